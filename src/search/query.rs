//! Search-box text, trimmed and case-folded.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// `None` for empty or whitespace-only input: that is the redisplay state,
    /// not a zero-length search.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded = raw.trim().to_lowercase();
        (!folded.is_empty()).then_some(Self(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring containment against pre-folded text.
    pub fn found_in(&self, folded: &str) -> bool {
        folded.contains(self.0.as_str())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_not_a_query() {
        assert!(Query::parse("").is_none());
        assert!(Query::parse("   \t\n").is_none());
    }

    #[test]
    fn trims_and_folds() {
        let q = Query::parse("  Off-Leash HOURS ").unwrap();
        assert_eq!(q.as_str(), "off-leash hours");
        assert!(q.found_in("early off-leash hours before 9am"));
    }
}
