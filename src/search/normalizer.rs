//! Uniform searchable projection of every record variant.
//!
//! A record matches when the query is a substring of any one of its match
//! fields, compared case-insensitively. List fields are joined with a space
//! first, so a query may span two list items but never two fields.

use super::query::Query;
use crate::dataset::Record;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    CoreRule,
    Fine,
    Park,
    DogRun,
    Clinic,
    Event,
    Contact,
}

impl Category {
    /// Result group order.
    pub const ORDER: [Category; 7] = [
        Category::CoreRule,
        Category::Fine,
        Category::Park,
        Category::DogRun,
        Category::Clinic,
        Category::Event,
        Category::Contact,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::CoreRule => "Core Rule",
            Category::Fine => "Fines",
            Category::Park => "Park",
            Category::DogRun => "Dog Run",
            Category::Clinic => "Clinic",
            Category::Event => "Event",
            Category::Contact => "Contact",
        }
    }

    pub fn group(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub category: Category,
    pub title: String,
    pub meta: Option<String>,
    /// Lower-cased match fields.
    fields: Vec<String>,
}

impl Projection {
    fn new(
        category: Category,
        title: impl Into<String>,
        meta: Option<String>,
        fields: &[&str],
    ) -> Self {
        Self {
            category,
            title: title.into(),
            meta,
            fields: fields.iter().map(|f| f.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, query: &Query) -> bool {
        self.fields.iter().any(|f| query.found_in(f))
    }

    pub fn match_fields(&self) -> &[String] {
        &self.fields
    }
}

pub fn normalize(record: Record<'_>) -> Projection {
    match record {
        Record::CoreRule(rule) => Projection::new(Category::CoreRule, rule, None, &[rule]),
        Record::Fine(fine) => Projection::new(
            Category::Fine,
            format!("{} — {}", fine.violation, fine.penalty),
            None,
            &[fine.violation.as_str(), fine.note.as_str()],
        ),
        Record::Park(park) => Projection::new(
            Category::Park,
            &park.name,
            non_empty(&park.borough),
            &[
                park.name.as_str(),
                park.notes.as_str(),
                park.designated_areas.join(" ").as_str(),
            ],
        ),
        Record::DogRun(run) => Projection::new(
            Category::DogRun,
            &run.name,
            non_empty(&run.borough),
            &[run.name.as_str(), run.facilities.join(" ").as_str()],
        ),
        Record::Clinic(clinic) => Projection::new(
            Category::Clinic,
            &clinic.name,
            non_empty(&clinic.borough).or_else(|| non_empty(&clinic.boroughs.join(", "))),
            &[clinic.name.as_str(), clinic.services.join(" ").as_str()],
        ),
        Record::Event(event) => Projection::new(
            Category::Event,
            &event.name,
            non_empty(&event.month).or_else(|| non_empty(&event.date)),
            &[event.name.as_str(), event.desc.as_str()],
        ),
        Record::Contact(contact) => Projection::new(
            Category::Contact,
            &contact.service,
            non_empty(&contact.phone).or_else(|| non_empty(&contact.url)),
            &[contact.service.as_str(), contact.notes.as_str()],
        ),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
