//! Panel configuration: where the datasets live and how search behaves.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL `{0}`: {1}")]
    BaseUrl(String, url::ParseError),
    #[error("at least one park partition is required")]
    NoParkPartitions,
    #[error("park partition `{0}` is listed twice")]
    DuplicatePartition(String),
    #[error("result cap must be > 0")]
    ZeroResultCap,
    #[error("invalid value for {var}: `{value}`")]
    InvalidEnv { var: &'static str, value: String },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub resources: ResourceConfig,
    pub search: SearchConfig,
    pub http: HttpConfig,
}

/// Resource names for each dataset. `parks` is ordered; each entry is one partition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResourceConfig {
    pub core: String,
    pub parks: Vec<String>,
    pub dogruns: String,
    pub clinics: String,
    pub resources: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub result_cap: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            resources: ResourceConfig::default(),
            search: SearchConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            core: "dog_core.json".to_string(),
            parks: vec![
                "dog_parks_1.json".to_string(),
                "dog_parks_2.json".to_string(),
                "dog_parks_3.json".to_string(),
            ],
            dogruns: "dog_runs.json".to_string(),
            clinics: "clinics_and_services.json".to_string(),
            resources: "resources_events_contacts.json".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            result_cap: 200,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("dogpanel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl PanelConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("loading config {}", path.display()))
    }

    /// Defaults overridden by environment variables (a `.env` file is honoured).
    /// ENV vars: DOGPANEL_BASE_URL, DOGPANEL_DEBOUNCE_MS, DOGPANEL_RESULT_CAP,
    /// DOGPANEL_TIMEOUT_SECS, DOGPANEL_PARK_FILES (comma separated)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(url) = lookup("DOGPANEL_BASE_URL") {
            cfg.base_url = url;
        }
        if let Some(v) = lookup("DOGPANEL_DEBOUNCE_MS") {
            cfg.search.debounce_ms = parse_env("DOGPANEL_DEBOUNCE_MS", v)?;
        }
        if let Some(v) = lookup("DOGPANEL_RESULT_CAP") {
            cfg.search.result_cap = parse_env("DOGPANEL_RESULT_CAP", v)?;
        }
        if let Some(v) = lookup("DOGPANEL_TIMEOUT_SECS") {
            cfg.http.timeout_secs = parse_env("DOGPANEL_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = lookup("DOGPANEL_PARK_FILES") {
            cfg.resources.parks = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Base URL with a trailing slash so resource names join underneath it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| ConfigError::BaseUrl(self.base_url.clone(), e))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;

        if self.resources.parks.is_empty() {
            return Err(ConfigError::NoParkPartitions);
        }
        let mut seen = HashSet::new();
        for part in &self.resources.parks {
            if !seen.insert(part) {
                return Err(ConfigError::DuplicatePartition(part.clone()));
            }
        }

        if self.search.result_cap == 0 {
            return Err(ConfigError::ZeroResultCap);
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_published_site() {
        let cfg = PanelConfig::default();
        assert_eq!(cfg.resources.parks.len(), 3);
        assert_eq!(cfg.search.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.search.result_cap, 200);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = PanelConfig::from_toml_str(
            r#"
            base_url = "https://dogs.example.org/data"

            [resources]
            parks = ["north.json", "south.json"]

            [search]
            result_cap = 50
            "#,
        )
        .unwrap();

        assert_eq!(cfg.resources.parks, vec!["north.json", "south.json"]);
        assert_eq!(cfg.resources.core, "dog_core.json");
        assert_eq!(cfg.search.result_cap, 50);
        assert_eq!(cfg.search.debounce_ms, 300);
        assert_eq!(
            cfg.base_url().unwrap().as_str(),
            "https://dogs.example.org/data/"
        );
    }

    #[test]
    fn rejects_bad_values() {
        let dup = PanelConfig::from_toml_str("[resources]\nparks = [\"a.json\", \"a.json\"]");
        assert!(matches!(dup, Err(ConfigError::DuplicatePartition(p)) if p == "a.json"));

        let empty = PanelConfig::from_toml_str("[resources]\nparks = []");
        assert!(matches!(empty, Err(ConfigError::NoParkPartitions)));

        let cap = PanelConfig::from_toml_str("[search]\nresult_cap = 0");
        assert!(matches!(cap, Err(ConfigError::ZeroResultCap)));

        let url = PanelConfig::from_toml_str("base_url = \"not a url\"");
        assert!(matches!(url, Err(ConfigError::BaseUrl(..))));
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DOGPANEL_DEBOUNCE_MS", "150"),
            ("DOGPANEL_PARK_FILES", "p1.json, p2.json,"),
        ]
        .into_iter()
        .collect();

        let cfg = PanelConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.search.debounce_ms, 150);
        assert_eq!(cfg.resources.parks, vec!["p1.json", "p2.json"]);

        let bad = PanelConfig::from_lookup(|k| {
            (k == "DOGPANEL_RESULT_CAP").then(|| "lots".to_string())
        });
        assert!(matches!(
            bad,
            Err(ConfigError::InvalidEnv { var: "DOGPANEL_RESULT_CAP", .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\ntimeout_secs = 3").unwrap();

        let cfg = PanelConfig::load(file.path()).unwrap();
        assert_eq!(cfg.http.timeout_secs, 3);

        let missing = PanelConfig::load(file.path().with_extension("absent"));
        assert!(missing.is_err());
    }
}
