//! Named datasets, their load states, and the partitioned cache that fills them.

pub mod cache;
pub mod records;


pub use cache::{DatasetCache, Entries};
pub use records::*;

use crate::loader::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Core,
    Parks,
    DogRuns,
    Clinics,
    Resources,
}

impl DatasetKind {
    /// Search traversal order.
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Core,
        DatasetKind::Parks,
        DatasetKind::DogRuns,
        DatasetKind::Clinics,
        DatasetKind::Resources,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Core => "core",
            DatasetKind::Parks => "parks",
            DatasetKind::DogRuns => "dogruns",
            DatasetKind::Clinics => "clinics",
            DatasetKind::Resources => "resources",
        }
    }

    pub fn is_partitioned(self) -> bool {
        matches!(self, DatasetKind::Parks)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown dataset `{0}`")]
pub struct UnknownDataset(pub String);

impl FromStr for DatasetKind {
    type Err = UnknownDataset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownDataset(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadState {
    Unloaded,
    Loading,
    PartiallyLoaded,
    Loaded,
    Failed,
}

/// Valid JSON that does not have the shape the dataset expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed `{resource}`: {message}")]
pub struct ParseError {
    pub resource: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{dataset} has {merged}/{declared} partitions; missing {missing:?}")]
pub struct PartialDatasetError {
    pub dataset: DatasetKind,
    pub merged: usize,
    pub declared: usize,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Partial(#[from] PartialDatasetError),
}

/// Settled outcome of one `ensure_loaded` call.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub dataset: DatasetKind,
    pub state: LoadState,
    /// Failures from the fetch sequence this report came from; empty on a cache hit.
    pub errors: Vec<DatasetError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.state == LoadState::Loaded
    }
}
