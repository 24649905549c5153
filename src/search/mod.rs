//! Aggregated search across every dataset.

pub mod aggregator;
pub mod normalizer;
pub mod query;


pub use aggregator::{
    records, scan, OrderingKey, SearchAggregator, SearchHit, SearchOutcome, SearchResults,
};
pub use normalizer::{normalize, Category, Projection};
pub use query::Query;
