//! Lazy multi-source dataset cache and aggregated search for the dog-owner
//! reference panel.
//!
//! ```text
//! input (debounced) → search → dataset cache (fills gaps) → normalizer → results
//! tab select        → dataset cache → tab view
//! ```

pub mod config;
pub mod dataset;
pub mod input;
pub mod loader;
pub mod panel;
pub mod search;
pub mod tabs;
pub mod telemetry;
pub mod view;

pub use config::PanelConfig;
pub use dataset::{DatasetCache, DatasetKind, LoadReport, LoadState};
pub use loader::{FetchError, ResourceLoader};
pub use panel::{Panel, PanelEvent};
pub use search::{SearchAggregator, SearchOutcome, SearchResults};
pub use view::{ParkFilter, TabView};
