//! The session object: one cache shared by tab switching and search input.

use crate::config::PanelConfig;
use crate::dataset::{DatasetCache, DatasetKind, LoadReport, LoadState};
use crate::input::InputController;
use crate::loader::{HttpLoader, ResourceLoader};
use crate::search::{SearchAggregator, SearchResults};
use crate::tabs::TabController;
use crate::view::TabView;
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::info;

/// Everything the view layer is asked to render.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// A debounced search has started.
    Searching(String),
    Results(SearchResults),
    /// The search box was cleared; the named tab is shown again.
    Redisplay(DatasetKind),
    Tab { view: TabView, report: LoadReport },
    TabFailed(LoadReport),
}

pub struct Panel {
    config: PanelConfig,
    cache: DatasetCache,
    tabs: TabController,
    input: InputController,
}

impl Panel {
    pub fn new(
        config: PanelConfig,
        loader: Arc<dyn ResourceLoader>,
    ) -> (Self, UnboundedReceiver<PanelEvent>) {
        let (events, rx) = mpsc::unbounded_channel();

        let cache = DatasetCache::new(loader, config.resources.clone());
        let tabs = TabController::new(cache.clone(), events.clone(), DatasetKind::Core);
        let aggregator = Arc::new(SearchAggregator::new(cache.clone(), config.search.result_cap));
        let input =
            InputController::new(aggregator, tabs.clone(), events, config.search.debounce());

        let panel = Self {
            config,
            cache,
            tabs,
            input,
        };
        (panel, rx)
    }

    /// Panel fetching its datasets over HTTP from `config.base_url`.
    pub fn connect(config: PanelConfig) -> anyhow::Result<(Self, UnboundedReceiver<PanelEvent>)> {
        config.validate().context("invalid panel config")?;
        let base = config.base_url()?;
        let loader = HttpLoader::new(base.clone(), &config.http).context("building HTTP client")?;
        info!(%base, "panel connected");
        Ok(Self::new(config, Arc::new(loader)))
    }

    /// Initial view: the overview tab.
    pub fn start(&self) -> JoinHandle<()> {
        self.tabs.select(DatasetKind::Core)
    }

    pub fn select_tab(&self, tab: DatasetKind) -> JoinHandle<()> {
        self.tabs.select(tab)
    }

    pub fn active_tab(&self) -> DatasetKind {
        self.tabs.active()
    }

    pub fn on_search_input(&mut self, raw: &str) {
        self.input.on_input(raw);
    }

    /// Wait for the pending debounced search, if any.
    pub async fn flush_search(&mut self) {
        self.input.flush().await;
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn load_states(&self) -> Vec<(DatasetKind, LoadState)> {
        self.cache.statuses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_uses_validated_config() {
        let config = PanelConfig {
            base_url: "https://dogs.example.org/data".into(),
            ..PanelConfig::default()
        };
        let (panel, _rx) = Panel::connect(config).unwrap();

        assert_eq!(panel.config().base_url, "https://dogs.example.org/data");
        assert_eq!(panel.active_tab(), DatasetKind::Core);
        assert!(panel
            .load_states()
            .iter()
            .all(|(_, state)| *state == LoadState::Unloaded));
    }

    #[tokio::test]
    async fn connect_rejects_invalid_config() {
        let mut config = PanelConfig::default();
        config.resources.parks.clear();
        assert!(Panel::connect(config).is_err());
    }
}
