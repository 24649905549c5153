//! Tab selection: remember the active tab, load its dataset, emit its view.

use crate::dataset::{DatasetCache, DatasetKind, LoadState};
use crate::panel::PanelEvent;
use crate::view::TabView;
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedSender, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct TabController {
    cache: DatasetCache,
    events: UnboundedSender<PanelEvent>,
    active: Arc<watch::Sender<DatasetKind>>,
}

impl TabController {
    pub fn new(
        cache: DatasetCache,
        events: UnboundedSender<PanelEvent>,
        initial: DatasetKind,
    ) -> Self {
        let (active, _) = watch::channel(initial);
        Self {
            cache,
            events,
            active: Arc::new(active),
        }
    }

    pub fn active(&self) -> DatasetKind {
        *self.active.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DatasetKind> {
        self.active.subscribe()
    }

    /// Switch tabs and eagerly load the tab's dataset.
    pub fn select(&self, tab: DatasetKind) -> JoinHandle<()> {
        self.active.send_replace(tab);
        self.spawn_show(tab)
    }

    /// Show the active tab again, e.g. after the search box is cleared.
    pub fn redisplay(&self) -> JoinHandle<()> {
        self.spawn_show(self.active())
    }

    fn spawn_show(&self, tab: DatasetKind) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let event = this.show(tab).await;
            if this.active() != tab {
                debug!(%tab, "tab changed while loading; view dropped");
                return;
            }
            let _ = this.events.send(event);
        })
    }

    #[instrument(skip(self))]
    pub async fn show(&self, tab: DatasetKind) -> PanelEvent {
        let report = self.cache.ensure_loaded(tab).await;

        match TabView::from_entries(tab, &self.cache.snapshot()) {
            Some(view) if report.state != LoadState::Failed => {
                debug!(dataset = %view.dataset(), entries = view.len(), "tab ready");
                PanelEvent::Tab { view, report }
            }
            _ => {
                warn!(%tab, state = ?report.state, "tab data unavailable");
                PanelEvent::TabFailed(report)
            }
        }
    }
}
