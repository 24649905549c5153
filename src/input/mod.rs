//! Search-box input: debounce keystrokes, route blank input to the active tab.

pub mod debounce;

pub use debounce::{Debouncer, Ticket};

use crate::panel::PanelEvent;
use crate::search::{Query, SearchAggregator, SearchOutcome};
use crate::tabs::TabController;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

pub struct InputController {
    aggregator: Arc<SearchAggregator>,
    tabs: TabController,
    events: UnboundedSender<PanelEvent>,
    debouncer: Debouncer,
}

impl InputController {
    pub fn new(
        aggregator: Arc<SearchAggregator>,
        tabs: TabController,
        events: UnboundedSender<PanelEvent>,
        quiet: Duration,
    ) -> Self {
        Self {
            aggregator,
            tabs,
            events,
            debouncer: Debouncer::new(quiet),
        }
    }

    /// Feed one raw input-change event.
    #[instrument(skip(self))]
    pub fn on_input(&mut self, raw: &str) {
        if Query::parse(raw).is_none() {
            // Blank input skips the delay and drops any pending search.
            self.debouncer.invalidate();
            let tab = self.tabs.active();
            debug!(%tab, "blank query; redisplaying tab");
            let _ = self.events.send(PanelEvent::Redisplay(tab));
            self.tabs.redisplay();
            return;
        }

        let raw = raw.to_string();
        let aggregator = self.aggregator.clone();
        let events = self.events.clone();

        self.debouncer.schedule(move |ticket| async move {
            let _ = events.send(PanelEvent::Searching(raw.clone()));

            match aggregator.search(&raw).await {
                SearchOutcome::Results(results) if ticket.is_current() => {
                    let _ = events.send(PanelEvent::Results(results));
                }
                SearchOutcome::Results(results) => {
                    // Cache fill is kept; only the stale result list is dropped.
                    debug!(query = %results.query, "superseded search discarded");
                }
                SearchOutcome::Redisplay => {}
            }
        });
    }

    /// Wait for the pending debounced search (if any) to finish.
    pub async fn flush(&mut self) {
        self.debouncer.flush().await;
    }
}
