//! Single-slot timer: each `schedule` re-arms the timer and invalidates the
//! previous one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Identity of one scheduled job; goes stale as soon as anything newer is scheduled.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: Arc<AtomicU64>,
    id: u64,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }
}

pub struct Debouncer {
    quiet: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Make every outstanding ticket stale and hand out a fresh one.
    pub fn invalidate(&mut self) -> Ticket {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation: self.generation.clone(),
            id,
        }
    }

    /// Run `job` once the quiet interval passes without another call.
    /// A job whose ticket went stale while waiting never runs.
    pub fn schedule<F, Fut>(&mut self, job: F)
    where
        F: FnOnce(Ticket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.invalidate();
        let quiet = self.quiet;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if !ticket.is_current() {
                trace!(id = ticket.id, "superseded before firing");
                return;
            }
            job(ticket).await;
        }));
    }

    /// Wait for the most recently scheduled job, if any.
    pub async fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.await;
        }
    }
}
