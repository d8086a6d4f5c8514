//! Trailing-edge debounce for slider commits.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::sleep;

/// Hands out tickets; only the most recent ticket fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

/// One scheduled commit. Await [`DebounceTicket::wait`] to learn whether it
/// is still the latest after the quiet period.
#[derive(Debug)]
#[must_use = "a ticket does nothing unless awaited"]
pub struct DebounceTicket {
    generation: u64,
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a new quiet period, superseding every outstanding ticket.
    pub fn schedule(&self) -> DebounceTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        DebounceTicket {
            generation,
            delay: self.delay,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Supersede every outstanding ticket without starting a new one.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }
}

impl DebounceTicket {
    /// Sleep for the quiet period; `true` if no newer ticket was scheduled meanwhile.
    pub async fn wait(self) -> bool {
        sleep(self.delay).await;
        self.is_latest()
    }

    /// Whether this ticket has not been superseded yet.
    pub fn is_latest(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}
