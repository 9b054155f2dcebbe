//! Minimum spacing between talks that hit the schedule and media servers.
//!
//! Talks are processed one at a time, so a single "last network use"
//! timestamp is enough. Talks skipped by the idempotence check never call
//! [`TalkPacer::mark`] and therefore never delay the next one.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument};

/// Enforces a minimum delay between consecutive network-bound talks.
#[derive(Debug)]
pub struct TalkPacer {
    min_delay: Duration,
    last_network_use: Option<Instant>,
}

impl TalkPacer {
    /// Creates a pacer with the given minimum delay.
    #[must_use]
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_network_use: None,
        }
    }

    /// Waits until `min_delay` has passed since the last [`mark`](Self::mark).
    ///
    /// Returns immediately for the first talk.
    #[instrument(skip(self), fields(min_delay_ms = self.min_delay.as_millis()))]
    pub async fn wait_turn(&self) {
        let Some(last) = self.last_network_use else {
            return;
        };
        let ready_at = last + self.min_delay;
        if ready_at > Instant::now() {
            debug!(
                wait_ms = (ready_at - Instant::now()).as_millis(),
                "pacing before next talk"
            );
            tokio::time::sleep_until(ready_at).await;
        }
    }

    /// Records that the current talk used the network.
    pub fn mark(&mut self) {
        self.last_network_use = Some(Instant::now());
    }
}
