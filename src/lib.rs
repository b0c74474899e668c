//! Best-effort page-visit and session analytics tracking.
//!
//! One [`PageTracker`] instance covers one page mount: it opens a
//! page-visit record on entry, closes it with the elapsed duration on
//! exit, and emits a deduplicated logout signal when the session ends.
//! Exit-path sends try the primary HTTP transport first and fall back to
//! an in-process outbox flushed in the background, so teardown-time data
//! has two chances to reach the server. Everything is fire-and-forget
//! from the embedding shell's point of view: tracking failures are logged
//! and never surface to the page.

pub mod api;
pub mod clock;
pub mod config;
pub mod delivery;
pub mod durations;
pub mod token;
pub mod tracker;
mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use api::client::AnalyticsClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use delivery::outbox::{Outbox, OutboxEntry, OutboxWorker};
pub use delivery::transport::{AnalyticsTransport, BeaconTransport};
pub use token::{SharedTokenStore, StaticToken, TokenProvider};
pub use tracker::{
    ExitGuard, ExitHandlers, ExitTrigger, LogoutState, PageTracker, TrackerSnapshot,
    TrackerState, VisitStatus,
};

/// Wires up a tracker for one page mount with the default HTTP transport:
/// one `AnalyticsClient` serving both delivery paths, plus the outbox
/// flusher. Must be called inside a tokio runtime. The returned worker
/// should be shut down on unmount so queued beacons get drained.
pub fn spawn_page_tracker(
    page_name: impl Into<String>,
    config: &TrackerConfig,
    tokens: Arc<dyn TokenProvider>,
) -> (PageTracker, OutboxWorker) {
    let client = Arc::new(AnalyticsClient::new(config, tokens.clone()));
    let (outbox, worker) = Outbox::start(config, client.clone());
    let tracker = PageTracker::new(page_name, client, outbox, tokens, Arc::new(SystemClock));
    (tracker, worker)
}
