pub mod outbox;
pub mod transport;

pub use outbox::{Outbox, OutboxEntry, OutboxWorker};
pub use transport::{AnalyticsTransport, BeaconTransport};
