pub mod controller;
pub mod exit;
pub mod state;

pub use controller::{PageTracker, TrackerSnapshot};
pub use exit::{ExitGuard, ExitHandlers, ExitTrigger};
pub use state::{LogoutState, TrackerState, VisitStatus};
