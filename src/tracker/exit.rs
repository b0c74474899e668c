use log::info;
use tokio_util::sync::CancellationToken;

use super::controller::PageTracker;

/// Page-teardown boundaries the UI shell reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    PageUnload,
    VisibilityHidden,
}

/// Registration of a tracker against the exit triggers. The shell calls
/// [`ExitHandlers::fire`] from its unload and visibility-change hooks; both
/// run the same sequence, close the visit then signal logout.
#[derive(Clone)]
pub struct ExitHandlers {
    tracker: PageTracker,
    armed: CancellationToken,
}

impl ExitHandlers {
    /// Registers `tracker` and returns the guard that removes the
    /// registration. The caller keeps the guard until unmount; once it is
    /// disarmed (or dropped), firing becomes a no-op.
    pub fn register(tracker: PageTracker) -> (Self, ExitGuard) {
        let armed = CancellationToken::new();
        let handlers = Self {
            tracker,
            armed: armed.clone(),
        };
        (handlers, ExitGuard { armed })
    }

    pub async fn fire(&self, trigger: ExitTrigger) {
        if self.armed.is_cancelled() {
            return;
        }
        info!("exit trigger {trigger:?} fired");
        self.tracker.stop_tracking().await;
        self.tracker.send_logout_event().await;
    }
}

/// Scoped de-registration of the exit handlers.
pub struct ExitGuard {
    armed: CancellationToken,
}

impl ExitGuard {
    /// Explicit form of dropping the guard.
    pub fn disarm(self) {}
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.armed.cancel();
    }
}
