use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VisitStatus {
    Idle,
    Tracking,
    Closing,
    Closed,
}

impl Default for VisitStatus {
    fn default() -> Self {
        VisitStatus::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LogoutState {
    Pending,
    Sent,
}

impl Default for LogoutState {
    fn default() -> Self {
        LogoutState::Pending
    }
}

/// Visit and logout lifecycle for one tracker instance. All transitions
/// happen under the controller's mutex, so whichever exit trigger gets the
/// lock first wins the close and the rest see a terminal status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub status: VisitStatus,
    pub visit_id: Option<i64>,
    pub logout: LogoutState,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_visit(&mut self, visit_id: i64) {
        self.status = VisitStatus::Tracking;
        self.visit_id = Some(visit_id);
    }

    /// Claims the close transition. Returns the visit id when this caller
    /// won it and must perform the delivery; `None` when there is nothing
    /// to close or someone else already claimed it.
    pub fn begin_close(&mut self) -> Option<i64> {
        if self.status != VisitStatus::Tracking {
            return None;
        }
        let visit_id = self.visit_id?;
        self.status = VisitStatus::Closing;
        Some(visit_id)
    }

    /// Terminal regardless of whether the delivery landed.
    pub fn finish_close(&mut self) {
        self.status = VisitStatus::Closed;
    }

    pub fn has_logged_out(&self) -> bool {
        self.logout == LogoutState::Sent
    }

    pub fn mark_logged_out(&mut self) {
        self.logout = LogoutState::Sent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle_and_pending() {
        let state = TrackerState::new();
        assert_eq!(state.status, VisitStatus::Idle);
        assert_eq!(state.visit_id, None);
        assert!(!state.has_logged_out());
    }

    #[test]
    fn close_requires_a_tracked_visit() {
        let mut state = TrackerState::new();
        assert_eq!(state.begin_close(), None);

        state.begin_visit(42);
        assert_eq!(state.begin_close(), Some(42));
        assert_eq!(state.status, VisitStatus::Closing);

        // second claimant loses
        assert_eq!(state.begin_close(), None);

        state.finish_close();
        assert_eq!(state.status, VisitStatus::Closed);
        assert_eq!(state.begin_close(), None);
    }

    #[test]
    fn logout_flag_is_sticky() {
        let mut state = TrackerState::new();
        state.mark_logged_out();
        assert!(state.has_logged_out());
    }
}
