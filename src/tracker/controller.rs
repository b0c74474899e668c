use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::{
    api::{
        paths,
        types::{PageVisitClose, PageVisitOpen},
    },
    clock::Clock,
    delivery::{
        outbox::{Outbox, OutboxEntry},
        transport::AnalyticsTransport,
    },
    durations::clamped_duration_seconds,
    token::TokenProvider,
};

use super::state::{TrackerState, VisitStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub page_name: String,
    pub session_start: DateTime<Utc>,
    pub state: TrackerState,
}

/// Tracks one page visit from mount to teardown and reports a deduplicated
/// logout signal on session end. Owned by the page that mounted it; cheap
/// to clone into exit handlers.
///
/// Every entry point is best-effort: failures are logged, never returned,
/// so tracking can never fail the page it observes.
#[derive(Clone)]
pub struct PageTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    page_name: String,
    session_start: DateTime<Utc>,
    state: Mutex<TrackerState>,
    transport: Arc<dyn AnalyticsTransport>,
    outbox: Outbox,
    tokens: Arc<dyn TokenProvider>,
    clock: Arc<dyn Clock>,
}

impl PageTracker {
    /// Session start is captured here, at construction.
    pub fn new(
        page_name: impl Into<String>,
        transport: Arc<dyn AnalyticsTransport>,
        outbox: Outbox,
        tokens: Arc<dyn TokenProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session_start = clock.now();
        Self {
            inner: Arc::new(TrackerInner {
                page_name: page_name.into(),
                session_start,
                state: Mutex::new(TrackerState::new()),
                transport,
                outbox,
                tokens,
                clock,
            }),
        }
    }

    pub fn page_name(&self) -> &str {
        &self.inner.page_name
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.inner.session_start
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        let state = self.inner.state.lock().await;
        TrackerSnapshot {
            page_name: self.inner.page_name.clone(),
            session_start: self.inner.session_start,
            state: state.clone(),
        }
    }

    /// Opens the page-visit record. No-op when already tracking or when no
    /// bearer token is present. A failed create is logged and dropped; that
    /// page view simply goes unrecorded.
    pub async fn start_tracking(&self) {
        let mut state = self.inner.state.lock().await;
        if state.status != VisitStatus::Idle {
            return;
        }
        if self.inner.tokens.token().is_none() {
            info!(
                "page visit for {} not tracked: no bearer token",
                self.inner.page_name
            );
            return;
        }

        let open = PageVisitOpen {
            page_name: self.inner.page_name.clone(),
        };
        match self.inner.transport.create_page_visit(&open).await {
            Ok(opened) => {
                state.begin_visit(opened.id);
                info!(
                    "started tracking {} as visit {}",
                    self.inner.page_name, opened.id
                );
            }
            Err(err) => {
                error!(
                    "failed to start tracking {}: {err:#}",
                    self.inner.page_name
                );
            }
        }
    }

    /// Closes the page-visit record with the elapsed duration and exit
    /// time. Primary transport first; on failure the same payload goes out
    /// through the outbox. The visit is terminal once this runs, whatever
    /// the delivery outcome.
    pub async fn stop_tracking(&self) {
        let mut state = self.inner.state.lock().await;
        if state.status != VisitStatus::Tracking || state.visit_id.is_none() {
            return;
        }
        if self.inner.tokens.token().is_none() {
            return;
        }
        let Some(visit_id) = state.begin_close() else {
            return;
        };

        let now = self.inner.clock.now();
        let close = PageVisitClose {
            exit_time: now,
            duration_seconds: clamped_duration_seconds(self.inner.session_start, now),
        };

        if let Err(err) = self.inner.transport.close_page_visit(visit_id, &close).await {
            warn!("close for visit {visit_id} failed, falling back to beacon: {err:#}");
            match serde_json::to_value(&close) {
                Ok(body) => {
                    let entry = OutboxEntry::new(paths::page_visit_exit(visit_id), body);
                    if let Err(beacon_err) = self.inner.outbox.enqueue(entry) {
                        error!("exit beacon for visit {visit_id} was not accepted: {beacon_err:#}");
                    }
                }
                Err(ser_err) => {
                    error!("exit payload for visit {visit_id} failed to serialize: {ser_err}");
                }
            }
        }

        state.finish_close();
        info!(
            "stopped tracking {} (visit {visit_id}, {:.1}s)",
            self.inner.page_name, close.duration_seconds
        );
    }

    /// Reports that the authenticated session is ending. Effective at most
    /// once: the logout flag only sets after the primary transport succeeds
    /// or the outbox accepts the fallback, so a total failure leaves a
    /// later exit trigger free to retry.
    pub async fn send_logout_event(&self) {
        let mut state = self.inner.state.lock().await;
        if state.has_logged_out() {
            return;
        }
        if self.inner.tokens.token().is_none() {
            return;
        }

        match self.inner.transport.send_logout().await {
            Ok(()) => {
                state.mark_logged_out();
                info!("logout event sent for {}", self.inner.page_name);
            }
            Err(err) => {
                warn!("logout failed, falling back to beacon: {err:#}");
                let entry = OutboxEntry::new(paths::LOGOUT, json!({}));
                match self.inner.outbox.enqueue(entry) {
                    Ok(()) => {
                        state.mark_logged_out();
                        info!("logout event queued via beacon");
                    }
                    Err(beacon_err) => {
                        error!("logout beacon was not accepted: {beacon_err:#}");
                    }
                }
            }
        }
    }
}
