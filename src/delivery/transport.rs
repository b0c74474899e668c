//! Transport seams for the dual-path exit delivery strategy.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::api::types::{PageVisitClose, PageVisitOpen, PageVisitOpened};

/// Primary transport: ordinary request/response, preferred because it
/// surfaces errors and carries the bearer header reliably.
#[async_trait]
pub trait AnalyticsTransport: Send + Sync {
    async fn create_page_visit(&self, open: &PageVisitOpen) -> Result<PageVisitOpened>;

    async fn close_page_visit(&self, visit_id: i64, close: &PageVisitClose) -> Result<()>;

    async fn send_logout(&self) -> Result<()>;
}

/// One-way send used by the outbox flusher. The response body and status
/// are never consumed; an `Ok` only means the request went out.
#[async_trait]
pub trait BeaconTransport: Send + Sync {
    async fn send_raw(&self, path: &str, body: Value) -> Result<()>;
}
