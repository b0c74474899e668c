use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    config::TrackerConfig,
    delivery::transport::{AnalyticsTransport, BeaconTransport},
    token::TokenProvider,
};

use super::{
    paths,
    types::{PageVisitClose, PageVisitOpen, PageVisitOpened},
};

/// HTTP client for the analytics API. Implements both delivery paths: the
/// primary request/response transport and the one-way beacon sends the
/// outbox flusher uses.
pub struct AnalyticsClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl AnalyticsClient {
    pub fn new(config: &TrackerConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Token is read from the shared store at call time, never cached here.
    fn bearer(&self) -> Result<String> {
        self.tokens
            .token()
            .ok_or_else(|| anyhow!("no bearer token available"))
    }
}

#[async_trait]
impl AnalyticsTransport for AnalyticsClient {
    async fn create_page_visit(&self, open: &PageVisitOpen) -> Result<PageVisitOpened> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.endpoint(paths::PAGE_VISIT))
            .bearer_auth(token)
            .json(open)
            .send()
            .await
            .context("create page visit request failed")?
            .error_for_status()
            .context("create page visit was rejected")?;

        response
            .json::<PageVisitOpened>()
            .await
            .context("malformed create page visit response")
    }

    async fn close_page_visit(&self, visit_id: i64, close: &PageVisitClose) -> Result<()> {
        let token = self.bearer()?;
        self.http
            .post(self.endpoint(&paths::page_visit_exit(visit_id)))
            .bearer_auth(token)
            .json(close)
            .send()
            .await
            .with_context(|| format!("close request for visit {visit_id} failed"))?
            .error_for_status()
            .with_context(|| format!("close request for visit {visit_id} was rejected"))?;
        Ok(())
    }

    async fn send_logout(&self) -> Result<()> {
        let token = self.bearer()?;
        self.http
            .post(self.endpoint(paths::LOGOUT))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await
            .context("logout request failed")?
            .error_for_status()
            .context("logout request was rejected")?;
        Ok(())
    }
}

#[async_trait]
impl BeaconTransport for AnalyticsClient {
    async fn send_raw(&self, path: &str, body: Value) -> Result<()> {
        let token = self.bearer()?;
        // Fire-and-forget: status and body are deliberately not inspected.
        self.http
            .post(self.endpoint(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("beacon send to {path} failed"))?;
        Ok(())
    }
}
