//! Shared fakes for the tracker and delivery tests.

use std::sync::{
    atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering},
    Arc, Mutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::{
    api::types::{PageVisitClose, PageVisitOpen, PageVisitOpened},
    delivery::transport::{AnalyticsTransport, BeaconTransport},
};

pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create(String),
    Close(i64, PageVisitClose),
    Logout,
}

/// Primary transport double: records every call, fails on demand.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<ApiCall>>,
    next_visit_id: AtomicI64,
    fail_create: AtomicBool,
    fail_close: AtomicBool,
    fail_logout: AtomicBool,
}

impl MockApi {
    pub fn new(next_visit_id: i64) -> Arc<Self> {
        let api = Self::default();
        api.next_visit_id.store(next_visit_id, Ordering::SeqCst);
        Arc::new(api)
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    pub fn fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalyticsTransport for MockApi {
    async fn create_page_visit(&self, open: &PageVisitOpen) -> Result<PageVisitOpened> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::Create(open.page_name.clone()));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated create failure"));
        }
        Ok(PageVisitOpened {
            id: self.next_visit_id.load(Ordering::SeqCst),
        })
    }

    async fn close_page_visit(&self, visit_id: i64, close: &PageVisitClose) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::Close(visit_id, close.clone()));
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated close failure"));
        }
        Ok(())
    }

    async fn send_logout(&self) -> Result<()> {
        self.calls.lock().unwrap().push(ApiCall::Logout);
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated logout failure"));
        }
        Ok(())
    }
}

/// Beacon double: records `(path, body)` pairs; `fail_next(n)` makes the
/// next `n` sends error out.
#[derive(Default)]
pub struct RecordingBeacon {
    sends: Mutex<Vec<(String, Value)>>,
    failures_left: AtomicU32,
}

impl RecordingBeacon {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sends(&self) -> Vec<(String, Value)> {
        self.sends.lock().unwrap().clone()
    }

    pub fn fail_next(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl BeaconTransport for RecordingBeacon {
    async fn send_raw(&self, path: &str, body: Value) -> Result<()> {
        self.sends
            .lock()
            .unwrap()
            .push((path.to_string(), body));
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            if left != u32::MAX {
                self.failures_left.store(left - 1, Ordering::SeqCst);
            }
            return Err(anyhow!("simulated beacon failure"));
        }
        Ok(())
    }
}
