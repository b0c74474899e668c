//! In-process fallback for exit-path sends.
//!
//! The browser original leaned on `navigator.sendBeacon`, which the host
//! schedules independently of page lifetime. Here the equivalent is an
//! outbox: `enqueue` hands the payload to a bounded queue and returns
//! immediately, and a background flusher task delivers entries with bounded
//! retries. Once the retry budget is spent an entry is dropped and logged;
//! analytics data loss at that point is accepted.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use rand::Rng;
use serde_json::Value;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::TrackerConfig;

use super::transport::BeaconTransport;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// One queued exit-path send.
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub path: String,
    pub body: Value,
}

impl OutboxEntry {
    pub fn new(path: impl Into<String>, body: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            body,
        }
    }
}

struct FlushPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_cap: Duration,
}

impl From<&TrackerConfig> for FlushPolicy {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            max_attempts: config.flush_max_attempts.max(1),
            backoff_base: config.flush_backoff_base,
            backoff_cap: config.flush_backoff_cap,
        }
    }
}

/// Sending half of the fallback queue. Cheap to clone.
#[derive(Clone)]
pub struct Outbox {
    queue: mpsc::Sender<OutboxEntry>,
}

impl Outbox {
    /// Spawns the flusher task and returns the queue handle plus the worker
    /// handle that owns shutdown. Must be called inside a tokio runtime.
    pub fn start(
        config: &TrackerConfig,
        beacon: Arc<dyn BeaconTransport>,
    ) -> (Self, OutboxWorker) {
        let (queue, rx) = mpsc::channel(config.outbox_capacity.max(1));
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(flush_loop(
            rx,
            beacon,
            FlushPolicy::from(config),
            cancel_token.clone(),
        ));

        (
            Self { queue },
            OutboxWorker {
                handle: Some(handle),
                cancel_token,
            },
        )
    }

    /// Accepts an entry for later delivery. Returns as soon as the queue
    /// takes it; delivery outcome is never observable from here. Fails when
    /// the queue is full or the flusher is gone.
    pub fn enqueue(&self, entry: OutboxEntry) -> Result<()> {
        self.queue
            .try_send(entry)
            .map_err(|err| anyhow!("outbox rejected entry: {err}"))
    }
}

pub struct OutboxWorker {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl OutboxWorker {
    /// Stops the flusher. Entries already queued get one final delivery
    /// attempt each, without backoff.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.await.context("outbox flusher failed to join")?;
        }
        Ok(())
    }
}

async fn flush_loop(
    mut rx: mpsc::Receiver<OutboxEntry>,
    beacon: Arc<dyn BeaconTransport>,
    policy: FlushPolicy,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            maybe_entry = rx.recv() => {
                match maybe_entry {
                    Some(entry) => deliver_with_retry(&*beacon, &policy, entry, &cancel_token).await,
                    None => break,
                }
            }
            _ = cancel_token.cancelled() => {
                drain(&mut rx, &*beacon).await;
                log_info!("outbox flusher shutting down");
                break;
            }
        }
    }
}

/// Final pass over whatever is already queued: one attempt each, no sleeps.
async fn drain(rx: &mut mpsc::Receiver<OutboxEntry>, beacon: &dyn BeaconTransport) {
    while let Ok(entry) = rx.try_recv() {
        if let Err(err) = beacon.send_raw(&entry.path, entry.body.clone()).await {
            log_warn!(
                "outbox drain: dropping entry {} for {}: {err:#}",
                entry.id,
                entry.path
            );
        }
    }
}

async fn deliver_with_retry(
    beacon: &dyn BeaconTransport,
    policy: &FlushPolicy,
    entry: OutboxEntry,
    cancel_token: &CancellationToken,
) {
    for attempt in 1..=policy.max_attempts {
        match beacon.send_raw(&entry.path, entry.body.clone()).await {
            Ok(()) => {
                log_info!(
                    "outbox delivered {} to {} (attempt {attempt})",
                    entry.id,
                    entry.path
                );
                return;
            }
            Err(err) if attempt == policy.max_attempts => {
                log_error!(
                    "outbox dropping {} for {} after {attempt} attempts: {err:#}",
                    entry.id,
                    entry.path
                );
                return;
            }
            Err(err) => {
                let delay = backoff_delay(policy, attempt);
                log_warn!(
                    "outbox attempt {attempt} for {} failed, retrying in {delay:?}: {err:#}",
                    entry.path
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel_token.cancelled() => {
                        // Shutdown mid-retry: one last immediate attempt.
                        if let Err(err) = beacon.send_raw(&entry.path, entry.body.clone()).await {
                            log_warn!("outbox shutdown: dropping entry {}: {err:#}", entry.id);
                        }
                        return;
                    }
                }
            }
        }
    }
}

fn backoff_delay(policy: &FlushPolicy, attempt: u32) -> Duration {
    let shift = (attempt - 1).min(16);
    let exponential = policy
        .backoff_base
        .saturating_mul(1u32 << shift)
        .min(policy.backoff_cap);
    // Jitter between 50% and 150% keeps retries from lining up.
    exponential.mul_f64(rand::thread_rng().gen_range(0.5..1.5))
}
