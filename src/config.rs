use std::{env, time::Duration};

use log::info;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const API_URL_ENV: &str = "PAGETRACK_API_URL";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Base URL of the analytics API, without a trailing slash.
    pub base_url: String,
    /// Entries the fallback outbox will hold before rejecting sends.
    pub outbox_capacity: usize,
    /// Delivery attempts per outbox entry before it is dropped.
    pub flush_max_attempts: u32,
    pub flush_backoff_base: Duration,
    pub flush_backoff_cap: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            outbox_capacity: 64,
            flush_max_attempts: 4,
            flush_backoff_base: Duration::from_millis(250),
            flush_backoff_cap: Duration::from_secs(5),
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        let base_url = env::var(API_URL_ENV)
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| {
                info!("{API_URL_ENV} not set, using default: {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });

        Self {
            base_url,
            ..Self::default()
        }
    }
}
