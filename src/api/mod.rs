pub mod client;
pub mod types;

pub use client::AnalyticsClient;

/// Analytics API paths, relative to the configured base URL.
pub mod paths {
    pub const PAGE_VISIT: &str = "/analytics/analytics/page-visit";
    pub const LOGOUT: &str = "/analytics/analytics/logout";

    pub fn page_visit_exit(visit_id: i64) -> String {
        format!("{PAGE_VISIT}/{visit_id}/exit")
    }
}
