use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of the create-page-visit call. Entry time is assigned server-side.
#[derive(Debug, Clone, Serialize)]
pub struct PageVisitOpen {
    pub page_name: String,
}

/// Server reply to create-page-visit. The record carries more fields, but
/// only the visit id is consumed client-side.
#[derive(Debug, Clone, Deserialize)]
pub struct PageVisitOpened {
    pub id: i64,
}

/// Body of the close-page-visit call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageVisitClose {
    pub exit_time: DateTime<Utc>,
    pub duration_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn close_payload_uses_wire_field_names() {
        let close = PageVisitClose {
            exit_time: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            duration_seconds: 125.4,
        };

        let value = serde_json::to_value(&close).unwrap();
        assert_eq!(value["duration_seconds"], 125.4);
        // exit_time must be an ISO-8601 string the server can parse back
        let raw = value["exit_time"].as_str().unwrap();
        let parsed: DateTime<Utc> = raw.parse().unwrap();
        assert_eq!(parsed, close.exit_time);
    }

    #[test]
    fn opened_reply_ignores_extra_fields() {
        let opened: PageVisitOpened = serde_json::from_str(
            r#"{"id": 7, "page_name": "presentation", "user_id": 3, "entry_time": "2025-03-14T09:26:53Z"}"#,
        )
        .unwrap();
        assert_eq!(opened.id, 7);
    }
}
