//! Session-duration math and the admin-facing formatting helpers.

use chrono::{DateTime, Utc};

/// Sessions longer than a day get flagged as suspect, not rejected.
const MAX_PLAUSIBLE_SESSION_SECS: f64 = 24.0 * 3600.0;

/// Elapsed seconds between `start` and `now`, clamped at zero so a clock
/// adjusted backward mid-session never yields a negative duration.
pub fn clamped_duration_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(start).num_milliseconds();
    millis.max(0) as f64 / 1000.0
}

/// Renders seconds as "2h 30m 15s". Zero-ish and negative inputs come out
/// as "0s".
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 {
        return "0s".to_string();
    }

    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || hours > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }

    parts.join(" ")
}

/// Mean over the positive samples; zero when none qualify.
pub fn average_session_seconds(durations: &[f64]) -> f64 {
    let valid: Vec<f64> = durations.iter().copied().filter(|d| *d > 0.0).collect();
    if valid.is_empty() {
        return 0.0;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}

pub fn is_plausible_session_duration(seconds: f64) -> bool {
    (0.0..=MAX_PLAUSIBLE_SESSION_SECS).contains(&seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn duration_is_elapsed_millis_over_thousand() {
        let start = Utc::now();
        let now = start + Duration::milliseconds(125_400);
        let duration = clamped_duration_seconds(start, now);
        assert!((duration - 125.4).abs() < 0.001);
    }

    #[test]
    fn backward_clock_clamps_to_zero() {
        let start = Utc::now();
        let now = start - Duration::seconds(5);
        assert_eq!(clamped_duration_seconds(start, now), 0.0);
    }

    #[test]
    fn formats_full_hours_minutes_seconds() {
        assert_eq!(format_duration(2.0 * 3600.0 + 30.0 * 60.0 + 15.0), "2h 30m 15s");
        assert_eq!(format_duration(3600.0), "1h 0m");
        assert_eq!(format_duration(60.0), "1m");
        assert_eq!(format_duration(45.9), "45s");
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(-3.0), "0s");
    }

    #[test]
    fn average_skips_non_positive_samples() {
        assert_eq!(average_session_seconds(&[]), 0.0);
        assert_eq!(average_session_seconds(&[-10.0, 0.0]), 0.0);
        assert_eq!(average_session_seconds(&[30.0, 90.0, -5.0]), 60.0);
    }

    #[test]
    fn plausibility_bounds() {
        assert!(is_plausible_session_duration(0.0));
        assert!(is_plausible_session_duration(8.0 * 3600.0));
        assert!(is_plausible_session_duration(24.0 * 3600.0));
        assert!(!is_plausible_session_duration(24.0 * 3600.0 + 1.0));
        assert!(!is_plausible_session_duration(-1.0));
    }
}
