//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a timestamp to Unix seconds as a float
///
/// Alert wire messages carry timestamps in this form.
pub fn unix_seconds(ts: DateTime<Utc>) -> f64 {
    ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_micros()) / 1_000_000.0
}

/// Convert seconds to duration
pub fn secs_to_duration(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_unix_seconds_whole_second() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(unix_seconds(ts), 1_700_000_000.0);
    }

    #[test]
    fn test_unix_seconds_subsecond_precision() {
        let ts = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        let secs = unix_seconds(ts);
        assert!((secs - 1_700_000_000.25).abs() < 1e-6);
    }

    #[test]
    fn test_unix_seconds_monotonic() {
        let a = Utc.timestamp_opt(100, 0).unwrap();
        let b = Utc.timestamp_opt(100, 500_000_000).unwrap();
        assert!(unix_seconds(b) > unix_seconds(a));
    }

    #[test]
    fn test_secs_to_duration() {
        assert_eq!(secs_to_duration(0), Duration::from_secs(0));
        assert_eq!(secs_to_duration(30), Duration::from_secs(30));
        assert_eq!(secs_to_duration(3600).as_secs(), 3600);
    }
}
