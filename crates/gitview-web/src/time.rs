//! Date formatting for commit and ref times.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Formats unix seconds as `YYYY-MM-DD HH:MM` (UTC).
pub fn format_date(when: i64) -> String {
    DateTime::<Utc>::from_timestamp(when, 0)
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Formats unix seconds as RFC 2822, for feeds.
pub fn format_rfc2822(when: i64) -> String {
    DateTime::<Utc>::from_timestamp(when, 0)
        .map(|date| date.to_rfc2822())
        .unwrap_or_default()
}

/// Describes how long ago `when` was, relative to `now`.
pub fn time_ago(when: i64, now: i64) -> String {
    let delta = now.saturating_sub(when).max(0);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };
    match delta {
        d if d < MINUTE => "just now".to_string(),
        d if d < HOUR => plural(d / MINUTE, "min"),
        d if d < DAY => plural(d / HOUR, "hour"),
        d if d < 2 * DAY => "yesterday".to_string(),
        d if d < 30 * DAY => plural(d / DAY, "day"),
        d if d < 365 * DAY => plural(d / (30 * DAY), "month"),
        d => plural(d / (365 * DAY), "year"),
    }
}

/// Current time in unix seconds.
pub fn now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(0), "1970-01-01 00:00");
        assert_eq!(format_date(1_700_000_000), "2023-11-14 22:13");
    }

    #[test]
    fn test_format_rfc2822() {
        let formatted = format_rfc2822(0);
        assert!(formatted.starts_with("Thu, "));
        assert!(formatted.ends_with("Jan 1970 00:00:00 +0000"));
    }

    #[test]
    fn test_time_ago() {
        let now = 1_000_000_000;
        assert_eq!(time_ago(now - 5, now), "just now");
        assert_eq!(time_ago(now - 60, now), "1 min ago");
        assert_eq!(time_ago(now - 3 * HOUR, now), "3 hours ago");
        assert_eq!(time_ago(now - DAY - HOUR, now), "yesterday");
        assert_eq!(time_ago(now - 10 * DAY, now), "10 days ago");
        assert_eq!(time_ago(now - 90 * DAY, now), "3 months ago");
        assert_eq!(time_ago(now - 800 * DAY, now), "2 years ago");
        assert_eq!(time_ago(now + 100, now), "just now");
    }
}
