//! Time and timestamp utilities

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

/// Current time as an ISO 8601 string with millisecond precision
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Next firing of a fixed-period timer armed at `anchor`.
///
/// Firings happen at `anchor + k * period` for `k >= 1`. Returns the first
/// one strictly after `now`.
pub fn next_firing(anchor: DateTime<Utc>, period: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
    let period_ms = period.as_millis().max(1) as i64;
    let elapsed_ms = (now - anchor).num_milliseconds().max(0);
    let fired = elapsed_ms / period_ms;
    anchor + TimeDelta::milliseconds((fired + 1) * period_ms)
}

/// Seconds elapsed since `started`
pub fn uptime_seconds(started: DateTime<Utc>) -> i64 {
    (Utc::now() - started).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_next_firing_before_first_tick() {
        let next = next_firing(at(1_000), Duration::from_secs(300), at(1_010));
        assert_eq!(next, at(1_300));
    }

    #[test]
    fn test_next_firing_on_tick_boundary_moves_forward() {
        let next = next_firing(at(1_000), Duration::from_secs(300), at(1_300));
        assert_eq!(next, at(1_600));
    }

    #[test]
    fn test_next_firing_clock_behind_anchor() {
        let next = next_firing(at(1_000), Duration::from_secs(30), at(900));
        assert_eq!(next, at(1_030));
    }

    #[test]
    fn test_now_iso8601_format() {
        let now = now_iso8601();
        assert!(now.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
