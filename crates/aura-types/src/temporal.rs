use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock timestamp in milliseconds since the UNIX epoch.
///
/// Serialized as a bare integer, matching the millisecond timestamps that
/// sensor producers send.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from milliseconds since the epoch.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(ms)
    }

    /// Milliseconds since the epoch.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns `true` for the zero timestamp, which producers use to mean
    /// "not set".
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// A timestamp `duration` earlier, clamped at the epoch.
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        Self(self.0.saturating_sub(duration.as_millis() as u64))
    }

    /// A timestamp `duration` later.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.as_millis() as u64))
    }

    /// Convert to a UTC `DateTime`. Out-of-range values clamp to the epoch.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        i64::try_from(self.0)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// RFC 3339 rendering with millisecond precision, e.g.
    /// `2024-05-01T12:00:00.000Z`.
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The UTC calendar day this timestamp falls on.
    pub fn utc_day(&self) -> NaiveDate {
        self.to_datetime().date_naive()
    }
}

impl From<u64> for Timestamp {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_produces_reasonable_timestamp() {
        // Should be after 2020-01-01 (1577836800000 ms)
        assert!(Timestamp::now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn zero_means_unset() {
        assert!(Timestamp::default().is_zero());
        assert!(!Timestamp::from_millis(1).is_zero());
    }

    #[test]
    fn saturating_sub_clamps_at_epoch() {
        let ts = Timestamp::from_millis(500);
        assert_eq!(ts.saturating_sub(Duration::from_secs(1)), Timestamp::default());
        assert_eq!(
            ts.saturating_sub(Duration::from_millis(200)).as_millis(),
            300
        );
    }

    #[test]
    fn rfc3339_rendering() {
        let ts = Timestamp::from_millis(1_714_564_800_123);
        assert_eq!(ts.to_rfc3339(), "2024-05-01T12:00:00.123Z");
    }

    #[test]
    fn utc_day_buckets() {
        let ts = Timestamp::from_millis(1_714_564_800_000);
        assert_eq!(ts.utc_day(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn serializes_as_integer() {
        let ts = Timestamp::from_millis(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
    }
}
