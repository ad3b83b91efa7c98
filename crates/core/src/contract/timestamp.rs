//! Nanosecond-precision timestamp type
//!
//! Timestamps are stored as whole seconds since Unix epoch plus a
//! non-negative sub-second remainder in nanoseconds. This keeps the full
//! precision a document field can carry, independent of any time library.
//!
//! ## Range
//!
//! The representable range is `0001-01-01T00:00:00Z` through
//! `9999-12-31T23:59:59.999999999Z`. Constructors reject anything outside it.
//!
//! ## Usage
//!
//! ```
//! use docmap_core::Timestamp;
//!
//! let ts = Timestamp::new(123, 123_456_000).unwrap();
//! let from_millis = Timestamp::from_millis(123).unwrap();
//! assert_eq!(from_millis.nanos(), 123_000_000);
//! assert!(from_millis < ts);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Seconds of `0001-01-01T00:00:00Z`
pub const MIN_SECONDS: i64 = -62_135_596_800;

/// Seconds of `9999-12-31T23:59:59Z`
pub const MAX_SECONDS: i64 = 253_402_300_799;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Nanosecond-precision timestamp
///
/// ## Invariants
///
/// - `seconds` lies in [`MIN_SECONDS`, `MAX_SECONDS`]
/// - `nanos` lies in `0..1_000_000_000`, also for negative `seconds`
/// - Ordering and equality compare `(seconds, nanos)`; a different
///   sub-second remainder is a genuine inequality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimestamp")]
pub struct Timestamp {
    seconds: i64,
    nanos: i32,
}

/// Unvalidated wire form of [`Timestamp`]
#[derive(Deserialize)]
struct RawTimestamp {
    seconds: i64,
    nanos: i32,
}

impl TryFrom<RawTimestamp> for Timestamp {
    type Error = Error;

    fn try_from(raw: RawTimestamp) -> Result<Self> {
        Timestamp::new(raw.seconds, raw.nanos)
    }
}

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp {
        seconds: 0,
        nanos: 0,
    };

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a timestamp from seconds and nanoseconds since epoch
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `nanos` is outside `0..1_000_000_000`
    /// or `seconds` is outside the supported range.
    pub fn new(seconds: i64, nanos: i32) -> Result<Self> {
        if !(0..NANOS_PER_SECOND as i32).contains(&nanos) {
            return Err(Error::invalid_argument(format!(
                "Timestamp nanoseconds out of range: {}",
                nanos
            )));
        }
        if !(MIN_SECONDS..=MAX_SECONDS).contains(&seconds) {
            return Err(Error::invalid_argument(format!(
                "Timestamp seconds out of range: {}",
                seconds
            )));
        }
        Ok(Timestamp { seconds, nanos })
    }

    /// Create a timestamp for the current moment
    ///
    /// Returns epoch if the system clock is before Unix epoch.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp {
            seconds: duration.as_secs() as i64,
            nanos: duration.subsec_nanos() as i32,
        }
    }

    /// Create a timestamp from milliseconds since epoch
    ///
    /// Negative values count backwards from epoch; the sub-second
    /// remainder stays non-negative.
    pub fn from_millis(millis: i64) -> Result<Self> {
        let seconds = millis.div_euclid(1_000);
        let nanos = millis.rem_euclid(1_000) * NANOS_PER_MILLI;
        Timestamp::new(seconds, nanos as i32)
    }

    /// Create a timestamp from a `chrono` UTC datetime
    pub fn from_datetime(dt: &DateTime<Utc>) -> Result<Self> {
        Timestamp::new(dt.timestamp(), dt.timestamp_subsec_nanos() as i32)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whole seconds since Unix epoch
    #[inline]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second remainder in nanoseconds
    #[inline]
    pub const fn nanos(&self) -> i32 {
        self.nanos
    }

    /// Milliseconds since Unix epoch (truncates towards negative infinity)
    pub fn as_millis(&self) -> i64 {
        self.seconds * 1_000 + (self.nanos as i64) / NANOS_PER_MILLI
    }

    /// Convert to a `chrono` UTC datetime
    pub fn to_datetime(&self) -> DateTime<Utc> {
        // Every in-range timestamp is representable by chrono.
        Utc.timestamp_opt(self.seconds, self.nanos as u32)
            .single()
            .unwrap_or_default()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Timestamp(seconds={}, nanoseconds={})",
            self.seconds, self.nanos
        )
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = Error;

    fn try_from(dt: DateTime<Utc>) -> Result<Self> {
        Timestamp::from_datetime(&dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.to_datetime()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_epoch() {
        assert_eq!(Timestamp::EPOCH.seconds(), 0);
        assert_eq!(Timestamp::EPOCH.nanos(), 0);
        assert_eq!(Timestamp::default(), Timestamp::EPOCH);
    }

    #[test]
    fn test_timestamp_new_valid() {
        let ts = Timestamp::new(123, 123_456_000).unwrap();
        assert_eq!(ts.seconds(), 123);
        assert_eq!(ts.nanos(), 123_456_000);
    }

    #[test]
    fn test_timestamp_rejects_bad_nanos() {
        assert!(Timestamp::new(0, -1).is_err());
        assert!(Timestamp::new(0, 1_000_000_000).is_err());
        assert!(Timestamp::new(0, 999_999_999).is_ok());
    }

    #[test]
    fn test_timestamp_rejects_out_of_range_seconds() {
        assert!(Timestamp::new(MIN_SECONDS, 0).is_ok());
        assert!(Timestamp::new(MAX_SECONDS, 999_999_999).is_ok());
        assert!(Timestamp::new(MIN_SECONDS - 1, 0).is_err());
        assert!(Timestamp::new(MAX_SECONDS + 1, 0).is_err());
    }

    #[test]
    fn test_timestamp_from_millis() {
        let ts = Timestamp::from_millis(123).unwrap();
        assert_eq!(ts.seconds(), 0);
        assert_eq!(ts.nanos(), 123_000_000);
        assert_eq!(ts.as_millis(), 123);
    }

    #[test]
    fn test_timestamp_from_negative_millis() {
        let ts = Timestamp::from_millis(-1).unwrap();
        assert_eq!(ts.seconds(), -1);
        assert_eq!(ts.nanos(), 999_000_000);
        assert_eq!(ts.as_millis(), -1);
    }

    #[test]
    fn test_timestamp_subsecond_inequality() {
        let a = Timestamp::new(123, 123_456_000).unwrap();
        let b = Timestamp::new(123, 123_456_001).unwrap();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_timestamp_ordering() {
        let t1 = Timestamp::new(-5, 900_000_000).unwrap();
        let t2 = Timestamp::new(0, 0).unwrap();
        let t3 = Timestamp::new(0, 1).unwrap();
        assert!(t1 < t2);
        assert!(t2 < t3);
    }

    #[test]
    fn test_timestamp_datetime_roundtrip() {
        let ts = Timestamp::new(1_700_000_000, 123_456_789).unwrap();
        let dt: DateTime<Utc> = ts.into();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_nanos(), 123_456_789);
        assert_eq!(Timestamp::try_from(dt).unwrap(), ts);
    }

    #[test]
    fn test_timestamp_deserialize_validates_range() {
        let ts: Timestamp = serde_json::from_str(r#"{"seconds":123,"nanos":5}"#).unwrap();
        assert_eq!(ts, Timestamp::new(123, 5).unwrap());

        let err = serde_json::from_str::<Timestamp>(r#"{"seconds":0,"nanos":-5}"#).unwrap_err();
        assert!(err.to_string().contains("nanoseconds out of range"));
        let too_late = format!(r#"{{"seconds":{},"nanos":0}}"#, MAX_SECONDS + 1);
        assert!(serde_json::from_str::<Timestamp>(&too_late).is_err());
    }

    #[test]
    fn test_timestamp_now_after_epoch() {
        assert!(Timestamp::now() > Timestamp::EPOCH);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::new(123, 123_456_000).unwrap();
        assert_eq!(
            ts.to_string(),
            "Timestamp(seconds=123, nanoseconds=123456000)"
        );
    }
}
