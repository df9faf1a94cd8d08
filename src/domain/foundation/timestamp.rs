//! Wall-clock timestamp value object.
//!
//! Used for data that leaves the process (language detections, lead
//! snapshots). Timers and guards use `tokio::time::Instant` instead.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Milliseconds elapsed since `other`, clamped at zero.
    pub fn millis_since(&self, other: &Timestamp) -> u64 {
        self.duration_since(other).num_milliseconds().max(0) as u64
    }

    pub fn plus_millis(&self, millis: u64) -> Self {
        Self(self.0 + Duration::milliseconds(millis as i64))
    }

    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
