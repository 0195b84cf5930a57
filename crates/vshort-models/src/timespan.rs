//! Millisecond time spans.
//!
//! Every planner works on the same `TimeSpan` type: a half-open interval
//! `[start_ms, end_ms)` with `end_ms > start_ms`. Spans are immutable once
//! constructed; derived spans are new values.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A half-open time interval in milliseconds, `end_ms > start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TimeSpan {
    /// Start time in milliseconds (inclusive).
    pub start_ms: u64,
    /// End time in milliseconds (exclusive).
    pub end_ms: u64,
}

/// Error for invalid time spans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeSpanError {
    #[error("span end ({end_ms}ms) must be after start ({start_ms}ms)")]
    EndNotAfterStart { start_ms: u64, end_ms: u64 },
}

impl TimeSpan {
    /// Create a new span, rejecting empty or inverted intervals.
    pub fn new(start_ms: u64, end_ms: u64) -> Result<Self, TimeSpanError> {
        if end_ms <= start_ms {
            return Err(TimeSpanError::EndNotAfterStart { start_ms, end_ms });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Duration of this span in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// Duration of this span in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }

    /// Whether `t` falls within this span.
    pub fn contains(&self, t_ms: u64) -> bool {
        t_ms >= self.start_ms && t_ms < self.end_ms
    }

    /// Whether two spans share any instant.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    /// Intersection of two spans, if non-empty.
    pub fn intersect(&self, other: &TimeSpan) -> Option<TimeSpan> {
        let start = self.start_ms.max(other.start_ms);
        let end = self.end_ms.min(other.end_ms);
        if end > start {
            Some(TimeSpan { start_ms: start, end_ms: end })
        } else {
            None
        }
    }

    /// Gap between this span and a later span, in milliseconds.
    ///
    /// Returns 0 when the spans touch or overlap.
    pub fn gap_to(&self, later: &TimeSpan) -> u64 {
        later.start_ms.saturating_sub(self.end_ms)
    }
}

impl std::fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}ms..{}ms)", self.start_ms, self.end_ms)
    }
}
