//! Error types for planning.

use thiserror::Error;
use vshort_models::{RegionListError, SegmentListError, TimeSpanError};

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while planning a clip.
///
/// Planning errors abort only the affected clip; the batch continues.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid segment list: {0}")]
    InvalidSegments(#[from] SegmentListError),

    #[error("invalid region list: {0}")]
    InvalidRegions(#[from] RegionListError),

    #[error("invalid time span: {0}")]
    InvalidSpan(#[from] TimeSpanError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Post-merge invariant violation. Defensive: unreachable given correct
    /// upstream logic.
    #[error("plan conflict between {first} and {second}")]
    PlanConflict { first: String, second: String },
}

impl PlanError {
    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a plan-conflict error naming the two offending ops.
    pub fn conflict(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::PlanConflict {
            first: first.into(),
            second: second.into(),
        }
    }
}
