//! Narration segments from the transcription collaborator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::timespan::TimeSpan;

/// Confidence below which a segment is treated as low-confidence.
///
/// Low-confidence segments are never dropped; they render with a lighter
/// caption emphasis instead.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// A contiguous narration unit with transcription confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// When this segment is spoken.
    pub span: TimeSpan,
    /// Transcribed text.
    pub text: String,
    /// Transcription confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Segment {
    /// Create a new segment.
    pub fn new(span: TimeSpan, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            span,
            text: text.into(),
            confidence,
        }
    }

    /// Whether the transcription confidence is below the rendering threshold.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }
}

/// Error produced when a segment list violates its ordering contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentListError {
    #[error("segment {index} starts at {start_ms}ms, before previous segment ends at {prev_end_ms}ms")]
    Unordered {
        index: usize,
        start_ms: u64,
        prev_end_ms: u64,
    },
    #[error("segment {index} has confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange { index: usize, confidence: f64 },
}

/// Validate that segments are chronological and non-overlapping.
///
/// The transcription collaborator promises insertion order equals
/// chronological order; this check rejects malformed input before any
/// planning begins.
pub fn validate_segments(segments: &[Segment]) -> Result<(), SegmentListError> {
    for (index, segment) in segments.iter().enumerate() {
        if !(0.0..=1.0).contains(&segment.confidence) {
            return Err(SegmentListError::ConfidenceOutOfRange {
                index,
                confidence: segment.confidence,
            });
        }
        if index > 0 {
            let prev_end_ms = segments[index - 1].span.end_ms;
            if segment.span.start_ms < prev_end_ms {
                return Err(SegmentListError::Unordered {
                    index,
                    start_ms: segment.span.start_ms,
                    prev_end_ms,
                });
            }
        }
    }
    Ok(())
}
