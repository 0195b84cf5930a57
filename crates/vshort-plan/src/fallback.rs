//! Fallback policy engine.
//!
//! One generic ordered-list-with-monotonic-index ladder serves every
//! concern; the resolver wraps the ladders with per-concern semantics.
//! Exhaustion is not a failure: the last viable parameter set stays in
//! effect and planning continues (partial degradation, never job failure).

use tracing::warn;
use vshort_models::{CaptionEmphasis, TimeSpan};

use crate::config::PlanConfig;

/// Outcome of advancing a ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<T> {
    /// The next, safer parameter set.
    Next(T),
    /// No options left; the contained value is the last viable one and
    /// must be kept.
    Exhausted(T),
}

impl<T> Resolution<T> {
    /// The parameter value regardless of exhaustion.
    pub fn value(&self) -> &T {
        match self {
            Resolution::Next(v) | Resolution::Exhausted(v) => v,
        }
    }

    /// Whether the ladder ran out of options.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Resolution::Exhausted(_))
    }
}

/// An ordered sequence of progressively safer parameter sets.
///
/// The index starts at 0 and only ever advances within one clip.
#[derive(Debug, Clone)]
pub struct FallbackLadder<T> {
    values: Vec<T>,
    index: usize,
}

impl<T: Clone> FallbackLadder<T> {
    /// Create a ladder. At least one value is required.
    pub fn new(values: Vec<T>) -> Self {
        debug_assert!(!values.is_empty(), "fallback ladder must not be empty");
        Self { values, index: 0 }
    }

    /// The currently selected parameter set.
    pub fn current(&self) -> &T {
        &self.values[self.index.min(self.values.len() - 1)]
    }

    /// The currently selected index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance to the next parameter set after a violation.
    pub fn advance(&mut self) -> Resolution<T> {
        if self.index + 1 < self.values.len() {
            self.index += 1;
            Resolution::Next(self.values[self.index].clone())
        } else {
            Resolution::Exhausted(self.values[self.index].clone())
        }
    }

    /// Whether the ladder is at its last value.
    pub fn is_exhausted(&self) -> bool {
        self.index + 1 >= self.values.len()
    }
}

/// Directive produced for a readability-floor violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadabilityDirective {
    /// The span must use the full-fit/background-blur reframe path.
    pub force_full_fit: bool,
    /// No further punch-in scaling is allowed on the span.
    pub forbid_punch_in: bool,
}

/// Per-clip fallback resolver.
///
/// Constructed fresh for each clip so ladder state never leaks between
/// plans. Crop conflicts are not resolved here: the reframing planner's
/// branch order already encodes that ladder.
#[derive(Debug, Clone)]
pub struct FallbackResolver {
    speed: FallbackLadder<f64>,
    punch_in_forbidden: Vec<TimeSpan>,
}

impl FallbackResolver {
    /// Create a resolver from the configured ladders.
    pub fn new(config: &PlanConfig) -> Self {
        Self {
            speed: FallbackLadder::new(config.speed_ladder.clone()),
            punch_in_forbidden: Vec::new(),
        }
    }

    /// Current speed factor without advancing the ladder.
    pub fn current_speed_factor(&self) -> f64 {
        *self.speed.current()
    }

    /// A speed artifact was detected at the current factor; move down the
    /// ladder. Exhaustion keeps the last factor.
    pub fn resolve_speed_artifact(&mut self) -> Resolution<f64> {
        let resolution = self.speed.advance();
        if resolution.is_exhausted() {
            warn!(
                factor = *resolution.value(),
                "speed ladder exhausted, keeping last viable factor"
            );
        }
        resolution
    }

    /// A segment's transcription confidence is too low: keep the caption,
    /// render it with lighter emphasis. Captions are never skipped.
    pub fn resolve_asr_confidence(&self) -> CaptionEmphasis {
        CaptionEmphasis::Lighter
    }

    /// Rendered text in `span` would fall under the minimum legible size:
    /// force the full-fit path and forbid punch-in scaling there.
    pub fn resolve_readability_floor(&mut self, span: TimeSpan) -> ReadabilityDirective {
        self.punch_in_forbidden.push(span);
        ReadabilityDirective { force_full_fit: true, forbid_punch_in: true }
    }

    /// Whether a punch-in may be emitted for `span`.
    pub fn punch_in_allowed(&self, span: &TimeSpan) -> bool {
        !self.punch_in_forbidden.iter().any(|s| s.overlaps(span))
    }
}
