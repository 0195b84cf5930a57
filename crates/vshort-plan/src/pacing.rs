//! Pacing planner: silence cuts, speed ramps, and punch-ins.
//!
//! Silence gaps come from the timing model; scroll/typing and focal-callout
//! markers come from an external content classifier and are consumed as
//! opaque tagged spans.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vshort_models::{Region, RenderOp, RenderOpKind, TimeSpan};

use crate::config::PlanConfig;
use crate::fallback::FallbackResolver;
use crate::interval::SpanIndex;

/// Classifier-supplied activity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Scrolling or typing; a candidate for speed-up.
    ScrollTyping,
    /// A focal callout; a candidate for punch-in.
    FocalCallout,
}

/// A tagged activity span from the content classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySpan {
    /// When the activity occurs.
    pub span: TimeSpan,
    /// What kind of activity it is.
    pub kind: ActivityKind,
}

/// Plans pacing ops for one clip.
pub struct PacingPlanner {
    config: PlanConfig,
    source_w: u32,
    source_h: u32,
}

impl PacingPlanner {
    /// Create a pacing planner for a source frame geometry.
    pub fn new(config: PlanConfig, source_w: u32, source_h: u32) -> Self {
        Self { config, source_w, source_h }
    }

    /// Produce all pacing ops: silence cuts, speed ramps, punch-ins.
    ///
    /// `focal_regions` supplies punch-in anchors; the resolver supplies the
    /// current speed factor and punch-in permissions.
    pub fn plan(
        &self,
        silence: &[TimeSpan],
        activity: &[ActivitySpan],
        focal_regions: &SpanIndex<Region>,
        resolver: &FallbackResolver,
    ) -> Vec<RenderOp> {
        let mut ops = self.silence_cuts(silence);
        ops.extend(self.speed_ramps(activity, resolver));
        ops.extend(self.punch_ins(activity, focal_regions, resolver));
        ops
    }

    /// Cut silence gaps, retaining handles and honoring the cut-spacing rule.
    ///
    /// A full cut keeps `cut_handle_ms` of air on each side. When the splice
    /// would land closer than `min_cut_spacing_ms` to the previous splice,
    /// the cut is not taken in full: the gap is instead shortened to exactly
    /// `min_cut_spacing_ms` (handles trimmed toward zero, never negative),
    /// or skipped entirely when the gap is no longer than the spacing floor.
    pub fn silence_cuts(&self, silence: &[TimeSpan]) -> Vec<RenderOp> {
        let handle = self.config.cut_handle_ms;
        let spacing = self.config.min_cut_spacing_ms;
        let mut ops: Vec<RenderOp> = Vec::new();
        let mut last_splice_ms: Option<u64> = None;

        for gap in silence {
            if gap.duration_ms() < self.config.silence_threshold_ms {
                continue;
            }

            let full_start = gap.start_ms + handle;
            let full_end = gap.end_ms.saturating_sub(handle);
            if full_end <= full_start {
                continue;
            }

            let violates = last_splice_ms
                .map(|prev| full_start.saturating_sub(prev) < spacing)
                .unwrap_or(false);

            let cut = if violates {
                if gap.duration_ms() > spacing {
                    // Leave exactly the spacing floor of air, zero handles.
                    Some(TimeSpan { start_ms: gap.start_ms + spacing, end_ms: gap.end_ms })
                } else {
                    debug!(%gap, "silence cut skipped, spacing floor");
                    None
                }
            } else {
                Some(TimeSpan { start_ms: full_start, end_ms: full_end })
            };

            if let Some(span) = cut {
                if span.end_ms > span.start_ms {
                    last_splice_ms = Some(span.end_ms);
                    ops.push(RenderOp::new(span, RenderOpKind::SilenceCut));
                }
            }
        }
        ops
    }

    /// Speed ramps for scroll/typing spans at the ladder's current factor.
    fn speed_ramps(&self, activity: &[ActivitySpan], resolver: &FallbackResolver) -> Vec<RenderOp> {
        let factor = resolver.current_speed_factor();
        let ramp_ms = self.config.ramp_duration_ms();
        activity
            .iter()
            .filter(|a| a.kind == ActivityKind::ScrollTyping)
            .map(|a| RenderOp::new(a.span, RenderOpKind::SpeedRamp { factor, ramp_ms }))
            .collect()
    }

    /// Punch-ins for focal callouts, anchored to the focal region center.
    ///
    /// The anchor is fixed for the whole event; it never drifts across the
    /// span. Spans the resolver has flagged for readability keep no punch-in.
    fn punch_ins(
        &self,
        activity: &[ActivitySpan],
        focal_regions: &SpanIndex<Region>,
        resolver: &FallbackResolver,
    ) -> Vec<RenderOp> {
        let target_scale = self.config.clamped_punch_in_scale();
        let ramp_ms = self.config.punch_in_duration_ms.max(1);
        activity
            .iter()
            .filter(|a| a.kind == ActivityKind::FocalCallout)
            .filter(|a| resolver.punch_in_allowed(&a.span))
            .map(|a| {
                let (anchor_x, anchor_y) = focal_regions
                    .first_active_at(a.span.start_ms)
                    .map(|r| r.rect.center())
                    .unwrap_or((self.source_w as i32 / 2, self.source_h as i32 / 2));
                RenderOp::new(
                    a.span,
                    RenderOpKind::PunchIn { target_scale, anchor_x, anchor_y, ramp_ms },
                )
            })
            .collect()
    }
}
