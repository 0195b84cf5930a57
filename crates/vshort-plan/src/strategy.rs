//! Effect strategies: named pipelines producing a `RenderPlan`.
//!
//! A strategy is a tagged variant, not an inheritance chain; new strategies
//! add variants. `Basic` is the shipping pipeline: reframe, pace, caption,
//! title strap, progress bar.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vshort_models::{
    validate_regions, validate_segments, CanvasSpec, Region, RegionKind, RenderOp, RenderOpKind,
    RenderPlan, Segment, TimeSpan,
};

use crate::assemble::assemble;
use crate::config::PlanConfig;
use crate::error::{PlanError, PlanResult};
use crate::fallback::FallbackResolver;
use crate::interval::SpanIndex;
use crate::pacing::{ActivitySpan, PacingPlanner};
use crate::reframe::{ReframeBranch, ReframePlanner};
use crate::timing::{caption_windows, check_cut_cadence, silence_gaps, CadenceGap, CaptionWindow};

/// Everything the planning pipeline needs for one clip.
#[derive(Debug, Clone)]
pub struct ClipInputs {
    /// The clip's span on the source timeline.
    pub clip: TimeSpan,
    /// Title for the top strap.
    pub title: String,
    /// Ordered narration segments from the transcription collaborator.
    pub segments: Vec<Segment>,
    /// Detected regions with validity spans.
    pub regions: Vec<Region>,
    /// Tagged activity spans from the content classifier.
    pub activity: Vec<ActivitySpan>,
    /// Source frame width in pixels.
    pub source_w: u32,
    /// Source frame height in pixels.
    pub source_h: u32,
    /// Target canvas.
    pub canvas: CanvasSpec,
}

/// The full planning result for one clip.
#[derive(Debug, Clone)]
pub struct ClipPlan {
    /// The validated, ordered render plan.
    pub plan: RenderPlan,
    /// Which reframe branch fired for each window (testability record).
    pub branches: Vec<(TimeSpan, ReframeBranch)>,
    /// Caption windows, also used to write the caption-track artifact.
    pub captions: Vec<CaptionWindow>,
    /// Stretches that still violate the cut cadence after planning.
    pub cadence_gaps: Vec<CadenceGap>,
}

/// Available effect strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Reframe + pacing + captions + title strap + progress bar.
    Basic,
}

/// Error for unknown strategy names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy: {0}")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Strategy::Basic),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

impl Strategy {
    /// The strategy name as used in filenames and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Basic => "basic",
        }
    }

    /// Plan one clip.
    ///
    /// The resolver is per clip but shared across re-plans of the same clip,
    /// so fallback ladders only ever advance.
    pub fn plan(
        &self,
        inputs: &ClipInputs,
        config: &PlanConfig,
        resolver: &mut FallbackResolver,
    ) -> PlanResult<ClipPlan> {
        match self {
            Strategy::Basic => plan_basic(inputs, config, resolver),
        }
    }
}

fn plan_basic(
    inputs: &ClipInputs,
    config: &PlanConfig,
    resolver: &mut FallbackResolver,
) -> PlanResult<ClipPlan> {
    validate_segments(&inputs.segments)?;
    validate_regions(&inputs.regions)?;
    if inputs.source_w == 0 || inputs.source_h == 0 {
        return Err(PlanError::invalid_input("source frame has zero dimension"));
    }

    // Timing
    let captions = caption_windows(&inputs.segments, config);
    let gaps = silence_gaps(&inputs.segments, inputs.clip, config);

    // Readability pre-pass: focal content that cannot show at 100% under any
    // crop forces the full-fit path and loses punch-in for its span.
    for region in &inputs.regions {
        if region.kind == RegionKind::FocalContent
            && (region.rect.w > inputs.canvas.width || region.rect.h > inputs.canvas.safe_height())
        {
            let directive = resolver.resolve_readability_floor(region.span);
            debug!(span = %region.span, ?directive, "readability floor engaged");
        }
    }

    // Reframing defines the coordinate space
    let reframer = ReframePlanner::new(inputs.source_w, inputs.source_h, inputs.canvas, config.clone());
    let decisions = reframer.plan(&inputs.regions, inputs.clip);
    let branches: Vec<(TimeSpan, ReframeBranch)> =
        decisions.iter().map(|d| (d.span, d.branch)).collect();

    let mut reframe_ops = Vec::new();
    let mut overlay_ops = Vec::new();
    for decision in decisions {
        for op in decision.ops {
            match op.kind {
                // Facecam composition is an overlay, drawn above pacing ops
                RenderOpKind::FacecamOverlay { .. } => overlay_ops.push(op),
                _ => reframe_ops.push(op),
            }
        }
    }

    // Pacing
    let focal_index = SpanIndex::new(
        inputs
            .regions
            .iter()
            .filter(|r| r.kind == RegionKind::FocalContent)
            .map(|r| (r.span, r.clone()))
            .collect::<Vec<_>>(),
    );
    let pacer = PacingPlanner::new(config.clone(), inputs.source_w, inputs.source_h);
    let pacing_ops = pacer.plan(&gaps, &inputs.activity, &focal_index, resolver);

    // Overlays: captions, title strap, progress bar
    let caption_band_h = config.caption_font_px * 2 + 48;
    let caption_band_y = inputs
        .canvas
        .bottom_safe_y()
        .saturating_sub(caption_band_h);
    for window in &captions {
        overlay_ops.push(RenderOp::new(
            window.span,
            RenderOpKind::Caption {
                lines: window.lines.clone(),
                emphasis: window.emphasis,
                font_px: config.caption_font_px,
                band_y_px: caption_band_y,
                band_h_px: caption_band_h,
            },
        ));
    }
    if !inputs.title.is_empty() {
        overlay_ops.push(RenderOp::new(
            inputs.clip,
            RenderOpKind::TitleStrap {
                text: inputs.title.clone(),
                band_h_px: config.title_strap_h_px,
                opacity: config.title_strap_opacity,
            },
        ));
    }
    overlay_ops.push(RenderOp::new(
        inputs.clip,
        RenderOpKind::ProgressBar {
            height_px: config.progress_bar_h_px,
            opacity: config.progress_bar_opacity,
        },
    ));

    // Cadence check over every visual-change event the plan produces
    let mut events: Vec<u64> = Vec::new();
    for (span, _) in branches.iter().skip(1) {
        events.push(span.start_ms);
    }
    for op in &pacing_ops {
        match op.kind {
            RenderOpKind::SilenceCut => events.push(op.span.end_ms),
            RenderOpKind::SpeedRamp { .. } | RenderOpKind::PunchIn { .. } => {
                events.push(op.span.start_ms)
            }
            _ => {}
        }
    }
    events.sort_unstable();
    let cadence_gaps = check_cut_cadence(&events, inputs.clip, config);
    if !cadence_gaps.is_empty() {
        warn!(count = cadence_gaps.len(), "cut cadence gaps remain after planning");
    }

    let plan = assemble(reframe_ops, pacing_ops, overlay_ops)?;
    Ok(ClipPlan { plan, branches, captions, cadence_gaps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vshort_models::{CaptionEmphasis, PixelRect};

    fn span(start: u64, end: u64) -> TimeSpan {
        TimeSpan::new(start, end).unwrap()
    }

    fn inputs() -> ClipInputs {
        ClipInputs {
            clip: span(0, 2500),
            title: "Borrow checker basics".to_string(),
            segments: vec![
                Segment::new(span(0, 1000), "hello world", 0.95),
                Segment::new(span(1200, 2500), "this is a test", 0.6),
            ],
            regions: Vec::new(),
            activity: Vec::new(),
            source_w: 1920,
            source_h: 1080,
            canvas: CanvasSpec::default(),
        }
    }

    #[test]
    fn test_basic_scenario_no_cut_low_confidence_kept() {
        let config = PlanConfig::default();
        let mut resolver = FallbackResolver::new(&config);
        let plan = Strategy::Basic.plan(&inputs(), &config, &mut resolver).unwrap();

        // 200ms gap is below the 250ms threshold: no silence cut
        assert!(!plan
            .plan
            .ops()
            .iter()
            .any(|op| matches!(op.kind, RenderOpKind::SilenceCut)));

        // Low-confidence caption is rendered lighter, never dropped
        let emphases: Vec<CaptionEmphasis> = plan
            .plan
            .ops()
            .iter()
            .filter_map(|op| match &op.kind {
                RenderOpKind::Caption { emphasis, .. } => Some(*emphasis),
                _ => None,
            })
            .collect();
        assert_eq!(emphases, vec![CaptionEmphasis::Normal, CaptionEmphasis::Lighter]);
    }

    #[test]
    fn test_basic_emits_strap_and_progress_bar() {
        let config = PlanConfig::default();
        let mut resolver = FallbackResolver::new(&config);
        let plan = Strategy::Basic.plan(&inputs(), &config, &mut resolver).unwrap();
        assert!(plan
            .plan
            .ops()
            .iter()
            .any(|op| matches!(op.kind, RenderOpKind::TitleStrap { .. })));
        assert!(plan
            .plan
            .ops()
            .iter()
            .any(|op| matches!(op.kind, RenderOpKind::ProgressBar { .. })));
    }

    #[test]
    fn test_planning_is_bit_deterministic() {
        let config = PlanConfig::default();
        let mut r1 = FallbackResolver::new(&config);
        let mut r2 = FallbackResolver::new(&config);
        let a = Strategy::Basic.plan(&inputs(), &config, &mut r1).unwrap();
        let b = Strategy::Basic.plan(&inputs(), &config, &mut r2).unwrap();
        assert_eq!(a.plan, b.plan);
        let ja = serde_json::to_string(&a.plan).unwrap();
        let jb = serde_json::to_string(&b.plan).unwrap();
        assert_eq!(ja, jb);
    }

    #[test]
    fn test_invalid_segments_rejected_before_planning() {
        let mut bad = inputs();
        bad.segments = vec![
            Segment::new(span(0, 1000), "a", 0.9),
            Segment::new(span(500, 1500), "b", 0.9),
        ];
        let config = PlanConfig::default();
        let mut resolver = FallbackResolver::new(&config);
        let err = Strategy::Basic.plan(&bad, &config, &mut resolver).unwrap_err();
        assert!(matches!(err, PlanError::InvalidSegments(_)));
    }

    #[test]
    fn test_oversized_focal_forces_full_fit_and_no_punch_in() {
        let mut wide = inputs();
        wide.regions = vec![Region::new(
            PixelRect::new(0, 0, 1600, 500),
            RegionKind::FocalContent,
            span(0, 2500),
        )];
        wide.activity = vec![ActivitySpan {
            span: span(500, 1500),
            kind: crate::pacing::ActivityKind::FocalCallout,
        }];
        let config = PlanConfig::default();
        let mut resolver = FallbackResolver::new(&config);
        let plan = Strategy::Basic.plan(&wide, &config, &mut resolver).unwrap();

        assert!(plan.branches.iter().all(|(_, b)| *b == ReframeBranch::FullFitBlur));
        assert!(!plan
            .plan
            .ops()
            .iter()
            .any(|op| matches!(op.kind, RenderOpKind::PunchIn { .. })));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("basic".parse::<Strategy>().unwrap(), Strategy::Basic);
        assert_eq!("Basic".parse::<Strategy>().unwrap(), Strategy::Basic);
        assert!("cinematic".parse::<Strategy>().is_err());
    }
}
