//! Render plan assembly and invariant validation.
//!
//! Merge order is fixed: reframing ops define the coordinate space, pacing
//! ops come second, overlays last. Sorting is by start time with the models'
//! draw-priority tie-break. Validation failures here indicate an upstream
//! bug; they abort planning for the affected clip only.

use vshort_models::{RenderOp, RenderOpKind, RenderPlan};

use crate::error::{PlanError, PlanResult};

/// Merge planner outputs into one validated `RenderPlan`.
///
/// Merging empty pacing/overlay sets is idempotent: the result equals the
/// reframing-only plan.
pub fn assemble(
    reframe_ops: Vec<RenderOp>,
    pacing_ops: Vec<RenderOp>,
    overlay_ops: Vec<RenderOp>,
) -> PlanResult<RenderPlan> {
    let mut ops = reframe_ops;
    ops.extend(pacing_ops);
    ops.extend(overlay_ops);
    let plan = RenderPlan::from_ops(ops);
    validate(&plan)?;
    Ok(plan)
}

/// Check the plan invariants.
///
/// - Ops of the same conflict class never overlap in time.
/// - A caption never overlaps a title strap in the same vertical band.
pub fn validate(plan: &RenderPlan) -> PlanResult<()> {
    const CLASSES: [&str; 5] = ["reframe", "caption", "pacing", "punch_in", "facecam"];
    for class in CLASSES {
        let ops: Vec<&RenderOp> = plan.ops_in_class(class).collect();
        for pair in ops.windows(2) {
            if pair[0].span.overlaps(&pair[1].span) {
                return Err(PlanError::conflict(pair[0].describe(), pair[1].describe()));
            }
        }
    }

    // Caption vs title strap vertical-band exclusion
    let straps: Vec<&RenderOp> = plan
        .ops()
        .iter()
        .filter(|op| matches!(op.kind, RenderOpKind::TitleStrap { .. }))
        .collect();
    for caption in plan.ops_in_class("caption") {
        let RenderOpKind::Caption { band_y_px, .. } = caption.kind else {
            continue;
        };
        for strap in &straps {
            let RenderOpKind::TitleStrap { band_h_px: strap_h, .. } = strap.kind else {
                continue;
            };
            // The strap band is anchored at y = 0
            if caption.span.overlaps(&strap.span) && band_y_px < strap_h {
                return Err(PlanError::conflict(caption.describe(), strap.describe()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vshort_models::{CaptionEmphasis, PixelRect, TimeSpan};

    fn span(start: u64, end: u64) -> TimeSpan {
        TimeSpan::new(start, end).unwrap()
    }

    fn crop(start: u64, end: u64) -> RenderOp {
        RenderOp::new(span(start, end), RenderOpKind::Crop {
            src: PixelRect::new(0, 0, 1080, 1920),
        })
    }

    #[test]
    fn test_empty_merge_is_idempotent() {
        let reframe = vec![crop(0, 5000)];
        let merged = assemble(reframe.clone(), Vec::new(), Vec::new()).unwrap();
        let reframe_only = RenderPlan::from_ops(reframe);
        assert_eq!(merged, reframe_only);
    }

    #[test]
    fn test_overlapping_crops_reported_with_both_ops() {
        let err = assemble(vec![crop(0, 3000), crop(2000, 5000)], Vec::new(), Vec::new())
            .unwrap_err();
        let PlanError::PlanConflict { first, second } = err else {
            panic!("expected plan conflict");
        };
        assert!(first.contains("crop"));
        assert!(second.contains("crop"));
        assert!(first.contains("0ms"));
        assert!(second.contains("2000ms"));
    }

    #[test]
    fn test_caption_in_strap_band_is_a_conflict() {
        let strap = RenderOp::new(
            span(0, 5000),
            RenderOpKind::TitleStrap { text: "t".into(), band_h_px: 80, opacity: 0.9 },
        );
        let caption = RenderOp::new(
            span(1000, 2000),
            RenderOpKind::Caption {
                lines: vec!["hello".into()],
                emphasis: CaptionEmphasis::Normal,
                font_px: 56,
                band_y_px: 20, // Inside the strap band
                band_h_px: 160,
            },
        );
        let err = assemble(vec![crop(0, 5000)], Vec::new(), vec![strap, caption]).unwrap_err();
        assert!(matches!(err, PlanError::PlanConflict { .. }));
    }

    #[test]
    fn test_caption_below_strap_band_is_fine() {
        let strap = RenderOp::new(
            span(0, 5000),
            RenderOpKind::TitleStrap { text: "t".into(), band_h_px: 80, opacity: 0.9 },
        );
        let caption = RenderOp::new(
            span(1000, 2000),
            RenderOpKind::Caption {
                lines: vec!["hello".into()],
                emphasis: CaptionEmphasis::Normal,
                font_px: 56,
                band_y_px: 1500,
                band_h_px: 160,
            },
        );
        assert!(assemble(vec![crop(0, 5000)], Vec::new(), vec![strap, caption]).is_ok());
    }

    #[test]
    fn test_sequential_captions_do_not_conflict() {
        let captions = vec![
            RenderOp::new(
                span(0, 1000),
                RenderOpKind::Caption {
                    lines: vec!["a".into()],
                    emphasis: CaptionEmphasis::Normal,
                    font_px: 56,
                    band_y_px: 1500,
                    band_h_px: 160,
                },
            ),
            RenderOp::new(
                span(1000, 2000),
                RenderOpKind::Caption {
                    lines: vec!["b".into()],
                    emphasis: CaptionEmphasis::Lighter,
                    font_px: 56,
                    band_y_px: 1500,
                    band_h_px: 160,
                },
            ),
        ];
        assert!(assemble(vec![crop(0, 2000)], Vec::new(), captions).is_ok());
    }
}
