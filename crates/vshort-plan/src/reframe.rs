//! Reframing planner: per-window crop/scale/background decisions.
//!
//! Branch order encodes the fallback for crop conflicts, with legibility
//! taking precedence over crop tightness:
//!
//! 1. Both regions fit the canvas at native resolution: plain crop.
//! 2. Facecam conflicts with the focal safe area: reposition the facecam
//!    to the nearest free canvas corner (shrink floor 70%), crop on focal.
//! 3. Otherwise: full-height fit of the source over a blurred, darkened
//!    duplicate filling the canvas. The foreground is never shrunk further.
//!
//! Identical inputs always produce identical plans; every decision records
//! the branch that fired.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vshort_models::{
    CanvasSpec, PixelRect, Region, RegionKind, RenderOp, RenderOpKind, TimeSpan,
};

use crate::config::PlanConfig;
use crate::interval::SpanIndex;

/// Which branch of the reframing algorithm produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReframeBranch {
    /// Branch 1: a single crop preserves every active region at 100%.
    DualRegionCrop,
    /// Branch 2: crop on focal content, facecam moved to a free corner.
    FacecamReposition,
    /// Branch 3: full-fit foreground over blurred background.
    FullFitBlur,
}

/// One reframing decision for a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct ReframeDecision {
    /// The window this decision covers.
    pub span: TimeSpan,
    /// Which branch fired.
    pub branch: ReframeBranch,
    /// The render ops implementing the decision.
    pub ops: Vec<RenderOp>,
}

/// Plans crop/scale/background ops from detected regions.
pub struct ReframePlanner {
    source_w: u32,
    source_h: u32,
    canvas: CanvasSpec,
    config: PlanConfig,
}

impl ReframePlanner {
    /// Create a planner for a source frame geometry and target canvas.
    pub fn new(source_w: u32, source_h: u32, canvas: CanvasSpec, config: PlanConfig) -> Self {
        Self { source_w, source_h, canvas, config }
    }

    /// Plan the whole clip, one decision per region-stability window.
    ///
    /// The timeline is partitioned at every region validity boundary;
    /// adjacent windows with identical geometry are coalesced.
    pub fn plan(&self, regions: &[Region], clip: TimeSpan) -> Vec<ReframeDecision> {
        let mut boundaries: Vec<u64> = vec![clip.start_ms, clip.end_ms];
        for region in regions {
            if region.span.start_ms > clip.start_ms && region.span.start_ms < clip.end_ms {
                boundaries.push(region.span.start_ms);
            }
            if region.span.end_ms > clip.start_ms && region.span.end_ms < clip.end_ms {
                boundaries.push(region.span.end_ms);
            }
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let index = SpanIndex::new(
            regions.iter().map(|r| (r.span, r.clone())).collect::<Vec<_>>(),
        );

        let mut decisions: Vec<ReframeDecision> = Vec::new();
        for pair in boundaries.windows(2) {
            let window = TimeSpan { start_ms: pair[0], end_ms: pair[1] };
            let mid = window.start_ms + window.duration_ms() / 2;
            let active = index.active_at(mid);
            let facecam = active.iter().find(|r| r.kind == RegionKind::Facecam).copied();
            let focal = active.iter().find(|r| r.kind == RegionKind::FocalContent).copied();
            let decision = self.plan_window(facecam, focal, window);

            // Coalesce with the previous window when geometry is unchanged
            if let Some(last) = decisions.last_mut() {
                if last.branch == decision.branch
                    && last.span.end_ms == decision.span.start_ms
                    && ops_geometry_eq(&last.ops, &decision.ops)
                {
                    let end_ms = decision.span.end_ms;
                    last.span.end_ms = end_ms;
                    for op in &mut last.ops {
                        op.span.end_ms = end_ms;
                    }
                    continue;
                }
            }
            decisions.push(decision);
        }
        decisions
    }

    /// Decide how to reframe one window with a stable region set.
    pub fn plan_window(
        &self,
        facecam: Option<&Region>,
        focal: Option<&Region>,
        window: TimeSpan,
    ) -> ReframeDecision {
        // Branch 1: everything fits a native-resolution crop.
        let preserved: Vec<&PixelRect> = facecam
            .iter()
            .chain(focal.iter())
            .map(|r| &r.rect)
            .collect();
        if !preserved.is_empty() {
            if let Some(bbox) = bounding_box(&preserved) {
                if self.fits_canvas(&bbox) && !self.conflicts(facecam, focal) {
                    let src = self.crop_around(&bbox);
                    debug!(branch = "dual_region_crop", %window, "reframe decision");
                    return ReframeDecision {
                        span: window,
                        branch: ReframeBranch::DualRegionCrop,
                        ops: vec![RenderOp::new(window, RenderOpKind::Crop { src })],
                    };
                }
            }
        }

        // Branch 2: reposition the facecam into a free corner of a
        // focal-centered crop.
        if let (Some(cam), Some(content)) = (facecam, focal) {
            if self.fits_canvas(&content.rect) {
                if let Some((crop, dst)) = self.reposition_facecam(&cam.rect, &content.rect) {
                    debug!(branch = "facecam_reposition", %window, "reframe decision");
                    return ReframeDecision {
                        span: window,
                        branch: ReframeBranch::FacecamReposition,
                        ops: vec![
                            RenderOp::new(window, RenderOpKind::Crop { src: crop }),
                            RenderOp::new(
                                window,
                                RenderOpKind::FacecamOverlay { src: cam.rect, dst },
                            ),
                        ],
                    };
                }
            }
        }

        // Branch 3: irreconcilable conflict or focal text would be clipped.
        // Legibility over crop tightness; the foreground stays at full fit.
        debug!(branch = "full_fit_blur", %window, "reframe decision");
        ReframeDecision {
            span: window,
            branch: ReframeBranch::FullFitBlur,
            ops: vec![RenderOp::new(
                window,
                RenderOpKind::ScaleBlurBackground {
                    blur_sigma: self.config.background_blur_sigma,
                    darken: self.config.background_darken,
                },
            )],
        }
    }

    /// Whether a rectangle fits the canvas content area at 100% scale, and
    /// the source is large enough to supply a canvas-sized crop at all.
    fn fits_canvas(&self, rect: &PixelRect) -> bool {
        self.source_w >= self.canvas.width
            && self.source_h >= self.canvas.height
            && rect.w <= self.canvas.width
            && rect.h <= self.canvas.safe_height()
    }

    /// Whether the facecam intrudes on the focal safe area.
    fn conflicts(&self, facecam: Option<&Region>, focal: Option<&Region>) -> bool {
        match (facecam, focal) {
            (Some(cam), Some(content)) => cam.rect.overlaps(&content.rect),
            _ => false,
        }
    }

    /// Canvas-sized source crop centered on a rectangle, clamped to the
    /// source frame.
    fn crop_around(&self, bbox: &PixelRect) -> PixelRect {
        let (cx, cy) = bbox.center();
        let w = self.canvas.width;
        let h = self.canvas.height;
        let x = (cx - w as i32 / 2).clamp(0, self.source_w.saturating_sub(w) as i32);
        let y = (cy - h as i32 / 2).clamp(0, self.source_h.saturating_sub(h) as i32);
        PixelRect::new(x, y, w, h)
    }

    /// Find a corner for the facecam overlay that clears the focal content.
    ///
    /// Returns the focal crop and the facecam destination on the canvas, or
    /// `None` when the shrink floor or every corner fails.
    fn reposition_facecam(
        &self,
        cam: &PixelRect,
        focal: &PixelRect,
    ) -> Option<(PixelRect, PixelRect)> {
        let crop = self.crop_around(focal);

        // Corner slot: a third of the canvas width, inside the safe margins.
        let slot = self.canvas.width / 3;
        let scale = (slot as f64 / cam.w as f64)
            .min(slot as f64 / cam.h as f64)
            .min(1.0);
        if scale < self.config.facecam_scale_floor {
            return None;
        }
        let shrunk = cam.scaled(scale);
        let (dst_w, dst_h) = (shrunk.w, shrunk.h);

        let margin = self.canvas.safe_margin_px as i32;
        let right = (self.canvas.width - dst_w) as i32;
        let bottom = (self.canvas.height - dst_h) as i32 - margin;
        let corners = [
            (0, margin),
            (right, margin),
            (0, bottom),
            (right, bottom),
        ];

        // Focal content's position inside the crop, in canvas coordinates
        let focal_on_canvas = PixelRect::new(focal.x - crop.x, focal.y - crop.y, focal.w, focal.h);
        // Facecam center mapped onto the canvas, to pick the nearest corner
        let (cam_cx, cam_cy) = cam.center();
        let cam_on_canvas = (cam_cx - crop.x, cam_cy - crop.y);

        let mut candidates: Vec<(i64, PixelRect)> = corners
            .iter()
            .map(|&(x, y)| {
                let dst = PixelRect::new(x, y, dst_w, dst_h);
                let (dx, dy) = dst.center();
                let dist = (dx as i64 - cam_on_canvas.0 as i64).pow(2)
                    + (dy as i64 - cam_on_canvas.1 as i64).pow(2);
                (dist, dst)
            })
            .filter(|(_, dst)| !dst.overlaps(&focal_on_canvas))
            .collect();
        candidates.sort_by_key(|(dist, _)| *dist);
        candidates.into_iter().next().map(|(_, dst)| (crop, dst))
    }
}

/// Union bounding box of rectangles.
fn bounding_box(rects: &[&PixelRect]) -> Option<PixelRect> {
    let first = rects.first()?;
    let mut x0 = first.x;
    let mut y0 = first.y;
    let mut x1 = first.right();
    let mut y1 = first.bottom();
    for rect in &rects[1..] {
        x0 = x0.min(rect.x);
        y0 = y0.min(rect.y);
        x1 = x1.max(rect.right());
        y1 = y1.max(rect.bottom());
    }
    Some(PixelRect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Compare op lists ignoring spans (geometry only).
fn ops_geometry_eq(a: &[RenderOp], b: &[RenderOp]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.kind == y.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u64, end: u64) -> TimeSpan {
        TimeSpan::new(start, end).unwrap()
    }

    fn planner() -> ReframePlanner {
        ReframePlanner::new(1920, 1080, CanvasSpec::default(), PlanConfig::default())
    }

    // 1080x1920 canvas never fits in a 1920x1080 source vertically, so use a
    // tall source for crop-branch tests.
    fn tall_planner() -> ReframePlanner {
        ReframePlanner::new(2160, 3840, CanvasSpec::default(), PlanConfig::default())
    }

    fn region(kind: RegionKind, x: i32, y: i32, w: u32, h: u32, s: TimeSpan) -> Region {
        Region::new(PixelRect::new(x, y, w, h), kind, s)
    }

    #[test]
    fn test_branch1_when_both_regions_fit() {
        let p = tall_planner();
        let w = span(0, 2000);
        let cam = region(RegionKind::Facecam, 100, 300, 240, 180, w);
        let focal = region(RegionKind::FocalContent, 100, 600, 800, 700, w);
        let decision = p.plan_window(Some(&cam), Some(&focal), w);
        assert_eq!(decision.branch, ReframeBranch::DualRegionCrop);
        assert_eq!(decision.ops.len(), 1);
        let RenderOpKind::Crop { src } = &decision.ops[0].kind else {
            panic!("expected crop op");
        };
        assert_eq!((src.w, src.h), (1080, 1920));
        // Both regions sit inside the crop
        assert!(src.contains_rect(&cam.rect));
        assert!(src.contains_rect(&focal.rect));
    }

    #[test]
    fn test_branch2_repositions_overlapping_facecam() {
        let p = tall_planner();
        let w = span(0, 2000);
        // Facecam sits on top of the focal content
        let cam = region(RegionKind::Facecam, 600, 900, 300, 240, w);
        let focal = region(RegionKind::FocalContent, 560, 840, 900, 900, w);
        let decision = p.plan_window(Some(&cam), Some(&focal), w);
        assert_eq!(decision.branch, ReframeBranch::FacecamReposition);
        assert_eq!(decision.ops.len(), 2);
        let RenderOpKind::FacecamOverlay { dst, .. } = &decision.ops[1].kind else {
            panic!("expected facecam overlay");
        };
        // Overlay shrink never passes the 70% floor
        assert!(dst.w as f64 >= cam.rect.w as f64 * 0.70);
        // Overlay clears the focal content area on the canvas
        let RenderOpKind::Crop { src } = &decision.ops[0].kind else {
            panic!("expected crop op");
        };
        let focal_on_canvas = PixelRect::new(
            focal.rect.x - src.x,
            focal.rect.y - src.y,
            focal.rect.w,
            focal.rect.h,
        );
        assert!(!dst.overlaps(&focal_on_canvas));
    }

    #[test]
    fn test_facecam_shrinks_to_corner_slot_with_even_dimensions() {
        let p = tall_planner();
        let w = span(0, 2000);
        // Facecam wider than the 360px corner slot shrinks to fit it,
        // staying above the 70% floor.
        let cam = region(RegionKind::Facecam, 600, 900, 480, 360, w);
        let focal = region(RegionKind::FocalContent, 560, 840, 900, 900, w);
        let decision = p.plan_window(Some(&cam), Some(&focal), w);
        assert_eq!(decision.branch, ReframeBranch::FacecamReposition);
        let RenderOpKind::FacecamOverlay { dst, .. } = &decision.ops[1].kind else {
            panic!("expected facecam overlay");
        };
        assert_eq!((dst.w, dst.h), (360, 270));
    }

    #[test]
    fn test_branch3_for_full_overlap_on_horizontal_source() {
        // Facecam fully overlaps focal for 2000ms on a
        // 1080x1920 canvas; branch 3 must fire, never branch 1.
        let p = planner();
        let w = span(0, 2000);
        let cam = region(RegionKind::Facecam, 400, 200, 400, 300, w);
        let focal = region(RegionKind::FocalContent, 400, 200, 400, 300, w);
        let decision = p.plan_window(Some(&cam), Some(&focal), w);
        assert_eq!(decision.branch, ReframeBranch::FullFitBlur);
        assert!(matches!(
            decision.ops[0].kind,
            RenderOpKind::ScaleBlurBackground { .. }
        ));
    }

    #[test]
    fn test_branch3_when_focal_text_would_clip() {
        let p = tall_planner();
        let w = span(0, 1000);
        // Focal content wider than the canvas cannot show at 100%
        let focal = region(RegionKind::FocalContent, 0, 0, 1600, 400, w);
        let cam = region(RegionKind::Facecam, 1700, 3000, 200, 150, w);
        let decision = p.plan_window(Some(&cam), Some(&focal), w);
        assert_eq!(decision.branch, ReframeBranch::FullFitBlur);
    }

    #[test]
    fn test_no_regions_falls_back_to_full_fit() {
        let p = planner();
        let decision = p.plan_window(None, None, span(0, 1000));
        assert_eq!(decision.branch, ReframeBranch::FullFitBlur);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let p = tall_planner();
        let clip = span(0, 5000);
        let regions = vec![
            region(RegionKind::Facecam, 100, 300, 240, 180, span(0, 3000)),
            region(RegionKind::FocalContent, 100, 600, 800, 700, span(0, 5000)),
        ];
        let a = p.plan(&regions, clip);
        let b = p.plan(&regions, clip);
        assert_eq!(a, b);
    }

    #[test]
    fn test_plan_partitions_at_region_boundaries() {
        let p = tall_planner();
        let clip = span(0, 4000);
        let regions = vec![
            region(RegionKind::FocalContent, 100, 1500, 800, 700, span(0, 4000)),
            region(RegionKind::Facecam, 100, 300, 240, 180, span(0, 2000)),
        ];
        let decisions = p.plan(&regions, clip);
        assert_eq!(decisions.len(), 2);
        // With the facecam active, the combined box is too tall for a plain
        // crop, so the facecam is repositioned; afterwards a plain crop works.
        assert_eq!(decisions[0].branch, ReframeBranch::FacecamReposition);
        assert_eq!(decisions[1].branch, ReframeBranch::DualRegionCrop);
        assert_eq!(decisions[0].span, span(0, 2000));
        assert_eq!(decisions[1].span, span(2000, 4000));
        // Reframe windows tile the clip with no overlap
        assert_eq!(decisions[0].span.end_ms, decisions[1].span.start_ms);
    }

    #[test]
    fn test_plan_coalesces_stable_geometry() {
        let p = tall_planner();
        let clip = span(0, 4000);
        // Two back-to-back focal detections with identical rects
        let regions = vec![
            region(RegionKind::FocalContent, 100, 600, 800, 700, span(0, 2000)),
            region(RegionKind::FocalContent, 100, 600, 800, 700, span(2000, 4000)),
        ];
        let decisions = p.plan(&regions, clip);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].span, clip);
    }
}
