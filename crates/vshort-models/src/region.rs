//! Detected regions of interest in source-pixel coordinates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::timespan::TimeSpan;

/// A rectangle in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PixelRect {
    /// X coordinate of the top-left corner.
    pub x: i32,
    /// Y coordinate of the top-left corner.
    pub y: i32,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl PixelRect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w as i32 / 2, self.y + self.h as i32 / 2)
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Whether two rectangles share any pixel.
    pub fn overlaps(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether this rectangle fully contains `other`.
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Return this rectangle scaled around its center.
    ///
    /// Dimensions are kept even (codec requirement downstream).
    pub fn scaled(&self, factor: f64) -> PixelRect {
        let new_w = ((self.w as f64 * factor).round() as u32 / 2) * 2;
        let new_h = ((self.h as f64 * factor).round() as u32 / 2) * 2;
        let (cx, cy) = self.center();
        PixelRect {
            x: cx - new_w as i32 / 2,
            y: cy - new_h as i32 / 2,
            w: new_w.max(2),
            h: new_h.max(2),
        }
    }
}

/// What a detected region contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// The presenter's webcam overlay.
    Facecam,
    /// The primary teaching content (code/UI).
    FocalContent,
}

/// A detected region with its validity window.
///
/// At most one `Facecam` region is active at any instant; multiple
/// `FocalContent` regions may coexist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Region {
    /// Rectangle in source-pixel coordinates.
    pub rect: PixelRect,
    /// What the rectangle contains.
    pub kind: RegionKind,
    /// When the detection is valid.
    pub span: TimeSpan,
}

impl Region {
    /// Create a new region.
    pub fn new(rect: PixelRect, kind: RegionKind, span: TimeSpan) -> Self {
        Self { rect, kind, span }
    }
}

/// Error produced when a region list violates its contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionListError {
    #[error("facecam regions {first} and {second} overlap in time")]
    ConcurrentFacecams { first: usize, second: usize },
    #[error("region {index} has a degenerate rectangle ({w}x{h})")]
    DegenerateRect { index: usize, w: u32, h: u32 },
}

/// Validate that at most one facecam region is active at a time and that
/// all rectangles are non-degenerate.
pub fn validate_regions(regions: &[Region]) -> Result<(), RegionListError> {
    for (index, region) in regions.iter().enumerate() {
        if region.rect.w == 0 || region.rect.h == 0 {
            return Err(RegionListError::DegenerateRect {
                index,
                w: region.rect.w,
                h: region.rect.h,
            });
        }
    }
    let facecams: Vec<(usize, &Region)> = regions
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kind == RegionKind::Facecam)
        .collect();
    for i in 0..facecams.len() {
        for j in (i + 1)..facecams.len() {
            if facecams[i].1.span.overlaps(&facecams[j].1.span) {
                return Err(RegionListError::ConcurrentFacecams {
                    first: facecams[i].0,
                    second: facecams[j].0,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u64, end: u64) -> TimeSpan {
        TimeSpan::new(start, end).unwrap()
    }

    #[test]
    fn test_rect_overlap() {
        let a = PixelRect::new(0, 0, 100, 100);
        let b = PixelRect::new(50, 50, 100, 100);
        let c = PixelRect::new(100, 0, 50, 50);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // Edge-adjacent does not overlap
    }

    #[test]
    fn test_rect_contains() {
        let outer = PixelRect::new(0, 0, 200, 200);
        let inner = PixelRect::new(10, 10, 50, 50);
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
    }

    #[test]
    fn test_rect_scaled_keeps_center_and_evenness() {
        let r = PixelRect::new(100, 100, 200, 100);
        let s = r.scaled(0.7);
        assert_eq!(s.w % 2, 0);
        assert_eq!(s.h % 2, 0);
        let (cx, cy) = r.center();
        let (sx, sy) = s.center();
        assert!((cx - sx).abs() <= 1);
        assert!((cy - sy).abs() <= 1);
    }

    #[test]
    fn test_concurrent_facecams_rejected() {
        let regions = vec![
            Region::new(PixelRect::new(0, 0, 100, 100), RegionKind::Facecam, span(0, 1000)),
            Region::new(PixelRect::new(200, 0, 100, 100), RegionKind::Facecam, span(500, 1500)),
        ];
        assert!(matches!(
            validate_regions(&regions),
            Err(RegionListError::ConcurrentFacecams { first: 0, second: 1 })
        ));
    }

    #[test]
    fn test_sequential_facecams_allowed() {
        let regions = vec![
            Region::new(PixelRect::new(0, 0, 100, 100), RegionKind::Facecam, span(0, 1000)),
            Region::new(PixelRect::new(200, 0, 100, 100), RegionKind::Facecam, span(1000, 2000)),
            Region::new(
                PixelRect::new(0, 200, 600, 400),
                RegionKind::FocalContent,
                span(0, 2000),
            ),
        ];
        assert!(validate_regions(&regions).is_ok());
    }
}
