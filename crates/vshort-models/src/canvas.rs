//! Target output canvas geometry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default portrait canvas width.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1080;
/// Default portrait canvas height.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1920;
/// Default safe margin (top/bottom band reserved for platform UI).
pub const DEFAULT_SAFE_MARGIN_PX: u32 = 220;

/// Output canvas geometry and safe margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CanvasSpec {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Top/bottom exclusion band in pixels.
    pub safe_margin_px: u32,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            safe_margin_px: DEFAULT_SAFE_MARGIN_PX,
        }
    }
}

impl CanvasSpec {
    /// Canvas aspect ratio (width / height).
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Vertical extent usable by content, excluding safe margins.
    pub fn safe_height(&self) -> u32 {
        self.height.saturating_sub(self.safe_margin_px * 2)
    }

    /// Top edge of the bottom safe band.
    pub fn bottom_safe_y(&self) -> u32 {
        self.height.saturating_sub(self.safe_margin_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_portrait_1080x1920() {
        let canvas = CanvasSpec::default();
        assert_eq!(canvas.width, 1080);
        assert_eq!(canvas.height, 1920);
        assert!((canvas.aspect() - 0.5625).abs() < 1e-9);
    }

    #[test]
    fn test_safe_height() {
        let canvas = CanvasSpec::default();
        assert_eq!(canvas.safe_height(), 1920 - 440);
        assert_eq!(canvas.bottom_safe_y(), 1700);
    }
}
