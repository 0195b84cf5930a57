//! Render operations and the assembled render plan.
//!
//! A `RenderPlan` is the single artifact the planning core hands to the
//! external media engine. Ops are sorted by start time; ties are broken by a
//! fixed draw priority so later-drawn elements land on top.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::region::PixelRect;
use crate::timespan::TimeSpan;

/// Caption rendering emphasis.
///
/// Low-confidence transcription keeps its caption but renders lighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaptionEmphasis {
    Normal,
    Lighter,
}

/// A single render operation with its time span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderOp {
    /// When this operation is active.
    pub span: TimeSpan,
    /// What this operation does.
    pub kind: RenderOpKind,
}

/// The operation variants understood by the media engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOpKind {
    /// Crop a source window and scale it to fill the canvas.
    Crop {
        /// Source window in source-pixel coordinates.
        src: PixelRect,
    },
    /// Fit the full source frame at native height, centered, over a
    /// blurred/darkened duplicate filling the canvas.
    ScaleBlurBackground {
        /// Gaussian blur sigma for the background duplicate.
        blur_sigma: f64,
        /// Background darkening, 0.0 (none) to 1.0 (black).
        darken: f64,
    },
    /// Caption text lines snapped to speech.
    Caption {
        /// Rendered lines (at most two).
        lines: Vec<String>,
        /// Emphasis level.
        emphasis: CaptionEmphasis,
        /// Font size in pixels.
        font_px: u32,
        /// Top edge of the caption band on the canvas.
        band_y_px: u32,
        /// Height of the caption band.
        band_h_px: u32,
    },
    /// Editor-style title bar at the top of the canvas.
    TitleStrap {
        /// Title text.
        text: String,
        /// Height of the strap band (anchored at y = 0).
        band_h_px: u32,
        /// Strap opacity, 0.0 to 1.0.
        opacity: f64,
    },
    /// Constant-factor speed-up with eased in/out ramps.
    SpeedRamp {
        /// Playback speed multiplier.
        factor: f64,
        /// Ramp in/out duration in milliseconds, always > 0.
        ramp_ms: u64,
    },
    /// Remove this span from the output entirely.
    SilenceCut,
    /// Scale-up animation anchored on the focal region center.
    PunchIn {
        /// Final scale, 1.0 = native.
        target_scale: f64,
        /// Anchor point in source-pixel coordinates.
        anchor_x: i32,
        /// Anchor point in source-pixel coordinates.
        anchor_y: i32,
        /// Scale-in duration in milliseconds, always > 0.
        ramp_ms: u64,
    },
    /// Animated progress bar along the bottom edge.
    ProgressBar {
        /// Bar height in pixels.
        height_px: u32,
        /// Bar opacity, 0.0 to 1.0.
        opacity: f64,
    },
    /// The facecam rectangle composited over the canvas.
    FacecamOverlay {
        /// Source window containing the facecam.
        src: PixelRect,
        /// Destination rectangle on the canvas.
        dst: PixelRect,
    },
}

impl RenderOpKind {
    /// Fixed draw priority used to break start-time ties.
    ///
    /// Lower draws first; later-drawn elements sit on top.
    pub fn draw_priority(&self) -> u8 {
        match self {
            RenderOpKind::Crop { .. } | RenderOpKind::ScaleBlurBackground { .. } => 0,
            RenderOpKind::SpeedRamp { .. } | RenderOpKind::SilenceCut => 1,
            RenderOpKind::PunchIn { .. } => 2,
            RenderOpKind::FacecamOverlay { .. } => 3,
            RenderOpKind::Caption { .. } => 4,
            RenderOpKind::TitleStrap { .. } => 5,
            RenderOpKind::ProgressBar { .. } => 6,
        }
    }

    /// Conflict class: ops in the same class must never overlap in time.
    ///
    /// `None` means the variant has no same-class exclusivity rule.
    pub fn conflict_class(&self) -> Option<&'static str> {
        match self {
            RenderOpKind::Crop { .. } | RenderOpKind::ScaleBlurBackground { .. } => Some("reframe"),
            RenderOpKind::Caption { .. } => Some("caption"),
            RenderOpKind::SpeedRamp { .. } | RenderOpKind::SilenceCut => Some("pacing"),
            RenderOpKind::PunchIn { .. } => Some("punch_in"),
            RenderOpKind::FacecamOverlay { .. } => Some("facecam"),
            RenderOpKind::TitleStrap { .. } | RenderOpKind::ProgressBar { .. } => None,
        }
    }

    /// Short variant name for logs and conflict reports.
    pub fn name(&self) -> &'static str {
        match self {
            RenderOpKind::Crop { .. } => "crop",
            RenderOpKind::ScaleBlurBackground { .. } => "scale_blur_background",
            RenderOpKind::Caption { .. } => "caption",
            RenderOpKind::TitleStrap { .. } => "title_strap",
            RenderOpKind::SpeedRamp { .. } => "speed_ramp",
            RenderOpKind::SilenceCut => "silence_cut",
            RenderOpKind::PunchIn { .. } => "punch_in",
            RenderOpKind::ProgressBar { .. } => "progress_bar",
            RenderOpKind::FacecamOverlay { .. } => "facecam_overlay",
        }
    }
}

impl RenderOp {
    /// Create a new render op.
    pub fn new(span: TimeSpan, kind: RenderOpKind) -> Self {
        Self { span, kind }
    }

    /// Human-readable description for conflict reports.
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind.name(), self.span)
    }
}

/// An ordered, validated sequence of render operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderPlan {
    ops: Vec<RenderOp>,
}

impl RenderPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan from ops, sorting by start time with draw-priority
    /// tie-breaking.
    pub fn from_ops(mut ops: Vec<RenderOp>) -> Self {
        ops.sort_by(|a, b| {
            a.span
                .start_ms
                .cmp(&b.span.start_ms)
                .then(a.kind.draw_priority().cmp(&b.kind.draw_priority()))
        });
        Self { ops }
    }

    /// The ordered operations.
    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// Number of operations in the plan.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the plan has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterate over ops of a particular conflict class.
    pub fn ops_in_class<'a>(
        &'a self,
        class: &'static str,
    ) -> impl Iterator<Item = &'a RenderOp> + 'a {
        self.ops
            .iter()
            .filter(move |op| op.kind.conflict_class() == Some(class))
    }
}
