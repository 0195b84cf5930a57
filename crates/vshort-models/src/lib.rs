//! Shared data models for the VShort planning pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Time spans and narration segments
//! - Detected regions (facecam, focal content)
//! - Canvas geometry and safe margins
//! - Render operations and the assembled render plan
//! - Fixed encoding pass-through specs

pub mod canvas;
pub mod encoding;
pub mod region;
pub mod render;
pub mod segment;
pub mod timespan;

// Re-export common types
pub use canvas::CanvasSpec;
pub use encoding::EncodingSpec;
pub use region::{validate_regions, PixelRect, Region, RegionKind, RegionListError};
pub use render::{CaptionEmphasis, RenderOp, RenderOpKind, RenderPlan};
pub use segment::{validate_segments, Segment, SegmentListError, LOW_CONFIDENCE_THRESHOLD};
pub use timespan::{TimeSpan, TimeSpanError};
