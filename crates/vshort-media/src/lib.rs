//! FFmpeg boundary: probe sources, build filtergraphs, run renders.
//!
//! Nothing in this crate makes planning decisions; it executes validated
//! [`RenderPlan`](vshort_models::RenderPlan)s and reports media failures.

pub mod captions;
pub mod command;
pub mod error;
pub mod filters;
pub mod probe;
pub mod render;

pub use captions::{render_ass, write_ass, CaptionStyle};
pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use filters::{build_filtergraph, timeline_segments, GraphInputs, TimelineMap};
pub use probe::{probe_video, VideoInfo};
pub use render::{render_clip, RenderRequest};
