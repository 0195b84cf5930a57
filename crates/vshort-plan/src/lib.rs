//! Deterministic effects planning for vertical shorts.
//!
//! This crate is the pure core of the pipeline: it turns collaborator
//! signals (transcript segments, detected regions, activity tags) into a
//! validated [`RenderPlan`](vshort_models::RenderPlan) without touching
//! media. All decisions are integer/millisecond arithmetic so planning the
//! same inputs twice yields bit-identical plans.

pub mod assemble;
pub mod config;
pub mod error;
pub mod fallback;
pub mod interval;
pub mod pacing;
pub mod reframe;
pub mod strategy;
pub mod timing;

pub use assemble::{assemble, validate};
pub use config::PlanConfig;
pub use error::{PlanError, PlanResult};
pub use fallback::{FallbackLadder, FallbackResolver, ReadabilityDirective, Resolution};
pub use pacing::{ActivityKind, ActivitySpan, PacingPlanner};
pub use reframe::{ReframeBranch, ReframeDecision, ReframePlanner};
pub use strategy::{ClipInputs, ClipPlan, Strategy};
pub use timing::{
    caption_windows, check_cut_cadence, silence_gaps, CadenceGap, CaptionWindow,
};
