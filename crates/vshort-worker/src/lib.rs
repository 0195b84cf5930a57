//! Bounded render executor for short clips.

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod manifest;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::{ClipJob, ClipOutcome, RenderExecutor};
pub use logging::{init_logging, ClipLogger};
pub use manifest::{BatchManifest, ClipManifest};
