//! Structured clip logging utilities.

use tracing::{info, warn};

/// Clip logger with consistent contextual fields.
#[derive(Debug, Clone)]
pub struct ClipLogger {
    clip_id: String,
    strategy: String,
}

impl ClipLogger {
    /// Create a logger for one clip and strategy.
    pub fn new(clip_id: &str, strategy: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            strategy: strategy.to_string(),
        }
    }

    /// Log the start of clip processing.
    pub fn log_start(&self, message: &str) {
        info!(
            clip_id = %self.clip_id,
            strategy = %self.strategy,
            "Clip started: {}", message
        );
    }

    /// Log a progress update.
    pub fn log_progress(&self, message: &str) {
        info!(
            clip_id = %self.clip_id,
            strategy = %self.strategy,
            "Clip progress: {}", message
        );
    }

    /// Log a non-fatal degradation.
    pub fn log_warning(&self, message: &str) {
        warn!(
            clip_id = %self.clip_id,
            strategy = %self.strategy,
            "Clip warning: {}", message
        );
    }

    /// Log successful completion.
    pub fn log_done(&self, message: &str) {
        info!(
            clip_id = %self.clip_id,
            strategy = %self.strategy,
            "Clip done: {}", message
        );
    }
}

/// Initialize tracing with colored output for dev, JSON for production.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vshort=info".parse().expect("static directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
