//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum clips rendered concurrently
    pub max_concurrent_renders: usize,
    /// Per-clip render timeout
    pub render_timeout: Duration,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
    /// Work directory for temporary files
    pub work_dir: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_renders: 2,
            render_timeout: Duration::from_secs(600),
            shutdown_timeout: Duration::from_secs(30),
            work_dir: "/tmp/vshort".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent_renders: std::env::var("VSHORT_MAX_RENDERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            render_timeout: Duration::from_secs(
                std::env::var("VSHORT_RENDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            shutdown_timeout: Duration::from_secs(
                std::env::var("VSHORT_SHUTDOWN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            work_dir: std::env::var("VSHORT_WORK_DIR")
                .unwrap_or_else(|_| "/tmp/vshort".to_string()),
        }
    }
}
