//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Clip failed: {0}")]
    ClipFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Planning error: {0}")]
    Plan(#[from] vshort_plan::PlanError),

    #[error("Media error: {0}")]
    Media(#[from] vshort_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn clip_failed(msg: impl Into<String>) -> Self {
        Self::ClipFailed(msg.into())
    }

    /// Whether the error is worth retrying on a fresh attempt.
    ///
    /// Planning errors are deterministic and will fail again; timeouts and
    /// transient media failures may clear.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Plan(_) | WorkerError::ConfigError(_) => false,
            WorkerError::Media(vshort_media::MediaError::Cancelled) => false,
            WorkerError::Media(vshort_media::MediaError::Timeout(_)) => true,
            WorkerError::Media(_) => true,
            WorkerError::Io(_) => true,
            WorkerError::ClipFailed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(WorkerError::Media(vshort_media::MediaError::Timeout(600)).is_retryable());
        assert!(!WorkerError::Media(vshort_media::MediaError::Cancelled).is_retryable());
        assert!(!WorkerError::Plan(vshort_plan::PlanError::invalid_input("bad")).is_retryable());
    }
}
