//! Bounded render executor.
//!
//! Runs a batch of clip renders under a concurrency limit. Each clip gets
//! its own cancellation receiver and timeout; one clip failing never takes
//! its siblings down.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use vshort_media::render::{render_clip, RenderRequest};
use vshort_plan::{ClipInputs, ClipPlan, FallbackResolver, PlanConfig, Strategy};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::ClipLogger;

/// One clip to plan and render.
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub clip_id: String,
    pub strategy: Strategy,
    pub inputs: ClipInputs,
    pub request: RenderRequest,
}

impl ClipJob {
    /// Assign a fresh clip id.
    pub fn new(strategy: Strategy, inputs: ClipInputs, request: RenderRequest) -> Self {
        Self {
            clip_id: Uuid::new_v4().to_string(),
            strategy,
            inputs,
            request,
        }
    }
}

/// The result of one clip, reported whether it succeeded or not.
#[derive(Debug)]
pub struct ClipOutcome {
    pub clip_id: String,
    pub result: WorkerResult<ClipPlan>,
}

impl ClipOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Executor running clip renders under a semaphore.
///
/// Each clip gets its own cancellation channel, so one clip can be stopped
/// without touching its siblings.
pub struct RenderExecutor {
    config: WorkerConfig,
    plan_config: PlanConfig,
    semaphore: Arc<Semaphore>,
    cancels: Arc<Mutex<HashMap<String, watch::Sender<bool>>>>,
}

impl RenderExecutor {
    /// Create a new executor.
    pub fn new(config: WorkerConfig, plan_config: PlanConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_renders));
        Self {
            config,
            plan_config,
            semaphore,
            cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Signal one in-flight render to stop. No-op for unknown or finished
    /// clips.
    pub fn cancel_clip(&self, clip_id: &str) {
        if let Ok(cancels) = self.cancels.lock() {
            if let Some(tx) = cancels.get(clip_id) {
                let _ = tx.send(true);
            }
        }
    }

    /// Signal every in-flight render to stop.
    pub fn cancel_all(&self) {
        if let Ok(cancels) = self.cancels.lock() {
            for tx in cancels.values() {
                let _ = tx.send(true);
            }
        }
    }

    /// Plan and render a batch of clips.
    ///
    /// Returns one outcome per job, in completion order. The batch always
    /// runs to the end; failed clips are reported alongside the successes.
    pub async fn execute_batch(&self, jobs: Vec<ClipJob>) -> Vec<ClipOutcome> {
        info!(
            clips = jobs.len(),
            max_concurrent = self.config.max_concurrent_renders,
            "starting render batch"
        );

        let mut set: JoinSet<ClipOutcome> = JoinSet::new();
        for job in jobs {
            let semaphore = Arc::clone(&self.semaphore);
            let cancels = Arc::clone(&self.cancels);
            let plan_config = self.plan_config.clone();
            let timeout_secs = self.config.render_timeout.as_secs();

            let (cancel_tx, cancel_rx) = watch::channel(false);
            if let Ok(mut map) = cancels.lock() {
                map.insert(job.clip_id.clone(), cancel_tx);
            }

            set.spawn(async move {
                let clip_id = job.clip_id.clone();
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ClipOutcome {
                            clip_id,
                            result: Err(WorkerError::clip_failed("executor shut down")),
                        }
                    }
                };
                let result =
                    execute_clip(job, plan_config, cancel_rx, timeout_secs).await;
                drop(permit);
                if let Ok(mut map) = cancels.lock() {
                    map.remove(&clip_id);
                }
                ClipOutcome { clip_id, result }
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => {
                    match &outcome.result {
                        Ok(_) => info!(clip_id = %outcome.clip_id, "clip completed"),
                        Err(e) => {
                            warn!(clip_id = %outcome.clip_id, error = %e, "clip failed")
                        }
                    }
                    outcomes.push(outcome);
                }
                Err(join_err) => {
                    error!(error = %join_err, "render task panicked");
                    outcomes.push(ClipOutcome {
                        clip_id: String::new(),
                        result: Err(WorkerError::clip_failed(join_err.to_string())),
                    });
                }
            }
        }

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            total = outcomes.len(),
            failed,
            "render batch finished"
        );
        outcomes
    }

    /// Working directory for intermediate files.
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}

/// Plan then render one clip.
async fn execute_clip(
    job: ClipJob,
    plan_config: PlanConfig,
    cancel_rx: watch::Receiver<bool>,
    timeout_secs: u64,
) -> WorkerResult<ClipPlan> {
    let logger = ClipLogger::new(&job.clip_id, job.strategy.as_str());
    logger.log_start("planning");

    // Fallback state is per clip; ladders only advance within it
    let mut resolver = FallbackResolver::new(&plan_config);
    let plan = job.strategy.plan(&job.inputs, &plan_config, &mut resolver)?;

    logger.log_progress(&format!("plan ready ({} ops)", plan.plan.ops().len()));

    render_clip(&job.request, &plan, Some(cancel_rx), Some(timeout_secs)).await?;

    logger.log_done("rendered");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vshort_models::{CanvasSpec, EncodingSpec, Segment, TimeSpan};

    fn span(start: u64, end: u64) -> TimeSpan {
        TimeSpan::new(start, end).unwrap()
    }

    fn job(input: &str) -> ClipJob {
        let inputs = ClipInputs {
            clip: span(0, 2000),
            title: "t".to_string(),
            segments: vec![Segment::new(span(0, 2000), "hello", 0.9)],
            regions: Vec::new(),
            activity: Vec::new(),
            source_w: 1920,
            source_h: 1080,
            canvas: CanvasSpec::default(),
        };
        let request = RenderRequest {
            input: PathBuf::from(input),
            output: PathBuf::from("/tmp/vshort-test-out.mp4"),
            clip: span(0, 2000),
            canvas: CanvasSpec::default(),
            encoding: EncodingSpec::default(),
            caption_font_px: 56,
        };
        ClipJob::new(Strategy::Basic, inputs, request)
    }

    #[tokio::test]
    async fn test_missing_input_fails_only_that_clip() {
        let executor = RenderExecutor::new(WorkerConfig::default(), PlanConfig::default());
        let jobs = vec![job("/nonexistent/a.mp4"), job("/nonexistent/b.mp4")];
        let outcomes = executor.execute_batch(jobs).await;
        assert_eq!(outcomes.len(), 2);
        for outcome in outcomes {
            assert!(matches!(
                outcome.result,
                Err(WorkerError::Media(vshort_media::MediaError::FileNotFound(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_cancel_unknown_clip_is_noop() {
        let executor = RenderExecutor::new(WorkerConfig::default(), PlanConfig::default());
        executor.cancel_clip("no-such-clip");
        executor.cancel_all();
        let outcomes = executor.execute_batch(Vec::new()).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_inputs_fail_in_planning() {
        let executor = RenderExecutor::new(WorkerConfig::default(), PlanConfig::default());
        let mut bad = job("/nonexistent/a.mp4");
        bad.inputs.segments = vec![
            Segment::new(span(0, 1000), "a", 0.9),
            Segment::new(span(500, 1500), "b", 0.9),
        ];
        let outcomes = executor.execute_batch(vec![bad]).await;
        assert!(matches!(
            outcomes[0].result,
            Err(WorkerError::Plan(_))
        ));
    }
}
