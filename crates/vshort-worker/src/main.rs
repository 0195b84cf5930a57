//! Short-clip render worker binary.
//!
//! Takes a batch manifest, plans every clip, and renders them under the
//! configured concurrency limit.

use std::sync::Arc;

use tracing::{error, info};

use vshort_media::probe::probe_video;
use vshort_media::render::RenderRequest;
use vshort_plan::PlanConfig;
use vshort_worker::{
    init_logging, BatchManifest, ClipJob, RenderExecutor, WorkerConfig,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    let manifest_path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            error!("usage: vshort-worker <manifest.json>");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&manifest_path).await {
        error!("worker failed: {e}");
        std::process::exit(1);
    }
}

async fn run(manifest_path: &str) -> anyhow::Result<()> {
    let manifest = BatchManifest::load(manifest_path)?;
    let config = WorkerConfig::from_env();
    let plan_config = PlanConfig::default();

    info!(
        source = %manifest.source.display(),
        clips = manifest.clips.len(),
        "loaded batch manifest"
    );

    std::fs::create_dir_all(&manifest.output_dir)?;

    let source_info = probe_video(&manifest.source).await?;
    info!(
        width = source_info.width,
        height = source_info.height,
        duration_s = source_info.duration,
        "probed source"
    );

    let caption_font_px = plan_config.caption_font_px;
    let jobs: Vec<ClipJob> = manifest
        .clips
        .iter()
        .enumerate()
        .map(|(i, clip)| {
            let inputs =
                manifest.clip_inputs(clip, source_info.width, source_info.height);
            let request = RenderRequest {
                input: manifest.source.clone(),
                output: manifest.output_path(i),
                clip: clip.span,
                canvas: manifest.canvas,
                encoding: manifest.encoding.clone(),
                caption_font_px,
            };
            ClipJob::new(manifest.strategy, inputs, request)
        })
        .collect();

    let executor = Arc::new(RenderExecutor::new(config, plan_config));

    // Ctrl-C cancels every in-flight render
    let cancel_executor = Arc::clone(&executor);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling renders");
            cancel_executor.cancel_all();
        }
    });

    let outcomes = executor.execute_batch(jobs).await;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed == outcomes.len() {
        anyhow::bail!("all {} clips failed", failed);
    }
    if failed > 0 {
        info!(failed, total = outcomes.len(), "batch finished with failures");
    } else {
        info!(total = outcomes.len(), "batch finished");
    }
    Ok(())
}
