//! Execute a clip plan against a source file.

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::{info, instrument};
use vshort_models::{CanvasSpec, EncodingSpec, TimeSpan};
use vshort_plan::ClipPlan;

use crate::captions::{write_ass, CaptionStyle};
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{build_filtergraph, GraphInputs, TimelineMap};
use crate::probe::probe_video;

/// One render request: a planned clip bound to files on disk.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub clip: TimeSpan,
    pub canvas: CanvasSpec,
    pub encoding: EncodingSpec,
    /// Caption font size, matched to the plan's caption ops.
    pub caption_font_px: u32,
}

/// Render one planned clip to its output file.
///
/// The caption track is written beside the output and burned in; loudness
/// normalization and encoding settings come from the request's
/// [`EncodingSpec`]. Cancellation kills the FFmpeg process.
#[instrument(skip_all, fields(output = %request.output.display()))]
pub async fn render_clip(
    request: &RenderRequest,
    plan: &ClipPlan,
    cancel_rx: Option<watch::Receiver<bool>>,
    timeout_secs: Option<u64>,
) -> MediaResult<()> {
    if !request.input.exists() {
        return Err(MediaError::FileNotFound(request.input.clone()));
    }
    let info = probe_video(&request.input).await?;
    if info.width == 0 || info.height == 0 {
        return Err(MediaError::InvalidVideo(
            "source has no visible frame".to_string(),
        ));
    }

    let map = TimelineMap::from_plan(&plan.plan);
    let ass_path = ass_sidecar_path(&request.output);
    let style = CaptionStyle::for_canvas(&request.canvas, request.caption_font_px);
    write_ass(&ass_path, &plan.captions, &map, &request.canvas, &style)?;

    let graph_inputs = GraphInputs {
        clip: request.clip,
        canvas: request.canvas,
        source_w: info.width,
        source_h: info.height,
        ass_path: Some(ass_path.to_string_lossy().to_string()),
    };
    let enc = &request.encoding;

    // Loudness normalization runs on the graph's audio output; -af cannot
    // touch a filter_complex stream.
    let graph = format!(
        "{};[aout]loudnorm=I={:.0}:TP={:.0}[anorm]",
        build_filtergraph(&plan.plan, &graph_inputs)?,
        enc.loudness_target_lufs,
        enc.loudness_peak_db,
    );

    let mut cmd = FfmpegCommand::new(&request.input, &request.output)
        .filter_complex(graph)
        .map("[vout]")
        .map("[anorm]")
        .output_args(["-c:v", &enc.video_codec])
        .output_args(["-preset", &enc.preset])
        .output_args(["-b:v", &enc.video_bitrate])
        .output_args(["-r", &enc.frame_rate.to_string()])
        .output_args(["-c:a", &enc.audio_codec])
        .output_args(["-b:a", &enc.audio_bitrate])
        .output_args(["-ar", &enc.audio_sample_rate.to_string()]);
    if enc.faststart {
        cmd = cmd.output_args(["-movflags", "+faststart"]);
    }

    let mut runner = FfmpegRunner::new();
    if let Some(rx) = cancel_rx {
        runner = runner.with_cancel(rx);
    }
    if let Some(secs) = timeout_secs {
        runner = runner.with_timeout(secs);
    }
    runner.run(&cmd).await?;

    info!(
        ops = plan.plan.ops().len(),
        captions = plan.captions.len(),
        "clip rendered"
    );
    Ok(())
}

/// The caption track path for a render output.
pub fn ass_sidecar_path(output: &Path) -> PathBuf {
    output.with_extension("ass")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ass_sidecar_path() {
        assert_eq!(
            ass_sidecar_path(Path::new("/tmp/out/clip_01.mp4")),
            PathBuf::from("/tmp/out/clip_01.ass")
        );
    }
}
