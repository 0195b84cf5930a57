//! Translate a render plan into an FFmpeg filtergraph.
//!
//! Pacing ops rewrite the timeline (cuts drop time, speed compresses it), so
//! the graph is built in two stages: a segmented trim/concat chain that
//! applies reframing and pacing per timeline segment, then an overlay stage
//! whose enable windows and subtitle times are remapped into output time via
//! [`TimelineMap`].

use std::fmt::Write as _;

use vshort_models::{CanvasSpec, RenderOpKind, RenderPlan, TimeSpan};

use crate::error::{MediaError, MediaResult};

/// Maps source-time milliseconds to output-time milliseconds.
///
/// Built from the plan's pacing ops. Cut spans collapse to a point; sped
/// spans contract by their factor; everything else passes through.
#[derive(Debug, Clone)]
pub struct TimelineMap {
    /// (input span, speed factor); cuts are factor 0 sentinels handled apart.
    cuts: Vec<TimeSpan>,
    speeds: Vec<(TimeSpan, f64)>,
}

impl TimelineMap {
    /// Build the map from a plan's pacing ops.
    pub fn from_plan(plan: &RenderPlan) -> Self {
        let mut cuts = Vec::new();
        let mut speeds = Vec::new();
        for op in plan.ops() {
            match &op.kind {
                RenderOpKind::SilenceCut => cuts.push(op.span),
                RenderOpKind::SpeedRamp { factor, .. } => speeds.push((op.span, *factor)),
                _ => {}
            }
        }
        cuts.sort_by_key(|s| s.start_ms);
        speeds.sort_by_key(|(s, _)| s.start_ms);
        Self { cuts, speeds }
    }

    /// Map a source timestamp to output time.
    pub fn to_output_ms(&self, input_ms: u64) -> u64 {
        let mut removed = 0.0f64;
        for cut in &self.cuts {
            if cut.end_ms <= input_ms {
                removed += cut.duration_ms() as f64;
            } else if cut.start_ms < input_ms {
                removed += (input_ms - cut.start_ms) as f64;
            }
        }
        for (span, factor) in &self.speeds {
            let covered = if span.end_ms <= input_ms {
                span.duration_ms() as f64
            } else if span.start_ms < input_ms {
                (input_ms - span.start_ms) as f64
            } else {
                0.0
            };
            removed += covered * (1.0 - 1.0 / factor);
        }
        (input_ms as f64 - removed).round().max(0.0) as u64
    }

    /// Map a source span to output time, preserving span validity.
    pub fn map_span(&self, span: TimeSpan) -> Option<TimeSpan> {
        let start = self.to_output_ms(span.start_ms);
        let end = self.to_output_ms(span.end_ms);
        if end > start {
            Some(TimeSpan { start_ms: start, end_ms: end })
        } else {
            None
        }
    }
}

/// One contiguous stretch of kept source time with uniform pacing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSegment {
    pub span: TimeSpan,
    pub speed: f64,
    pub punch_in: Option<PunchInSpec>,
}

/// Resolved punch-in geometry for a segment, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PunchInSpec {
    pub scale: f64,
    pub anchor_x: i32,
    pub anchor_y: i32,
}

/// Partition the clip timeline at every pacing boundary and drop cut spans.
///
/// Each returned segment carries the speed factor and punch-in active over
/// its whole extent, so the per-segment filter chain is uniform.
pub fn timeline_segments(plan: &RenderPlan, clip: TimeSpan) -> Vec<TimelineSegment> {
    let mut boundaries = vec![clip.start_ms, clip.end_ms];
    for op in plan.ops() {
        match op.kind {
            RenderOpKind::SilenceCut
            | RenderOpKind::SpeedRamp { .. }
            | RenderOpKind::PunchIn { .. }
            | RenderOpKind::Crop { .. }
            | RenderOpKind::ScaleBlurBackground { .. } => {
                if op.span.start_ms > clip.start_ms && op.span.start_ms < clip.end_ms {
                    boundaries.push(op.span.start_ms);
                }
                if op.span.end_ms > clip.start_ms && op.span.end_ms < clip.end_ms {
                    boundaries.push(op.span.end_ms);
                }
            }
            _ => {}
        }
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut segments = Vec::new();
    for pair in boundaries.windows(2) {
        let span = TimeSpan { start_ms: pair[0], end_ms: pair[1] };
        let mid = span.start_ms + span.duration_ms() / 2;

        let cut = plan.ops().iter().any(|op| {
            matches!(op.kind, RenderOpKind::SilenceCut) && op.span.contains(mid)
        });
        if cut {
            continue;
        }

        let speed = plan
            .ops()
            .iter()
            .find_map(|op| match op.kind {
                RenderOpKind::SpeedRamp { factor, .. } if op.span.contains(mid) => Some(factor),
                _ => None,
            })
            .unwrap_or(1.0);

        let punch_in = plan.ops().iter().find_map(|op| match op.kind {
            RenderOpKind::PunchIn { target_scale, anchor_x, anchor_y, .. }
                if op.span.contains(mid) =>
            {
                Some(PunchInSpec { scale: target_scale, anchor_x, anchor_y })
            }
            _ => None,
        });

        segments.push(TimelineSegment { span, speed, punch_in });
    }
    segments
}

fn secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

/// The reframe chain active over a segment: crop or blur-background fit.
///
/// `tag` keeps the blur chain's internal link labels unique per segment.
fn reframe_chain(plan: &RenderPlan, mid_ms: u64, canvas: &CanvasSpec, tag: usize) -> String {
    for op in plan.ops() {
        if !op.span.contains(mid_ms) {
            continue;
        }
        match &op.kind {
            RenderOpKind::Crop { src } => {
                return format!("crop={}:{}:{}:{}", src.w, src.h, src.x, src.y);
            }
            RenderOpKind::ScaleBlurBackground { blur_sigma, darken } => {
                return format!(
                    "split=2[bg{tag}][fg{tag}];\
                     [bg{tag}]scale={w}:{h}:force_original_aspect_ratio=increase,\
                     crop={w}:{h},gblur=sigma={sigma},eq=brightness=-{darken:.2}[bgb{tag}];\
                     [fg{tag}]scale={w}:{h}:force_original_aspect_ratio=decrease[fgs{tag}];\
                     [bgb{tag}][fgs{tag}]overlay=(W-w)/2:(H-h)/2",
                    w = canvas.width,
                    h = canvas.height,
                    sigma = blur_sigma,
                    darken = darken,
                );
            }
            _ => {}
        }
    }
    // No reframe op covers this instant; fit the full frame
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
        w = canvas.width,
        h = canvas.height,
    )
}

/// Punch-in as a centered even-dimension crop back-scaled to the full frame.
fn punch_in_chain(spec: &PunchInSpec, src_w: u32, src_h: u32) -> String {
    let w = ((src_w as f64 / spec.scale) as u32) & !1;
    let h = ((src_h as f64 / spec.scale) as u32) & !1;
    let x = (spec.anchor_x - w as i32 / 2).clamp(0, src_w.saturating_sub(w) as i32);
    let y = (spec.anchor_y - h as i32 / 2).clamp(0, src_h.saturating_sub(h) as i32);
    format!("crop={w}:{h}:{x}:{y},scale={src_w}:{src_h}")
}

/// atempo only accepts factors in [0.5, 2.0]; chain for anything outside.
fn atempo_chain(factor: f64) -> String {
    let mut parts = Vec::new();
    let mut remaining = factor;
    while remaining > 2.0 {
        parts.push("atempo=2.0".to_string());
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        parts.push("atempo=0.5".to_string());
        remaining /= 0.5;
    }
    parts.push(format!("atempo={:.4}", remaining));
    parts.join(",")
}

/// Everything the graph builder needs besides the plan itself.
#[derive(Debug, Clone)]
pub struct GraphInputs {
    pub clip: TimeSpan,
    pub canvas: CanvasSpec,
    pub source_w: u32,
    pub source_h: u32,
    /// Path of the caption track, already written; None renders no captions.
    pub ass_path: Option<String>,
}

/// Build the complete filter_complex for one clip.
///
/// Returns the graph string; the video output label is `[vout]` and the
/// audio output label is `[aout]`.
pub fn build_filtergraph(plan: &RenderPlan, inputs: &GraphInputs) -> MediaResult<String> {
    let segments = timeline_segments(plan, inputs.clip);
    if segments.is_empty() {
        return Err(MediaError::InvalidVideo(
            "plan leaves no timeline segments to render".to_string(),
        ));
    }
    let map = TimelineMap::from_plan(plan);

    let mut graph = String::new();

    // Stage 1: per-segment trim, punch-in, reframe, speed; then concat.
    for (i, seg) in segments.iter().enumerate() {
        let mid = seg.span.start_ms + seg.span.duration_ms() / 2;
        let mut chain = format!(
            "[0:v]trim={:.3}:{:.3},setpts=PTS-STARTPTS",
            secs(seg.span.start_ms),
            secs(seg.span.end_ms),
        );
        if let Some(punch) = &seg.punch_in {
            let _ = write!(chain, ",{}", punch_in_chain(punch, inputs.source_w, inputs.source_h));
        }
        let reframe = reframe_chain(plan, mid, &inputs.canvas, i);
        if reframe.contains('[') {
            // Multi-link chain (blur background); splice it as its own stage
            let _ = write!(graph, "{chain}[s{i}pre];[s{i}pre]{reframe}[s{i}fit];");
            chain = format!("[s{i}fit]setpts=PTS");
        } else {
            let _ = write!(chain, ",{reframe}");
        }
        if (seg.speed - 1.0).abs() > f64::EPSILON {
            let _ = write!(chain, ",setpts=PTS/{:.4}", seg.speed);
        }
        let _ = write!(graph, "{chain}[v{i}];");

        let _ = write!(
            graph,
            "[0:a]atrim={:.3}:{:.3},asetpts=PTS-STARTPTS",
            secs(seg.span.start_ms),
            secs(seg.span.end_ms),
        );
        if (seg.speed - 1.0).abs() > f64::EPSILON {
            let _ = write!(graph, ",{}", atempo_chain(seg.speed));
        }
        let _ = write!(graph, "[a{i}];");
    }
    for i in 0..segments.len() {
        let _ = write!(graph, "[v{i}][a{i}]");
    }
    let _ = write!(graph, "concat=n={}:v=1:a=1[vcat][aout];", segments.len());

    let mut current = "vcat".to_string();
    let mut next_label = 0usize;
    let mut link = |graph: &mut String, chain: &str, current: &mut String, next: &mut usize| {
        let label = format!("o{next}");
        *next += 1;
        let _ = write!(graph, "[{current}]{chain}[{label}];");
        *current = label;
    };

    // Stage 2: overlays in output time.
    for op in plan.ops() {
        if let RenderOpKind::FacecamOverlay { src, dst } = &op.kind {
            let Some(out_span) = map.map_span(op.span) else { continue };
            let cam_label = format!("cam{next_label}");
            let _ = write!(
                graph,
                "[0:v]trim={:.3}:{:.3},setpts=PTS-STARTPTS,crop={}:{}:{}:{},scale={}:{}[{cam_label}];",
                secs(op.span.start_ms),
                secs(op.span.end_ms),
                src.w,
                src.h,
                src.x,
                src.y,
                dst.w,
                dst.h,
            );
            let label = format!("o{next_label}");
            next_label += 1;
            let _ = write!(
                graph,
                "[{current}][{cam_label}]overlay={}:{}:enable='between(t,{:.3},{:.3})'[{label}];",
                dst.x,
                dst.y,
                secs(out_span.start_ms),
                secs(out_span.end_ms),
            );
            current = label;
        }
    }

    for op in plan.ops() {
        match &op.kind {
            RenderOpKind::TitleStrap { text, band_h_px, opacity } => {
                let chain = format!(
                    "drawbox=x=0:y=0:w=iw:h={band_h_px}:color=black@{opacity:.2}:t=fill,\
                     drawtext=text='{}':fontsize={}:fontcolor=white:\
                     x=(w-text_w)/2:y=({band_h_px}-text_h)/2",
                    escape_drawtext(text),
                    band_h_px * 6 / 10,
                );
                link(&mut graph, &chain, &mut current, &mut next_label);
            }
            RenderOpKind::ProgressBar { height_px, opacity } => {
                let out_dur = secs(map.to_output_ms(inputs.clip.end_ms));
                let chain = format!(
                    "drawbox=x=0:y=ih-{height_px}:w='iw*t/{out_dur:.3}':h={height_px}:\
                     color=white@{opacity:.2}:t=fill",
                );
                link(&mut graph, &chain, &mut current, &mut next_label);
            }
            _ => {}
        }
    }

    if let Some(ass) = &inputs.ass_path {
        let chain = format!("ass='{}'", escape_filter_path(ass));
        link(&mut graph, &chain, &mut current, &mut next_label);
    }

    let _ = write!(graph, "[{current}]format=yuv420p[vout]");
    Ok(graph)
}

/// Escape text for a drawtext argument.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

/// Escape a path for a filter option value.
fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\").replace(':', "\\:").replace('\'', "\\'")
}
