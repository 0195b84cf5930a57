//! End-to-end pipeline test: inputs through planning to filtergraph and
//! caption track, without invoking FFmpeg.

use vshort_media::captions::{render_ass, CaptionStyle};
use vshort_media::filters::{build_filtergraph, GraphInputs, TimelineMap};
use vshort_models::{
    CanvasSpec, PixelRect, Region, RegionKind, RenderOpKind, Segment, TimeSpan,
};
use vshort_plan::{
    ActivityKind, ActivitySpan, ClipInputs, FallbackResolver, PlanConfig, Strategy,
};

fn span(start: u64, end: u64) -> TimeSpan {
    TimeSpan::new(start, end).unwrap()
}

fn demo_inputs() -> ClipInputs {
    ClipInputs {
        clip: span(0, 20_000),
        title: "Async in practice".to_string(),
        segments: vec![
            Segment::new(span(0, 3_000), "so the first thing we do", 0.95),
            // 2s gap triggers a silence cut
            Segment::new(span(5_000, 9_000), "is open the scheduler source", 0.9),
            Segment::new(span(9_200, 20_000), "and look at the run queue here", 0.7),
        ],
        regions: vec![
            Region::new(
                PixelRect::new(40, 40, 320, 180),
                RegionKind::Facecam,
                span(0, 20_000),
            ),
            Region::new(
                PixelRect::new(500, 200, 900, 600),
                RegionKind::FocalContent,
                span(0, 20_000),
            ),
        ],
        activity: vec![ActivitySpan {
            span: span(5_500, 8_000),
            kind: ActivityKind::ScrollTyping,
        }],
        source_w: 2160,
        source_h: 3840,
        canvas: CanvasSpec::default(),
    }
}

#[test]
fn test_full_pipeline_produces_renderable_artifacts() {
    let config = PlanConfig::default();
    let mut resolver = FallbackResolver::new(&config);
    let clip_plan = Strategy::Basic
        .plan(&demo_inputs(), &config, &mut resolver)
        .unwrap();

    // The 2s narration gap became a cut, scroll activity a speed ramp
    assert!(clip_plan
        .plan
        .ops()
        .iter()
        .any(|op| matches!(op.kind, RenderOpKind::SilenceCut)));
    assert!(clip_plan
        .plan
        .ops()
        .iter()
        .any(|op| matches!(op.kind, RenderOpKind::SpeedRamp { .. })));

    let graph_inputs = GraphInputs {
        clip: span(0, 20_000),
        canvas: CanvasSpec::default(),
        source_w: 2160,
        source_h: 3840,
        ass_path: Some("/tmp/captions.ass".to_string()),
    };
    let graph = build_filtergraph(&clip_plan.plan, &graph_inputs).unwrap();
    assert!(graph.contains("concat="));
    assert!(graph.contains("ass="));
    assert!(graph.ends_with("[vout]"));

    // Caption times land in output time, after the cut contracted the clip
    let map = TimelineMap::from_plan(&clip_plan.plan);
    let style = CaptionStyle::for_canvas(&CanvasSpec::default(), config.caption_font_px);
    let doc = render_ass(&clip_plan.captions, &map, &CanvasSpec::default(), &style);
    assert!(doc.contains("Dialogue:"));
    assert!(doc.contains("Lighter"));
    let output_end = map.to_output_ms(20_000);
    assert!(output_end < 20_000);
}

#[test]
fn test_cancelled_speed_fallback_keeps_plan_renderable() {
    let config = PlanConfig::default();
    let mut resolver = FallbackResolver::new(&config);

    // Simulate two audio-artifact reports before planning
    resolver.resolve_speed_artifact();
    resolver.resolve_speed_artifact();

    let clip_plan = Strategy::Basic
        .plan(&demo_inputs(), &config, &mut resolver)
        .unwrap();
    let ramp = clip_plan.plan.ops().iter().find_map(|op| match op.kind {
        RenderOpKind::SpeedRamp { factor, .. } => Some(factor),
        _ => None,
    });
    assert_eq!(ramp, Some(1.25));

    let graph_inputs = GraphInputs {
        clip: span(0, 20_000),
        canvas: CanvasSpec::default(),
        source_w: 2160,
        source_h: 3840,
        ass_path: None,
    };
    assert!(build_filtergraph(&clip_plan.plan, &graph_inputs).is_ok());
}
