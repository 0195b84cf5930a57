//! ASS caption track generation.
//!
//! Caption windows from the planner are written as an Advanced SubStation
//! file and burned in via the `ass` filter. Times are output-timeline times,
//! so windows must be remapped through a [`TimelineMap`] before writing.

use std::path::Path;

use vshort_models::{CanvasSpec, CaptionEmphasis};
use vshort_plan::CaptionWindow;

use crate::error::MediaResult;
use crate::filters::TimelineMap;

/// Caption rendering parameters.
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    pub font: String,
    pub font_px: u32,
    /// Vertical margin from the bottom edge, in pixels.
    pub margin_v: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: "DejaVu Sans".to_string(),
            font_px: 56,
            margin_v: 384,
        }
    }
}

impl CaptionStyle {
    /// Style placing the caption band at a fraction of the canvas height.
    pub fn for_canvas(canvas: &CanvasSpec, font_px: u32) -> Self {
        Self {
            font: "DejaVu Sans".to_string(),
            font_px,
            // Band center sits at 80% of the canvas height
            margin_v: canvas.height / 5,
        }
    }
}

/// Format milliseconds as an ASS timestamp (H:MM:SS.cs).
fn ass_time(ms: u64) -> String {
    let cs = (ms / 10) % 100;
    let s = (ms / 1000) % 60;
    let m = (ms / 60_000) % 60;
    let h = ms / 3_600_000;
    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

/// Escape caption text for an ASS dialogue line.
fn ass_escape(text: &str) -> String {
    text.replace('\\', "\\\u{200b}").replace('{', "(").replace('}', ")")
}

/// Render caption windows into ASS document text.
///
/// Low-confidence windows use the `Lighter` style (reduced alpha) so shaky
/// transcription reads as tentative instead of asserted.
pub fn render_ass(
    windows: &[CaptionWindow],
    map: &TimelineMap,
    canvas: &CanvasSpec,
    style: &CaptionStyle,
) -> String {
    let mut doc = String::new();
    doc.push_str("[Script Info]\n");
    doc.push_str("ScriptType: v4.00+\n");
    doc.push_str(&format!("PlayResX: {}\n", canvas.width));
    doc.push_str(&format!("PlayResY: {}\n", canvas.height));
    doc.push_str("WrapStyle: 2\n\n");

    doc.push_str("[V4+ Styles]\n");
    doc.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, OutlineColour, \
         Bold, Outline, Shadow, Alignment, MarginL, MarginR, MarginV\n",
    );
    doc.push_str(&format!(
        "Style: Default,{font},{size},&H00FFFFFF,&H00000000,1,3,0,2,60,60,{mv}\n",
        font = style.font,
        size = style.font_px,
        mv = style.margin_v,
    ));
    doc.push_str(&format!(
        "Style: Lighter,{font},{size},&H66FFFFFF,&H66000000,0,3,0,2,60,60,{mv}\n",
        font = style.font,
        size = style.font_px,
        mv = style.margin_v,
    ));
    doc.push('\n');

    doc.push_str("[Events]\n");
    doc.push_str("Format: Layer, Start, End, Style, Text\n");
    for window in windows {
        let Some(out) = map.map_span(window.span) else {
            continue;
        };
        let style_name = match window.emphasis {
            CaptionEmphasis::Normal => "Default",
            CaptionEmphasis::Lighter => "Lighter",
        };
        let text = window
            .lines
            .iter()
            .map(|l| ass_escape(l))
            .collect::<Vec<_>>()
            .join("\\N");
        doc.push_str(&format!(
            "Dialogue: 0,{},{},{},{}\n",
            ass_time(out.start_ms),
            ass_time(out.end_ms),
            style_name,
            text,
        ));
    }
    doc
}

/// Write the caption track next to the render output.
pub fn write_ass(
    path: impl AsRef<Path>,
    windows: &[CaptionWindow],
    map: &TimelineMap,
    canvas: &CanvasSpec,
    style: &CaptionStyle,
) -> MediaResult<()> {
    let doc = render_ass(windows, map, canvas, style);
    std::fs::write(path, doc)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vshort_models::{RenderPlan, TimeSpan};

    fn window(start: u64, end: u64, text: &str, emphasis: CaptionEmphasis) -> CaptionWindow {
        CaptionWindow {
            span: TimeSpan::new(start, end).unwrap(),
            lines: vec![text.to_string()],
            emphasis,
        }
    }

    fn identity_map() -> TimelineMap {
        TimelineMap::from_plan(&RenderPlan::new())
    }

    #[test]
    fn test_ass_time_format() {
        assert_eq!(ass_time(0), "0:00:00.00");
        assert_eq!(ass_time(61_230), "0:01:01.23");
        assert_eq!(ass_time(3_600_000), "1:00:00.00");
    }

    #[test]
    fn test_render_ass_styles_and_events() {
        let windows = vec![
            window(0, 1000, "hello world", CaptionEmphasis::Normal),
            window(1200, 2500, "this is a test", CaptionEmphasis::Lighter),
        ];
        let canvas = CanvasSpec::default();
        let doc = render_ass(&windows, &identity_map(), &canvas, &CaptionStyle::default());
        assert!(doc.contains("Style: Default"));
        assert!(doc.contains("Style: Lighter"));
        assert!(doc.contains("Dialogue: 0,0:00:00.00,0:00:01.00,Default,hello world"));
        assert!(doc.contains("Dialogue: 0,0:00:01.20,0:00:02.50,Lighter,this is a test"));
    }

    #[test]
    fn test_two_lines_join_with_line_break() {
        let mut w = window(0, 1000, "first", CaptionEmphasis::Normal);
        w.lines.push("second".to_string());
        let canvas = CanvasSpec::default();
        let doc = render_ass(&[w], &identity_map(), &canvas, &CaptionStyle::default());
        assert!(doc.contains("first\\Nsecond"));
    }

    #[test]
    fn test_braces_are_neutralized() {
        let w = window(0, 1000, "{\\b1}bold", CaptionEmphasis::Normal);
        let canvas = CanvasSpec::default();
        let doc = render_ass(&[w], &identity_map(), &canvas, &CaptionStyle::default());
        assert!(!doc.contains("{\\b1}"));
    }
}
