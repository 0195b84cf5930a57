//! Timing model: caption windows, silence gaps, and cut cadence.
//!
//! Pure functions over the ordered segment list. Caption windows snap to
//! speech: a window never starts before its speech and its end may only be
//! delayed, never its start advanced, so captions cannot spoil upcoming
//! narration.

use vshort_models::{CaptionEmphasis, Segment, TimeSpan};

use crate::config::PlanConfig;

/// A caption display window derived from one narration segment.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionWindow {
    /// When the caption is visible.
    pub span: TimeSpan,
    /// Rendered lines, at most `caption_max_lines`.
    pub lines: Vec<String>,
    /// Emphasis carried from transcription confidence.
    pub emphasis: CaptionEmphasis,
}

impl CaptionWindow {
    /// Total character count across lines, used for proportional splits.
    fn char_weight(lines: &[String]) -> u64 {
        lines.iter().map(|l| l.chars().count() as u64).sum::<u64>().max(1)
    }
}

/// Greedy word wrap into lines of at most `max_chars` characters.
///
/// A single word longer than the budget gets its own line rather than being
/// broken mid-word.
fn wrap_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split segments into caption windows honoring the line/character budget.
///
/// Each segment's span is divided proportionally to character count across
/// its windows. Windows shorter than the minimum display duration have their
/// end delayed, by at most the snap offset past the segment and never into
/// the next segment's speech. When a segment is too dense to give every
/// window the minimum, the minimum shrinks so that every wrapped line still
/// gets a window; text is degraded to shorter display, never dropped.
pub fn caption_windows(segments: &[Segment], config: &PlanConfig) -> Vec<CaptionWindow> {
    let mut windows = Vec::new();

    for (seg_idx, segment) in segments.iter().enumerate() {
        let lines = wrap_lines(&segment.text, config.caption_line_chars);
        if lines.is_empty() {
            continue;
        }
        let emphasis = if segment.is_low_confidence() {
            CaptionEmphasis::Lighter
        } else {
            CaptionEmphasis::Normal
        };

        let chunks: Vec<Vec<String>> = lines
            .chunks(config.caption_max_lines.max(1))
            .map(|c| c.to_vec())
            .collect();
        let total_weight: u64 = chunks.iter().map(|c| CaptionWindow::char_weight(c)).sum();
        let duration = segment.span.duration_ms();
        let chunk_count = chunks.len() as u64;

        // Farthest any window of this segment may reach: into silence by at
        // most the snap offset, never into the next segment's speech.
        let mut limit = segment.span.end_ms + config.caption_snap_offset_ms;
        if let Some(next) = segments.get(seg_idx + 1) {
            limit = limit.min(next.span.start_ms);
        }
        // Per-window minimum, shrunk when the segment cannot give every
        // window the configured floor. Dense segments degrade to shorter
        // windows; text is never dropped.
        let min_window = (limit.saturating_sub(segment.span.start_ms) / chunk_count)
            .min(config.caption_min_window_ms)
            .max(1);

        let mut cursor = segment.span.start_ms;
        let mut consumed_weight = 0u64;
        for (chunk_idx, chunk) in chunks.into_iter().enumerate() {
            consumed_weight += CaptionWindow::char_weight(&chunk);
            let remaining = chunk_count - 1 - chunk_idx as u64;
            let mut end_ms = if remaining == 0 {
                segment.span.end_ms
            } else {
                segment.span.start_ms + duration * consumed_weight / total_weight
            };

            // Too-short windows delay their end; the start stays on speech.
            // The stretch is capped so every later window keeps its minimum.
            if end_ms.saturating_sub(cursor) < min_window {
                let ceiling = limit.saturating_sub(remaining * min_window);
                end_ms = end_ms.max((cursor + min_window).min(ceiling));
            }
            let end_ms = end_ms.max(cursor + 1);

            windows.push(CaptionWindow {
                span: TimeSpan { start_ms: cursor, end_ms },
                lines: chunk,
                emphasis,
            });
            cursor = end_ms;
        }
    }

    windows
}

/// Spans of silence (no narration) at least the configured threshold long.
///
/// Includes leading silence before the first segment and trailing silence
/// after the last, relative to the clip span.
pub fn silence_gaps(segments: &[Segment], clip: TimeSpan, config: &PlanConfig) -> Vec<TimeSpan> {
    let mut gaps = Vec::new();
    let mut push_gap = |start_ms: u64, end_ms: u64| {
        if end_ms > start_ms && end_ms - start_ms >= config.silence_threshold_ms {
            gaps.push(TimeSpan { start_ms, end_ms });
        }
    };

    match segments.first() {
        Some(first) => {
            push_gap(clip.start_ms, first.span.start_ms.min(clip.end_ms));
            for pair in segments.windows(2) {
                push_gap(pair[0].span.end_ms, pair[1].span.start_ms);
            }
            if let Some(last) = segments.last() {
                push_gap(last.span.end_ms.max(clip.start_ms), clip.end_ms);
            }
        }
        None => push_gap(clip.start_ms, clip.end_ms),
    }

    gaps
}

/// A stretch of timeline where no visual-change event occurred in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceGap {
    /// The previous event (or clip start).
    pub prev_ms: u64,
    /// The event (or clip end) that arrived too late.
    pub next_ms: u64,
}

impl CadenceGap {
    /// Length of the uneventful stretch.
    pub fn gap_ms(&self) -> u64 {
        self.next_ms.saturating_sub(self.prev_ms)
    }
}

/// Check that every visual-change event has a prior event within the
/// configured maximum gap.
///
/// `events_ms` must be sorted ascending. The clip start counts as the first
/// event; the clip end is checked against the last event so a long tail
/// without changes is also reported.
pub fn check_cut_cadence(events_ms: &[u64], clip: TimeSpan, config: &PlanConfig) -> Vec<CadenceGap> {
    let mut gaps = Vec::new();
    let mut prev = clip.start_ms;
    for &event in events_ms {
        if event.saturating_sub(prev) > config.cut_cadence_max_ms {
            gaps.push(CadenceGap { prev_ms: prev, next_ms: event });
        }
        prev = event;
    }
    if clip.end_ms.saturating_sub(prev) > config.cut_cadence_max_ms {
        gaps.push(CadenceGap { prev_ms: prev, next_ms: clip.end_ms });
    }
    gaps
}
