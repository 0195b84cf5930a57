//! Tunable planning parameters.
//!
//! All defaults match the documented product behavior. Configuration is an
//! immutable value passed explicitly into each planner call; planning never
//! reads ambient state.

use serde::{Deserialize, Serialize};

/// Speed-ramp fallback ladder tried in order when artifacts are detected.
pub const DEFAULT_SPEED_LADDER: [f64; 4] = [1.35, 1.30, 1.25, 1.15];

/// Tunable parameters for the planning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Minimum silence duration considered a gap (milliseconds).
    ///
    /// - Lower values (150ms): aggressive cutting, faster paced
    /// - Default (250ms): natural micro-pauses preserved
    /// - Higher values (500ms+): only obvious dead air is cut
    pub silence_threshold_ms: u64,

    /// Handle retained on each side of a silence cut (milliseconds).
    ///
    /// Prevents clipping word onsets and endings. Handles are trimmed toward
    /// zero when the cut-spacing rule requires it, never below 0.
    pub cut_handle_ms: u64,

    /// Minimum output-time spacing between two silence-cut points
    /// (milliseconds). At most one cut per this interval.
    pub min_cut_spacing_ms: u64,

    /// Maximum allowed time between consecutive visual-change events
    /// (milliseconds).
    pub cut_cadence_max_ms: u64,

    /// Maximum rendered caption lines per window.
    pub caption_max_lines: usize,

    /// Maximum characters per caption line.
    pub caption_line_chars: usize,

    /// Maximum offset between caption timing and speech (milliseconds).
    ///
    /// When a window must be stretched to stay readable, the end is delayed
    /// within this bound; the start is never advanced before speech.
    pub caption_snap_offset_ms: u64,

    /// Minimum caption display duration (milliseconds).
    pub caption_min_window_ms: u64,

    /// Caption font size in pixels.
    pub caption_font_px: u32,

    /// Minimum legible font size in pixels (readability floor).
    pub min_legible_font_px: u32,

    /// Speed factors tried in order when speed artifacts are detected.
    pub speed_ladder: Vec<f64>,

    /// Speed-ramp in/out duration expressed in output frames.
    ///
    /// Converted to milliseconds using `frame_rate`; the resulting ramp
    /// duration is always greater than zero.
    pub ramp_frames: u32,

    /// Declared output frame rate used for frame/millisecond conversion.
    pub frame_rate: u32,

    /// Punch-in target scale, clamped to [1.15, 1.35].
    pub punch_in_scale: f64,

    /// Hard ceiling on total punch-in scale.
    pub punch_in_max_scale: f64,

    /// Punch-in animation duration (milliseconds).
    pub punch_in_duration_ms: u64,

    /// Floor for facecam shrink when repositioning (fraction of current size).
    pub facecam_scale_floor: f64,

    /// Gaussian blur sigma for the full-fit background duplicate.
    pub background_blur_sigma: f64,

    /// Darkening applied to the background duplicate (0.0 to 1.0).
    pub background_darken: f64,

    /// Title strap band height in pixels.
    pub title_strap_h_px: u32,

    /// Title strap opacity.
    pub title_strap_opacity: f64,

    /// Progress bar height in pixels.
    pub progress_bar_h_px: u32,

    /// Progress bar opacity.
    pub progress_bar_opacity: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            silence_threshold_ms: 250,
            cut_handle_ms: 120,
            min_cut_spacing_ms: 500,
            cut_cadence_max_ms: 3000,
            caption_max_lines: 2,
            caption_line_chars: 32,
            caption_snap_offset_ms: 120,
            caption_min_window_ms: 350,
            caption_font_px: 56,
            min_legible_font_px: 24,
            speed_ladder: DEFAULT_SPEED_LADDER.to_vec(),
            ramp_frames: 5,
            frame_rate: 30,
            punch_in_scale: 1.25,
            punch_in_max_scale: 1.40,
            punch_in_duration_ms: 400,
            facecam_scale_floor: 0.70,
            background_blur_sigma: 25.0,
            background_darken: 0.3,
            title_strap_h_px: 80,
            title_strap_opacity: 0.92,
            progress_bar_h_px: 12,
            progress_bar_opacity: 0.9,
        }
    }
}

impl PlanConfig {
    /// Ramp duration in milliseconds; always at least one millisecond.
    pub fn ramp_duration_ms(&self) -> u64 {
        let ms = (self.ramp_frames as f64 * 1000.0 / self.frame_rate.max(1) as f64).round() as u64;
        ms.max(1)
    }

    /// Punch-in target scale clamped to the allowed range.
    pub fn clamped_punch_in_scale(&self) -> f64 {
        self.punch_in_scale.clamp(1.15, 1.35).min(self.punch_in_max_scale)
    }

    /// Builder-style setter for the silence threshold.
    pub fn with_silence_threshold_ms(mut self, ms: u64) -> Self {
        self.silence_threshold_ms = ms;
        self
    }

    /// Builder-style setter for the cut handles.
    pub fn with_cut_handle_ms(mut self, ms: u64) -> Self {
        self.cut_handle_ms = ms;
        self
    }

    /// Builder-style setter for the speed ladder.
    pub fn with_speed_ladder(mut self, ladder: Vec<f64>) -> Self {
        self.speed_ladder = ladder;
        self
    }

    /// Builder-style setter for the declared frame rate.
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = fps.max(1);
        self
    }

    /// Builder-style setter for the punch-in target scale.
    pub fn with_punch_in_scale(mut self, scale: f64) -> Self {
        self.punch_in_scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_product_defaults() {
        let config = PlanConfig::default();
        assert_eq!(config.silence_threshold_ms, 250);
        assert_eq!(config.cut_handle_ms, 120);
        assert_eq!(config.cut_cadence_max_ms, 3000);
        assert_eq!(config.speed_ladder, vec![1.35, 1.30, 1.25, 1.15]);
    }

    #[test]
    fn test_ramp_duration_never_zero() {
        let config = PlanConfig::default().with_frame_rate(30);
        assert_eq!(config.ramp_duration_ms(), 167);

        // Even a degenerate frame count yields a positive ramp
        let config = PlanConfig { ramp_frames: 0, ..PlanConfig::default() };
        assert!(config.ramp_duration_ms() >= 1);
    }

    #[test]
    fn test_punch_in_scale_clamping() {
        let config = PlanConfig::default().with_punch_in_scale(2.0);
        assert!((config.clamped_punch_in_scale() - 1.35).abs() < f64::EPSILON);

        let config = PlanConfig::default().with_punch_in_scale(1.0);
        assert!((config.clamped_punch_in_scale() - 1.15).abs() < f64::EPSILON);
    }
}
