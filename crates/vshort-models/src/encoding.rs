//! Fixed output encoding specs.
//!
//! These are pass-through constants handed to the media engine; the planning
//! core never computes them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264).
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset.
pub const DEFAULT_PRESET: &str = "fast";
/// Default video bitrate.
pub const DEFAULT_VIDEO_BITRATE: &str = "5M";
/// Default audio bitrate.
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";
/// Default audio sample rate in Hz.
pub const DEFAULT_AUDIO_SAMPLE_RATE: u32 = 48_000;
/// Default output frame rate.
pub const DEFAULT_FRAME_RATE: u32 = 30;
/// Default pixel format.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Loudness normalization target in LUFS.
pub const DEFAULT_LOUDNESS_TARGET_LUFS: f64 = -14.0;
/// True-peak limit in dB for loudness normalization.
pub const DEFAULT_LOUDNESS_PEAK_DB: f64 = -1.0;

/// Output encoding specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingSpec {
    /// Video codec (e.g. "libx264").
    pub video_codec: String,
    /// Audio codec (e.g. "aac").
    pub audio_codec: String,
    /// Encoder preset.
    pub preset: String,
    /// Video bitrate (FFmpeg syntax, e.g. "5M").
    pub video_bitrate: String,
    /// Audio bitrate (e.g. "192k").
    pub audio_bitrate: String,
    /// Audio sample rate in Hz.
    pub audio_sample_rate: u32,
    /// Output frame rate.
    pub frame_rate: u32,
    /// Pixel format.
    pub pixel_format: String,
    /// Loudness normalization target in LUFS.
    pub loudness_target_lufs: f64,
    /// True-peak limit in dB.
    pub loudness_peak_db: f64,
    /// Move the moov atom up front for mobile streaming.
    pub faststart: bool,
}

impl Default for EncodingSpec {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            video_bitrate: DEFAULT_VIDEO_BITRATE.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            audio_sample_rate: DEFAULT_AUDIO_SAMPLE_RATE,
            frame_rate: DEFAULT_FRAME_RATE,
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            loudness_target_lufs: DEFAULT_LOUDNESS_TARGET_LUFS,
            loudness_peak_db: DEFAULT_LOUDNESS_PEAK_DB,
            faststart: true,
        }
    }
}

impl EncodingSpec {
    /// Duration of one output frame in milliseconds.
    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.frame_rate as f64
    }
}
