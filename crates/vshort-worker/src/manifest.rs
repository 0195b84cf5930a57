//! Batch manifest: the JSON handed to the worker binary.
//!
//! One manifest describes a source recording and the clips to cut from it,
//! with the collaborator signals (transcript, regions, activity) inlined.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vshort_models::{CanvasSpec, EncodingSpec, Region, Segment, TimeSpan};
use vshort_plan::{ActivitySpan, ClipInputs, Strategy};

use crate::error::{WorkerError, WorkerResult};

/// A batch of clips from one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifest {
    /// Source recording path.
    pub source: PathBuf,
    /// Directory for rendered outputs.
    pub output_dir: PathBuf,
    /// Strategy for the whole batch.
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    /// Target canvas; defaults to 1080x1920.
    #[serde(default)]
    pub canvas: CanvasSpec,
    /// Encoding settings; defaults to the standard short-form profile.
    #[serde(default)]
    pub encoding: EncodingSpec,
    /// The clips to produce.
    pub clips: Vec<ClipManifest>,
}

fn default_strategy() -> Strategy {
    Strategy::Basic
}

/// One clip's inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipManifest {
    pub span: TimeSpan,
    pub title: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub activity: Vec<ActivitySpan>,
}

impl BatchManifest {
    /// Load and parse a manifest file.
    pub fn load(path: impl AsRef<Path>) -> WorkerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let manifest: BatchManifest = serde_json::from_str(&text)
            .map_err(|e| WorkerError::ConfigError(format!("invalid manifest: {e}")))?;
        if manifest.clips.is_empty() {
            return Err(WorkerError::ConfigError(
                "manifest has no clips".to_string(),
            ));
        }
        Ok(manifest)
    }

    /// Output path for a clip by index.
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("clip_{:02}.mp4", index + 1))
    }

    /// Convert one clip entry into planner inputs.
    pub fn clip_inputs(&self, clip: &ClipManifest, source_w: u32, source_h: u32) -> ClipInputs {
        ClipInputs {
            clip: clip.span,
            title: clip.title.clone(),
            segments: clip.segments.clone(),
            regions: clip.regions.clone(),
            activity: clip.activity.clone(),
            source_w,
            source_h,
            canvas: self.canvas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parses_with_defaults() {
        let json = r#"{
            "source": "/in/rec.mp4",
            "output_dir": "/out",
            "clips": [
                {
                    "span": {"start_ms": 0, "end_ms": 30000},
                    "title": "Intro",
                    "segments": [
                        {"span": {"start_ms": 0, "end_ms": 2000}, "text": "hello", "confidence": 0.9}
                    ]
                }
            ]
        }"#;
        let manifest: BatchManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.strategy, Strategy::Basic);
        assert_eq!(manifest.canvas, CanvasSpec::default());
        assert_eq!(manifest.clips.len(), 1);
        assert_eq!(manifest.output_path(0), PathBuf::from("/out/clip_01.mp4"));
    }

    #[test]
    fn test_empty_clips_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        std::fs::write(&path, r#"{"source": "/in.mp4", "output_dir": "/out", "clips": []}"#)
            .unwrap();
        assert!(matches!(
            BatchManifest::load(&path),
            Err(WorkerError::ConfigError(_))
        ));
    }
}
