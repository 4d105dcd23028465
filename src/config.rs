use crate::error::MediaResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a media library rooted at a directory holding `media/` and `thumbnails/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryOptions {
    /// Directory containing `media/{cluster}/{asset}` and `thumbnails/{cluster}/{asset}.webp`.
    pub root: PathBuf,
    /// Longest side of thumbnails and placeholders, in pixels.
    pub max_dimension: u32,
    /// Offset into a video at which the thumbnail frame is sampled.
    pub video_seek_seconds: f64,
    /// Upper bound on a single ffmpeg/ffprobe invocation.
    pub tool_timeout_secs: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            max_dimension: 650,
            video_seek_seconds: 7.0,
            tool_timeout_secs: 30,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl LibraryOptions {
    /// Reads options from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> MediaResult<Self> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}
