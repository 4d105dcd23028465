//! The external multimedia tool behind probing and transcoding.

use crate::config::LibraryOptions;
use crate::error::{MediaError, MediaResult};
use crate::ffmpeg::{run_ffmpeg, run_ffprobe};
use crate::ffprobe::{StreamInfo, parse_streams, probe_args};
use crate::sniff::MediaKind;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// A single-frame WEBP derivation of a source file.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscodeRequest {
    /// Side of the box the frame is scaled to cover.
    pub box_size: u32,
    /// Seek offset in seconds, applied before sampling. Only set for video sources.
    pub seek_seconds: Option<f64>,
}

impl TranscodeRequest {
    /// The thumbnail derivation for a source of the given kind.
    pub fn thumbnail(kind: MediaKind, box_size: u32, video_seek_seconds: f64) -> Self {
        Self {
            box_size,
            seek_seconds: kind.is_video().then_some(video_seek_seconds),
        }
    }

    pub fn scale_filter(&self) -> String {
        let s = self.box_size;
        format!("scale=w={s}:h={s}:force_original_aspect_ratio=increase")
    }

    /// ffmpeg arguments that write one encoded frame to stdout.
    pub fn ffmpeg_args(&self, input: &Path) -> Vec<String> {
        let mut args = vec!["-v".to_string(), "error".to_string()];
        if let Some(seek) = self.seek_seconds {
            args.extend(["-ss".to_string(), seek.to_string()]);
        }
        args.extend([
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            self.scale_filter(),
            "-vframes".to_string(),
            "1".to_string(),
            "-f".to_string(),
            "image2".to_string(),
            "-vcodec".to_string(),
            "libwebp".to_string(),
            "pipe:1".to_string(),
        ]);
        args
    }
}

/// Probing and transcoding capability. Swapped for a fake in tests.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Full structured metadata document for `path`.
    async fn inspect(&self, path: &Path) -> MediaResult<Value>;

    /// Encodes `path` according to `request` and returns the encoded bytes.
    async fn transcode(&self, path: &Path, request: &TranscodeRequest) -> MediaResult<Vec<u8>>;

    /// Stream descriptors of `path`, in the order the tool reports them.
    async fn probe(&self, path: &Path) -> MediaResult<Vec<StreamInfo>> {
        let document = self.inspect(path).await?;
        parse_streams(&document)
    }
}

/// `MediaTool` backed by the ffmpeg and ffprobe binaries.
#[derive(Clone, Debug)]
pub struct FfmpegTool {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout,
        }
    }

    pub fn from_options(options: &LibraryOptions) -> Self {
        Self::new(
            options.ffmpeg_path.clone(),
            options.ffprobe_path.clone(),
            options.tool_timeout(),
        )
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    async fn inspect(&self, path: &Path) -> MediaResult<Value> {
        let args = probe_args(&path.to_string_lossy());
        let stdout = run_ffprobe(&self.ffprobe, &args, self.timeout).await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| MediaError::probe_failed(format!("unparseable ffprobe output: {e}"), None))
    }

    async fn transcode(&self, path: &Path, request: &TranscodeRequest) -> MediaResult<Vec<u8>> {
        run_ffmpeg(&self.ffmpeg, &request.ffmpeg_args(path), self.timeout).await
    }
}
