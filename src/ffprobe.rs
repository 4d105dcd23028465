//! Stream metadata from ffprobe's JSON output.

use crate::error::{MediaError, MediaResult};
use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stream as reported by ffprobe. Audio and data streams carry no geometry.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamInfo {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<StreamInfo>,
}

/// Arguments that make ffprobe print streams and container format as JSON.
pub fn probe_args(path: &str) -> Vec<String> {
    [
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
        path,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Extracts the stream list from a parsed ffprobe document.
pub fn parse_streams(document: &Value) -> MediaResult<Vec<StreamInfo>> {
    let parsed = ProbeOutput::deserialize(document)
        .map_err(|e| MediaError::probe_failed(format!("unparseable ffprobe output: {e}"), None))?;
    Ok(parsed.streams)
}

/// First stream exposing both width and height, in reported order.
pub fn first_visual_stream(streams: &[StreamInfo]) -> MediaResult<Size> {
    streams
        .iter()
        .find_map(|s| match (s.width, s.height) {
            (Some(width), Some(height)) => Some(Size { width, height }),
            _ => None,
        })
        .ok_or(MediaError::NoVisualStream)
}
