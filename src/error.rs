//! Error types for derivative generation and group resolution.

use std::path::PathBuf;
use thiserror::Error;

use crate::{AssetId, ClusterId, GroupId};

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while serving derivatives or resolving groups.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("asset {cluster}/{asset} not found")]
    NotFound { cluster: ClusterId, asset: AssetId },

    #[error("probe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("no stream exposes both width and height")]
    NoVisualStream,

    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("transcode failed: {message}")]
    TranscodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("failed to write cache entry {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("group {0} does not exist")]
    UnknownGroup(GroupId),

    #[error("cannot move group {group} under {parent}: it would become its own ancestor")]
    GroupCycle { group: GroupId, parent: GroupId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create a transcode failure error.
    pub fn transcode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::TranscodeFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// HTTP-equivalent status for this error kind.
    ///
    /// Missing assets and groups map to 404, every failure to derive something
    /// from an existing asset maps to 422, and everything else is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::UnknownGroup(_) => 404,
            Self::ProbeFailed { .. }
            | Self::NoVisualStream
            | Self::InvalidDimensions { .. }
            | Self::TranscodeFailed { .. }
            | Self::GroupCycle { .. } => 422,
            Self::CacheWrite { .. } | Self::Io(_) | Self::JsonParse(_) => 500,
        }
    }
}
