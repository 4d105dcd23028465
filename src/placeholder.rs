//! Placeholder silhouettes shown while a thumbnail loads.

use crate::error::{MediaError, MediaResult};
use crate::ffprobe::first_visual_stream;
use crate::geometry::{Size, scale};
use crate::paths::LibraryPaths;
use crate::thumbnails::Derivative;
use crate::tool::MediaTool;
use crate::{AssetId, ClusterId};
use std::sync::Arc;
use tracing::debug;

pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/svg+xml";

/// An SVG holding one rectangle with the given size.
pub fn render_svg(size: Size) -> String {
    let Size { width, height } = size;
    format!(
        r#"<svg viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg"><rect width="{width}" height="{height}" x="0" y="0"/></svg>"#
    )
}

pub struct PlaceholderGenerator<T> {
    paths: LibraryPaths,
    tool: Arc<T>,
    max_dimension: f64,
}

impl<T: MediaTool> PlaceholderGenerator<T> {
    pub fn new(paths: LibraryPaths, tool: Arc<T>, max_dimension: u32) -> Self {
        Self {
            paths,
            tool,
            max_dimension: f64::from(max_dimension),
        }
    }

    /// Probes the asset and renders a silhouette with its aspect ratio. Never cached.
    pub async fn placeholder(&self, cluster: ClusterId, asset: AssetId) -> MediaResult<Derivative> {
        if !self.paths.asset_exists(cluster, asset).await {
            return Err(MediaError::NotFound { cluster, asset });
        }
        let streams = self
            .tool
            .probe(&self.paths.media_path(cluster, asset))
            .await?;
        let source = first_visual_stream(&streams)?;
        let size = scale(source.width, source.height, self.max_dimension)?;
        debug!(cluster, asset, width = size.width, height = size.height, "placeholder rendered");

        Ok(Derivative {
            bytes: render_svg(size).into_bytes(),
            content_type: PLACEHOLDER_CONTENT_TYPE,
        })
    }
}
