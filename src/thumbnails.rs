use crate::cache::{DerivativeCache, DerivativeKind};
use crate::error::{MediaError, MediaResult};
use crate::paths::LibraryPaths;
use crate::sniff::sniff_file;
use crate::tool::{MediaTool, TranscodeRequest};
use crate::{AssetId, ClusterId};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const THUMBNAIL_CONTENT_TYPE: &str = "image/webp";

/// Generated bytes plus the content type to serve them with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivative {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Where a thumbnail came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThumbnailSource {
    Cache,
    Generated,
}

/// Serves cached WEBP thumbnails and generates them on a miss.
pub struct ThumbnailGenerator<T> {
    paths: LibraryPaths,
    cache: DerivativeCache,
    tool: Arc<T>,
    box_size: u32,
    video_seek_seconds: f64,
}

impl<T: MediaTool> ThumbnailGenerator<T> {
    pub fn new(
        paths: LibraryPaths,
        tool: Arc<T>,
        box_size: u32,
        video_seek_seconds: f64,
    ) -> Self {
        Self {
            cache: DerivativeCache::new(paths.clone()),
            paths,
            tool,
            box_size,
            video_seek_seconds,
        }
    }

    pub async fn thumbnail(&self, cluster: ClusterId, asset: AssetId) -> MediaResult<Derivative> {
        self.thumbnail_with_source(cluster, asset)
            .await
            .map(|(derivative, _)| derivative)
    }

    /// Like [`Self::thumbnail`], also reporting whether the cache answered.
    ///
    /// A transcode failure is returned immediately; calling again repeats the whole lookup.
    pub async fn thumbnail_with_source(
        &self,
        cluster: ClusterId,
        asset: AssetId,
    ) -> MediaResult<(Derivative, ThumbnailSource)> {
        match self.cache.get(cluster, asset, DerivativeKind::Thumbnail).await {
            Ok(Some(bytes)) => {
                debug!(cluster, asset, "thumbnail cache hit");
                return Ok((webp(bytes), ThumbnailSource::Cache));
            }
            Ok(None) => debug!(cluster, asset, "thumbnail cache miss"),
            Err(e) => warn!(cluster, asset, error = %e, "thumbnail cache unreadable, regenerating"),
        }

        if !self.paths.asset_exists(cluster, asset).await {
            return Err(MediaError::NotFound { cluster, asset });
        }
        let source = self.paths.media_path(cluster, asset);

        let kind = sniff_file(&source).await?;
        let request = TranscodeRequest::thumbnail(kind, self.box_size, self.video_seek_seconds);
        let bytes = self.tool.transcode(&source, &request).await?;
        if bytes.is_empty() {
            return Err(MediaError::transcode_failed("transcode produced no output", None, None));
        }
        info!(cluster, asset, ?kind, size_bytes = bytes.len(), "thumbnail generated");

        if let Err(e) = self
            .cache
            .put(cluster, asset, DerivativeKind::Thumbnail, &bytes)
            .await
        {
            warn!(cluster, asset, error = %e, "failed to persist thumbnail");
        }

        Ok((webp(bytes), ThumbnailSource::Generated))
    }
}

fn webp(bytes: Vec<u8>) -> Derivative {
    Derivative {
        bytes,
        content_type: THUMBNAIL_CONTENT_TYPE,
    }
}
