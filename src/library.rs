use crate::config::LibraryOptions;
use crate::error::{MediaError, MediaResult};
use crate::groups::{GroupNode, GroupStore, GroupTreeResolver};
use crate::paths::LibraryPaths;
use crate::placeholder::PlaceholderGenerator;
use crate::thumbnails::{Derivative, ThumbnailGenerator, ThumbnailSource};
use crate::tool::MediaTool;
use crate::{AssetId, ClusterId};
use serde_json::Value;
use std::sync::Arc;

/// Entry point for everything served about a library: derivatives, media info and group trees.
pub struct MediaLibrary<T, S> {
    paths: LibraryPaths,
    tool: Arc<T>,
    thumbnails: ThumbnailGenerator<T>,
    placeholders: PlaceholderGenerator<T>,
    groups: GroupTreeResolver<S>,
}

impl<T: MediaTool, S: GroupStore> MediaLibrary<T, S> {
    pub fn new(options: &LibraryOptions, tool: T, store: S) -> Self {
        let paths = LibraryPaths::new(&options.root);
        let tool = Arc::new(tool);
        Self {
            thumbnails: ThumbnailGenerator::new(
                paths.clone(),
                tool.clone(),
                options.max_dimension,
                options.video_seek_seconds,
            ),
            placeholders: PlaceholderGenerator::new(
                paths.clone(),
                tool.clone(),
                options.max_dimension,
            ),
            groups: GroupTreeResolver::new(Arc::new(store)),
            paths,
            tool,
        }
    }

    pub fn paths(&self) -> &LibraryPaths {
        &self.paths
    }

    /// WEBP thumbnail, served from the cache when present.
    pub async fn get_thumbnail(&self, cluster: ClusterId, asset: AssetId) -> MediaResult<Derivative> {
        self.thumbnails.thumbnail(cluster, asset).await
    }

    pub(crate) async fn thumbnail_with_source(
        &self,
        cluster: ClusterId,
        asset: AssetId,
    ) -> MediaResult<(Derivative, ThumbnailSource)> {
        self.thumbnails.thumbnail_with_source(cluster, asset).await
    }

    /// SVG silhouette with the asset's aspect ratio.
    pub async fn get_placeholder(
        &self,
        cluster: ClusterId,
        asset: AssetId,
    ) -> MediaResult<Derivative> {
        self.placeholders.placeholder(cluster, asset).await
    }

    pub async fn get_group_tree(&self, cluster: ClusterId) -> MediaResult<Vec<GroupNode>> {
        self.groups.resolve(cluster).await
    }

    /// Raw inspection document for an asset, as reported by the media tool.
    pub async fn get_media_info(&self, cluster: ClusterId, asset: AssetId) -> MediaResult<Value> {
        if !self.paths.asset_exists(cluster, asset).await {
            return Err(MediaError::NotFound { cluster, asset });
        }
        self.tool
            .inspect(&self.paths.media_path(cluster, asset))
            .await
    }
}
