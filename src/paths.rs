use crate::{AssetId, ClusterId};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Deterministic on-disk layout of a library.
///
/// - sources live at `media/{cluster}/{asset}`
/// - thumbnails live at `thumbnails/{cluster}/{asset}.webp`
#[derive(Clone, Debug)]
pub struct LibraryPaths {
    root: PathBuf,
}

impl LibraryPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cluster_media_dir(&self, cluster: ClusterId) -> PathBuf {
        self.root.join("media").join(cluster.to_string())
    }

    pub fn media_path(&self, cluster: ClusterId, asset: AssetId) -> PathBuf {
        self.cluster_media_dir(cluster).join(asset.to_string())
    }

    pub fn cluster_thumbnail_dir(&self, cluster: ClusterId) -> PathBuf {
        self.root.join("thumbnails").join(cluster.to_string())
    }

    pub fn thumbnail_path(&self, cluster: ClusterId, asset: AssetId) -> PathBuf {
        self.cluster_thumbnail_dir(cluster)
            .join(format!("{asset}.webp"))
    }

    /// Whether the source file for an asset is present on disk.
    pub async fn asset_exists(&self, cluster: ClusterId, asset: AssetId) -> bool {
        fs::metadata(self.media_path(cluster, asset))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
