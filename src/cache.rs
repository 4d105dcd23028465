//! Filesystem-backed store for generated derivatives.

use crate::error::{MediaError, MediaResult};
use crate::paths::LibraryPaths;
use crate::{AssetId, ClusterId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::debug;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivativeKind {
    Thumbnail,
    /// Recomputed on every request, never stored.
    Placeholder,
}

#[derive(Clone, Debug)]
pub struct DerivativeCache {
    paths: LibraryPaths,
}

impl DerivativeCache {
    pub fn new(paths: LibraryPaths) -> Self {
        Self { paths }
    }

    /// Where an entry lives on disk, if the kind is persisted at all.
    pub fn entry_path(
        &self,
        cluster: ClusterId,
        asset: AssetId,
        kind: DerivativeKind,
    ) -> Option<PathBuf> {
        match kind {
            DerivativeKind::Thumbnail => Some(self.paths.thumbnail_path(cluster, asset)),
            DerivativeKind::Placeholder => None,
        }
    }

    /// Returns the cached bytes, or `None` on a miss.
    pub async fn get(
        &self,
        cluster: ClusterId,
        asset: AssetId,
        kind: DerivativeKind,
    ) -> MediaResult<Option<Vec<u8>>> {
        let Some(path) = self.entry_path(cluster, asset, kind) else {
            return Ok(None);
        };
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stores `bytes` for the key.
    ///
    /// The entry is written to a sibling temp file and renamed into place, so readers
    /// only ever see complete files. Concurrent writers for one key are last-writer-wins.
    pub async fn put(
        &self,
        cluster: ClusterId,
        asset: AssetId,
        kind: DerivativeKind,
        bytes: &[u8],
    ) -> MediaResult<()> {
        let Some(path) = self.entry_path(cluster, asset, kind) else {
            return Ok(());
        };
        write_atomic(&path, bytes)
            .await
            .map_err(|source| MediaError::CacheWrite { path, source })
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = TempFile::new(temp_sibling(path));

    fs::write(tmp.path(), bytes).await?;
    fs::rename(tmp.path(), path).await?;
    tmp.persisted();

    debug!(path = %path.display(), size_bytes = bytes.len(), "cache entry written");
    Ok(())
}

/// Removes the temp file when dropped, unless it was renamed into place.
///
/// Covers both write errors and a caller dropping the future between write and rename.
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persisted(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// A temp name next to `path`, unique within this process.
fn temp_sibling(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{n}.tmp", std::process::id()));
    path.with_file_name(name)
}
