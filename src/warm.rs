//! Batch pre-generation of a cluster's thumbnails.

use crate::error::MediaError;
use crate::groups::GroupStore;
use crate::library::MediaLibrary;
use crate::thumbnails::ThumbnailSource;
use crate::tool::MediaTool;
use crate::{AssetId, ClusterId};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{info, warn};
use walkdir::WalkDir;

const RETRY_INTERVAL_MS: u64 = 500;
const RETRIES: usize = 2;

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct WarmSummary {
    pub generated: usize,
    pub cached: usize,
    pub failed: Vec<AssetId>,
}

/// Asset ids present under `media/{cluster}`, ascending.
///
/// Only names that are exactly an id's decimal form count; `007` or `+5` are not
/// the path any id maps to, so they are skipped.
pub fn cluster_assets<T: MediaTool, S: GroupStore>(
    library: &MediaLibrary<T, S>,
    cluster: ClusterId,
) -> Vec<AssetId> {
    let mut assets: Vec<AssetId> = WalkDir::new(library.paths().cluster_media_dir(cluster))
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| parse_asset_name(e.file_name().to_str()?))
        .collect();
    assets.sort_unstable();
    assets
}

fn parse_asset_name(name: &str) -> Option<AssetId> {
    let id: AssetId = name.parse().ok()?;
    (id.to_string() == name).then_some(id)
}

/// Makes sure every asset in a cluster has a cached thumbnail.
///
/// Transcode failures are retried a couple of times; anything else fails the asset at once.
pub async fn warm_cluster<T: MediaTool, S: GroupStore>(
    library: &MediaLibrary<T, S>,
    cluster: ClusterId,
    concurrency: usize,
) -> WarmSummary {
    let assets = cluster_assets(library, cluster);
    info!(cluster, assets = assets.len(), "warming thumbnail cache");

    let results: Vec<_> = stream::iter(assets)
        .map(|asset| async move {
            let strategy = FixedInterval::from_millis(RETRY_INTERVAL_MS).take(RETRIES);
            let result = RetryIf::spawn(
                strategy,
                || library.thumbnail_with_source(cluster, asset),
                |e: &MediaError| matches!(e, MediaError::TranscodeFailed { .. }),
            )
            .await;
            (asset, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = WarmSummary::default();
    for (asset, result) in results {
        match result {
            Ok((_, ThumbnailSource::Cache)) => summary.cached += 1,
            Ok((_, ThumbnailSource::Generated)) => summary.generated += 1,
            Err(e) => {
                warn!(cluster, asset, error = %e, "failed to warm thumbnail");
                summary.failed.push(asset);
            }
        }
    }
    summary.failed.sort_unstable();
    summary
}
