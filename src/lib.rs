//! # Stash media derivatives
//!
//! Serves browser-ready derivatives of a clustered media stash and the group tree
//! used to organize it.
//!
//! - **Thumbnails**: a single WEBP frame covering a 650x650 box, generated with FFmpeg on
//!   the first request and cached at `thumbnails/{cluster}/{asset}.webp`. Videos are
//!   sampled 7 seconds in.
//! - **Placeholders**: a one-rectangle SVG with the asset's aspect ratio, computed from
//!   FFprobe metadata on every request.
//! - **Group trees**: a cluster's groups materialized into a nested tree, preceded by the
//!   virtual Unsorted, Trash and Everything groups.
//!
//! Sources are read from `media/{cluster}/{asset}` under the library root.
//!
//! ## Requirements
//!
//! - **FFmpeg** and **FFprobe** must be installed and accessible in the system's `PATH`
//!   (or configured through [`LibraryOptions`]).
//!
//! ## Example
//!
//! ```no_run
//! use stash_media::{FfmpegTool, LibraryOptions, MediaLibrary, MemoryGroupStore};
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let options = LibraryOptions::default();
//!     let library = MediaLibrary::new(
//!         &options,
//!         FfmpegTool::from_options(&options),
//!         MemoryGroupStore::new(),
//!     );
//!
//!     let thumb = library.get_thumbnail(1, 42).await?;
//!     println!("{} bytes of {}", thumb.bytes.len(), thumb.content_type);
//!     Ok(())
//! }
//! ```

// On-disk store for generated thumbnails, written atomically.
mod cache;
// Library options: root directory, tool paths and timeouts.
mod config;
// The crate-wide error type and its status code mapping.
mod error;
// Module for running the `ffmpeg` command-line tool.
mod ffmpeg;
// Module for interacting with the `ffprobe` command-line tool.
mod ffprobe;
// Aspect-preserving scaling into a bounding box.
mod geometry;
// Group rows, stores and the virtual-group tree builder.
mod groups;
// The facade tying paths, cache and generators together.
mod library;
// Layout of the `media/` and `thumbnails/` directories.
mod paths;
// SVG placeholders with an asset's aspect ratio.
mod placeholder;
// Magic-byte detection of images and videos.
mod sniff;
// The core module for generating thumbnails.
mod thumbnails;
// The seam between the library and the external media tools.
mod tool;
// Batch pre-generation of a cluster's thumbnails.
mod warm;

pub type ClusterId = u32;
pub type AssetId = u64;
/// Group ids; the virtual groups use negative ids.
pub type GroupId = i64;

// Re-export the library facade, its options and the building blocks behind it.
pub use cache::{DerivativeCache, DerivativeKind};
pub use config::LibraryOptions;
pub use error::{MediaError, MediaResult};
pub use ffprobe::{StreamInfo, first_visual_stream};
pub use geometry::{Size, scale};
pub use groups::{
    GroupNode, GroupRow, GroupStore, GroupTreeResolver, MemoryGroupStore, VirtualGroup,
    build_forest,
};
pub use library::MediaLibrary;
pub use paths::LibraryPaths;
pub use placeholder::{PLACEHOLDER_CONTENT_TYPE, PlaceholderGenerator, render_svg};
pub use sniff::{MediaKind, detect_kind, sniff_file};
pub use thumbnails::{Derivative, THUMBNAIL_CONTENT_TYPE, ThumbnailGenerator, ThumbnailSource};
pub use tool::{FfmpegTool, MediaTool, TranscodeRequest};
pub use warm::{WarmSummary, cluster_assets, warm_cluster};
