use async_trait::async_trait;
use serde_json::{Value, json};
use stash_media::{
    LibraryOptions, MediaError, MediaLibrary, MediaResult, MediaTool, MemoryGroupStore,
    TranscodeRequest, warm_cluster,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use temp_dir::TempDir;

const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
const MP4_HEADER: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom";

/// Canned probe documents and transcode output, with call bookkeeping.
struct FakeTool {
    probe: Value,
    output: Vec<u8>,
    transcodes: AtomicUsize,
    requests: Mutex<Vec<TranscodeRequest>>,
}

impl FakeTool {
    fn new(probe: Value, output: &[u8]) -> Self {
        Self {
            probe,
            output: output.to_vec(),
            transcodes: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn landscape() -> Self {
        Self::new(
            json!({"streams": [
                {"index": 0, "codec_type": "audio"},
                {"index": 1, "codec_type": "video", "width": 1920, "height": 1080}
            ]}),
            b"RIFF\x10\x00\x00\x00WEBPVP8 fake",
        )
    }
}

#[async_trait]
impl MediaTool for FakeTool {
    async fn inspect(&self, _path: &Path) -> MediaResult<Value> {
        Ok(self.probe.clone())
    }

    async fn transcode(&self, _path: &Path, request: &TranscodeRequest) -> MediaResult<Vec<u8>> {
        self.transcodes.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.output.is_empty() {
            return Err(MediaError::transcode_failed("fake transcode failed", None, Some(1)));
        }
        Ok(self.output.clone())
    }
}

/// Shares one fake between the library and the test body.
struct SharedTool(std::sync::Arc<FakeTool>);

#[async_trait]
impl MediaTool for SharedTool {
    async fn inspect(&self, path: &Path) -> MediaResult<Value> {
        self.0.inspect(path).await
    }

    async fn transcode(&self, path: &Path, request: &TranscodeRequest) -> MediaResult<Vec<u8>> {
        self.0.transcode(path, request).await
    }
}

fn library_with(
    dir: &TempDir,
    tool: FakeTool,
) -> (MediaLibrary<SharedTool, MemoryGroupStore>, std::sync::Arc<FakeTool>) {
    let options = LibraryOptions {
        root: dir.path().to_path_buf(),
        ..LibraryOptions::default()
    };
    let tool = std::sync::Arc::new(tool);
    let library = MediaLibrary::new(&options, SharedTool(tool.clone()), MemoryGroupStore::new());
    (library, tool)
}

fn add_asset(dir: &TempDir, cluster: u32, asset: u64, content: &[u8]) -> PathBuf {
    let path = dir.path().join(format!("media/{cluster}/{asset}"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_thumbnail_is_cached_after_first_request() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 1, 7, JPEG_HEADER);
    let (library, tool) = library_with(&dir, FakeTool::landscape());

    let first = library.get_thumbnail(1, 7).await?;
    let cache_file = dir.path().join("thumbnails/1/7.webp");
    let written_at = std::fs::metadata(&cache_file)?.modified()?;

    let second = library.get_thumbnail(1, 7).await?;
    assert_eq!(first, second);
    assert_eq!(second.content_type, "image/webp");
    assert_eq!(tool.transcodes.load(Ordering::SeqCst), 1);
    assert_eq!(std::fs::metadata(&cache_file)?.modified()?, written_at);
    assert_eq!(std::fs::read(&cache_file)?, first.bytes);
    Ok(())
}

#[tokio::test]
async fn test_video_is_sampled_after_seek() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 2, 1, MP4_HEADER);
    add_asset(&dir, 2, 2, JPEG_HEADER);
    let (library, tool) = library_with(&dir, FakeTool::landscape());

    library.get_thumbnail(2, 1).await?;
    library.get_thumbnail(2, 2).await?;

    let requests = tool.requests.lock().unwrap().clone();
    assert_eq!(requests[0].seek_seconds, Some(7.0));
    assert_eq!(requests[1].seek_seconds, None);
    assert!(requests.iter().all(|r| r.box_size == 650));
    Ok(())
}

#[tokio::test]
async fn test_missing_asset_is_not_found_everywhere() -> MediaResult<()> {
    let dir = TempDir::new()?;
    let (library, tool) = library_with(&dir, FakeTool::landscape());

    assert!(matches!(
        library.get_thumbnail(3, 99).await,
        Err(MediaError::NotFound { cluster: 3, asset: 99 })
    ));
    assert!(matches!(
        library.get_placeholder(3, 99).await,
        Err(MediaError::NotFound { .. })
    ));
    assert!(matches!(
        library.get_media_info(3, 99).await,
        Err(MediaError::NotFound { .. })
    ));
    assert_eq!(tool.transcodes.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("thumbnails").exists());
    Ok(())
}

#[tokio::test]
async fn test_transcode_failure_is_surfaced_and_not_cached() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 1, 1, JPEG_HEADER);
    let (library, tool) = library_with(&dir, FakeTool::new(json!({"streams": []}), b""));

    assert!(matches!(
        library.get_thumbnail(1, 1).await,
        Err(MediaError::TranscodeFailed { .. })
    ));
    assert!(matches!(
        library.get_thumbnail(1, 1).await,
        Err(MediaError::TranscodeFailed { .. })
    ));
    assert_eq!(tool.transcodes.load(Ordering::SeqCst), 2);
    assert!(!dir.path().join("thumbnails/1/1.webp").exists());
    Ok(())
}

#[tokio::test]
async fn test_cache_write_failure_still_serves_bytes() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 1, 4, JPEG_HEADER);
    std::fs::write(dir.path().join("thumbnails"), b"in the way")?;
    let (library, tool) = library_with(&dir, FakeTool::landscape());

    let first = library.get_thumbnail(1, 4).await?;
    assert_eq!(first.bytes, tool.output);
    library.get_thumbnail(1, 4).await?;
    assert_eq!(tool.transcodes.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_placeholder_matches_aspect_ratio() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 1, 2, MP4_HEADER);
    let (library, _) = library_with(&dir, FakeTool::landscape());

    let placeholder = library.get_placeholder(1, 2).await?;
    assert_eq!(placeholder.content_type, "image/svg+xml");
    let svg = String::from_utf8(placeholder.bytes).unwrap();
    assert!(svg.starts_with(r#"<svg viewBox="0 0 650 365.625" xmlns="http://www.w3.org/2000/svg">"#));
    assert!(svg.contains(r#"<rect width="650" height="365.625" x="0" y="0"/>"#));
    assert!(!dir.path().join("thumbnails").exists());
    Ok(())
}

#[tokio::test]
async fn test_audio_only_placeholder_has_no_visual_stream() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 1, 3, b"ID3\x04\x00");
    let tool = FakeTool::new(
        json!({"streams": [{"codec_type": "audio"}, {"codec_type": "audio"}]}),
        b"unused",
    );
    let (library, _) = library_with(&dir, tool);

    assert!(matches!(
        library.get_placeholder(1, 3).await,
        Err(MediaError::NoVisualStream)
    ));
    Ok(())
}

#[tokio::test]
async fn test_degenerate_probe_is_invalid_dimensions() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 1, 5, JPEG_HEADER);
    let tool = FakeTool::new(
        json!({"streams": [{"codec_type": "video", "width": 0, "height": 480}]}),
        b"unused",
    );
    let (library, _) = library_with(&dir, tool);

    assert!(matches!(
        library.get_placeholder(1, 5).await,
        Err(MediaError::InvalidDimensions { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_media_info_is_raw_probe_document() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 6, 1, JPEG_HEADER);
    let (library, tool) = library_with(&dir, FakeTool::landscape());

    assert_eq!(library.get_media_info(6, 1).await?, tool.probe);
    Ok(())
}

#[tokio::test]
async fn test_warm_cluster_counts_assets() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 4, 1, JPEG_HEADER);
    add_asset(&dir, 4, 2, MP4_HEADER);
    add_asset(&dir, 4, 3, JPEG_HEADER);
    add_asset(&dir, 4, 0, JPEG_HEADER);
    std::fs::write(dir.path().join("media/4/notes.txt"), b"skip me")?;
    let (library, tool) = library_with(&dir, FakeTool::landscape());

    library.get_thumbnail(4, 1).await?;
    let summary = warm_cluster(&library, 4, 2).await;
    assert_eq!(summary.cached, 1);
    assert_eq!(summary.generated, 3);
    assert!(summary.failed.is_empty());
    assert_eq!(tool.transcodes.load(Ordering::SeqCst), 4);
    Ok(())
}

#[tokio::test]
async fn test_warm_cluster_retries_transcode_failures() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 5, 10, JPEG_HEADER);
    let (library, tool) = library_with(&dir, FakeTool::new(json!({"streams": []}), b""));

    let summary = warm_cluster(&library, 5, 1).await;
    assert_eq!(summary.failed, vec![10]);
    assert_eq!(tool.transcodes.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn test_warm_cluster_skips_noncanonical_names() -> MediaResult<()> {
    let dir = TempDir::new()?;
    add_asset(&dir, 1, 7, JPEG_HEADER);
    std::fs::write(dir.path().join("media/1/007"), JPEG_HEADER)?;
    std::fs::write(dir.path().join("media/1/+5"), JPEG_HEADER)?;
    let (library, tool) = library_with(&dir, FakeTool::landscape());

    let summary = warm_cluster(&library, 1, 2).await;
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.cached, 0);
    assert!(summary.failed.is_empty());
    assert_eq!(tool.transcodes.load(Ordering::SeqCst), 1);
    Ok(())
}
