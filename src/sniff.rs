//! Content sniffing from a file's leading bytes.

use crate::error::MediaResult;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Enough bytes to cover every signature below, including three transport stream packets.
const HEADER_LEN: usize = 512;

const TS_PACKET_LEN: usize = 188;

/// ISO-BMFF brands that hold still images rather than video.
const IMAGE_BRANDS: &[&[u8]] = &[b"avif", b"avis", b"heic", b"heix", b"mif1", b"msf1"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl MediaKind {
    pub fn is_video(self) -> bool {
        self == MediaKind::Video
    }
}

/// A byte signature at a fixed offset.
struct Signature {
    offset: usize,
    bytes: &'static [u8],
}

const VIDEO_SIGNATURES: &[Signature] = &[
    // Matroska / WebM
    Signature { offset: 0, bytes: &[0x1A, 0x45, 0xDF, 0xA3] },
    // FLV
    Signature { offset: 0, bytes: b"FLV" },
    // MPEG program stream
    Signature { offset: 0, bytes: &[0x00, 0x00, 0x01, 0xBA] },
    // ASF / WMV
    Signature { offset: 0, bytes: &[0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11] },
    // QuickTime files without an ftyp box
    Signature { offset: 4, bytes: b"moov" },
    Signature { offset: 4, bytes: b"mdat" },
    Signature { offset: 4, bytes: b"wide" },
];

impl Signature {
    fn matches(&self, header: &[u8]) -> bool {
        header
            .get(self.offset..self.offset + self.bytes.len())
            .is_some_and(|slice| slice == self.bytes)
    }
}

/// Classifies a file from its first bytes. The file name plays no part.
pub fn detect_kind(header: &[u8]) -> MediaKind {
    if let Some(brand) = header.get(4..8).filter(|b| *b == b"ftyp").and(header.get(8..12)) {
        return if IMAGE_BRANDS.iter().any(|b| *b == brand) {
            MediaKind::Image
        } else {
            MediaKind::Video
        };
    }
    if header.starts_with(b"RIFF") && header.get(8..12) == Some(&b"AVI "[..]) {
        return MediaKind::Video;
    }
    if VIDEO_SIGNATURES.iter().any(|s| s.matches(header)) {
        return MediaKind::Video;
    }
    // Before the transport stream check: 0x47 is also the `G` of `GIF8`.
    if image::guess_format(header).is_ok() {
        return MediaKind::Image;
    }
    if is_mpeg_ts(header) {
        return MediaKind::Video;
    }
    MediaKind::Unknown
}

/// Transport streams repeat a 0x47 sync byte at the start of every packet.
fn is_mpeg_ts(header: &[u8]) -> bool {
    (0..3).all(|packet| header.get(packet * TS_PACKET_LEN) == Some(&0x47))
}

/// Reads the start of `path` and classifies it.
pub async fn sniff_file(path: &Path) -> MediaResult<MediaKind> {
    let mut file = File::open(path).await?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut header).await?;
    Ok(detect_kind(&header))
}
