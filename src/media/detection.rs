// SPDX-License-Identifier: MPL-2.0

//! Classification of wallpaper sources.
//!
//! FFmpeg accepts both local paths and URIs. Local paths are checked for
//! existence and a known container extension before opening, so obvious
//! mistakes are logged with a clear message. FFmpeg still has the final say:
//! an unknown extension only produces a warning.

use std::path::Path;

use tracing::{debug, warn};

/// Container extensions that commonly hold a playable video stream.
/// Compared case-insensitively.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4",  // MPEG-4 container (typically H.264/H.265 codec)
    "webm", // WebM container (VP8/VP9/AV1)
    "mkv",  // Matroska container (any codec)
    "avi",  // AVI container (legacy format)
    "mov",  // QuickTime container (typically H.264)
    "m4v",  // MPEG-4 Video (Apple variant of MP4)
    "ogv",  // Ogg Video container (Theora codec)
    "wmv",  // Windows Media Video
    "flv",  // Flash Video
    "ts",   // MPEG transport stream
    "gif",  // Animated GIF, decoded by FFmpeg like any other stream
];

/// How a source string should be handed to FFmpeg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A `scheme://` location (http, rtsp, file, ...).
    Uri,
    /// A path on the local file system.
    Path,
}

/// Classify a source string. Windows drive letters (`C:\`) are paths.
#[must_use]
pub fn source_kind(source: &str) -> SourceKind {
    match source.split_once("://") {
        Some((scheme, _))
            if scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            SourceKind::Uri
        }
        _ => SourceKind::Path,
    }
}

/// Check if a path has a known video container extension.
#[must_use]
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Log anything suspicious about a source before FFmpeg opens it.
pub fn inspect_source(source: &str) {
    match source_kind(source) {
        SourceKind::Uri => debug!(uri = source, "Source is a URI, skipping file checks"),
        SourceKind::Path => {
            let path = Path::new(source);
            if !path.is_file() {
                warn!(path = %path.display(), "Source is not a readable file");
            } else if !is_video_file(path) {
                warn!(
                    path = %path.display(),
                    "Unrecognized video extension, letting FFmpeg probe it anyway"
                );
            }
        }
    }
}
