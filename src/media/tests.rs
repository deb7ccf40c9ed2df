// SPDX-License-Identifier: MPL-2.0

//! Unit tests for source detection and frame layout checks.

use std::path::Path;

use super::detection::{SourceKind, is_video_file, source_kind};
use super::{check_buffer_size, select_video_stream};
use crate::error::WallpaperError;

#[test]
fn test_is_video_file() {
    assert!(is_video_file(Path::new("test.mp4")));
    assert!(is_video_file(Path::new("test.MP4")));
    assert!(is_video_file(Path::new("test.webm")));
    assert!(is_video_file(Path::new("test.mkv")));
    assert!(is_video_file(Path::new("test.m4v")));
    assert!(is_video_file(Path::new("test.mov")));
    assert!(is_video_file(Path::new("test.wmv")));
    assert!(is_video_file(Path::new("C:\\Users\\me\\Videos\\loop.Mp4")));
    assert!(!is_video_file(Path::new("test.png")));
    assert!(!is_video_file(Path::new("test.jpg")));
    assert!(!is_video_file(Path::new("test.mp3")));
}

#[test]
fn test_edge_cases() {
    // No extension
    assert!(!is_video_file(Path::new("test")));
    assert!(!is_video_file(Path::new("/path/to/file")));

    // Hidden files and multiple dots
    assert!(is_video_file(Path::new(".hidden.mp4")));
    assert!(is_video_file(Path::new("my.video.file.webm")));
    assert!(is_video_file(Path::new("../test.mkv")));
}

#[test]
fn test_source_kind() {
    assert_eq!(source_kind("rtsp://camera.local/stream"), SourceKind::Uri);
    assert_eq!(source_kind("https://example.com/loop.mp4"), SourceKind::Uri);
    assert_eq!(source_kind("file:///C:/loop.mp4"), SourceKind::Uri);
    assert_eq!(source_kind("C:\\Videos\\loop.mp4"), SourceKind::Path);
    assert_eq!(source_kind("videos/loop.mp4"), SourceKind::Path);
    assert_eq!(source_kind("://missing-scheme"), SourceKind::Path);
    assert_eq!(source_kind("weird dir://x.mp4"), SourceKind::Path);
}

#[test]
fn test_first_video_stream_is_selected() {
    // audio, video, video
    assert_eq!(select_video_stream([false, true, true]), Some(1));
    assert_eq!(select_video_stream([true]), Some(0));
}

#[test]
fn test_no_video_stream() {
    assert_eq!(select_video_stream([false, false]), None);
    assert_eq!(select_video_stream(std::iter::empty()), None);
}

#[test]
fn test_buffer_size_must_match() {
    // 1920x1080 BGR24 at alignment 1
    let expected = 1920 * 1080 * 3;
    assert_eq!(check_buffer_size(expected, expected).unwrap(), expected);

    let err = check_buffer_size(expected, expected - 1).unwrap_err();
    assert!(matches!(
        err,
        WallpaperError::BufferSize { expected: e, filled: f } if e == expected && f == expected - 1
    ));
}
