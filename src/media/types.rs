// SPDX-License-Identifier: MPL-2.0

//! Core types shared by the decode and conversion stages.

use std::fmt;

use crate::error::{Result, WallpaperError};

/// Dimensions and native pixel format reported by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoGeometry {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Decoder's native pixel format, for logging.
    pub pixel_format: String,
}

impl fmt::Display for VideoGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.pixel_format)
    }
}

/// Result of pulling one compressed packet from the container.
#[derive(Debug)]
pub enum ReadOutcome<P> {
    Packet(P),
    EndOfStream,
    /// Any other read failure.
    Failed(String),
}

/// Result of feeding one packet to the decoder.
#[derive(Debug)]
pub enum DecodeOutcome<'a, F> {
    /// A frame was emitted and is borrowed from the source until the next decode.
    Frame(&'a F),
    /// The decoder needs more input before it can emit a frame.
    NotReady,
    Failed(String),
}

/// First plane of a converted frame, ready for texture upload.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    /// Bytes per row.
    pub stride: usize,
}

/// Verify that the converted frame layout fills exactly the buffer that was
/// sized for it.
pub fn check_buffer_size(expected: usize, filled: usize) -> Result<usize> {
    if expected == filled {
        Ok(expected)
    } else {
        Err(WallpaperError::BufferSize { expected, filled })
    }
}

/// Index of the first video stream, if any.
pub fn select_video_stream<I>(is_video: I) -> Option<usize>
where
    I: IntoIterator<Item = bool>,
{
    is_video.into_iter().position(|video| video)
}
