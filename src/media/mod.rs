// SPDX-License-Identifier: MPL-2.0

//! Video decoding and color conversion using FFmpeg.
//!
//! The play loop only sees the two traits defined here, so it can be driven
//! by FFmpeg in production and by scripted fakes in tests.
//!
//! # Module Structure
//!
//! - [`types`]: Read/decode outcomes, frame geometry and converted planes
//! - [`detection`]: Source path and URI classification
//! - [`ffmpeg_source`]: Container, stream selection and decoder
//! - [`convert`]: swscale context and the converted frame buffer
//!
//! # Pipeline
//!
//! ```text
//! container ─read─▶ packet ─decode─▶ native frame ─convert─▶ BGR24 plane
//! ```

pub mod detection;
mod types;

#[cfg(feature = "playback")]
mod convert;
#[cfg(feature = "playback")]
mod ffmpeg_source;

pub use types::{
    DecodeOutcome, Plane, ReadOutcome, VideoGeometry, check_buffer_size, select_video_stream,
};

#[cfg(feature = "playback")]
pub use convert::FfmpegConverter;
#[cfg(feature = "playback")]
pub use ffmpeg_source::FfmpegSource;

/// An opened container with a decoder attached to its first video stream.
pub trait MediaSource {
    /// One compressed packet. Dropping it releases the packet.
    type Packet;
    /// One decoded frame in the decoder's native format.
    type Frame;

    fn geometry(&self) -> VideoGeometry;

    /// Pull the next compressed packet from the container.
    fn read_packet(&mut self) -> ReadOutcome<Self::Packet>;

    /// Whether the packet belongs to the selected video stream.
    fn is_video_packet(&self, packet: &Self::Packet) -> bool;

    /// Submit a packet and try to receive one decoded frame.
    fn decode(&mut self, packet: &Self::Packet) -> DecodeOutcome<'_, Self::Frame>;

    /// Seek back to the container's start timestamp.
    fn seek_to_start(&mut self) -> eyre::Result<()>;
}

/// Converts decoded frames into the renderer's pixel format.
pub trait FrameConverter<F> {
    fn convert(&mut self, frame: &F) -> eyre::Result<Plane<'_>>;
}

#[cfg(test)]
mod tests;
