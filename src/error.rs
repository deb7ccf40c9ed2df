// SPDX-License-Identifier: MPL-2.0

//! Failures that end a wallpaper session.
//!
//! Every setup step has its own variant so the log says which resource could
//! not be acquired. Once the play loop runs, only [`WallpaperError::Read`]
//! can end it, and only under [`ReadErrorPolicy::Abort`].
//!
//! [`ReadErrorPolicy::Abort`]: vidpaper_config::ReadErrorPolicy::Abort

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("failed to initialize {subsystem}: {reason}")]
    Init {
        subsystem: &'static str,
        reason: String,
    },
    #[error("failed to open {uri}: {reason}")]
    Open { uri: String, reason: String },
    #[error("failed to probe stream info: {0}")]
    Probe(String),
    #[error("no video stream found")]
    NoVideoStream,
    #[error("no decoder available for codec {0}")]
    UnsupportedCodec(String),
    #[error("failed to set up decoder: {0}")]
    Decoder(String),
    #[error("converted frame needs {expected} bytes but {filled} were laid out")]
    BufferSize { expected: usize, filled: usize },
    #[error("failed to create scaling context: {0}")]
    Converter(String),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("failed to create renderer: {0}")]
    Renderer(String),
    #[error("failed to create texture: {0}")]
    Texture(String),
    #[error("failed to read packet: {0}")]
    Read(String),
}

pub type Result<T, E = WallpaperError> = std::result::Result<T, E>;
