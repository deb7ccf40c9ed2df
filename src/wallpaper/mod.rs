// SPDX-License-Identifier: MPL-2.0

//! Video wallpaper session: setup chain and the decode-convert-present loop.
//!
//! ## Resource lifetime
//!
//! [`set_video`] acquires the media source, the frame converter and the
//! presenter as locals, in that order. Any setup failure returns early and
//! drops whatever was already acquired; a quit event returns normally. In
//! both cases Rust drops the locals in reverse, so the window goes first and
//! the container is closed last.
//!
//! ## Play loop
//!
//! ```text
//! Reading ──packet──▶ Decoding ──frame──▶ Converting ──▶ Presenting ──delay──┐
//!    │                    │ not ready, other stream                         │
//!    │ EndOfStream        ▼                                                 │
//!    └─▶ seek,       PollingEvents ◀────────────────────────────────────────┘
//!        Reading          │ quit
//!                         ▼
//!                      Quitting
//! ```
//!
//! A successful seek goes straight back to reading. If that pass reaches
//! end of stream again without a single packet, the seek is followed by an
//! event poll, so an empty container can still be quit.
//!
//! Pacing is a fixed sleep after every decoded frame, not a deadline
//! scheduler. Playback speed therefore drifts with decode cost.

use std::time::Duration;

use tracing::{debug, error, info, trace, warn};
use vidpaper_config::{Config, ReadErrorPolicy};

use crate::{
    error::{Result, WallpaperError},
    media::{DecodeOutcome, FrameConverter, MediaSource, ReadOutcome, VideoGeometry},
    present::{Presenter, PresenterEvent},
};

#[cfg(feature = "playback")]
mod native;

#[cfg(feature = "playback")]
pub use native::NativeBackend;

/// Presented frames between two progress log lines.
const PROGRESS_INTERVAL: u64 = 600;

/// Settings for one wallpaper session.
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// Sleep after every decoded frame.
    pub frame_delay: Duration,
    pub read_error_policy: ReadErrorPolicy,
    pub window_title: String,
    /// Timeout for the worker layer request sent to the desktop shell.
    pub shell_timeout: Duration,
}

impl From<&Config> for PlaybackOptions {
    fn from(config: &Config) -> Self {
        Self {
            frame_delay: config.frame_delay(),
            read_error_policy: config.read_error_policy,
            window_title: config.window_title.clone(),
            shell_timeout: config.shell_message_timeout(),
        }
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Counters collected by the play loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub packets: u64,
    pub frames_presented: u64,
    /// Video packets after which the decoder had no frame ready.
    pub frames_pending: u64,
    /// Decode, convert, upload or present failures that were skipped.
    pub frame_errors: u64,
    pub read_failures: u64,
    /// Completed passes through the video.
    pub loops: u64,
}

/// Factory for the three resources of a wallpaper session.
///
/// Implementations acquire native resources; each returned value releases
/// its own resources when dropped.
pub trait Backend {
    type Source: MediaSource;
    type Converter: FrameConverter<<Self::Source as MediaSource>::Frame>;
    type Presenter: Presenter;

    /// Open and probe the container and open a decoder for its first video stream.
    fn open_source(&mut self, uri: &str) -> Result<Self::Source>;

    /// Allocate the converted frame buffer and the scaling context.
    fn create_converter(&mut self, source: &Self::Source) -> Result<Self::Converter>;

    /// Create the window, embed it into the desktop, then create the renderer
    /// and the streaming texture.
    fn create_presenter(
        &mut self,
        geometry: &VideoGeometry,
        options: &PlaybackOptions,
    ) -> Result<Self::Presenter>;
}

/// Play `uri` as the desktop wallpaper until a quit event arrives.
///
/// Returns an error if any setup step fails, or if a packet read fails under
/// [`ReadErrorPolicy::Abort`].
pub fn set_video<B: Backend>(
    backend: &mut B,
    uri: &str,
    options: &PlaybackOptions,
) -> Result<PlaybackStats> {
    info!(uri, "Setting video wallpaper");

    let mut source = backend.open_source(uri)?;
    let geometry = source.geometry();
    debug!(%geometry, "Video source ready");

    let mut converter = backend.create_converter(&source)?;
    let mut presenter = backend.create_presenter(&geometry, options)?;

    play(&mut source, &mut converter, &mut presenter, options)
}

/// Run the decode-convert-present loop until a quit event.
pub fn play<S, C, P>(
    source: &mut S,
    converter: &mut C,
    presenter: &mut P,
    options: &PlaybackOptions,
) -> Result<PlaybackStats>
where
    S: MediaSource,
    C: FrameConverter<S::Frame>,
    P: Presenter,
{
    let mut stats = PlaybackStats::default();
    info!(
        delay_ms = options.frame_delay.as_millis(),
        policy = ?options.read_error_policy,
        "Starting playback"
    );

    // Set by a seek, cleared by the next packet.
    let mut rewound = false;

    loop {
        match source.read_packet() {
            ReadOutcome::EndOfStream => {
                stats.loops += 1;
                let empty_pass = std::mem::replace(&mut rewound, true);
                debug!(loop_num = stats.loops, "Video EOS, seeking to start");
                // Both fallthroughs poll events so a stuck source can still be quit.
                match source.seek_to_start() {
                    Ok(()) if !empty_pass => continue,
                    Ok(()) => trace!("No packets since the last seek"),
                    Err(err) => warn!(?err, "Failed to seek to start for loop"),
                }
            }
            ReadOutcome::Failed(reason) => {
                stats.read_failures += 1;
                match options.read_error_policy {
                    ReadErrorPolicy::Skip => debug!(%reason, "Packet read failed, skipping"),
                    ReadErrorPolicy::Abort => {
                        error!(%reason, "Packet read failed, stopping playback");
                        return Err(WallpaperError::Read(reason));
                    }
                }
            }
            ReadOutcome::Packet(packet) => {
                stats.packets += 1;
                rewound = false;
                if source.is_video_packet(&packet) {
                    show_packet(source, converter, presenter, &packet, options, &mut stats);
                }
            }
        }

        if presenter.poll_event() == Some(PresenterEvent::Quit) {
            info!(
                frames = stats.frames_presented,
                loops = stats.loops,
                "Quit requested, stopping playback"
            );
            return Ok(stats);
        }
    }
}

/// Decode one video packet and, if a frame comes out, present it.
fn show_packet<S, C, P>(
    source: &mut S,
    converter: &mut C,
    presenter: &mut P,
    packet: &S::Packet,
    options: &PlaybackOptions,
    stats: &mut PlaybackStats,
) where
    S: MediaSource,
    C: FrameConverter<S::Frame>,
    P: Presenter,
{
    let frame = match source.decode(packet) {
        DecodeOutcome::Frame(frame) => frame,
        DecodeOutcome::NotReady => {
            stats.frames_pending += 1;
            trace!("Decoder needs more input");
            return;
        }
        DecodeOutcome::Failed(reason) => {
            stats.frame_errors += 1;
            debug!(%reason, "Skipped frame: decode failed");
            return;
        }
    };

    match converter.convert(frame) {
        Ok(plane) => {
            if let Err(err) = presenter.update(plane) {
                stats.frame_errors += 1;
                debug!(?err, "Texture upload failed");
            }
            match presenter.present() {
                Ok(()) => {
                    stats.frames_presented += 1;
                    if stats.frames_presented % PROGRESS_INTERVAL == 0 {
                        debug!(
                            frames = stats.frames_presented,
                            packets = stats.packets,
                            pending = stats.frames_pending,
                            errors = stats.frame_errors,
                            loops = stats.loops,
                            "Video playback progress"
                        );
                    }
                }
                Err(err) => {
                    stats.frame_errors += 1;
                    debug!(?err, "Present failed");
                }
            }
        }
        Err(err) => {
            stats.frame_errors += 1;
            debug!(?err, "Skipped frame: conversion failed");
        }
    }

    if !options.frame_delay.is_zero() {
        std::thread::sleep(options.frame_delay);
    }
}
