// SPDX-License-Identifier: MPL-2.0

//! FFmpeg + SDL2 + desktop shell backend.

use ffmpeg_next as ffmpeg;
use tracing::{debug, info};

use super::{Backend, PlaybackOptions};
use crate::{
    desktop::{self, DesktopShell},
    error::{Result, WallpaperError},
    media::{FfmpegConverter, FfmpegSource, VideoGeometry},
    present::{SdlContext, SdlPresenter},
};

/// Owns the process-wide library state. SDL shuts down when the backend is
/// dropped, so it must outlive every session it creates.
pub struct NativeBackend {
    shell: Box<dyn DesktopShell>,
    sdl: SdlContext,
}

impl NativeBackend {
    /// Bring up DPI awareness, SDL and FFmpeg, in that order.
    pub fn init() -> Result<Self> {
        desktop::set_dpi_aware();

        let sdl = SdlContext::init()?;

        ffmpeg::init().map_err(|e| WallpaperError::Init {
            subsystem: "FFmpeg",
            reason: e.to_string(),
        })?;
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        debug!("Initialized FFmpeg");

        Ok(Self {
            shell: desktop::native_shell(),
            sdl,
        })
    }
}

impl Backend for NativeBackend {
    type Source = FfmpegSource;
    type Converter = FfmpegConverter;
    type Presenter = SdlPresenter;

    fn open_source(&mut self, uri: &str) -> Result<FfmpegSource> {
        FfmpegSource::open(uri)
    }

    fn create_converter(&mut self, source: &FfmpegSource) -> Result<FfmpegConverter> {
        FfmpegConverter::new(source.decoder())
    }

    fn create_presenter(
        &mut self,
        geometry: &VideoGeometry,
        options: &PlaybackOptions,
    ) -> Result<SdlPresenter> {
        info!(%geometry, "Creating wallpaper window");
        SdlPresenter::new(
            &self.sdl,
            geometry,
            &options.window_title,
            self.shell.as_ref(),
            options.shell_timeout,
        )
    }
}
