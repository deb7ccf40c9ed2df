// SPDX-License-Identifier: MPL-2.0

//! SDL2 window, renderer and streaming texture.

use std::time::Duration;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use sdl2::{
    EventPump, Sdl, VideoSubsystem,
    event::Event,
    pixels::PixelFormatEnum,
    rect::Rect,
    render::{Canvas, Texture, TextureCreator},
    video::{Window, WindowContext},
};
use tracing::{debug, info, warn};

use super::{Presenter, PresenterEvent};
use crate::{
    desktop::{self, DesktopShell, WindowId},
    error::{Result, WallpaperError},
    media::{Plane, VideoGeometry},
};

/// Texture format matching the converter's BGR24 output.
const TEXTURE_FORMAT: PixelFormatEnum = PixelFormatEnum::BGR24;

/// Initialized SDL library. Dropping it shuts SDL down, so it must outlive
/// every presenter created from it.
pub struct SdlContext {
    _audio: Option<sdl2::AudioSubsystem>,
    _timer: Option<sdl2::TimerSubsystem>,
    video: VideoSubsystem,
    sdl: Sdl,
}

impl SdlContext {
    pub fn init() -> Result<Self> {
        let init_error = |reason: String| WallpaperError::Init {
            subsystem: "SDL",
            reason,
        };

        let sdl = sdl2::init().map_err(init_error)?;
        let video = sdl.video().map_err(init_error)?;

        // Nothing is played through these; they are brought up alongside
        // video and failures only matter for the log.
        let audio = sdl
            .audio()
            .inspect_err(|err| warn!(%err, "SDL audio subsystem unavailable"))
            .ok();
        let timer = sdl
            .timer()
            .inspect_err(|err| warn!(%err, "SDL timer subsystem unavailable"))
            .ok();

        info!(driver = video.current_video_driver(), "Initialized SDL");

        Ok(Self {
            _audio: audio,
            _timer: timer,
            video,
            sdl,
        })
    }
}

/// Borderless window showing frames through a streaming texture.
///
/// Release order is texture, renderer, window. The texture is destroyed
/// explicitly in [`Drop`]; the renderer outlives it through the texture
/// creator and the window outlives the renderer through SDL2's shared
/// window context.
pub struct SdlPresenter {
    texture: Option<Texture>,
    _texture_creator: TextureCreator<WindowContext>,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    frame_rect: Rect,
}

impl SdlPresenter {
    pub fn new(
        context: &SdlContext,
        geometry: &VideoGeometry,
        title: &str,
        shell: &dyn DesktopShell,
        shell_timeout: Duration,
    ) -> Result<Self> {
        let window = context
            .video
            .window(title, geometry.width, geometry.height)
            .position(0, 0)
            .borderless()
            .allow_highdpi()
            .opengl()
            .build()
            .map_err(|e| WallpaperError::Window(e.to_string()))?;

        match native_window_id(&window) {
            Some(id) => {
                let outcome = desktop::embed(shell, id, shell_timeout);
                debug!(?outcome, "Desktop embedding finished");
            }
            None => warn!("No native window handle, skipping desktop embedding"),
        }

        let canvas = window
            .into_canvas()
            .target_texture()
            .build()
            .map_err(|e| WallpaperError::Renderer(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let texture = texture_creator
            .create_texture_streaming(TEXTURE_FORMAT, geometry.width, geometry.height)
            .map_err(|e| WallpaperError::Texture(e.to_string()))?;

        let event_pump = context
            .sdl
            .event_pump()
            .map_err(|reason| WallpaperError::Init {
                subsystem: "SDL events",
                reason,
            })?;

        info!(
            renderer = canvas.info().name,
            width = geometry.width,
            height = geometry.height,
            "Created wallpaper window"
        );

        Ok(Self {
            texture: Some(texture),
            _texture_creator: texture_creator,
            canvas,
            event_pump,
            frame_rect: Rect::new(0, 0, geometry.width, geometry.height),
        })
    }
}

fn native_window_id(window: &Window) -> Option<WindowId> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(handle) => Some(WindowId(handle.hwnd.get())),
        other => {
            debug!(?other, "Window handle is not a Win32 handle");
            None
        }
    }
}

impl Presenter for SdlPresenter {
    fn update(&mut self, plane: Plane<'_>) -> eyre::Result<()> {
        let texture = self
            .texture
            .as_mut()
            .ok_or_else(|| eyre::eyre!("Texture already destroyed"))?;
        texture.update(Some(self.frame_rect), plane.data, plane.stride)?;
        Ok(())
    }

    fn present(&mut self) -> eyre::Result<()> {
        let texture = self
            .texture
            .as_ref()
            .ok_or_else(|| eyre::eyre!("Texture already destroyed"))?;
        self.canvas.clear();
        self.canvas
            .copy(texture, Some(self.frame_rect), Some(self.frame_rect))
            .map_err(|e| eyre::eyre!("Failed to copy texture: {e}"))?;
        self.canvas.present();
        Ok(())
    }

    fn poll_event(&mut self) -> Option<PresenterEvent> {
        self.event_pump.poll_event().map(|event| match event {
            Event::Quit { .. } => PresenterEvent::Quit,
            _ => PresenterEvent::Other,
        })
    }
}

impl Drop for SdlPresenter {
    fn drop(&mut self) {
        if let Some(texture) = self.texture.take() {
            // SAFETY: the renderer that owns the texture is still alive here.
            unsafe { texture.destroy() };
        }
        debug!("Released wallpaper window");
    }
}
