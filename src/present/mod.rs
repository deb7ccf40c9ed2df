// SPDX-License-Identifier: MPL-2.0

//! Presenting converted frames in the wallpaper window.

#[cfg(feature = "playback")]
mod sdl;

#[cfg(feature = "playback")]
pub use sdl::{SdlContext, SdlPresenter};

use crate::media::Plane;

/// Window-system event seen by the play loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterEvent {
    /// The user or the system asked the wallpaper to close.
    Quit,
    Other,
}

/// A window with a renderer and one streaming texture of frame size.
pub trait Presenter {
    /// Overwrite the whole texture with `plane`.
    fn update(&mut self, plane: Plane<'_>) -> eyre::Result<()>;

    /// Clear, copy the texture 1:1 and present.
    fn present(&mut self) -> eyre::Result<()>;

    /// Take at most one pending event.
    fn poll_event(&mut self) -> Option<PresenterEvent>;
}
