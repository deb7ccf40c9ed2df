// SPDX-License-Identifier: MPL-2.0

//! Placing the wallpaper window beneath the desktop icons.
//!
//! Explorer keeps its icons in a `SHELLDLL_DefView` hosted by a top-level
//! window. Sending the undocumented message `0x052C` to `Progman` makes the
//! shell split its background into a separate `WorkerW` layer. Our window is
//! re-parented under `Progman` and the `WorkerW` that follows the icon host
//! is hidden, which leaves the video visible behind the icons.
//!
//! None of this is documented. Every step degrades to a logged warning
//! rather than an error, so an unfamiliar shell layout still plays the video
//! in an ordinary window.

#[cfg(target_os = "windows")]
mod win32;

#[cfg(target_os = "windows")]
pub use win32::Win32Shell;

use std::time::Duration;

use tracing::{debug, info, warn};

/// Platform window handle, stored as an integer so it can cross trait
/// boundaries without tying callers to a platform crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub isize);

/// Operations on the desktop shell's window hierarchy.
pub trait DesktopShell {
    /// The shell's root window (`Progman`), if present.
    fn root_window(&self) -> Option<WindowId>;

    /// Ask the root to create its background worker layer. Failure is ignored.
    fn request_worker_layer(&self, root: WindowId, timeout: Duration);

    /// Re-parent `child` under `parent`. Returns `false` on failure.
    fn reparent(&self, child: WindowId, parent: WindowId) -> bool;

    /// Given the desktop root, return the worker window to hide, or none.
    fn worker_to_hide(&self, root: WindowId) -> Option<WindowId>;

    fn hide(&self, window: WindowId);
}

/// How far embedding got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// Re-parented and the worker layer hidden.
    BehindIcons,
    /// Re-parented, but no worker layer was found to hide.
    Reparented,
    /// Left as an ordinary top-level window.
    Detached,
}

/// Embed `window` into the desktop shell.
pub fn embed(shell: &dyn DesktopShell, window: WindowId, timeout: Duration) -> EmbedOutcome {
    let Some(root) = shell.root_window() else {
        warn!("Desktop root window not found, wallpaper stays a normal window");
        return EmbedOutcome::Detached;
    };
    debug!(?root, ?window, "Found desktop root window");

    shell.request_worker_layer(root, timeout);

    if !shell.reparent(window, root) {
        warn!(?window, ?root, "Failed to re-parent wallpaper window");
        return EmbedOutcome::Detached;
    }

    match shell.worker_to_hide(root) {
        Some(worker) => {
            shell.hide(worker);
            info!(?worker, "Wallpaper embedded behind desktop icons");
            EmbedOutcome::BehindIcons
        }
        None => {
            warn!("No worker window found, wallpaper may cover the desktop icons");
            EmbedOutcome::Reparented
        }
    }
}

/// Shell for platforms without a Program Manager: nothing to embed into.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedShell;

impl DesktopShell for DetachedShell {
    fn root_window(&self) -> Option<WindowId> {
        None
    }

    fn request_worker_layer(&self, _root: WindowId, _timeout: Duration) {}

    fn reparent(&self, _child: WindowId, _parent: WindowId) -> bool {
        false
    }

    fn worker_to_hide(&self, _root: WindowId) -> Option<WindowId> {
        None
    }

    fn hide(&self, _window: WindowId) {}
}

/// The shell for the current platform.
#[must_use]
pub fn native_shell() -> Box<dyn DesktopShell> {
    #[cfg(target_os = "windows")]
    {
        Box::new(Win32Shell)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Box::new(DetachedShell)
    }
}

/// Opt the process into DPI awareness before any window exists.
pub fn set_dpi_aware() {
    #[cfg(target_os = "windows")]
    win32::set_dpi_aware();
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct FakeShell {
        root: Option<WindowId>,
        reparent_ok: bool,
        worker: Option<WindowId>,
        calls: RefCell<Vec<String>>,
    }

    impl DesktopShell for FakeShell {
        fn root_window(&self) -> Option<WindowId> {
            self.calls.borrow_mut().push("root".into());
            self.root
        }

        fn request_worker_layer(&self, root: WindowId, timeout: Duration) {
            self.calls
                .borrow_mut()
                .push(format!("request {} {}ms", root.0, timeout.as_millis()));
        }

        fn reparent(&self, child: WindowId, parent: WindowId) -> bool {
            self.calls
                .borrow_mut()
                .push(format!("reparent {} -> {}", child.0, parent.0));
            self.reparent_ok
        }

        fn worker_to_hide(&self, root: WindowId) -> Option<WindowId> {
            self.calls.borrow_mut().push(format!("find worker {}", root.0));
            self.worker
        }

        fn hide(&self, window: WindowId) {
            self.calls.borrow_mut().push(format!("hide {}", window.0));
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(100);

    #[test]
    fn embeds_behind_icons() {
        let shell = FakeShell {
            root: Some(WindowId(10)),
            reparent_ok: true,
            worker: Some(WindowId(30)),
            ..Default::default()
        };

        assert_eq!(embed(&shell, WindowId(1), TIMEOUT), EmbedOutcome::BehindIcons);
        assert_eq!(
            *shell.calls.borrow(),
            [
                "root",
                "request 10 100ms",
                "reparent 1 -> 10",
                "find worker 10",
                "hide 30"
            ]
        );
    }

    #[test]
    fn missing_worker_keeps_reparented_window() {
        let shell = FakeShell {
            root: Some(WindowId(10)),
            reparent_ok: true,
            ..Default::default()
        };

        assert_eq!(embed(&shell, WindowId(1), TIMEOUT), EmbedOutcome::Reparented);
        assert!(!shell.calls.borrow().iter().any(|c| c.starts_with("hide")));
    }

    #[test]
    fn missing_root_leaves_window_detached() {
        let shell = FakeShell::default();

        assert_eq!(embed(&shell, WindowId(1), TIMEOUT), EmbedOutcome::Detached);
        assert_eq!(*shell.calls.borrow(), ["root"]);
    }

    #[test]
    fn failed_reparent_skips_worker_search() {
        let shell = FakeShell {
            root: Some(WindowId(10)),
            worker: Some(WindowId(30)),
            ..Default::default()
        };

        assert_eq!(embed(&shell, WindowId(1), TIMEOUT), EmbedOutcome::Detached);
        assert_eq!(shell.calls.borrow().last().map(String::as_str), Some("reparent 1 -> 10"));
    }

    #[test]
    fn detached_shell_never_embeds() {
        assert_eq!(
            embed(&DetachedShell, WindowId(1), TIMEOUT),
            EmbedOutcome::Detached
        );
    }
}
