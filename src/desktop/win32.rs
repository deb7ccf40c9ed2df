// SPDX-License-Identifier: MPL-2.0

//! Win32 implementation of the desktop shell operations.

use std::{ffi::c_void, time::Duration};

use tracing::{debug, trace};
use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, WPARAM},
        UI::WindowsAndMessaging::{
            EnumWindows, FindWindowExW, FindWindowW, SMTO_NORMAL, SW_HIDE, SendMessageTimeoutW,
            SetParent, SetProcessDPIAware, ShowWindow,
        },
    },
    core::{BOOL, PCWSTR, w},
};

use super::{DesktopShell, WindowId};

/// Asks `Progman` to spawn a `WorkerW` behind the desktop icons.
const SPAWN_WORKER_MESSAGE: u32 = 0x052C;

fn hwnd(id: WindowId) -> HWND {
    HWND(id.0 as *mut c_void)
}

fn window_id(hwnd: HWND) -> WindowId {
    WindowId(hwnd.0 as isize)
}

pub(super) fn set_dpi_aware() {
    let aware = unsafe { SetProcessDPIAware() };
    debug!(aware = aware.as_bool(), "Requested DPI awareness");
}

/// Explorer's `Progman` / `SHELLDLL_DefView` / `WorkerW` layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Shell;

/// State carried through `EnumWindows` via its `LPARAM`.
#[derive(Debug, Default)]
struct WorkerSearch {
    visited: usize,
    worker: Option<HWND>,
}

/// Stops at the first top-level window hosting the icon view and records the
/// `WorkerW` that follows it.
unsafe extern "system" fn visit_top_level(window: HWND, context: LPARAM) -> BOOL {
    // SAFETY: `context` is the `&mut WorkerSearch` passed by `worker_to_hide`,
    // which outlives the synchronous `EnumWindows` call.
    let search = unsafe { &mut *(context.0 as *mut WorkerSearch) };
    search.visited += 1;

    let icon_view =
        unsafe { FindWindowExW(Some(window), None, w!("SHELLDLL_DefView"), PCWSTR::null()) };
    if !icon_view.is_ok_and(|view| !view.is_invalid()) {
        return BOOL::from(true);
    }

    trace!(host = ?window.0, "Found icon view host");
    search.worker = unsafe { FindWindowExW(None, Some(window), w!("WorkerW"), PCWSTR::null()) }
        .ok()
        .filter(|worker| !worker.is_invalid());
    BOOL::from(false)
}

impl DesktopShell for Win32Shell {
    fn root_window(&self) -> Option<WindowId> {
        unsafe { FindWindowW(w!("Progman"), PCWSTR::null()) }
            .ok()
            .filter(|root| !root.is_invalid())
            .map(window_id)
    }

    fn request_worker_layer(&self, root: WindowId, timeout: Duration) {
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let result = unsafe {
            SendMessageTimeoutW(
                hwnd(root),
                SPAWN_WORKER_MESSAGE,
                WPARAM(0),
                LPARAM(0),
                SMTO_NORMAL,
                timeout_ms,
                None,
            )
        };
        debug!(result = result.0, timeout_ms, "Requested desktop worker layer");
    }

    fn reparent(&self, child: WindowId, parent: WindowId) -> bool {
        match unsafe { SetParent(hwnd(child), Some(hwnd(parent))) } {
            Ok(_) => true,
            Err(err) => {
                debug!(%err, "SetParent failed");
                false
            }
        }
    }

    fn worker_to_hide(&self, _root: WindowId) -> Option<WindowId> {
        let mut search = WorkerSearch::default();
        // Returns an error when the visitor stops early, which is the success case.
        let _ = unsafe {
            EnumWindows(
                Some(visit_top_level),
                LPARAM(&mut search as *mut WorkerSearch as isize),
            )
        };
        debug!(
            visited = search.visited,
            found = search.worker.is_some(),
            "Enumerated top-level windows"
        );
        search.worker.map(window_id)
    }

    fn hide(&self, window: WindowId) {
        let _ = unsafe { ShowWindow(hwnd(window), SW_HIDE) };
    }
}
