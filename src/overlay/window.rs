use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tauri::{
    AppHandle, Emitter, LogicalPosition, LogicalSize, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder,
};

use super::{Bounds, DisplaySurface, OverlayWindow, SurfaceCommand, OVERLAY_COMMAND_EVENT};

pub const OVERLAY_LABEL: &str = "overlay";

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 300.0;

/// The one overlay webview, acting as both the native window and the page.
pub struct TauriOverlay {
    window: WebviewWindow,
    display_text: Mutex<String>,
}

impl TauriOverlay {
    /// Builds the overlay window with its stealth flags. Call once at startup.
    pub fn initialize(app: &AppHandle) -> Result<Self> {
        let window = WebviewWindowBuilder::new(app, OVERLAY_LABEL, WebviewUrl::App("index.html".into()))
            .title("")
            .inner_size(WIDTH, HEIGHT)
            .decorations(false)
            .transparent(true)
            .shadow(false)
            .resizable(false)
            .focused(false)
            .skip_taskbar(true)
            .always_on_top(true)
            .visible_on_all_workspaces(true)
            .content_protected(true)
            .build()
            .map_err(|err| anyhow!("failed to create overlay window: {err}"))?;

        raise_to_screen_saver_level(&window)?;

        Ok(Self {
            window,
            display_text: Mutex::new(String::new()),
        })
    }
}

impl OverlayWindow for TauriOverlay {
    /// Outer position with the inner (content) size, matching what
    /// `set_position` and `set_size` take.
    fn bounds(&self) -> Result<Bounds> {
        let scale = self.window.scale_factor()?;
        let position = self.window.outer_position()?.to_logical::<f64>(scale);
        let size = self.window.inner_size()?.to_logical::<f64>(scale);
        Ok(Bounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<()> {
        self.window
            .set_position(LogicalPosition::new(bounds.x, bounds.y))?;

        let current = self.bounds()?;
        if needs_resize(&current, &bounds) {
            self.window
                .set_size(LogicalSize::new(bounds.width, bounds.height))?;
        }
        Ok(())
    }
}

/// Moves keep the size, so only a real size change touches the window size.
fn needs_resize(current: &Bounds, requested: &Bounds) -> bool {
    const EPSILON: f64 = 0.5;
    (current.width - requested.width).abs() > EPSILON
        || (current.height - requested.height).abs() > EPSILON
}

impl DisplaySurface for TauriOverlay {
    fn send(&self, command: SurfaceCommand) -> Result<()> {
        if let SurfaceCommand::SetDisplayText { text } = &command {
            *self
                .display_text
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = text.clone();
        }
        self.window
            .emit(OVERLAY_COMMAND_EVENT, &command)
            .map_err(|err| anyhow!("failed to emit {OVERLAY_COMMAND_EVENT}: {err}"))
    }

    fn display_text(&self) -> String {
        self.display_text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(target_os = "macos")]
fn raise_to_screen_saver_level(window: &WebviewWindow) -> Result<()> {
    use objc2_app_kit::{NSWindow, NSWindowCollectionBehavior};

    // kCGScreenSaverWindowLevel, plus one so nothing else at that tier covers us.
    const SCREEN_SAVER_LEVEL: isize = 1000;

    window
        .with_webview(|webview| unsafe {
            let ns_window = webview.ns_window() as *mut NSWindow;
            let Some(ns_window) = ns_window.as_ref() else {
                log::error!("overlay has no NSWindow; window level unchanged");
                return;
            };
            ns_window.setLevel(SCREEN_SAVER_LEVEL + 1);
            ns_window.setCollectionBehavior(
                NSWindowCollectionBehavior::CanJoinAllSpaces
                    | NSWindowCollectionBehavior::FullScreenAuxiliary
                    | NSWindowCollectionBehavior::Stationary,
            );
        })
        .map_err(|err| anyhow!("failed to configure overlay window level: {err}"))
}

#[cfg(not(target_os = "macos"))]
fn raise_to_screen_saver_level(_window: &WebviewWindow) -> Result<()> {
    // `always_on_top` already maps to the topmost tier here.
    Ok(())
}
