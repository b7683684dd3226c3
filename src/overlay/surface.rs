use anyhow::Result;
use serde::Serialize;

use super::Bounds;

/// Event name the page listens on for [`SurfaceCommand`]s.
pub const OVERLAY_COMMAND_EVENT: &str = "overlay-command";

/// Everything the Rust side may ask the rendered page to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SurfaceCommand {
    /// Replace the whole display text.
    SetDisplayText { text: String },
    /// Move the text container's scroll offset, clamped at zero.
    ScrollBy { delta: f64 },
}

/// Receiver of display commands. `ScrollBy` never takes the offset below zero
/// and leaves the upper end to the content height.
pub trait DisplaySurface: Send + Sync {
    fn send(&self, command: SurfaceCommand) -> Result<()>;

    /// Last text applied through `SetDisplayText`.
    fn display_text(&self) -> String;
}

/// Native window geometry.
pub trait OverlayWindow: Send + Sync {
    fn bounds(&self) -> Result<Bounds>;
    fn set_bounds(&self, bounds: Bounds) -> Result<()>;
}
