use std::sync::Arc;

use anyhow::Result;

use super::{Bounds, Direction, DisplaySurface, OverlayWindow, SurfaceCommand};

pub const NUDGE_STEP: f64 = 10.0;
pub const SCROLL_STEP: f64 = 50.0;

/// Moves the overlay around and scrolls its text. Cheap to clone; every clone
/// drives the same window.
#[derive(Clone)]
pub struct OverlayController {
    window: Arc<dyn OverlayWindow>,
    surface: Arc<dyn DisplaySurface>,
}

impl OverlayController {
    pub fn new(window: Arc<dyn OverlayWindow>, surface: Arc<dyn DisplaySurface>) -> Self {
        Self { window, surface }
    }

    pub fn nudge(&self, direction: Direction) -> Result<Bounds> {
        self.nudge_by(direction, NUDGE_STEP)
    }

    pub fn nudge_by(&self, direction: Direction, step: f64) -> Result<Bounds> {
        let next = self.window.bounds()?.nudged(direction, step);
        self.window.set_bounds(next)?;
        Ok(next)
    }

    /// Scrolls the text container. Only `Up` and `Down` are meaningful;
    /// horizontal directions are ignored.
    pub fn scroll_content(&self, direction: Direction) -> Result<()> {
        self.scroll_content_by(direction, SCROLL_STEP)
    }

    pub fn scroll_content_by(&self, direction: Direction, step: f64) -> Result<()> {
        let delta = match direction {
            Direction::Up => -step,
            Direction::Down => step,
            Direction::Left | Direction::Right => return Ok(()),
        };
        self.surface.send(SurfaceCommand::ScrollBy { delta })
    }

    pub fn set_display_text(&self, text: impl Into<String>) -> Result<()> {
        self.surface
            .send(SurfaceCommand::SetDisplayText { text: text.into() })
    }

    pub fn display_text(&self) -> String {
        self.surface.display_text()
    }
}
