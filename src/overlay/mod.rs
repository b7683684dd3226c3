pub mod controller;
pub mod geometry;
pub mod surface;
pub mod window;

pub use controller::OverlayController;
pub use geometry::{Bounds, Direction};
pub use surface::{DisplaySurface, OverlayWindow, SurfaceCommand, OVERLAY_COMMAND_EVENT};
pub use window::TauriOverlay;
