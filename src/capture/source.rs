use image::{imageops::FilterType, DynamicImage, RgbaImage};
use xcap::Monitor;

use super::CaptureError;

/// Something that can hand back a still frame of the primary screen.
pub trait ScreenSource: Send + Sync {
    /// Returns the primary screen scaled to fit within `max_width` x `max_height`.
    fn primary_frame(&self, max_width: u32, max_height: u32) -> Result<RgbaImage, CaptureError>;
}

/// Screen source backed by the OS capture APIs through `xcap`.
pub struct XcapScreenSource;

impl ScreenSource for XcapScreenSource {
    fn primary_frame(&self, max_width: u32, max_height: u32) -> Result<RgbaImage, CaptureError> {
        let monitors =
            Monitor::all().map_err(|err| CaptureError::Capture(format!("listing monitors: {err}")))?;

        let primary = monitors
            .iter()
            .position(|monitor| monitor.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors
            .into_iter()
            .nth(primary)
            .ok_or(CaptureError::NoSourceAvailable)?;

        let frame = monitor
            .capture_image()
            .map_err(|err| CaptureError::Capture(err.to_string()))?;

        Ok(fit_within(frame, max_width, max_height))
    }
}

/// Downscales `frame` to fit the target box, keeping its aspect ratio.
/// Frames that already fit are returned untouched.
pub fn fit_within(frame: RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    if frame.width() <= max_width && frame.height() <= max_height {
        return frame;
    }
    DynamicImage::ImageRgba8(frame)
        .resize(max_width, max_height, FilterType::Triangle)
        .to_rgba8()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_frames_are_not_upscaled() {
        let frame = RgbaImage::new(640, 480);
        let out = fit_within(frame, 1920, 1080);
        assert_eq!(out.dimensions(), (640, 480));
    }

    #[test]
    fn large_frames_fit_the_target_box() {
        let frame = RgbaImage::new(3840, 2160);
        let out = fit_within(frame, 1920, 1080);
        assert_eq!(out.dimensions(), (1920, 1080));
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        let frame = RgbaImage::new(2560, 1600);
        let out = fit_within(frame, 1920, 1080);
        assert!(out.width() <= 1920 && out.height() <= 1080);
        assert_eq!(out.height(), 1080);
        assert_eq!(out.width(), 1728);
    }
}
