use std::{
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use super::ScreenSource;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const FILE_PREFIX: &str = "screenshot_";
const FILE_EXTENSION: &str = "png";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no screen sources available")]
    NoSourceAvailable,
    #[error("screen capture failed: {0}")]
    Capture(String),
    #[error("failed to encode screenshot: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write screenshot: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub index: u32,
    pub path: PathBuf,
    pub bytes: usize,
    pub captured_at: DateTime<Utc>,
}

/// Numbered screenshots waiting to be analyzed.
///
/// Files live at `<dir>/screenshot_<index>.png` for `index` in `1..=count`.
/// `count` only moves forward on a successful write and only returns to zero
/// through [`CaptureStore::clear`].
pub struct CaptureStore {
    dir: PathBuf,
    count: u32,
    source: Arc<dyn ScreenSource>,
    max_width: u32,
    max_height: u32,
}

impl CaptureStore {
    pub fn new(
        dir: PathBuf,
        source: Arc<dyn ScreenSource>,
        max_width: u32,
        max_height: u32,
    ) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            count: 0,
            source,
            max_width,
            max_height,
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, index: u32) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{index}.{FILE_EXTENSION}"))
    }

    /// Grabs the primary screen and appends it to the batch.
    pub fn capture(&mut self) -> Result<CaptureRecord, CaptureError> {
        let frame = self.source.primary_frame(self.max_width, self.max_height)?;
        let png = encode_png(&frame)?;

        let index = self.count + 1;
        let path = self.path_for(index);
        fs::write(&path, &png)?;
        self.count = index;

        let record = CaptureRecord {
            index,
            path,
            bytes: png.len(),
            captured_at: Utc::now(),
        };
        log_info!(
            "Screenshot saved: {} ({} bytes, {}x{})",
            record.path.display(),
            record.bytes,
            frame.width(),
            frame.height()
        );
        Ok(record)
    }

    /// Reads every stored payload in index order. Missing files are skipped.
    pub fn drain(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        (1..=self.count).filter_map(move |index| {
            let path = self.path_for(index);
            match fs::read(&path) {
                Ok(bytes) => Some(bytes),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    log_warn!("Screenshot {} not found, skipping", path.display());
                    None
                }
                Err(err) => {
                    log_warn!("Failed to read screenshot {}: {err}", path.display());
                    None
                }
            }
        })
    }

    /// Deletes the batch and resets the counter. Safe to call repeatedly.
    pub fn clear(&mut self) {
        for index in 1..=self.count {
            let path = self.path_for(index);
            if let Err(err) = fs::remove_file(&path) {
                if err.kind() != io::ErrorKind::NotFound {
                    log_warn!("Failed to delete screenshot {}: {err}", path.display());
                }
            }
        }
        self.count = 0;
    }

    /// Removes screenshots left behind by an earlier run, so the counter and
    /// the directory agree from the first capture on.
    pub fn remove_stale(&self) -> io::Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if is_capture_file(&path) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        if removed > 0 {
            log_info!("Removed {removed} stale screenshot(s) from {}", self.dir.display());
        }
        Ok(removed)
    }
}

fn is_capture_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(&format!(".{FILE_EXTENSION}")))
        .map(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    frame.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Screen source that returns a solid frame, or nothing when `empty` is set.
    pub(crate) struct FakeScreen {
        pub(crate) empty: AtomicBool,
    }

    impl FakeScreen {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                empty: AtomicBool::new(false),
            })
        }
    }

    impl ScreenSource for FakeScreen {
        fn primary_frame(&self, _: u32, _: u32) -> Result<RgbaImage, CaptureError> {
            if self.empty.load(Ordering::SeqCst) {
                return Err(CaptureError::NoSourceAvailable);
            }
            Ok(RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255])))
        }
    }

    pub(crate) fn store_in(dir: &Path, source: Arc<dyn ScreenSource>) -> CaptureStore {
        CaptureStore::new(dir.join("captures"), source, 1920, 1080).unwrap()
    }

    #[test]
    fn capture_assigns_sequential_indices() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path(), FakeScreen::new());

        let first = store.capture().unwrap();
        let second = store.capture().unwrap();

        assert_eq!(first.index, 1);
        assert_eq!(second.index, 2);
        assert_eq!(store.count(), 2);
        assert!(store.path_for(1).exists());
        assert!(store.path_for(2).exists());
        assert_eq!(fs::read(&second.path).unwrap().len(), second.bytes);
    }

    #[test]
    fn captured_file_is_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path(), FakeScreen::new());

        let record = store.capture().unwrap();
        let decoded = image::open(&record.path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn capture_without_source_leaves_count_alone() {
        let dir = tempfile::tempdir().unwrap();
        let screen = FakeScreen::new();
        let mut store = store_in(dir.path(), screen.clone());
        store.capture().unwrap();

        screen.empty.store(true, Ordering::SeqCst);
        let err = store.capture().unwrap_err();

        assert!(matches!(err, CaptureError::NoSourceAvailable));
        assert_eq!(store.count(), 1);
        assert!(!store.path_for(2).exists());
    }

    #[test]
    fn drain_skips_missing_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path(), FakeScreen::new());
        for _ in 0..3 {
            store.capture().unwrap();
        }
        fs::write(store.path_for(3), b"third").unwrap();
        fs::remove_file(store.path_for(2)).unwrap();

        let payloads: Vec<Vec<u8>> = store.drain().collect();

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[1], b"third");
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn clear_removes_files_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path(), FakeScreen::new());
        store.capture().unwrap();
        store.capture().unwrap();
        fs::remove_file(store.path_for(1)).unwrap();

        store.clear();
        assert_eq!(store.count(), 0);
        assert!(!store.path_for(2).exists());

        store.clear();
        assert_eq!(store.count(), 0);
        assert_eq!(store.capture().unwrap().index, 1);
    }

    #[test]
    fn remove_stale_only_touches_screenshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), FakeScreen::new());
        fs::write(store.path_for(7), b"old").unwrap();
        fs::write(store.dir().join("screenshot_x.png"), b"keep").unwrap();
        fs::write(store.dir().join("notes.txt"), b"keep").unwrap();

        assert_eq!(store.remove_stale().unwrap(), 1);
        assert!(!store.path_for(7).exists());
        assert!(store.dir().join("screenshot_x.png").exists());
        assert!(store.dir().join("notes.txt").exists());
    }
}
