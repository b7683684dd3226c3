pub mod source;
pub mod store;

pub use source::{ScreenSource, XcapScreenSource};
pub use store::{CaptureError, CaptureRecord, CaptureStore};
