pub mod client;
pub mod error;
pub mod orchestrator;
pub mod request;

pub use client::{OpenAiClient, VisionClient};
pub use error::{classify_status, AnalysisError};
pub use orchestrator::{AnalysisOrchestrator, CycleOutcome};
