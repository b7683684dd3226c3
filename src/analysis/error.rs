use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Why an analysis cycle ended without an answer. `Display` is the text shown
/// in the overlay.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No screenshots to send. Take a screenshot first with {capture_hotkey}.")]
    EmptyBatch { capture_hotkey: String },
    #[error("No screenshot files found.")]
    MissingFiles,
    #[error("Error reading prompt file.")]
    PromptUnreadable(#[source] std::io::Error),
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimited,
    #[error("{}", unauthorized_message(.status))]
    Unauthorized { status: u16 },
    #[error("API Error: {message}")]
    Api { message: String },
    #[error("HTTP Error {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("Network error: Unable to reach the model API.")]
    Network(String),
    #[error("Error processing screenshots.")]
    MalformedResponse(String),
    /// A blocking store or file task panicked or was cancelled.
    #[error("Error processing screenshots.")]
    Worker(String),
}

impl AnalysisError {
    /// True for failures that happened after the request was sent.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AnalysisError::RateLimited
                | AnalysisError::Unauthorized { .. }
                | AnalysisError::Api { .. }
                | AnalysisError::Http { .. }
                | AnalysisError::Network(_)
                | AnalysisError::MalformedResponse(_)
        )
    }

    /// Underlying cause for logs; the overlay only shows `Display`.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AnalysisError::Network(detail)
            | AnalysisError::MalformedResponse(detail)
            | AnalysisError::Worker(detail) => Some(detail),
            _ => None,
        }
    }
}

fn unauthorized_message(status: &u16) -> &'static str {
    if *status == 403 {
        "Access forbidden. Check your API key permissions."
    } else {
        "API key invalid or unauthorized."
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Maps a non-success response to its error class. Total over every status:
/// anything that is not 429, 401/403 or a structured error body becomes `Http`.
pub fn classify_status(status: StatusCode, body: &str) -> AnalysisError {
    match status.as_u16() {
        429 => AnalysisError::RateLimited,
        code @ (401 | 403) => AnalysisError::Unauthorized { status: code },
        code => match structured_message(body) {
            Some(message) => AnalysisError::Api { message },
            None => AnalysisError::Http {
                status: code,
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            },
        },
    }
}

fn structured_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
}
