use std::future::Future;

use reqwest::Client;

use super::{
    classify_status,
    request::{ChatCompletion, ChatRequest, ChatResponse},
    AnalysisError,
};
use crate::settings::ApiKey;

/// A remote model that turns a chat request into text.
pub trait VisionClient: Send + Sync + 'static {
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatCompletion, AnalysisError>> + Send;
}

/// Chat-completions client over HTTPS with a bearer token. No timeout and no
/// retries: a request waits until the server answers or the connection fails.
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    api_key: Option<ApiKey>,
}

impl OpenAiClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<ApiKey>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

impl VisionClient for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, AnalysisError> {
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| AnalysisError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AnalysisError::Network(err.to_string()))?;

        if !status.is_success() {
            log::error!("model endpoint returned {status}: {body}");
            return Err(classify_status(status, &body));
        }

        serde_json::from_str::<ChatResponse>(&body)
            .map_err(|err| AnalysisError::MalformedResponse(err.to_string()))?
            .into_completion()
            .ok_or_else(|| AnalysisError::MalformedResponse("response has no message content".into()))
    }
}
