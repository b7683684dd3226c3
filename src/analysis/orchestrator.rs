use std::{
    fs,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use base64::{engine::general_purpose::STANDARD, Engine};
use uuid::Uuid;

use super::{request::ChatRequest, AnalysisError, VisionClient};
use crate::{
    capture::CaptureStore,
    overlay::OverlayController,
    settings::{ModelSettings, SYSTEM_PROMPT, USER_INSTRUCTION},
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub const LOADING_TEXT: &str = "Loading...";

#[derive(Debug)]
pub enum CycleOutcome {
    /// The model answered and the batch was cleared.
    Answered,
    /// Another cycle was already in flight; nothing changed.
    Busy,
    /// The cycle stopped early or the request failed; the batch is kept.
    Failed(AnalysisError),
}

/// Runs analysis cycles: drain the batch, ask the model about the first
/// screenshot, show the answer, clear the batch.
pub struct AnalysisOrchestrator<C> {
    store: Arc<Mutex<CaptureStore>>,
    client: C,
    overlay: OverlayController,
    model: ModelSettings,
    prompt_path: PathBuf,
    capture_hotkey: String,
    busy: AtomicBool,
}

/// Clears the busy flag when a cycle ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<C: VisionClient> AnalysisOrchestrator<C> {
    pub fn new(
        store: Arc<Mutex<CaptureStore>>,
        client: C,
        overlay: OverlayController,
        model: ModelSettings,
        prompt_path: PathBuf,
        capture_hotkey: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client,
            overlay,
            model,
            prompt_path,
            capture_hotkey: capture_hotkey.into(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.try_begin() else {
            log_warn!("Analysis already in progress; ignoring trigger");
            return CycleOutcome::Busy;
        };

        let cycle_id = Uuid::new_v4();
        match self.analyze(cycle_id).await {
            Ok(()) => CycleOutcome::Answered,
            Err(err) => {
                if err.is_remote() || err.detail().is_some() {
                    let detail = err.detail().unwrap_or_default();
                    log_error!("[{cycle_id}] error processing screenshots: {err} {detail}");
                } else {
                    log_info!("[{cycle_id}] analysis skipped: {err}");
                }
                self.show(err.to_string());
                CycleOutcome::Failed(err)
            }
        }
    }

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    async fn analyze(&self, cycle_id: Uuid) -> Result<(), AnalysisError> {
        if self.with_store(|store| store.count()).await? == 0 {
            return Err(AnalysisError::EmptyBatch {
                capture_hotkey: self.capture_hotkey.clone(),
            });
        }

        self.show(LOADING_TEXT);

        let screenshots: Vec<String> = self
            .with_store(move |store| {
                store
                    .drain()
                    .enumerate()
                    .map(|(position, png)| {
                        let encoded = STANDARD.encode(png);
                        log_info!(
                            "[{cycle_id}] loaded screenshot {}: {} characters in base64",
                            position + 1,
                            encoded.len()
                        );
                        encoded
                    })
                    .collect()
            })
            .await?;

        // Only the first screenshot goes out; the rest of the batch is dropped
        // from the request but stays on disk until the batch is cleared.
        let Some(first) = screenshots.first() else {
            return Err(AnalysisError::MissingFiles);
        };

        // The prompt file must be readable, but the request text is fixed.
        let prompt_path = self.prompt_path.clone();
        let prompt = tokio::task::spawn_blocking(move || fs::read_to_string(prompt_path))
            .await
            .map_err(|err| AnalysisError::Worker(err.to_string()))?
            .map_err(AnalysisError::PromptUnreadable)?;

        let request = ChatRequest::vision(
            &self.model.model,
            SYSTEM_PROMPT,
            USER_INSTRUCTION,
            first,
            self.model.max_tokens,
        );
        log_info!(
            "[{cycle_id}] sending to {}: model={}, prompt_length={}, image_size={}, images={}/{}",
            self.model.endpoint,
            self.model.model,
            prompt.len(),
            first.len(),
            request.images().count(),
            screenshots.len()
        );

        let completion = self.client.complete(&request).await?;

        log_info!("[{cycle_id}] response: {}", completion.text);
        log_info!("[{cycle_id}] finish reason: {:?}", completion.finish_reason);
        if let Some(usage) = completion.usage {
            log_info!(
                "[{cycle_id}] usage: prompt={} completion={} total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }
        self.show(completion.text);
        self.with_store(|store| store.clear()).await
    }

    fn show(&self, text: impl Into<String>) {
        if let Err(err) = self.overlay.set_display_text(text) {
            log_error!("Failed to update overlay text: {err}");
        }
    }

    /// Runs `f` against the store on the blocking pool. A capture may hold the
    /// lock for a full screen grab, and store calls touch the disk.
    async fn with_store<T, F>(&self, f: F) -> Result<T, AnalysisError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CaptureStore) -> T + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&mut guard)
        })
        .await
        .map_err(|err| AnalysisError::Worker(err.to_string()))
    }
}
