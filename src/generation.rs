//! Content generation coordinator.
//!
//! Runs at most one generation at a time against a [`LanguageModel`],
//! persisting a status flag in the local scope so a reopened popup can show
//! a generation started by an earlier one. The flag is cleared on every
//! exit path: success, error, timeout and cancellation.

use crate::error::{GenerationError, ServiceError, StoreError};
use crate::model::{Availability, LanguageModel, ModelSession, SessionOptions};
use crate::settings::PopupPreferences;
use crate::store::{keys, Scope, Store};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Budget for the prompt call itself; availability checks and session
/// creation are not counted.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

pub const STATUS_STARTING: &str = "Generating content with built-in AI...";
pub const STATUS_DOWNLOADABLE: &str = "Downloading AI model... This may take a few minutes.";
pub const STATUS_DOWNLOADING: &str = "AI model is currently downloading... Please wait.";
pub const STATUS_CREATING_SESSION: &str = "Creating AI session...";
pub const STATUS_GENERATING: &str = "Generating content... This may take up to 2 minutes. Please don't close this popup till generation is complete.";
pub const STATUS_SUCCESS: &str = "Content generated successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub target_word_count: u32,
}

impl GenerationRequest {
    pub fn new(prompt: &str, target_word_count: u32) -> Result<Self, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::Validation("Please enter a prompt"));
        }
        if target_word_count == 0 {
            return Err(GenerationError::Validation("Word count must be greater than zero"));
        }
        Ok(Self {
            prompt: prompt.to_string(),
            target_word_count,
        })
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are a helpful assistant that generates content for teleprompter use. \
             Please write approximately {} words. Format the content for teleprompter use \
             with clear paragraphs. Make the content engaging and suitable for speech delivery.",
            self.target_word_count
        )
    }
}

/// Persisted progress of the current generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatus {
    pub is_generating: bool,
    /// Only meaningful while `is_generating` is true.
    pub status_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Loading,
    Success,
    Cancelled,
    Error,
}

/// Message shown in the popup's status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub message: String,
    pub kind: StatusKind,
}

impl StatusReport {
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Loading,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            message: GenerationError::Cancelled.to_string(),
            kind: StatusKind::Cancelled,
        }
    }

    /// What the popup shows once `submit` returns.
    pub fn from_outcome(outcome: &Result<String, GenerationError>) -> Self {
        match outcome {
            Ok(_) => Self {
                message: STATUS_SUCCESS.to_string(),
                kind: StatusKind::Success,
            },
            Err(GenerationError::Cancelled) => Self::cancelled(),
            Err(GenerationError::Validation(message)) => Self {
                message: message.to_string(),
                kind: StatusKind::Error,
            },
            Err(e) => Self {
                message: format!("Error: {e}"),
                kind: StatusKind::Error,
            },
        }
    }

    /// What a freshly opened popup shows for a generation it did not start.
    pub fn from_status(status: &GenerationStatus) -> Option<Self> {
        status
            .is_generating
            .then(|| Self::loading(status.status_message.clone()))
    }
}

struct ActiveRequest {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct GenerationState {
    next_id: u64,
    active: Option<ActiveRequest>,
}

pub struct GenerationCoordinator<M> {
    model: M,
    store: Store,
    state: Mutex<GenerationState>,
    timeout: Duration,
}

impl<M: LanguageModel> GenerationCoordinator<M> {
    pub fn new(model: M, store: Store) -> Self {
        Self {
            model,
            store,
            state: Mutex::new(GenerationState::default()),
            timeout: GENERATION_TIMEOUT,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Generates content for `prompt` and persists it as the teleprompter text.
    ///
    /// A call made while another is in flight supersedes it: the earlier call
    /// resolves with `GenerationError::Cancelled`.
    pub async fn submit(&self, prompt: &str, word_count: u32) -> Result<String, GenerationError> {
        let request = GenerationRequest::new(prompt, word_count)?;

        let popup = PopupPreferences {
            last_prompt: Some(request.prompt.clone()),
            word_count: Some(request.target_word_count),
        };
        if let Err(e) = popup.save(&self.store).await {
            warn!(error = %e, "failed to save popup preferences");
        }

        let (id, token) = self.begin().await?;
        info!(request = id, words = request.target_word_count, "generation started");

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(GenerationError::Cancelled),
            result = self.generate(id, &request, &token) => result,
        };

        // No early return above this line: the flag must always be cleared.
        self.finish(id).await;

        match &result {
            Ok(content) => info!(request = id, chars = content.len(), "generation finished"),
            Err(GenerationError::Cancelled) => info!(request = id, "generation cancelled"),
            Err(e) => warn!(request = id, error = %e, "generation failed"),
        }
        result
    }

    /// Aborts the in-flight request, if any, and clears the persisted flag.
    ///
    /// The flag is cleared even with nothing in flight so a stale flag left
    /// by a previous process can be dismissed.
    pub async fn cancel(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(active) = state.active.take() {
            info!(request = active.id, "cancelling generation");
            active.token.cancel();
        }
        self.write_status(false, "").await
    }

    /// Reads the persisted status without starting anything.
    pub async fn resume_observation(&self) -> Result<GenerationStatus, StoreError> {
        let is_generating = self
            .store
            .get::<bool>(Scope::Local, keys::IS_GENERATING)
            .await?
            .unwrap_or(false);
        if !is_generating {
            return Ok(GenerationStatus::default());
        }

        let status_message = self
            .store
            .get::<String>(Scope::Local, keys::GENERATION_STATUS)
            .await?
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| STATUS_STARTING.to_string());
        Ok(GenerationStatus {
            is_generating,
            status_message,
        })
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.active.is_some()
    }

    /// Teardown: cancels whatever is still running.
    pub async fn shutdown(&self) {
        if let Err(e) = self.cancel().await {
            error!(error = %e, "failed to clear generation state on shutdown");
        }
    }

    async fn begin(&self) -> Result<(u64, CancellationToken), GenerationError> {
        let mut state = self.state.lock().await;
        if let Some(previous) = state.active.take() {
            info!(request = previous.id, "superseding in-flight generation");
            previous.token.cancel();
        }

        // Persist before any external call is made.
        if let Err(e) = self.write_status(true, STATUS_STARTING).await {
            // Nothing else owns the flag now.
            if let Err(clear) = self.write_status(false, "").await {
                error!(error = %clear, "failed to clear generation state");
            }
            return Err(e.into());
        }

        state.next_id += 1;
        let id = state.next_id;
        let token = CancellationToken::new();
        state.active = Some(ActiveRequest {
            id,
            token: token.clone(),
        });
        Ok((id, token))
    }

    async fn finish(&self, id: u64) {
        let mut state = self.state.lock().await;
        // A cancelled or superseded request no longer owns the flag.
        if !state.active.as_ref().is_some_and(|active| active.id == id) {
            return;
        }
        state.active = None;
        if let Err(e) = self.write_status(false, "").await {
            error!(request = id, error = %e, "failed to clear generation state");
        }
    }

    async fn set_phase(&self, id: u64, message: &str) {
        let state = self.state.lock().await;
        if !state.active.as_ref().is_some_and(|active| active.id == id) {
            return;
        }
        debug!(request = id, message, "generation phase");
        if let Err(e) = self.write_status(true, message).await {
            warn!(request = id, error = %e, "failed to persist generation status");
        }
    }

    async fn write_status(&self, is_generating: bool, message: &str) -> Result<(), StoreError> {
        self.store
            .set_many(
                Scope::Local,
                &[
                    (keys::IS_GENERATING, json!(is_generating)),
                    (keys::GENERATION_STATUS, json!(message)),
                ],
            )
            .await
    }

    async fn generate(
        &self,
        id: u64,
        request: &GenerationRequest,
        token: &CancellationToken,
    ) -> Result<String, GenerationError> {
        let availability = self
            .model
            .availability()
            .await
            .map_err(GenerationError::Availability)?;
        debug!(request = id, ?availability, "model availability");

        match availability {
            Availability::Unavailable => {
                return Err(GenerationError::Availability(ServiceError::Unavailable))
            }
            Availability::Downloadable => self.set_phase(id, STATUS_DOWNLOADABLE).await,
            Availability::Downloading => self.set_phase(id, STATUS_DOWNLOADING).await,
            Availability::Readily => {}
        }

        self.set_phase(id, STATUS_CREATING_SESSION).await;
        let session = self.create_session(id, request).await?;

        self.set_phase(id, STATUS_GENERATING).await;
        let text = match tokio::time::timeout(self.timeout, session.prompt(&request.prompt, token)).await {
            Ok(result) => result.map_err(GenerationError::Generation)?,
            // The prompt future is dropped here; whatever it would have produced is ignored.
            Err(_) => return Err(GenerationError::Timeout(self.timeout)),
        };

        let content = strip_reasoning(&text);
        self.store
            .set(Scope::Local, keys::GENERATED_CONTENT, &content)
            .await?;
        Ok(content)
    }

    async fn create_session(
        &self,
        id: u64,
        request: &GenerationRequest,
    ) -> Result<M::Session, GenerationError> {
        let options = SessionOptions {
            system_prompt: request.system_prompt(),
            output_language: Some("en".to_string()),
        };
        let (monitor, mut progress) = mpsc::unbounded_channel();

        let create = self.model.create(options, monitor);
        tokio::pin!(create);
        loop {
            tokio::select! {
                result = &mut create => return result.map_err(GenerationError::Session),
                Some(fraction) = progress.recv() => {
                    let percent = (fraction * 100.0).round();
                    self.set_phase(id, &format!("Downloading AI model: {percent}%")).await;
                }
            }
        }
    }
}

/// Drops a leading `<think>...</think>` block some models emit.
pub fn strip_reasoning(text: &str) -> String {
    static THINK: OnceLock<Regex> = OnceLock::new();
    let re = THINK.get_or_init(|| {
        Regex::new(r"(?s)^\s*<think>.*?</think>\s*").expect("reasoning pattern is valid")
    });
    re.replace(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[derive(Clone)]
    enum Reply {
        Text(String),
        Fail(String),
        Hang,
    }

    struct FakeModel {
        availability: Availability,
        progress: Vec<f64>,
        fail_create: bool,
        hold_create: Option<Arc<Notify>>,
        reply: Reply,
        availability_calls: AtomicUsize,
        prompts: Arc<Mutex<Vec<String>>>,
        prompt_started: Arc<Notify>,
    }

    impl FakeModel {
        fn replying(text: &str) -> Self {
            Self {
                availability: Availability::Readily,
                progress: Vec::new(),
                fail_create: false,
                hold_create: None,
                reply: Reply::Text(text.to_string()),
                availability_calls: AtomicUsize::new(0),
                prompts: Arc::new(Mutex::new(Vec::new())),
                prompt_started: Arc::new(Notify::new()),
            }
        }

        fn hanging() -> Self {
            Self {
                reply: Reply::Hang,
                ..Self::replying("")
            }
        }
    }

    struct FakeSession {
        reply: Reply,
        prompts: Arc<Mutex<Vec<String>>>,
        started: Arc<Notify>,
    }

    #[async_trait]
    impl ModelSession for FakeSession {
        async fn prompt(&self, input: &str, _cancel: &CancellationToken) -> Result<String, ServiceError> {
            self.prompts.lock().await.push(input.to_string());
            self.started.notify_one();
            match &self.reply {
                Reply::Text(text) => Ok(text.clone()),
                Reply::Fail(message) => Err(ServiceError::Rejected(message.clone())),
                // Ignores cancellation, like a backend without an abort hook.
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    #[async_trait]
    impl LanguageModel for FakeModel {
        type Session = FakeSession;

        async fn availability(&self) -> Result<Availability, ServiceError> {
            self.availability_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.availability)
        }

        async fn create(
            &self,
            _options: SessionOptions,
            monitor: crate::model::DownloadMonitor,
        ) -> Result<FakeSession, ServiceError> {
            for fraction in &self.progress {
                let _ = monitor.send(*fraction);
                tokio::task::yield_now().await;
            }
            if let Some(hold) = &self.hold_create {
                hold.notified().await;
            }
            if self.fail_create {
                return Err(ServiceError::Rejected("no session".into()));
            }
            Ok(FakeSession {
                reply: self.reply.clone(),
                prompts: self.prompts.clone(),
                started: self.prompt_started.clone(),
            })
        }
    }

    fn coordinator(model: FakeModel) -> (Arc<GenerationCoordinator<FakeModel>>, Store) {
        let store = Store::open_in_memory().unwrap();
        (Arc::new(GenerationCoordinator::new(model, store.clone())), store)
    }

    async fn persisted_flag(store: &Store) -> Option<bool> {
        store.get(Scope::Local, keys::IS_GENERATING).await.unwrap()
    }

    #[tokio::test]
    async fn successful_generation_persists_content_and_clears_flag() {
        let (coordinator, store) = coordinator(FakeModel::replying("The ocean is vast."));

        let content = coordinator.submit("Write about the ocean", 150).await.unwrap();

        assert_eq!(content, "The ocean is vast.");
        let saved: Option<String> = store.get(Scope::Local, keys::GENERATED_CONTENT).await.unwrap();
        assert_eq!(saved.as_deref(), Some("The ocean is vast."));
        assert_eq!(persisted_flag(&store).await, Some(false));
        assert_eq!(
            coordinator.model().prompts.lock().await.as_slice(),
            ["Write about the ocean".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_external_call() {
        let (coordinator, store) = coordinator(FakeModel::replying("unused"));

        let err = coordinator.submit("   ", 150).await.unwrap_err();

        assert!(matches!(err, GenerationError::Validation(_)));
        assert_eq!(coordinator.model().availability_calls.load(Ordering::SeqCst), 0);
        assert_eq!(persisted_flag(&store).await, None);
    }

    #[tokio::test]
    async fn zero_word_count_is_rejected() {
        let (coordinator, _) = coordinator(FakeModel::replying("unused"));
        let err = coordinator.submit("prompt", 0).await.unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generation_times_out_and_clears_flag() {
        let (coordinator, store) = coordinator(FakeModel::hanging());

        let err = coordinator.submit("Write about the ocean", 150).await.unwrap_err();

        assert!(matches!(err, GenerationError::Timeout(d) if d == GENERATION_TIMEOUT));
        assert_eq!(persisted_flag(&store).await, Some(false));
        let saved: Option<String> = store.get(Scope::Local, keys::GENERATED_CONTENT).await.unwrap();
        assert!(saved.is_none());
    }

    #[tokio::test]
    async fn cancel_mid_request_reports_cancellation() {
        let model = FakeModel::hanging();
        let started = model.prompt_started.clone();
        let (coordinator, store) = coordinator(model);

        let task = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.submit("Write about the ocean", 150).await })
        };
        started.notified().await;
        assert_eq!(persisted_flag(&store).await, Some(true));
        assert!(coordinator.is_busy().await);

        coordinator.cancel().await.unwrap();
        let outcome = task.await.unwrap();

        assert!(matches!(outcome, Err(GenerationError::Cancelled)));
        assert_eq!(StatusReport::from_outcome(&outcome).kind, StatusKind::Cancelled);
        assert_eq!(persisted_flag(&store).await, Some(false));
        assert!(!coordinator.is_busy().await);
    }

    #[tokio::test]
    async fn second_submit_supersedes_first() {
        let model = FakeModel::hanging();
        let started = model.prompt_started.clone();
        let (coordinator, store) = coordinator(model);

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.submit("first", 100).await })
        };
        started.notified().await;

        let second = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.submit("second", 100).await })
        };

        assert!(matches!(first.await.unwrap(), Err(GenerationError::Cancelled)));
        started.notified().await;
        // The second request still owns the flag.
        assert_eq!(persisted_flag(&store).await, Some(true));

        coordinator.cancel().await.unwrap();
        assert!(matches!(second.await.unwrap(), Err(GenerationError::Cancelled)));
        assert_eq!(persisted_flag(&store).await, Some(false));
    }

    #[tokio::test]
    async fn failed_start_after_supersede_leaves_flag_cleared() {
        let model = FakeModel::hanging();
        let started = model.prompt_started.clone();
        let (coordinator, store) = coordinator(model);

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.submit("first", 100).await })
        };
        started.notified().await;
        assert_eq!(persisted_flag(&store).await, Some(true));

        store
            .execute_batch(
                "CREATE TRIGGER reject_generating BEFORE INSERT ON local_storage
                 WHEN NEW.key = 'isGenerating' AND NEW.value = 'true'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .await
            .unwrap();

        let err = coordinator.submit("second", 100).await.unwrap_err();
        assert!(matches!(err, GenerationError::Store(_)));
        assert!(matches!(first.await.unwrap(), Err(GenerationError::Cancelled)));
        assert_eq!(persisted_flag(&store).await, Some(false));
        assert!(!coordinator.is_busy().await);
    }

    #[tokio::test]
    async fn unavailable_model_fails_availability_phase() {
        let mut model = FakeModel::replying("unused");
        model.availability = Availability::Unavailable;
        let (coordinator, store) = coordinator(model);

        let err = coordinator.submit("prompt", 100).await.unwrap_err();

        assert!(matches!(err, GenerationError::Availability(ServiceError::Unavailable)));
        assert_eq!(persisted_flag(&store).await, Some(false));
        assert!(coordinator.model().prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn session_failure_is_wrapped_and_clears_flag() {
        let mut model = FakeModel::replying("unused");
        model.fail_create = true;
        let (coordinator, store) = coordinator(model);

        let err = coordinator.submit("prompt", 100).await.unwrap_err();

        assert!(matches!(err, GenerationError::Session(_)));
        assert_eq!(persisted_flag(&store).await, Some(false));
    }

    #[tokio::test]
    async fn prompt_failure_is_wrapped_and_clears_flag() {
        let mut model = FakeModel::replying("unused");
        model.reply = Reply::Fail("context overflow".into());
        let (coordinator, store) = coordinator(model);

        let err = coordinator.submit("prompt", 100).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to generate content: context overflow");
        assert_eq!(
            StatusReport::from_outcome(&Err(err)).message,
            "Error: Failed to generate content: context overflow"
        );
        assert_eq!(persisted_flag(&store).await, Some(false));
    }

    #[tokio::test]
    async fn download_progress_is_persisted_while_running() {
        let hold = Arc::new(Notify::new());
        let mut model = FakeModel::hanging();
        model.availability = Availability::Downloadable;
        model.progress = vec![0.25, 0.5];
        model.hold_create = Some(hold.clone());
        let started = model.prompt_started.clone();
        let (coordinator, _store) = coordinator(model);

        let task = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.submit("prompt", 100).await })
        };

        let mut seen = None;
        for _ in 0..100 {
            let status = coordinator.resume_observation().await.unwrap();
            if status.status_message == "Downloading AI model: 50%" {
                seen = Some(status);
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(seen.is_some_and(|status| status.is_generating));

        hold.notify_one();
        started.notified().await;
        let status = coordinator.resume_observation().await.unwrap();
        assert_eq!(status.status_message, STATUS_GENERATING);

        coordinator.cancel().await.unwrap();
        assert!(task.await.unwrap().unwrap_err().is_cancellation());
    }

    #[tokio::test]
    async fn resume_observation_reflects_earlier_instance() {
        let store = Store::open_in_memory().unwrap();
        store
            .set_many(
                Scope::Local,
                &[
                    (keys::IS_GENERATING, json!(true)),
                    (keys::GENERATION_STATUS, json!(STATUS_CREATING_SESSION)),
                ],
            )
            .await
            .unwrap();

        let coordinator = GenerationCoordinator::new(FakeModel::replying("unused"), store.clone());
        let status = coordinator.resume_observation().await.unwrap();

        assert_eq!(
            status,
            GenerationStatus {
                is_generating: true,
                status_message: STATUS_CREATING_SESSION.to_string(),
            }
        );
        assert_eq!(
            StatusReport::from_status(&status),
            Some(StatusReport::loading(STATUS_CREATING_SESSION))
        );
        // Observing never starts a generation.
        assert_eq!(coordinator.model().availability_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn idle_status_ignores_stale_message() {
        let store = Store::open_in_memory().unwrap();
        store.set(Scope::Local, keys::GENERATION_STATUS, "leftover").await.unwrap();
        let coordinator = GenerationCoordinator::new(FakeModel::replying("unused"), store);

        let status = coordinator.resume_observation().await.unwrap();
        assert_eq!(status, GenerationStatus::default());
        assert_eq!(StatusReport::from_status(&status), None);
    }

    #[tokio::test]
    async fn cancel_without_request_clears_stale_flag() {
        let (coordinator, store) = coordinator(FakeModel::replying("unused"));
        store.set(Scope::Local, keys::IS_GENERATING, &true).await.unwrap();

        coordinator.cancel().await.unwrap();

        assert_eq!(persisted_flag(&store).await, Some(false));
    }

    #[tokio::test]
    async fn submit_remembers_popup_preferences() {
        let (coordinator, store) = coordinator(FakeModel::replying("text"));
        coordinator.submit("  Write about the ocean  ", 150).await.unwrap();

        let popup = PopupPreferences::load(&store).await.unwrap();
        assert_eq!(popup.last_prompt.as_deref(), Some("Write about the ocean"));
        assert_eq!(popup.word_count, Some(150));
    }

    #[test]
    fn system_prompt_embeds_word_count() {
        let request = GenerationRequest::new("topic", 250).unwrap();
        assert!(request.system_prompt().contains("approximately 250 words"));
    }

    #[test]
    fn reasoning_preamble_is_removed() {
        assert_eq!(
            strip_reasoning("<think>\nplan the speech\n</think>\n\nGood evening."),
            "Good evening."
        );
        assert_eq!(strip_reasoning("No preamble here."), "No preamble here.");
    }

    #[test]
    fn status_reports_for_outcomes() {
        let ok = StatusReport::from_outcome(&Ok("text".into()));
        assert_eq!(ok.kind, StatusKind::Success);
        assert_eq!(ok.message, STATUS_SUCCESS);

        let invalid = StatusReport::from_outcome(&Err(GenerationError::Validation("Please enter a prompt")));
        assert_eq!(invalid.message, "Please enter a prompt");
        assert_eq!(invalid.kind, StatusKind::Error);

        let cancelled = StatusReport::cancelled();
        assert_eq!(cancelled.message, "Generation cancelled by user.");
    }
}
