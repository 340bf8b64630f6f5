// Handles communication with the external language model (Ollama)

use crate::error::ServiceError;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Whether the model can be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Unavailable,
    Downloadable,
    Downloading,
    Readily,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub system_prompt: String,
    /// ISO 639-1 code the answer should be written in.
    pub output_language: Option<String>,
}

/// Receives the fraction (0.0 to 1.0) of a model download completed so far.
pub type DownloadMonitor = mpsc::UnboundedSender<f64>;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    type Session: ModelSession + 'static;

    async fn availability(&self) -> Result<Availability, ServiceError>;

    /// Creates a session, downloading the model first when needed.
    async fn create(
        &self,
        options: SessionOptions,
        monitor: DownloadMonitor,
    ) -> Result<Self::Session, ServiceError>;
}

#[async_trait]
pub trait ModelSession: Send + Sync {
    /// Runs one prompt. Stops early with `ServiceError::Aborted` once
    /// `cancel` fires.
    async fn prompt(&self, input: &str, cancel: &CancellationToken) -> Result<String, ServiceError>;
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Deserialize)]
struct PullProgress {
    #[serde(default)]
    status: String,
    completed: Option<u64>,
    total: Option<u64>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// Language model served by a local Ollama instance.
#[derive(Clone)]
pub struct OllamaModel {
    client: Client,
    base_url: String,
    model: String,
    pulling: Arc<AtomicBool>,
}

impl OllamaModel {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::with_client(base_url, model, Client::new())
    }

    pub fn with_client(base_url: &str, model: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            pulling: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Lists locally installed model names.
    pub async fn fetch_models(&self) -> Result<Vec<String>, ServiceError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        let tags: TagList = serde_json::from_slice(&response.bytes().await?)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn pull(&self, monitor: &DownloadMonitor) -> Result<(), ServiceError> {
        info!(model = %self.model, "pulling model");
        self.pulling.store(true, Ordering::SeqCst);
        let result = self.stream_pull(monitor).await;
        self.pulling.store(false, Ordering::SeqCst);
        result
    }

    async fn stream_pull(&self, monitor: &DownloadMonitor) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&serde_json::json!({ "model": self.model, "stream": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
            for line in drain_lines(&mut buffer) {
                let progress: PullProgress = serde_json::from_slice(&line)?;
                if let Some(error) = progress.error {
                    return Err(ServiceError::Rejected(error));
                }
                if let Some(fraction) = progress.fraction() {
                    // Nobody listening is fine.
                    let _ = monitor.send(fraction);
                }
                if progress.status == "success" {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

impl PullProgress {
    fn fraction(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                Some((completed as f64 / total as f64).min(1.0))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    type Session = OllamaSession;

    async fn availability(&self) -> Result<Availability, ServiceError> {
        let models = match self.fetch_models().await {
            Ok(models) => models,
            // No server means no model on this machine.
            Err(ServiceError::Transport(e)) if e.is_connect() => {
                debug!(error = %e, "model server unreachable");
                return Ok(Availability::Unavailable);
            }
            Err(e) => return Err(e),
        };

        if is_model_listed(&models, &self.model) {
            Ok(Availability::Readily)
        } else if self.pulling.load(Ordering::SeqCst) {
            Ok(Availability::Downloading)
        } else {
            Ok(Availability::Downloadable)
        }
    }

    async fn create(
        &self,
        options: SessionOptions,
        monitor: DownloadMonitor,
    ) -> Result<OllamaSession, ServiceError> {
        if self.availability().await? != Availability::Readily {
            self.pull(&monitor).await?;
        }

        let mut system = options.system_prompt;
        if let Some(code) = &options.output_language {
            system.push_str(&format!(
                " Respond only in {}.",
                crate::translate::language_name(code)
            ));
        }

        Ok(OllamaSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            system,
        })
    }
}

pub struct OllamaSession {
    client: Client,
    base_url: String,
    model: String,
    system: String,
}

#[async_trait]
impl ModelSession for OllamaSession {
    async fn prompt(&self, input: &str, cancel: &CancellationToken) -> Result<String, ServiceError> {
        let response = tokio::select! {
            response = self
                .client
                .post(format!("{}/api/generate", self.base_url))
                .json(&serde_json::json!({
                    "model": self.model,
                    "system": self.system,
                    "prompt": input,
                    "stream": true
                }))
                .send() => response?,
            _ = cancel.cancelled() => return Err(ServiceError::Aborted),
        };

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        let mut ai_response = String::new();
        let mut buffer = Vec::new();
        let mut stream = response.bytes_stream();
        loop {
            tokio::select! {
                chunk = stream.next() => {
                    let Some(chunk) = chunk else {
                        break;
                    };
                    buffer.extend_from_slice(&chunk?);
                    for line in drain_lines(&mut buffer) {
                        let parsed: GenerateChunk = serde_json::from_slice(&line)?;
                        if let Some(error) = parsed.error {
                            return Err(ServiceError::Rejected(error));
                        }
                        ai_response.push_str(&parsed.response);
                        if parsed.done {
                            return Ok(ai_response);
                        }
                    }
                },
                _ = cancel.cancelled() => {
                    debug!("generation stream cancelled");
                    return Err(ServiceError::Aborted);
                }
            }
        }

        Ok(ai_response)
    }
}

/// Takes every complete newline-terminated line out of `buffer`, leaving a
/// trailing partial line in place. Blank lines are skipped.
///
/// Works on raw bytes: a read may end inside a multibyte character, so
/// nothing is decoded until its whole line has arrived.
pub(crate) fn drain_lines(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let Some(last_newline) = buffer.iter().rposition(|&b| b == b'\n') else {
        return Vec::new();
    };

    let rest = buffer.split_off(last_newline + 1);
    let complete = std::mem::replace(buffer, rest);
    complete
        .split(|&b| b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(<[u8]>::to_vec)
        .collect()
}

/// Ollama reports untagged models with an implicit `:latest` suffix.
fn is_model_listed(models: &[String], wanted: &str) -> bool {
    models.iter().any(|name| {
        name == wanted || (!wanted.contains(':') && name.strip_suffix(":latest") == Some(wanted))
    })
}
