// Error types shared across the crate

use std::time::Duration;
use thiserror::Error;

/// Failures reported by the external model service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to reach the model server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model server call failed with status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Unexpected response from the model server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("AI model is not available on this device. Please check hardware requirements.")]
    Unavailable,

    #[error("The request was aborted")]
    Aborted,

    #[error("{0}")]
    Rejected(String),
}

/// Failures of the persisted key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored value for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed or cancelled content generation.
///
/// Every variant except `Validation` and `Cancelled` names the phase that
/// failed so the popup can show it verbatim.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Failed to check AI model availability: {0}")]
    Availability(#[source] ServiceError),

    #[error("Failed to initialize AI session. Please check that the AI model is properly downloaded and try again. Error: {0}")]
    Session(#[source] ServiceError),

    #[error("Failed to generate content: AI generation timed out after {} minutes. This is normal for complex prompts or when the model is still initializing.", .0.as_secs() / 60)]
    Timeout(Duration),

    #[error("Failed to generate content: {0}")]
    Generation(#[source] ServiceError),

    #[error("Generation cancelled by user.")]
    Cancelled,

    #[error("Failed to save generation state: {0}")]
    Store(#[from] StoreError),
}

impl GenerationError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, GenerationError::Cancelled)
    }
}

/// Failures of the translation flow.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{source_name} to {target_name} translation is not supported.")]
    Unsupported {
        source_name: String,
        target_name: String,
    },

    #[error("Translator API is not ready.")]
    NotReady,

    #[error("Failed to check translation availability: {0}")]
    Availability(#[source] ServiceError),

    #[error("Failed to create translation session: {0}")]
    Session(#[source] ServiceError),

    #[error("Failed to translate content: {0}")]
    Translation(#[source] ServiceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
