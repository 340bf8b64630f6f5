// Translation of teleprompter content through the language model

use crate::error::{ServiceError, TranslateError};
use crate::model::{Availability, LanguageModel, ModelSession, OllamaModel, OllamaSession, SessionOptions};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Source language assumed when detection fails.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Language codes the translator accepts, with English display names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("tr", "Turkish"),
    ("zh", "Chinese"),
];

/// English display name for a language code, or the code itself.
pub fn language_name(code: &str) -> &str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub language: String,
    pub confidence: f64,
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Candidate languages, most likely first.
    async fn detect(&self, text: &str) -> Result<Vec<Detection>, ServiceError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    type Session: TranslationSession;

    async fn availability(&self, source: &str, target: &str) -> Result<Availability, ServiceError>;

    async fn create(&self, source: &str, target: &str) -> Result<Self::Session, ServiceError>;
}

#[async_trait]
pub trait TranslationSession: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, ServiceError>;
}

/// Translates `text` into `target`, detecting the source language first.
pub async fn translate_text<T, D>(
    translator: &T,
    detector: &D,
    text: &str,
    target: &str,
) -> Result<String, TranslateError>
where
    T: Translator,
    D: LanguageDetector,
{
    let source = match detector.detect(text.trim()).await {
        Ok(candidates) => candidates
            .into_iter()
            .next()
            .map(|d| d.language)
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()),
        Err(e) => {
            warn!(error = %e, "language detection failed, using default English");
            FALLBACK_LANGUAGE.to_string()
        }
    };
    debug!(from = %source, to = %target, "translating content");

    match translator
        .availability(&source, target)
        .await
        .map_err(TranslateError::Availability)?
    {
        Availability::Unavailable => {
            return Err(TranslateError::Unsupported {
                source_name: language_name(&source).to_string(),
                target_name: language_name(target).to_string(),
            })
        }
        Availability::Readily | Availability::Downloadable => {}
        Availability::Downloading => return Err(TranslateError::NotReady),
    }

    let session = translator
        .create(&source, target)
        .await
        .map_err(TranslateError::Session)?;
    let translated = session
        .translate(text)
        .await
        .map_err(TranslateError::Translation)?;

    info!(from = %source, to = %target, "translation complete");
    Ok(translated)
}

/// Translator and detector backed by the Ollama model.
#[derive(Clone)]
pub struct OllamaTranslator {
    model: OllamaModel,
}

impl OllamaTranslator {
    pub fn new(model: OllamaModel) -> Self {
        Self { model }
    }

    async fn session(
        &self,
        system_prompt: String,
        output_language: Option<String>,
    ) -> Result<OllamaSession, ServiceError> {
        // Download progress is not surfaced for translations.
        let (monitor, _) = mpsc::unbounded_channel();
        self.model
            .create(
                SessionOptions {
                    system_prompt,
                    output_language,
                },
                monitor,
            )
            .await
    }
}

#[async_trait]
impl LanguageDetector for OllamaTranslator {
    async fn detect(&self, text: &str) -> Result<Vec<Detection>, ServiceError> {
        let session = self
            .session(
                "Identify the language of the user's text. Reply with its two-letter ISO 639-1 code only.".to_string(),
                None,
            )
            .await?;
        let reply = session.prompt(text, &CancellationToken::new()).await?;
        Ok(parse_language_code(&reply)
            .map(|language| Detection {
                language,
                confidence: 1.0,
            })
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    type Session = OllamaTranslation;

    async fn availability(&self, source: &str, target: &str) -> Result<Availability, ServiceError> {
        if source == target || !is_supported(source) || !is_supported(target) {
            return Ok(Availability::Unavailable);
        }
        self.model.availability().await
    }

    async fn create(&self, source: &str, target: &str) -> Result<OllamaTranslation, ServiceError> {
        let system_prompt = format!(
            "You are a translator. Translate the user's text from {} to {}. Reply with the translation only and keep the paragraph breaks.",
            language_name(source),
            language_name(target)
        );
        let session = self.session(system_prompt, Some(target.to_string())).await?;
        Ok(OllamaTranslation { session })
    }
}

pub struct OllamaTranslation {
    session: OllamaSession,
}

#[async_trait]
impl TranslationSession for OllamaTranslation {
    async fn translate(&self, text: &str) -> Result<String, ServiceError> {
        let translated = self.session.prompt(text, &CancellationToken::new()).await?;
        Ok(translated.trim().to_string())
    }
}

/// Pulls a supported two-letter code out of a free-form model reply.
fn parse_language_code(reply: &str) -> Option<String> {
    reply
        .split(|c: char| !c.is_ascii_alphabetic())
        .map(|word| word.to_ascii_lowercase())
        .find(|word| word.len() == 2 && is_supported(word))
}
