// Typed preferences stored in the sync scope

use crate::error::StoreError;
use crate::scroll::{MAX_SPEED, MAX_TEXT_SIZE, MIN_SPEED, MIN_TEXT_SIZE};
use crate::store::{keys, Scope, Store};

use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_SPEED: f64 = 3.0;
pub const DEFAULT_TEXT_SIZE: u32 = 24;
pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// Teleprompter defaults edited on the options view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub default_speed: f64,
    pub default_text_size: u32,
    pub background_color: String,
    pub text_color: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            default_text_size: DEFAULT_TEXT_SIZE,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
        }
    }
}

impl Preferences {
    /// Loads preferences, substituting defaults for keys that were never saved.
    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        let defaults = Self::default();
        Ok(Self {
            default_speed: store
                .get(Scope::Sync, keys::DEFAULT_SPEED)
                .await?
                .unwrap_or(defaults.default_speed),
            default_text_size: store
                .get(Scope::Sync, keys::DEFAULT_TEXT_SIZE)
                .await?
                .unwrap_or(defaults.default_text_size),
            background_color: store
                .get(Scope::Sync, keys::BACKGROUND_COLOR)
                .await?
                .unwrap_or(defaults.background_color),
            text_color: store
                .get(Scope::Sync, keys::TEXT_COLOR)
                .await?
                .unwrap_or(defaults.text_color),
        })
    }

    /// Saves preferences. Speed and size are clamped to the ranges the
    /// teleprompter accepts.
    pub async fn save(&self, store: &Store) -> Result<(), StoreError> {
        let speed = if self.default_speed.is_finite() {
            self.default_speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            DEFAULT_SPEED
        };
        store
            .set_many(
                Scope::Sync,
                &[
                    (keys::DEFAULT_SPEED, json!(speed)),
                    (
                        keys::DEFAULT_TEXT_SIZE,
                        json!(self.default_text_size.clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE)),
                    ),
                    (keys::BACKGROUND_COLOR, json!(self.background_color)),
                    (keys::TEXT_COLOR, json!(self.text_color)),
                ],
            )
            .await
    }

    /// Clears the whole sync scope and returns the defaults now in effect.
    pub async fn reset(store: &Store) -> Result<Self, StoreError> {
        store.clear(Scope::Sync).await?;
        Ok(Self::default())
    }
}

/// Last prompt and word count, restored when the popup reopens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupPreferences {
    pub last_prompt: Option<String>,
    pub word_count: Option<u32>,
}

impl PopupPreferences {
    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        Ok(Self {
            last_prompt: store.get(Scope::Sync, keys::LAST_PROMPT).await?,
            word_count: store.get(Scope::Sync, keys::WORD_COUNT).await?,
        })
    }

    pub async fn save(&self, store: &Store) -> Result<(), StoreError> {
        let mut entries = Vec::with_capacity(2);
        if let Some(prompt) = &self.last_prompt {
            entries.push((keys::LAST_PROMPT, json!(prompt)));
        }
        if let Some(count) = self.word_count {
            entries.push((keys::WORD_COUNT, json!(count)));
        }
        store.set_many(Scope::Sync, &entries).await
    }
}
