// Application configuration: model endpoint, model name and data location

use crate::error::ConfigError;
use crate::store::{keys, Store};

use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DATABASE_FILE: &str = "teleai.db";

pub const ENV_OLLAMA_URL: &str = "TELEAI_OLLAMA_URL";
pub const ENV_MODEL: &str = "TELEAI_MODEL";
pub const ENV_DATA_DIR: &str = "TELEAI_DATA_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub ollama_url: String,
    pub model: String,
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            data_dir: default_data_dir(),
        }
    }
}

/// Platform data directory, falling back to the working directory.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("teleai")
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from defaults overridden by `lookup(name)`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            config.ollama_url = url.trim().to_string();
        }
        if let Some(model) = lookup(ENV_MODEL) {
            config.model = model.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ollama_url.is_empty() {
            return Err(ConfigError::Validation {
                message: "Model server URL must not be empty".to_string(),
            });
        }
        if !self.ollama_url.starts_with("http://") && !self.ollama_url.starts_with("https://") {
            return Err(ConfigError::Validation {
                message: format!("Model server URL must be http(s): {}", self.ollama_url),
            });
        }
        if self.model.is_empty() {
            return Err(ConfigError::Validation {
                message: "Model name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// A model picked in the app wins over the environment default.
    pub async fn apply_stored_overrides(&mut self, store: &Store) -> Result<(), ConfigError> {
        if let Some(model) = store.get_config_value(keys::SELECTED_MODEL).await? {
            let model = model.trim();
            if !model.is_empty() && model != self.model {
                info!(model, "using selected model");
                self.model = model.to_string();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.database_path().ends_with("teleai/teleai.db"));
    }

    #[test]
    fn environment_overrides_apply() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_OLLAMA_URL, "http://gpu-box:11434"),
            (ENV_MODEL, " mistral "),
            (ENV_DATA_DIR, "/tmp/teleai-test"),
        ]))
        .unwrap();

        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.model, "mistral");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/teleai-test/teleai.db"));
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_MODEL, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_OLLAMA_URL, "localhost:11434")])).unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[tokio::test]
    async fn selected_model_overrides_default() {
        let store = Store::open_in_memory().unwrap();
        let mut config = AppConfig::from_lookup(lookup(&[])).unwrap();

        config.apply_stored_overrides(&store).await.unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);

        store.update_config_value(keys::SELECTED_MODEL, "phi3").await.unwrap();
        config.apply_stored_overrides(&store).await.unwrap();
        assert_eq!(config.model, "phi3");
    }
}
