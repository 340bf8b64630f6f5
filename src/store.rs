// Handles SQLite persistence for the two storage scopes

use crate::error::StoreError;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Storage keys shared by the popup, the teleprompter and the options view.
pub mod keys {
    // sync scope
    pub const DEFAULT_SPEED: &str = "defaultSpeed";
    pub const DEFAULT_TEXT_SIZE: &str = "defaultTextSize";
    pub const BACKGROUND_COLOR: &str = "backgroundColor";
    pub const TEXT_COLOR: &str = "textColor";
    pub const LAST_PROMPT: &str = "lastPrompt";
    pub const WORD_COUNT: &str = "wordCount";

    // local scope
    pub const GENERATED_CONTENT: &str = "generatedContent";
    pub const IS_GENERATING: &str = "isGenerating";
    pub const GENERATION_STATUS: &str = "generationStatus";

    // app_config
    pub const SELECTED_MODEL: &str = "selected_model_name";
}

/// Which storage area a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// User preferences.
    Sync,
    /// Session and content state.
    Local,
}

impl Scope {
    fn table(self) -> &'static str {
        match self {
            Scope::Sync => "sync_storage",
            Scope::Local => "local_storage",
        }
    }
}

/// Persisted key-value store. Values are stored as JSON text.
///
/// Cloning is cheap; all clones share one connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens (or creates) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_config (
                key TEXT PRIMARY KEY,
                value TEXT
            )",
            [],
        )?;

        for scope in [Scope::Sync, Scope::Local] {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    scope.table()
                ),
                [],
            )?;
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Reads a value. Returns `None` if the key was never written.
    pub async fn get<T: DeserializeOwned>(
        &self,
        scope: Scope,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let raw: Option<String> = {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", scope.table()),
                [key],
                |row| row.get(0),
            )
            .optional()?
        };

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    pub async fn set<T: Serialize + ?Sized>(
        &self,
        scope: Scope,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let text = encode(key, value)?;
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (key, value) VALUES (?1, ?2)",
                scope.table()
            ),
            params![key, text],
        )?;
        Ok(())
    }

    /// Writes several keys in one transaction so readers never observe half of them.
    pub async fn set_many(&self, scope: Scope, entries: &[(&str, Value)]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO {} (key, value) VALUES (?1, ?2)",
                scope.table()
            ))?;
            for (key, value) in entries {
                stmt.execute(params![key, encode(key, value)?])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub async fn remove(&self, scope: Scope, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!("DELETE FROM {} WHERE key = ?1", scope.table()),
            [key],
        )?;
        Ok(())
    }

    /// Removes every key in `scope`.
    pub async fn clear(&self, scope: Scope) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(&format!("DELETE FROM {}", scope.table()), [])?;
        Ok(())
    }

    /// Inserts or updates a configuration key-value pair.
    pub async fn update_config_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO app_config (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.conn.lock().await.execute_batch(sql)?;
        Ok(())
    }

    /// Retrieves a configuration value by key. Returns `None` if the key doesn't exist.
    pub async fn get_config_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().await;
        let value = conn
            .query_row(
                "SELECT value FROM app_config WHERE key = ?1",
                [key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}
