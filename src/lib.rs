//! TeleAI core: AI content generation for a teleprompter and the
//! auto-scrolling engine that plays it back.
//!
//! The desktop shell (`desktop` feature) only forwards commands to the types
//! defined here.

pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod model;
pub mod scroll;
pub mod settings;
pub mod store;
pub mod teleprompter;
pub mod translate;

pub use config::AppConfig;
pub use error::{ConfigError, GenerationError, ServiceError, StoreError, TranslateError};
pub use generation::{GenerationCoordinator, GenerationStatus, StatusKind, StatusReport};
pub use model::{Availability, LanguageModel, ModelSession, OllamaModel};
pub use scroll::{PlayState, ScrollEngine, ScrollMetrics, ScrollState};
pub use settings::{PopupPreferences, Preferences};
pub use store::{Scope, Store};
pub use teleprompter::{HostAction, ScrollView, Shortcut, Teleprompter, ViewSnapshot};
pub use translate::{LanguageDetector, OllamaTranslator, Translator};
