//! Teleprompter view controller.
//!
//! Owns one [`ScrollEngine`] and the frame schedule that drives it, plus the
//! displayed text, the editor and translation. Hosts forward user input as
//! plain method calls and receive scroll offsets through a [`ScrollView`].

use crate::error::{StoreError, TranslateError};
use crate::scroll::{PlayState, ScrollEngine, ScrollMetrics, ScrollState};
use crate::settings::Preferences;
use crate::store::{keys, Scope, Store};
use crate::translate::{translate_text, LanguageDetector, Translator};

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Period of the tick source driving the engine.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub const SPEED_STEP: f64 = 0.1;
pub const TEXT_SIZE_STEP: i32 = 2;

pub const WELCOME_TEXT: &str = "Welcome to TeleAI! Generate content from the extension popup to get started, or paste your own text here by double-clicking to edit.";

/// Receives the scroll offset to render after each change.
pub trait ScrollView: Send + Sync + 'static {
    fn render_offset(&self, offset: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    TogglePlayback,
    Reset,
    ToggleFullscreen,
    SpeedUp,
    SlowDown,
    LargerText,
    SmallerText,
    ExitFullscreen,
}

impl Shortcut {
    /// Maps a key code (`KeyboardEvent.code` naming) to a shortcut.
    /// `command` is Ctrl on Linux/Windows and Cmd on macOS.
    pub fn from_key(code: &str, command: bool) -> Option<Self> {
        match (code, command) {
            ("Space", _) => Some(Shortcut::TogglePlayback),
            ("KeyR", true) => Some(Shortcut::Reset),
            ("KeyF", true) => Some(Shortcut::ToggleFullscreen),
            ("ArrowUp", _) => Some(Shortcut::SpeedUp),
            ("ArrowDown", _) => Some(Shortcut::SlowDown),
            ("Equal", true) => Some(Shortcut::LargerText),
            ("Minus", true) => Some(Shortcut::SmallerText),
            ("Escape", _) => Some(Shortcut::ExitFullscreen),
            _ => None,
        }
    }
}

/// Window-level work a shortcut asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HostAction {
    ToggleFullscreen,
    ExitFullscreen,
}

/// Everything the view needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub paragraphs: Vec<String>,
    pub play_state: PlayState,
    pub scroll: ScrollState,
    pub text_size: u32,
    pub background_color: String,
    pub text_color: String,
    pub editing: bool,
}

#[derive(Default)]
struct Content {
    /// Text before translation; what the editor saves to.
    original: String,
    paragraphs: Vec<String>,
    editing: bool,
}

pub struct Teleprompter<V> {
    engine: Arc<Mutex<ScrollEngine>>,
    frames: Mutex<Option<CancellationToken>>,
    content: Mutex<Content>,
    preferences: Mutex<Preferences>,
    view: Arc<V>,
    store: Store,
}

impl<V: ScrollView> Teleprompter<V> {
    pub fn new(view: V, store: Store) -> Self {
        let mut engine = ScrollEngine::default();
        engine.stop();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            frames: Mutex::new(None),
            content: Mutex::new(Content::default()),
            preferences: Mutex::new(Preferences::default()),
            view: Arc::new(view),
            store,
        }
    }

    /// Applies stored preferences, shows the stored content (or the welcome
    /// text) and starts playback.
    pub async fn load(&self) -> ViewSnapshot {
        let preferences = match Preferences::load(&self.store).await {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!(error = %e, "failed to load settings, using defaults");
                Preferences::default()
            }
        };
        {
            let mut engine = self.engine.lock().await;
            engine.set_speed(preferences.default_speed);
            engine.set_text_size(preferences.default_text_size);
        }
        *self.preferences.lock().await = preferences;

        let text = match self
            .store
            .get::<String>(Scope::Local, keys::GENERATED_CONTENT)
            .await
        {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => WELCOME_TEXT.to_string(),
            Err(e) => {
                warn!(error = %e, "failed to load content");
                WELCOME_TEXT.to_string()
            }
        };
        self.content.lock().await.original = text.clone();
        self.set_content(&text).await;

        self.start().await;
        self.snapshot().await
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let (scroll, play_state, text_size) = {
            let engine = self.engine.lock().await;
            (engine.state(), engine.play_state(), engine.text_size())
        };
        let content = self.content.lock().await;
        let preferences = self.preferences.lock().await;
        ViewSnapshot {
            paragraphs: content.paragraphs.clone(),
            play_state,
            scroll,
            text_size,
            background_color: preferences.background_color.clone(),
            text_color: preferences.text_color.clone(),
            editing: content.editing,
        }
    }

    /// Starts playback from the top and (re)schedules frames.
    pub async fn start(&self) {
        let mut frames = self.frames.lock().await;
        // The old schedule must be gone before a new one exists.
        if let Some(previous) = frames.take() {
            previous.cancel();
        }

        {
            let mut engine = self.engine.lock().await;
            engine.start();
            self.view.render_offset(engine.position());
        }

        let token = CancellationToken::new();
        tokio::spawn(run_frames(
            self.engine.clone(),
            self.view.clone(),
            token.clone(),
        ));
        *frames = Some(token);
        debug!("playback started");
    }

    pub async fn stop(&self) {
        let mut frames = self.frames.lock().await;
        if let Some(token) = frames.take() {
            token.cancel();
        }
        self.engine.lock().await.stop();
    }

    pub async fn toggle(&self) -> PlayState {
        let running = self.engine.lock().await.is_running();
        if running {
            self.stop().await;
            PlayState::Stopped
        } else {
            self.start().await;
            PlayState::Running
        }
    }

    pub async fn reset(&self) {
        self.engine.lock().await.reset();
        self.view.render_offset(0.0);
    }

    /// The user dragged the text. Stops playback; rewinds when they reached the end.
    pub async fn manual_scroll(&self, metrics: ScrollMetrics) {
        let mut frames = self.frames.lock().await;
        if let Some(token) = frames.take() {
            token.cancel();
        }
        let rewound = self.engine.lock().await.manual_scroll(metrics);
        if rewound {
            self.view.render_offset(0.0);
        }
    }

    pub async fn set_speed(&self, speed: f64) -> f64 {
        self.engine.lock().await.set_speed(speed)
    }

    pub async fn adjust_speed(&self, delta: f64) -> f64 {
        self.engine.lock().await.adjust_speed(delta)
    }

    pub async fn set_text_size(&self, size: u32) -> u32 {
        self.engine.lock().await.set_text_size(size)
    }

    pub async fn adjust_text_size(&self, delta: i32) -> u32 {
        self.engine.lock().await.adjust_text_size(delta)
    }

    /// Called by the view whenever the laid-out text height changes.
    pub async fn set_content_extent(&self, extent: f64) {
        self.engine.lock().await.set_content_extent(extent);
    }

    pub async fn handle_shortcut(&self, shortcut: Shortcut) -> Option<HostAction> {
        match shortcut {
            Shortcut::TogglePlayback => {
                self.toggle().await;
            }
            Shortcut::Reset => self.reset().await,
            Shortcut::SpeedUp => {
                self.adjust_speed(SPEED_STEP).await;
            }
            Shortcut::SlowDown => {
                self.adjust_speed(-SPEED_STEP).await;
            }
            Shortcut::LargerText => {
                self.adjust_text_size(TEXT_SIZE_STEP).await;
            }
            Shortcut::SmallerText => {
                self.adjust_text_size(-TEXT_SIZE_STEP).await;
            }
            Shortcut::ToggleFullscreen => return Some(HostAction::ToggleFullscreen),
            Shortcut::ExitFullscreen => return Some(HostAction::ExitFullscreen),
        }
        None
    }

    /// Stops playback and returns the displayed text for editing.
    pub async fn open_editor(&self) -> String {
        self.stop().await;
        let mut content = self.content.lock().await;
        content.editing = true;
        content.paragraphs.join("\n")
    }

    /// Replaces and persists the content, then closes the editor.
    ///
    /// The view is updated even if persisting fails.
    pub async fn save_content(&self, text: &str) -> Result<(), StoreError> {
        self.set_content(text).await;
        {
            let mut content = self.content.lock().await;
            content.original = text.to_string();
            content.editing = false;
        }
        self.store
            .set(Scope::Local, keys::GENERATED_CONTENT, text)
            .await?;
        info!(chars = text.len(), "content saved from editor");
        Ok(())
    }

    pub async fn close_editor(&self) {
        self.content.lock().await.editing = false;
    }

    pub async fn is_editing(&self) -> bool {
        self.content.lock().await.editing
    }

    pub async fn paragraphs(&self) -> Vec<String> {
        self.content.lock().await.paragraphs.clone()
    }

    /// Shows the original text translated into `target`. An empty target
    /// restores the original. On failure the original is shown and the
    /// error is returned for display.
    pub async fn translate<T, D>(
        &self,
        translator: &T,
        detector: &D,
        target: &str,
    ) -> Result<(), TranslateError>
    where
        T: Translator,
        D: LanguageDetector,
    {
        let original = self.content.lock().await.original.clone();
        if target.is_empty() {
            self.set_content(&original).await;
            return Ok(());
        }

        match translate_text(translator, detector, &original, target).await {
            Ok(translated) => {
                self.set_content(&translated).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, language = target, "translation failed, showing original");
                self.set_content(&original).await;
                Err(e)
            }
        }
    }

    /// Stops the frame schedule for good.
    pub async fn shutdown(&self) {
        self.stop().await;
    }

    async fn set_content(&self, text: &str) {
        let paragraphs = format_paragraphs(text);
        self.content.lock().await.paragraphs = paragraphs;
        self.reset().await;
    }
}

async fn run_frames<V: ScrollView>(
    engine: Arc<Mutex<ScrollEngine>>,
    view: Arc<V>,
    token: CancellationToken,
) {
    let mut ticker = interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; playback begins one frame later.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let mut engine = engine.lock().await;
                if token.is_cancelled() {
                    break;
                }
                match engine.advance() {
                    Some(offset) => view.render_offset(offset),
                    None => break,
                }
            }
        }
    }
}

/// Splits text into trimmed, non-empty paragraphs, one per line.
pub fn format_paragraphs(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
