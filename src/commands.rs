// Handles Tauri command definitions

use std::sync::Arc;

use serde::Serialize;
use tauri::{command, AppHandle, Manager, State, Window, WindowBuilder, WindowUrl};
use teleai::generation::{GenerationCoordinator, StatusReport};
use teleai::scroll::{PlayState, ScrollMetrics};
use teleai::settings::{PopupPreferences, Preferences};
use teleai::store::{keys, Store};
use teleai::teleprompter::{HostAction, ScrollView, Shortcut, Teleprompter, ViewSnapshot};
use teleai::{GenerationStatus, OllamaModel, OllamaTranslator};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const SCROLL_EVENT: &str = "teleprompter://scroll";
pub const TELEPROMPTER_WINDOW: &str = "teleprompter";
pub const SETTINGS_WINDOW: &str = "settings";

pub struct AppState {
    pub store: Store,
    pub coordinator: Arc<GenerationCoordinator<OllamaModel>>,
    pub translator: OllamaTranslator,
    pub teleprompter: Mutex<Option<Arc<Teleprompter<WindowView>>>>,
}

/// Pushes scroll offsets to the teleprompter window.
pub struct WindowView(Window);

impl ScrollView for WindowView {
    fn render_offset(&self, offset: f64) {
        if let Err(e) = self.0.emit(SCROLL_EVENT, offset) {
            warn!(error = %e, "failed to emit scroll offset");
        }
    }
}

#[derive(Serialize)]
pub struct GenerationReply {
    pub status: StatusReport,
    pub content: Option<String>,
}

async fn teleprompter(state: &AppState) -> Result<Arc<Teleprompter<WindowView>>, String> {
    state
        .teleprompter
        .lock()
        .await
        .clone()
        .ok_or_else(|| "Teleprompter is not open".to_string())
}

// Popup

#[command]
pub async fn generate_content(
    prompt: String,
    word_count: u32,
    state: State<'_, AppState>,
) -> Result<GenerationReply, String> {
    let outcome = state.coordinator.submit(&prompt, word_count).await;
    let status = StatusReport::from_outcome(&outcome);
    Ok(GenerationReply {
        status,
        content: outcome.ok(),
    })
}

#[command]
pub async fn cancel_generation(state: State<'_, AppState>) -> Result<StatusReport, String> {
    state.coordinator.cancel().await.map_err(|e| e.to_string())?;
    Ok(StatusReport::cancelled())
}

#[command]
pub async fn generation_status(state: State<'_, AppState>) -> Result<GenerationStatus, String> {
    state
        .coordinator
        .resume_observation()
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn load_popup_preferences(state: State<'_, AppState>) -> Result<PopupPreferences, String> {
    PopupPreferences::load(&state.store)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn load_models(state: State<'_, AppState>) -> Result<Vec<String>, String> {
    state
        .coordinator
        .model()
        .fetch_models()
        .await
        .map_err(|_| "Failed to load models".to_string())
}

// Get selected model
#[command]
pub async fn get_selected_model(state: State<'_, AppState>) -> Result<String, String> {
    state
        .store
        .get_config_value(keys::SELECTED_MODEL)
        .await
        .map(|model| model.unwrap_or_else(|| state.coordinator.model().model_name().to_string()))
        .map_err(|e| e.to_string())
}

// Save selected model; used from the next launch on
#[command]
pub async fn save_selected_model(model_name: String, state: State<'_, AppState>) -> Result<(), String> {
    state
        .store
        .update_config_value(keys::SELECTED_MODEL, &model_name)
        .await
        .map_err(|e| e.to_string())?;
    info!(model = %model_name, "selected model saved");
    Ok(())
}

// Navigation

fn open_window(app: &AppHandle, label: &str, page: &str, title: &str) -> Result<(), String> {
    if let Some(window) = app.get_window(label) {
        return window.set_focus().map_err(|e| e.to_string());
    }
    WindowBuilder::new(app, label, WindowUrl::App(page.into()))
        .title(title)
        .build()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[command]
pub async fn open_teleprompter(app: AppHandle) -> Result<(), String> {
    open_window(&app, TELEPROMPTER_WINDOW, "teleprompter.html", "TeleAI Teleprompter")
}

#[command]
pub async fn open_settings(app: AppHandle) -> Result<(), String> {
    open_window(&app, SETTINGS_WINDOW, "options.html", "TeleAI Settings")
}

// Teleprompter

#[command]
pub async fn teleprompter_load(window: Window, state: State<'_, AppState>) -> Result<ViewSnapshot, String> {
    let teleprompter = Arc::new(Teleprompter::new(WindowView(window), state.store.clone()));
    let previous = state.teleprompter.lock().await.replace(teleprompter.clone());
    if let Some(previous) = previous {
        previous.shutdown().await;
    }
    Ok(teleprompter.load().await)
}

#[command]
pub async fn teleprompter_snapshot(state: State<'_, AppState>) -> Result<ViewSnapshot, String> {
    Ok(teleprompter(&state).await?.snapshot().await)
}

#[command]
pub async fn teleprompter_toggle(state: State<'_, AppState>) -> Result<PlayState, String> {
    Ok(teleprompter(&state).await?.toggle().await)
}

#[command]
pub async fn teleprompter_reset(state: State<'_, AppState>) -> Result<(), String> {
    teleprompter(&state).await?.reset().await;
    Ok(())
}

#[command]
pub async fn teleprompter_manual_scroll(
    metrics: ScrollMetrics,
    state: State<'_, AppState>,
) -> Result<(), String> {
    teleprompter(&state).await?.manual_scroll(metrics).await;
    Ok(())
}

#[command]
pub async fn teleprompter_set_speed(speed: f64, state: State<'_, AppState>) -> Result<f64, String> {
    Ok(teleprompter(&state).await?.set_speed(speed).await)
}

#[command]
pub async fn teleprompter_set_text_size(size: u32, state: State<'_, AppState>) -> Result<u32, String> {
    Ok(teleprompter(&state).await?.set_text_size(size).await)
}

#[command]
pub async fn teleprompter_set_content_extent(extent: f64, state: State<'_, AppState>) -> Result<(), String> {
    teleprompter(&state).await?.set_content_extent(extent).await;
    Ok(())
}

#[command]
pub async fn teleprompter_shortcut(
    code: String,
    command: bool,
    window: Window,
    state: State<'_, AppState>,
) -> Result<Option<HostAction>, String> {
    let Some(shortcut) = Shortcut::from_key(&code, command) else {
        return Ok(None);
    };
    let action = teleprompter(&state).await?.handle_shortcut(shortcut).await;
    match action {
        Some(HostAction::ToggleFullscreen) => {
            let fullscreen = window.is_fullscreen().map_err(|e| e.to_string())?;
            window.set_fullscreen(!fullscreen).map_err(|e| e.to_string())?;
        }
        Some(HostAction::ExitFullscreen) => {
            window.set_fullscreen(false).map_err(|e| e.to_string())?;
        }
        None => {}
    }
    Ok(action)
}

#[command]
pub async fn teleprompter_open_editor(state: State<'_, AppState>) -> Result<String, String> {
    Ok(teleprompter(&state).await?.open_editor().await)
}

#[command]
pub async fn teleprompter_save_content(text: String, state: State<'_, AppState>) -> Result<(), String> {
    teleprompter(&state)
        .await?
        .save_content(&text)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn teleprompter_close_editor(state: State<'_, AppState>) -> Result<(), String> {
    teleprompter(&state).await?.close_editor().await;
    Ok(())
}

#[command]
pub async fn teleprompter_translate(
    target_language: String,
    state: State<'_, AppState>,
) -> Result<ViewSnapshot, String> {
    let teleprompter = teleprompter(&state).await?;
    teleprompter
        .translate(&state.translator, &state.translator, &target_language)
        .await
        .map_err(|e| format!("Error translating content: {e} Showing original content instead."))?;
    Ok(teleprompter.snapshot().await)
}

// Settings

#[command]
pub async fn load_settings(state: State<'_, AppState>) -> Result<Preferences, String> {
    Preferences::load(&state.store).await.map_err(|e| e.to_string())
}

#[command]
pub async fn save_settings(preferences: Preferences, state: State<'_, AppState>) -> Result<(), String> {
    preferences.save(&state.store).await.map_err(|e| e.to_string())
}

#[command]
pub async fn reset_settings(state: State<'_, AppState>) -> Result<Preferences, String> {
    Preferences::reset(&state.store).await.map_err(|e| e.to_string())
}
