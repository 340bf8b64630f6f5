mod commands;

use commands::AppState;
use std::error::Error;
use std::sync::Arc;
use tauri::{Manager, PhysicalPosition, PhysicalSize, RunEvent, WindowEvent};
use teleai::{logging, AppConfig, GenerationCoordinator, OllamaModel, OllamaTranslator, Store, StoreError};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

// Save window state
async fn save_window_state(window: &tauri::Window, store: &Store) -> Result<(), StoreError> {
    if let Ok(position) = window.outer_position() {
        store.update_config_value("window_x", &position.x.to_string()).await?;
        store.update_config_value("window_y", &position.y.to_string()).await?;
    }

    if let Ok(size) = window.outer_size() {
        store.update_config_value("window_width", &size.width.to_string()).await?;
        store.update_config_value("window_height", &size.height.to_string()).await?;
    }

    Ok(())
}

async fn stored_number<T: std::str::FromStr>(store: &Store, key: &str, default: T) -> Result<T, StoreError> {
    Ok(store
        .get_config_value(key)
        .await?
        .and_then(|value| value.parse().ok())
        .unwrap_or(default))
}

// Load window state
async fn load_window_state(window: &tauri::Window, store: &Store) -> Result<(), Box<dyn Error>> {
    let x: i32 = stored_number(store, "window_x", 100).await?;
    let y: i32 = stored_number(store, "window_y", 100).await?;
    let width: u32 = stored_number(store, "window_width", 380).await?;
    let height: u32 = stored_number(store, "window_height", 560).await?;

    window.set_position(tauri::Position::Physical(PhysicalPosition::new(x, y)))?;
    window.set_size(PhysicalSize::new(width, height))?;
    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut config = AppConfig::from_env()?;
    let store = Store::open(&config.database_path())?;
    tauri::async_runtime::block_on(config.apply_stored_overrides(&store))?;
    info!(url = %config.ollama_url, model = %config.model, "starting TeleAI");

    let model = OllamaModel::new(&config.ollama_url, &config.model);
    let state = AppState {
        store: store.clone(),
        coordinator: Arc::new(GenerationCoordinator::new(model.clone(), store.clone())),
        translator: OllamaTranslator::new(model),
        teleprompter: Mutex::new(None),
    };

    let app = tauri::Builder::default()
        .manage(state)
        .setup(move |app| {
            let window = app.get_window("main").ok_or("main window is missing")?;

            if let Err(e) = tauri::async_runtime::block_on(load_window_state(&window, &store)) {
                warn!(error = %e, "failed to restore window state");
            }

            let window_clone = window.clone();
            window.on_window_event(move |event| {
                if matches!(event, WindowEvent::Resized(_) | WindowEvent::Moved(_)) {
                    let window = window_clone.clone();
                    let store = store.clone();
                    tauri::async_runtime::spawn(async move {
                        if let Err(e) = save_window_state(&window, &store).await {
                            warn!(error = %e, "failed to save window state");
                        }
                    });
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::generate_content,
            commands::cancel_generation,
            commands::generation_status,
            commands::load_popup_preferences,
            commands::load_models,
            commands::get_selected_model,
            commands::save_selected_model,
            commands::open_teleprompter,
            commands::open_settings,
            commands::teleprompter_load,
            commands::teleprompter_snapshot,
            commands::teleprompter_toggle,
            commands::teleprompter_reset,
            commands::teleprompter_manual_scroll,
            commands::teleprompter_set_speed,
            commands::teleprompter_set_text_size,
            commands::teleprompter_set_content_extent,
            commands::teleprompter_shortcut,
            commands::teleprompter_open_editor,
            commands::teleprompter_save_content,
            commands::teleprompter_close_editor,
            commands::teleprompter_translate,
            commands::load_settings,
            commands::save_settings,
            commands::reset_settings
        ])
        .build(tauri::generate_context!())?;

    app.run(|handle, event| {
        if let RunEvent::Exit = event {
            let state = handle.state::<AppState>();
            tauri::async_runtime::block_on(async {
                if let Some(teleprompter) = state.teleprompter.lock().await.take() {
                    teleprompter.shutdown().await;
                }
                state.coordinator.shutdown().await;
            });
        }
    });
    Ok(())
}

// application entry point
fn main() {
    logging::init_logging();
    if let Err(e) = run() {
        error!(error = %e, "TeleAI failed to start");
        std::process::exit(1);
    }
}
