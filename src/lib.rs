mod analysis;
mod capture;
mod hotkeys;
mod overlay;
mod settings;
mod utils;

use std::sync::{Arc, Mutex};

use analysis::{AnalysisOrchestrator, OpenAiClient};
use capture::{CaptureStore, XcapScreenSource};
use log::warn;
use overlay::{OverlayController, TauriOverlay};
use settings::{ApiKey, SettingsStore};
use tauri::{Manager, RunEvent, State};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};

pub(crate) struct AppState {
    pub(crate) overlay: OverlayController,
    pub(crate) captures: Arc<Mutex<CaptureStore>>,
    pub(crate) analysis: Arc<AnalysisOrchestrator<OpenAiClient>>,
}

#[tauri::command]
fn get_display_text(state: State<AppState>) -> Result<String, String> {
    Ok(state.overlay.display_text())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(err) = dotenvy::dotenv() {
        log::debug!("No .env file loaded: {err}");
    }

    log::info!("ghostpane starting up...");

    let app = tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| {
                    if event.state() != ShortcutState::Pressed {
                        return;
                    }
                    if let Some(action) = hotkeys::action_for(shortcut) {
                        hotkeys::dispatch(app, action);
                    }
                })
                .build(),
        )
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let config_dir = app
                    .path()
                    .app_config_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                let cache_dir = app
                    .path()
                    .app_cache_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&config_dir)?;

                let settings_path = config_dir.join("settings.json");
                let settings_exists = settings_path.exists();
                let settings = SettingsStore::new(settings_path)?;
                if !settings_exists {
                    settings.persist()?;
                }

                let prompt_path = config_dir.join("prompt");
                settings::ensure_prompt_template(&prompt_path)?;

                let capture = settings.capture();
                let store = CaptureStore::new(
                    cache_dir.join("captures"),
                    Arc::new(XcapScreenSource),
                    capture.width,
                    capture.height,
                )?;
                store.remove_stale()?;
                log::info!("Screenshots are kept in {}", store.dir().display());
                let captures = Arc::new(Mutex::new(store));

                let api_key = ApiKey::from_env();
                if api_key.is_none() {
                    warn!(
                        "{} is not set; requests will be rejected as unauthorized",
                        settings::API_KEY_ENV
                    );
                }

                let model = settings.model();
                let window = Arc::new(TauriOverlay::initialize(app.handle())?);
                let overlay = OverlayController::new(window.clone(), window);

                let analysis = AnalysisOrchestrator::new(
                    Arc::clone(&captures),
                    OpenAiClient::new(model.endpoint.clone(), api_key),
                    overlay.clone(),
                    model,
                    prompt_path,
                    hotkeys::capture_hotkey_label(),
                );

                app.manage(AppState {
                    overlay,
                    captures,
                    analysis: Arc::new(analysis),
                });

                for (shortcut, action) in hotkeys::bindings() {
                    app.global_shortcut().register(shortcut)?;
                    log::debug!("Registered {shortcut:?} for {action:?}");
                }

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![get_display_text])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| match event {
        // Closing the overlay quits everywhere except macOS, where the app
        // stays resident with its shortcuts.
        #[cfg(target_os = "macos")]
        RunEvent::ExitRequested { api, code: None, .. } => {
            api.prevent_exit();
        }
        RunEvent::Exit => {
            if let Err(err) = app_handle.global_shortcut().unregister_all() {
                log::error!("Failed to unregister shortcuts: {err}");
            }
        }
        _ => {}
    });
}
