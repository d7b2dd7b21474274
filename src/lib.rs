pub mod analytics;
mod commands;
pub mod events;
pub mod intents;
pub mod logging;
pub mod models;
mod scheduler;
pub mod state;
pub mod storage;
pub mod store;
pub mod timer;

#[cfg(all(feature = "app", not(test)))]
use tauri::Manager;

#[cfg(all(feature = "app", not(test)))]
use crate::commands::*;
#[cfg(all(feature = "app", not(test)))]
use crate::logging::init_logging;
#[cfg(all(feature = "app", not(test)))]
use crate::scheduler::start_scheduler;
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::Storage;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
#[cfg(all(feature = "app", not(test)))]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            if let Err(error) = init_logging(&data_dir) {
                eprintln!("logger init failed: {error}");
            }

            let storage = Storage::new(data_dir);
            storage.ensure_dirs()?;
            let store = storage.load_store();
            log::info!(
                "store loaded tasks={} habits={} goals={} log_entries={}",
                store.tasks.len(),
                store.habits.len(),
                store.goals.len(),
                store.activity_log.len()
            );

            let state = AppState::new(store);
            app.manage(state.clone());
            start_scheduler(app.handle().clone(), state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_state,
            dispatch_intent,
            load_analytics,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
