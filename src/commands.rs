use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::analytics::AnalyticsPayload;
use crate::events::{DashboardSnapshot, TimersPayload};
#[cfg(all(feature = "app", not(test)))]
use crate::events::{
    MediaPayload, EVENT_MEDITATION_MEDIA, EVENT_STATE_UPDATED, EVENT_TIMER_UPDATED,
};
use crate::intents::Intent;
use crate::state::AppState;
use crate::storage::{Storage, StorageError};
use crate::timer::MediaCue;

#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter, Manager, Runtime, State};
#[cfg(all(feature = "app", not(test)))]
use tauri_plugin_notification::NotificationExt;

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Host services the command layer and the ticker need.
pub(crate) trait CommandCtx {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_state_updated(&self, payload: DashboardSnapshot);
    fn emit_timer_updated(&self, payload: TimersPayload);
    fn emit_media(&self, cue: MediaCue);
    fn notify(&self, title: &str, body: &str);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// Writes the full store and broadcasts the new snapshot. The write holds the state lock.
pub(crate) fn persist(
    ctx: &impl CommandCtx,
    state: &AppState,
    now: &DateTime<Local>,
) -> Result<(), StorageError> {
    let root = ctx.app_data_dir()?;
    let storage = Storage::new(root);
    storage.ensure_dirs()?;
    state.with_store(|store| storage.save_store(store))?;
    ctx.emit_state_updated(state.snapshot(now));
    Ok(())
}

#[cfg(all(feature = "app", not(test)))]
pub(crate) struct TauriCommandCtx<'a, R: Runtime> {
    pub(crate) app: &'a AppHandle<R>,
}

#[cfg(all(feature = "app", not(test)))]
impl<R: Runtime> CommandCtx for TauriCommandCtx<'_, R> {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError> {
        self.app
            .path()
            .app_data_dir()
            .map_err(|err| StorageError::Io(std::io::Error::other(err.to_string())))
    }

    fn emit_state_updated(&self, payload: DashboardSnapshot) {
        let _ = self.app.emit(EVENT_STATE_UPDATED, payload);
    }

    fn emit_timer_updated(&self, payload: TimersPayload) {
        let _ = self.app.emit(EVENT_TIMER_UPDATED, payload);
    }

    fn emit_media(&self, cue: MediaCue) {
        let _ = self.app.emit(EVENT_MEDITATION_MEDIA, MediaPayload { cue });
    }

    fn notify(&self, title: &str, body: &str) {
        if let Err(error) = self
            .app
            .notification()
            .builder()
            .title(title)
            .body(body)
            .show()
        {
            log::warn!("notification failed: {error}");
        }
    }
}

fn load_state_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    now: &DateTime<Local>,
) -> CommandResult<DashboardSnapshot> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    state.with_store_mut(|store| *store = storage.load_store());
    ok(state.snapshot(now))
}

fn dispatch_intent_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    intent: Intent,
    now: &DateTime<Local>,
) -> CommandResult<DashboardSnapshot> {
    let outcome = state.dispatch(intent, now);
    if outcome.persist {
        if let Err(error) = persist(ctx, state, now) {
            log::error!("persist failed: {error}");
            return err(&format!("storage error: {error:?}"));
        }
    }
    if let Some(cue) = outcome.media {
        ctx.emit_media(cue);
    }
    if outcome.applied && !outcome.persist {
        ctx.emit_timer_updated(state.timers());
    }
    ok(state.snapshot(now))
}

fn load_analytics_impl(state: &AppState, now: &DateTime<Local>) -> CommandResult<AnalyticsPayload> {
    ok(state.analytics(now))
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_state(app: AppHandle, state: State<AppState>) -> CommandResult<DashboardSnapshot> {
    let ctx = TauriCommandCtx { app: &app };
    load_state_impl(&ctx, state.inner(), &Local::now())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn dispatch_intent(
    app: AppHandle,
    state: State<AppState>,
    intent: Intent,
) -> CommandResult<DashboardSnapshot> {
    let ctx = TauriCommandCtx { app: &app };
    dispatch_intent_impl(&ctx, state.inner(), intent, &Local::now())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_analytics(state: State<AppState>) -> CommandResult<AnalyticsPayload> {
    load_analytics_impl(state.inner(), &Local::now())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::store::Store;
    use crate::timer::TimerMode;
    use chrono::TimeZone;
    use crate::scheduler::run_tick;
    use std::fs;
    use std::sync::Mutex;
    use std::thread;

    pub(crate) struct TestCtx {
        root: tempfile::TempDir,
        app_data_dir_error: Option<String>,
        pub(crate) emitted: Mutex<Vec<DashboardSnapshot>>,
        pub(crate) timer_updates: Mutex<Vec<TimersPayload>>,
        pub(crate) media: Mutex<Vec<MediaCue>>,
        pub(crate) notifications: Mutex<Vec<(String, String)>>,
    }

    impl TestCtx {
        pub(crate) fn new() -> Self {
            Self {
                root: tempfile::tempdir().unwrap(),
                app_data_dir_error: None,
                emitted: Mutex::new(Vec::new()),
                timer_updates: Mutex::new(Vec::new()),
                media: Mutex::new(Vec::new()),
                notifications: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_app_data_dir_error(message: &str) -> Self {
            let mut ctx = Self::new();
            ctx.app_data_dir_error = Some(message.to_string());
            ctx
        }

        pub(crate) fn root_path(&self) -> &std::path::Path {
            self.root.path()
        }
    }

    impl CommandCtx for TestCtx {
        fn app_data_dir(&self) -> Result<PathBuf, StorageError> {
            if let Some(message) = &self.app_data_dir_error {
                return Err(StorageError::Io(std::io::Error::other(message.clone())));
            }
            Ok(self.root.path().to_path_buf())
        }

        fn emit_state_updated(&self, payload: DashboardSnapshot) {
            self.emitted.lock().unwrap().push(payload);
        }

        fn emit_timer_updated(&self, payload: TimersPayload) {
            self.timer_updates.lock().unwrap().push(payload);
        }

        fn emit_media(&self, cue: MediaCue) {
            self.media.lock().unwrap().push(cue);
        }

        fn notify(&self, title: &str, body: &str) {
            self.notifications
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }
    }

    pub(crate) fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).single().unwrap()
    }

    fn add_task(text: &str) -> Intent {
        Intent::AddTask {
            text: text.into(),
            priority: Priority::Medium,
        }
    }

    #[test]
    fn ok_and_err_helpers_construct_expected_shape() {
        let r = ok(123);
        assert!(r.ok);
        assert_eq!(r.data, Some(123));
        assert_eq!(r.error, None);

        let r: CommandResult<i32> = err("nope");
        assert!(!r.ok);
        assert_eq!(r.data, None);
        assert_eq!(r.error, Some("nope".to_string()));
    }

    #[test]
    fn persist_success_and_error_paths() {
        let ctx = TestCtx::new();
        let state = AppState::new(Store::default());
        state.dispatch(add_task("a"), &now());

        persist(&ctx, &state, &now()).unwrap();
        assert!(ctx.root_path().join("tasks.json").is_file());
        assert!(ctx.root_path().join("activity_log.json").is_file());
        assert_eq!(ctx.emitted.lock().unwrap().len(), 1);

        let bad_ctx = TestCtx::with_app_data_dir_error("nope");
        assert!(persist(&bad_ctx, &state, &now()).is_err());

        let ctx2 = TestCtx::new();
        fs::create_dir_all(ctx2.root_path().join("goals.json")).unwrap();
        assert!(persist(&ctx2, &state, &now()).is_err());
        assert!(ctx2.emitted.lock().unwrap().is_empty());
    }

    #[test]
    fn load_state_reads_storage_and_defaults_missing_keys() {
        let state = AppState::new(Store::default());

        let bad_ctx = TestCtx::with_app_data_dir_error("nope");
        let res = load_state_impl(&bad_ctx, &state, &now());
        assert!(!res.ok);

        let ctx = TestCtx::new();
        let res = load_state_impl(&ctx, &state, &now());
        assert!(res.ok);
        let snapshot = res.data.unwrap();
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.theme.color, "hsl(204, 70%, 50%)");

        // Write through one state, reload through another.
        let writer = AppState::new(Store::default());
        dispatch_intent_impl(&ctx, &writer, add_task("carry over"), &now());
        let reader = AppState::new(Store::default());
        let res = load_state_impl(&ctx, &reader, &now());
        assert_eq!(res.data.unwrap().tasks[0].text, "carry over");
    }

    #[test]
    fn dispatch_persists_store_mutations_and_returns_snapshot() {
        let ctx = TestCtx::new();
        let state = AppState::new(Store::default());

        let res = dispatch_intent_impl(&ctx, &state, add_task("write"), &now());
        assert!(res.ok);
        let snapshot = res.data.unwrap();
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(ctx.emitted.lock().unwrap().len(), 1);

        let stored = Storage::new(ctx.root_path().to_path_buf()).load_store();
        assert_eq!(stored.tasks, state.store().tasks);

        // Unknown ids are silent no-ops: nothing written, nothing emitted.
        let res = dispatch_intent_impl(&ctx, &state, Intent::DeleteTask { id: -1 }, &now());
        assert!(res.ok);
        assert_eq!(res.data.unwrap().tasks.len(), 1);
        assert_eq!(ctx.emitted.lock().unwrap().len(), 1);
    }

    #[test]
    fn dispatch_reports_storage_errors() {
        let ctx = TestCtx::with_app_data_dir_error("nope");
        let state = AppState::new(Store::default());
        let res = dispatch_intent_impl(&ctx, &state, add_task("write"), &now());
        assert!(!res.ok);
        assert!(res.error.unwrap().starts_with("storage error"));
    }

    #[test]
    fn timer_intents_emit_timer_updates_and_media_cues() {
        let ctx = TestCtx::new();
        let state = AppState::new(Store::default());

        dispatch_intent_impl(
            &ctx,
            &state,
            Intent::SetWorkMode {
                mode: TimerMode::ShortBreak,
            },
            &now(),
        );
        let updates = ctx.timer_updates.lock().unwrap().clone();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].work.display, "05:00");

        dispatch_intent_impl(&ctx, &state, Intent::StartMeditation, &now());
        dispatch_intent_impl(&ctx, &state, Intent::StartMeditation, &now());
        dispatch_intent_impl(&ctx, &state, Intent::StopMeditation, &now());
        assert_eq!(
            *ctx.media.lock().unwrap(),
            vec![MediaCue::Play, MediaCue::Stop]
        );
        assert!(ctx.emitted.lock().unwrap().is_empty());
        assert!(!ctx.root_path().join("tasks.json").exists());
    }

    #[test]
    fn load_analytics_reflects_logged_activity() {
        let ctx = TestCtx::new();
        let state = AppState::new(Store::default());
        dispatch_intent_impl(&ctx, &state, add_task("a"), &now());
        let id = state.store().tasks[0].id;
        dispatch_intent_impl(&ctx, &state, Intent::ToggleTask { id }, &now());
        dispatch_intent_impl(&ctx, &state, Intent::ToggleTask { id }, &now());

        let res = load_analytics_impl(&state, &now());
        let payload = res.data.unwrap();
        assert_eq!(payload.daily.tasks.iter().sum::<u32>(), 1);
        assert_eq!(payload.categories.tasks, 1);
        assert_eq!(payload.categories.pomodoros, 0);
    }

    #[test]
    fn concurrent_dispatches_all_persist_and_disk_matches_memory() {
        let ctx = TestCtx::new();
        let state = AppState::new(Store::default());

        thread::scope(|scope| {
            for worker in 0..4 {
                let (ctx, state) = (&ctx, &state);
                scope.spawn(move || {
                    for n in 0..25 {
                        let res = dispatch_intent_impl(
                            ctx,
                            state,
                            add_task(&format!("w{worker}-{n}")),
                            &now(),
                        );
                        assert!(res.ok, "{:?}", res.error);
                    }
                });
            }
        });

        let stored = Storage::new(ctx.root_path().to_path_buf()).load_store();
        assert_eq!(stored.tasks.len(), 100);
        assert_eq!(stored, state.store());
    }

    #[test]
    fn ticker_completion_and_dispatch_share_one_store() {
        let ctx = TestCtx::new();
        let state = AppState::new(Store::default());
        state.dispatch(
            Intent::SetWorkMode {
                mode: TimerMode::ShortBreak,
            },
            &now(),
        );
        state.dispatch(Intent::AdjustWork { minutes: -5 }, &now());
        state.dispatch(Intent::StartWork, &now());

        thread::scope(|scope| {
            let (ticker_ctx, ticker_state) = (&ctx, &state);
            scope.spawn(move || {
                for _ in 0..20 {
                    run_tick(ticker_ctx, ticker_state, &now());
                }
            });
            let (ui_ctx, ui_state) = (&ctx, &state);
            scope.spawn(move || {
                for n in 0..20 {
                    let intent = add_task(&format!("t{n}"));
                    let res = dispatch_intent_impl(ui_ctx, ui_state, intent, &now());
                    assert!(res.ok, "{:?}", res.error);
                }
            });
        });

        let stored = Storage::new(ctx.root_path().to_path_buf()).load_store();
        assert_eq!(stored, state.store());
        assert_eq!(stored.tasks.len(), 20);
        assert_eq!(stored.activity_log.len(), 1);
        assert_eq!(ctx.notifications.lock().unwrap().len(), 1);
    }
}
