use chrono::{DateTime, Local};
#[cfg(all(feature = "app", not(test)))]
use std::time::Duration;
#[cfg(all(feature = "app", not(test)))]
use tauri::AppHandle;

use crate::commands::{persist, CommandCtx};
#[cfg(all(feature = "app", not(test)))]
use crate::commands::TauriCommandCtx;
use crate::state::{AppState, TickReport};
use crate::timer::TimerMode;

pub const COMPLETION_TITLE: &str = "Timer Complete!";

#[cfg(all(feature = "app", not(test)))]
pub fn start_scheduler(app: AppHandle, state: AppState) {
    tauri::async_runtime::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let ctx = TauriCommandCtx { app: &app };
        loop {
            interval.tick().await;
            run_tick(&ctx, &state, &Local::now());
        }
    });
}

fn completion_body(mode: TimerMode, minutes: u32) -> String {
    let label = match mode {
        TimerMode::Work => "Focus session",
        TimerMode::ShortBreak => "Short break",
        TimerMode::LongBreak => "Long break",
    };
    format!("{label} finished ({minutes} min)")
}

/// One scheduler second: advance both timers, then route completion side effects to the host.
pub(crate) fn run_tick(ctx: &impl CommandCtx, state: &AppState, now: &DateTime<Local>) -> TickReport {
    let report = state.tick(now);
    if !report.active {
        return report;
    }
    if let Some(done) = report.work_completed {
        if let Err(error) = persist(ctx, state, now) {
            log::error!("failed to persist finished session: {error}");
        }
        ctx.notify(COMPLETION_TITLE, &completion_body(done.mode, done.minutes));
    }
    if let Some(cue) = report.meditation_media {
        ctx.emit_media(cue);
    }
    ctx.emit_timer_updated(state.timers());
    report
}
