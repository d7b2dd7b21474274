use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone};

use crate::analytics::{analytics, AnalyticsPayload};
use crate::events::{DashboardSnapshot, TimersPayload};
use crate::intents::{dispatch, DispatchOutcome, Intent};
use crate::models::ActivityKind;
use crate::store::Store;
use crate::timer::{MediaCue, MeditationTimer, WorkCompletion, WorkTimer};

/// Persisted store plus the two in-memory timers.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub store: Store,
    pub work_timer: WorkTimer,
    pub meditation_timer: MeditationTimer,
}

/// Result of one scheduler second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// At least one timer was counting down when the tick arrived.
    pub active: bool,
    pub work_completed: Option<WorkCompletion>,
    pub meditation_media: Option<MediaCue>,
}

impl Dashboard {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    /// Advances both timers one second. A finished work interval is logged to the store.
    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> TickReport {
        let active =
            self.work_timer.countdown().is_running() || self.meditation_timer.countdown().is_running();
        let work_completed = self.work_timer.tick();
        if let Some(done) = work_completed {
            log::info!("work timer finished mode={:?} minutes={}", done.mode, done.minutes);
            self.store
                .log_activity(ActivityKind::Pomo, done.minutes, now);
        }
        let meditation_media = self.meditation_timer.tick();
        if meditation_media.is_some() {
            log::info!("meditation session finished");
        }
        TickReport {
            active,
            work_completed,
            meditation_media,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<Dashboard>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Dashboard::new(store))),
        }
    }

    pub fn store(&self) -> Store {
        let guard = self.inner.lock().expect("state poisoned");
        guard.store.clone()
    }

    /// Runs `f` against the store under the state lock. Saves and reloads go through here so
    /// they cannot interleave with each other or with a mutation.
    pub fn with_store<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        let guard = self.inner.lock().expect("state poisoned");
        f(&guard.store)
    }

    pub fn with_store_mut<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut guard = self.inner.lock().expect("state poisoned");
        f(&mut guard.store)
    }

    pub fn dispatch(&self, intent: Intent, now: &DateTime<Local>) -> DispatchOutcome {
        let mut guard = self.inner.lock().expect("state poisoned");
        dispatch(&mut guard, intent, now, &mut rand::thread_rng())
    }

    pub fn tick(&self, now: &DateTime<Local>) -> TickReport {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tick(now)
    }

    pub fn snapshot(&self, now: &DateTime<Local>) -> DashboardSnapshot {
        let guard = self.inner.lock().expect("state poisoned");
        DashboardSnapshot::build(&guard, now)
    }

    pub fn timers(&self) -> TimersPayload {
        let guard = self.inner.lock().expect("state poisoned");
        TimersPayload::build(&guard)
    }

    pub fn analytics(&self, now: &DateTime<Local>) -> AnalyticsPayload {
        let guard = self.inner.lock().expect("state poisoned");
        analytics(&guard.store.activity_log, &guard.store.habits, now)
    }
}
