use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{EntityId, Priority, ThemeProperty};
use crate::state::Dashboard;
use crate::timer::{MediaCue, TimerMode};

/// Every request the rendering layer can make, addressed by entity id where one is needed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    AddTask {
        text: String,
        #[serde(default)]
        priority: Priority,
    },
    ToggleTask {
        id: EntityId,
    },
    DeleteTask {
        id: EntityId,
    },
    AddHabit {
        text: String,
    },
    ToggleHabit {
        id: EntityId,
    },
    DeleteHabit {
        id: EntityId,
    },
    AddGoal {
        text: String,
        #[serde(default)]
        target: Option<i64>,
    },
    UpdateGoal {
        id: EntityId,
        delta: i64,
    },
    DeleteGoal {
        id: EntityId,
    },
    SetQuickNote {
        text: String,
    },
    UpdateTheme {
        property: ThemeProperty,
        value: i64,
    },
    RandomTheme,
    ResetTheme,
    StartWork,
    StopWork,
    ResetWork,
    SetWorkMode {
        mode: TimerMode,
    },
    AdjustWork {
        minutes: i64,
    },
    StartMeditation,
    StopMeditation,
    AdjustMeditation {
        minutes: i64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub struct DispatchOutcome {
    /// False when validation or an unknown id turned the intent into a no-op.
    pub applied: bool,
    /// The store changed and has to be written back.
    pub persist: bool,
    pub media: Option<MediaCue>,
}

impl DispatchOutcome {
    fn store(applied: bool) -> Self {
        Self {
            applied,
            persist: applied,
            media: None,
        }
    }

    fn timer(applied: bool) -> Self {
        Self {
            applied,
            persist: false,
            media: None,
        }
    }

    fn media(cue: Option<MediaCue>) -> Self {
        Self {
            applied: cue.is_some(),
            persist: false,
            media: cue,
        }
    }
}

pub fn dispatch<Tz: TimeZone, R: rand::Rng + ?Sized>(
    dashboard: &mut Dashboard,
    intent: Intent,
    now: &DateTime<Tz>,
    rng: &mut R,
) -> DispatchOutcome {
    let store = &mut dashboard.store;
    let outcome = match intent {
        Intent::AddTask { text, priority } => {
            DispatchOutcome::store(store.add_task(&text, priority, now).is_some())
        }
        Intent::ToggleTask { id } => DispatchOutcome::store(store.toggle_task(id, now).is_some()),
        Intent::DeleteTask { id } => DispatchOutcome::store(store.delete_task(id)),
        Intent::AddHabit { text } => DispatchOutcome::store(store.add_habit(&text, now).is_some()),
        Intent::ToggleHabit { id } => {
            DispatchOutcome::store(store.toggle_habit(id, now.date_naive()).is_some())
        }
        Intent::DeleteHabit { id } => DispatchOutcome::store(store.delete_habit(id)),
        Intent::AddGoal { text, target } => {
            let added = target.and_then(|target| store.add_goal(&text, target, now));
            DispatchOutcome::store(added.is_some())
        }
        Intent::UpdateGoal { id, delta } => {
            DispatchOutcome::store(store.update_goal(id, delta).is_some())
        }
        Intent::DeleteGoal { id } => DispatchOutcome::store(store.delete_goal(id)),
        Intent::SetQuickNote { text } => {
            store.set_quick_note(text);
            DispatchOutcome::store(true)
        }
        Intent::UpdateTheme { property, value } => {
            store.update_theme(property, value);
            DispatchOutcome::store(true)
        }
        Intent::RandomTheme => {
            store.random_theme(rng);
            DispatchOutcome::store(true)
        }
        Intent::ResetTheme => {
            store.reset_theme();
            DispatchOutcome::store(true)
        }
        Intent::StartWork => DispatchOutcome::timer(dashboard.work_timer.start()),
        Intent::StopWork => {
            dashboard.work_timer.stop();
            DispatchOutcome::timer(true)
        }
        Intent::ResetWork => {
            dashboard.work_timer.reset();
            DispatchOutcome::timer(true)
        }
        Intent::SetWorkMode { mode } => {
            dashboard.work_timer.set_mode(mode);
            DispatchOutcome::timer(true)
        }
        Intent::AdjustWork { minutes } => {
            DispatchOutcome::timer(dashboard.work_timer.adjust_minutes(minutes))
        }
        Intent::StartMeditation => DispatchOutcome::media(dashboard.meditation_timer.start()),
        Intent::StopMeditation => {
            DispatchOutcome::media(Some(dashboard.meditation_timer.stop()))
        }
        Intent::AdjustMeditation { minutes } => {
            DispatchOutcome::timer(dashboard.meditation_timer.adjust_minutes(minutes))
        }
    };
    if !outcome.applied {
        log::debug!("intent ignored");
    }
    outcome
}
