use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{
    day_key, ActivityEntry, ActivityKind, EntityId, Goal, Habit, Priority, Task, ThemeProperty,
    ThemeSettings,
};

/// Everything the dashboard persists. Each field maps to one storage key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Store {
    pub tasks: Vec<Task>,
    pub habits: Vec<Habit>,
    pub goals: Vec<Goal>,
    pub theme: ThemeSettings,
    pub quick_note: String,
    pub activity_log: Vec<ActivityEntry>,
}

/// Next id for a collection: the creation millisecond, bumped past every id already present.
fn next_id(existing: impl Iterator<Item = EntityId>, now_ms: i64) -> EntityId {
    match existing.max() {
        Some(max) if max >= now_ms => max + 1,
        _ => now_ms,
    }
}

fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Store {
    pub fn add_task<Tz: TimeZone>(
        &mut self,
        text: &str,
        priority: Priority,
        now: &DateTime<Tz>,
    ) -> Option<Task> {
        let text = normalize_text(text)?;
        let task = Task {
            id: next_id(self.tasks.iter().map(|t| t.id), now.timestamp_millis()),
            text,
            priority,
            completed: false,
        };
        log::debug!("add task id={} priority={:?}", task.id, task.priority);
        self.tasks.push(task.clone());
        Some(task)
    }

    /// Flips `completed`. Returns the new value, or `None` when the id is unknown.
    pub fn toggle_task<Tz: TimeZone>(&mut self, id: EntityId, now: &DateTime<Tz>) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        if completed {
            self.log_activity(ActivityKind::Task, 1, now);
        }
        log::debug!("toggle task id={id} completed={completed}");
        Some(completed)
    }

    pub fn delete_task(&mut self, id: EntityId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        before != self.tasks.len()
    }

    pub fn add_habit<Tz: TimeZone>(&mut self, text: &str, now: &DateTime<Tz>) -> Option<Habit> {
        let text = normalize_text(text)?;
        let habit = Habit {
            id: next_id(self.habits.iter().map(|h| h.id), now.timestamp_millis()),
            text,
            completions: Default::default(),
        };
        log::debug!("add habit id={}", habit.id);
        self.habits.push(habit.clone());
        Some(habit)
    }

    /// Marks `today` done, or undoes it when already marked. Returns whether today is now marked.
    pub fn toggle_habit(&mut self, id: EntityId, today: NaiveDate) -> Option<bool> {
        let habit = self.habits.iter_mut().find(|h| h.id == id)?;
        let key = day_key(today);
        let marked = if habit.completions.remove(&key) {
            false
        } else {
            habit.completions.insert(key);
            true
        };
        log::debug!("toggle habit id={id} day={today} marked={marked}");
        Some(marked)
    }

    pub fn delete_habit(&mut self, id: EntityId) -> bool {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        before != self.habits.len()
    }

    pub fn add_goal<Tz: TimeZone>(
        &mut self,
        text: &str,
        target: i64,
        now: &DateTime<Tz>,
    ) -> Option<Goal> {
        if target <= 0 {
            return None;
        }
        let text = normalize_text(text)?;
        let goal = Goal {
            id: next_id(self.goals.iter().map(|g| g.id), now.timestamp_millis()),
            text,
            current: 0,
            target,
        };
        log::debug!("add goal id={} target={}", goal.id, goal.target);
        self.goals.push(goal.clone());
        Some(goal)
    }

    /// Shifts progress by `delta`, clamped to [0, target]. Returns the new `current`.
    pub fn update_goal(&mut self, id: EntityId, delta: i64) -> Option<i64> {
        let goal = self.goals.iter_mut().find(|g| g.id == id)?;
        goal.current = goal.current.saturating_add(delta).clamp(0, goal.target.max(0));
        log::debug!("update goal id={id} current={}", goal.current);
        Some(goal.current)
    }

    pub fn delete_goal(&mut self, id: EntityId) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        before != self.goals.len()
    }

    pub fn set_quick_note(&mut self, text: String) {
        self.quick_note = text;
    }

    pub fn update_theme(&mut self, property: ThemeProperty, value: i64) {
        self.theme.set(property, value);
    }

    pub fn random_theme<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.theme.randomize(rng);
    }

    pub fn reset_theme(&mut self) {
        self.theme = ThemeSettings::default();
    }

    pub fn log_activity<Tz: TimeZone>(&mut self, kind: ActivityKind, value: u32, now: &DateTime<Tz>) {
        log::debug!("log activity kind={kind:?} value={value}");
        self.activity_log.push(ActivityEntry {
            kind,
            value,
            timestamp: now.timestamp_millis(),
        });
    }
}
