use chrono::{DateTime, Local};

use crate::models::{date_label, Goal, Habit, Task, ThemeSettings};
use crate::state::Dashboard;
use crate::timer::{MediaCue, TimerSnapshot};

pub const EVENT_STATE_UPDATED: &str = "state_updated";
pub const EVENT_TIMER_UPDATED: &str = "timer_updated";
pub const EVENT_MEDITATION_MEDIA: &str = "meditation_media";

#[derive(Debug, Clone, serde::Serialize)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub completed_today: bool,
    pub days: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub percentage: u8,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ThemePayload {
    #[serde(flatten)]
    pub settings: ThemeSettings,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TimersPayload {
    pub work: TimerSnapshot,
    pub meditation: TimerSnapshot,
}

impl TimersPayload {
    pub fn build(dashboard: &Dashboard) -> Self {
        Self {
            work: TimerSnapshot::from(&dashboard.work_timer),
            meditation: TimerSnapshot::from(&dashboard.meditation_timer),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MediaPayload {
    pub cue: MediaCue,
}

/// Read-only view handed to the rendering layer after every change.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardSnapshot {
    pub today: String,
    pub tasks: Vec<Task>,
    pub habits: Vec<HabitView>,
    pub goals: Vec<GoalView>,
    pub quick_note: String,
    pub theme: ThemePayload,
    pub timers: TimersPayload,
}

impl DashboardSnapshot {
    pub fn build(dashboard: &Dashboard, now: &DateTime<Local>) -> Self {
        let store = &dashboard.store;
        let today = now.date_naive();
        Self {
            today: date_label(now),
            tasks: store.tasks.clone(),
            habits: store
                .habits
                .iter()
                .map(|habit| HabitView {
                    completed_today: habit.is_done_on(today),
                    days: habit.completions.len(),
                    habit: habit.clone(),
                })
                .collect(),
            goals: store
                .goals
                .iter()
                .map(|goal| GoalView {
                    percentage: goal.percentage(),
                    goal: goal.clone(),
                })
                .collect(),
            quick_note: store.quick_note.clone(),
            theme: ThemePayload {
                color: store.theme.css_color(),
                settings: store.theme.clone(),
            },
            timers: TimersPayload::build(dashboard),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn snapshot_marks_habits_done_today_and_goal_progress() {
        let now = Local.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).single().unwrap();
        let mut dashboard = Dashboard::default();
        let habit = dashboard.store.add_habit("walk", &now).unwrap();
        let other = dashboard.store.add_habit("swim", &now).unwrap();
        dashboard.store.toggle_habit(habit.id, now.date_naive());
        dashboard
            .store
            .toggle_habit(other.id, (now - Duration::days(1)).date_naive());
        let goal = dashboard.store.add_goal("pages", 4, &now).unwrap();
        dashboard.store.update_goal(goal.id, 1);

        let snapshot = DashboardSnapshot::build(&dashboard, &now);
        assert!(snapshot.habits[0].completed_today);
        assert!(!snapshot.habits[1].completed_today);
        assert_eq!(snapshot.habits[1].days, 1);
        assert_eq!(snapshot.goals[0].percentage, 25);
        assert_eq!(snapshot.theme.color, "hsl(204, 70%, 50%)");
        assert_eq!(snapshot.timers.work.display, "25:00");
        assert_eq!(snapshot.timers.meditation.display, "05:00");
    }

    #[test]
    fn snapshot_flattens_entity_fields_on_the_wire() {
        let now = Local.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).single().unwrap();
        let mut dashboard = Dashboard::default();
        dashboard.store.add_goal("pages", 2, &now);
        let value = serde_json::to_value(DashboardSnapshot::build(&dashboard, &now)).unwrap();
        let goal = &value["goals"][0];
        assert_eq!(goal["text"], "pages");
        assert_eq!(goal["target"], 2);
        assert_eq!(goal["percentage"], 0);
        assert_eq!(value["theme"]["hue"], 204);
    }
}
