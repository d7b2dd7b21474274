use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::{ActivityEntry, ActivityKind, Habit};

pub const WINDOW_DAYS: usize = 7;

/// Per-day task completions and pomodoro minutes, oldest day first.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DailySeries {
    pub labels: Vec<String>,
    pub tasks: Vec<u32>,
    pub pomo_minutes: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub struct CategoryTotals {
    pub tasks: u32,
    pub pomodoros: u32,
    /// Completed habit days summed over every habit.
    pub habits: u32,
    /// Habit-typed log entries. Nothing writes these yet, so this stays zero.
    pub habit_entries: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AnalyticsPayload {
    pub daily: DailySeries,
    pub categories: CategoryTotals,
}

/// The `WINDOW_DAYS` calendar days ending at `now`'s local date.
pub fn trailing_days<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<NaiveDate> {
    let today = now.date_naive();
    (0..WINDOW_DAYS as i64)
        .rev()
        .map(|back| today - Duration::days(back))
        .collect()
}

pub fn daily_series<Tz: TimeZone>(log: &[ActivityEntry], now: &DateTime<Tz>) -> DailySeries {
    let days = trailing_days(now);
    let tz = now.timezone();
    let mut tasks = vec![0u32; days.len()];
    let mut pomo_minutes = vec![0u32; days.len()];

    for entry in log {
        let Some(date) = entry.local_date(&tz) else {
            continue;
        };
        let Some(index) = days.iter().position(|day| *day == date) else {
            continue;
        };
        match entry.kind {
            ActivityKind::Task if entry.value == 1 => {
                tasks[index] = tasks[index].saturating_add(1)
            }
            ActivityKind::Pomo => {
                pomo_minutes[index] = pomo_minutes[index].saturating_add(entry.value)
            }
            _ => {}
        }
    }

    DailySeries {
        labels: days
            .iter()
            .map(|day| format!("{}/{}", day.month(), day.day()))
            .collect(),
        tasks,
        pomo_minutes,
    }
}

pub fn category_totals(log: &[ActivityEntry], habits: &[Habit]) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for entry in log {
        match entry.kind {
            ActivityKind::Task => totals.tasks = totals.tasks.saturating_add(1),
            ActivityKind::Pomo => totals.pomodoros = totals.pomodoros.saturating_add(1),
            ActivityKind::Habit => totals.habit_entries = totals.habit_entries.saturating_add(1),
        }
    }
    totals.habits = habits.iter().fold(0u32, |sum, habit| {
        sum.saturating_add(u32::try_from(habit.completions.len()).unwrap_or(u32::MAX))
    });
    totals
}

pub fn analytics<Tz: TimeZone>(
    log: &[ActivityEntry],
    habits: &[Habit],
    now: &DateTime<Tz>,
) -> AnalyticsPayload {
    AnalyticsPayload {
        daily: daily_series(log, now),
        categories: category_totals(log, habits),
    }
}
