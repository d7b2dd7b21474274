use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Millisecond creation timestamp; doubles as the entity id.
pub type EntityId = i64;

/// Instant an activity was recorded, in Unix milliseconds.
pub type Timestamp = i64;

/// Calendar-day key used for habit completions.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_HUE: u16 = 204;
pub const DEFAULT_SATURATION: u8 = 70;
pub const DEFAULT_BRIGHTNESS: u8 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: EntityId,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Habit {
    pub id: EntityId,
    pub text: String,
    #[serde(default)]
    pub completions: BTreeSet<String>,
}

impl Habit {
    pub fn is_done_on(&self, day: NaiveDate) -> bool {
        self.completions.contains(&day_key(day))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Goal {
    pub id: EntityId,
    pub text: String,
    #[serde(default)]
    pub current: i64,
    pub target: i64,
}

impl Goal {
    /// Progress rounded to a whole percent, capped at 100.
    pub fn percentage(&self) -> u8 {
        if self.target <= 0 {
            return 0;
        }
        let pct = (self.current as f64 / self.target as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Task,
    Pomo,
    // Reserved: nothing records habit entries today.
    Habit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub value: u32,
    pub timestamp: Timestamp,
}

impl ActivityEntry {
    /// Local calendar date the entry falls on in `tz`.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        tz.timestamp_millis_opt(self.timestamp)
            .single()
            .map(|dt| dt.date_naive())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeProperty {
    Hue,
    Saturation,
    Brightness,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ThemeSettings {
    #[serde(default = "default_hue")]
    pub hue: u16,
    #[serde(default = "default_saturation")]
    pub saturation: u8,
    #[serde(default = "default_brightness")]
    pub brightness: u8,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            hue: DEFAULT_HUE,
            saturation: DEFAULT_SATURATION,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl ThemeSettings {
    /// Sets one channel. Hue wraps into [0, 360); the percentages clamp to [0, 100].
    pub fn set(&mut self, property: ThemeProperty, value: i64) {
        match property {
            ThemeProperty::Hue => self.hue = value.rem_euclid(360) as u16,
            ThemeProperty::Saturation => self.saturation = value.clamp(0, 100) as u8,
            ThemeProperty::Brightness => self.brightness = value.clamp(0, 100) as u8,
        }
    }

    /// Brings values read from storage back into range.
    pub fn normalized(mut self) -> Self {
        let (hue, saturation, brightness) = (self.hue, self.saturation, self.brightness);
        self.set(ThemeProperty::Hue, i64::from(hue));
        self.set(ThemeProperty::Saturation, i64::from(saturation));
        self.set(ThemeProperty::Brightness, i64::from(brightness));
        self
    }

    pub fn randomize<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.hue = rng.gen_range(0..360);
        self.saturation = rng.gen_range(50..100);
        self.brightness = rng.gen_range(40..70);
    }

    pub fn css_color(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.brightness
        )
    }
}

fn default_hue() -> u16 {
    DEFAULT_HUE
}

fn default_saturation() -> u8 {
    DEFAULT_SATURATION
}

fn default_brightness() -> u8 {
    DEFAULT_BRIGHTNESS
}

pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Header label such as `Friday, October 16, 2026`.
pub fn date_label(now: &DateTime<Local>) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}
