use serde::{Deserialize, Serialize};

pub const WORK_MINUTES: u32 = 25;
pub const SHORT_BREAK_MINUTES: u32 = 5;
pub const LONG_BREAK_MINUTES: u32 = 15;
pub const MEDITATION_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Nominal length of the interval; also the minutes logged when it finishes.
    pub fn minutes(self) -> u32 {
        match self {
            TimerMode::Work => WORK_MINUTES,
            TimerMode::ShortBreak => SHORT_BREAK_MINUTES,
            TimerMode::LongBreak => LONG_BREAK_MINUTES,
        }
    }

    pub fn seconds(self) -> u32 {
        self.minutes() * 60
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
}

/// One-second countdown shared by both timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    status: TimerStatus,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            status: TimerStatus::Idle,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Returns false when already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    pub fn stop(&mut self) {
        self.status = TimerStatus::Idle;
    }

    pub fn set_remaining(&mut self, seconds: u32) {
        self.remaining = seconds;
    }

    /// Advances one second. Returns true exactly once per run, on the tick that reaches zero;
    /// that tick also returns the countdown to idle with zero remaining.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return false;
        }
        self.status = TimerStatus::Idle;
        log::debug!("countdown finished");
        true
    }

    /// Shifts remaining time while idle. Rejected while running or if the result would go negative.
    pub fn adjust(&mut self, delta_seconds: i64) -> bool {
        if self.is_running() {
            return false;
        }
        let next = i64::from(self.remaining) + delta_seconds;
        if next < 0 {
            return false;
        }
        self.remaining = u32::try_from(next).unwrap_or(u32::MAX);
        true
    }
}

/// What the host has to do after a work interval ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCompletion {
    pub mode: TimerMode,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTimer {
    mode: TimerMode,
    countdown: Countdown,
}

impl Default for WorkTimer {
    fn default() -> Self {
        Self {
            mode: TimerMode::Work,
            countdown: Countdown::new(TimerMode::Work.seconds()),
        }
    }
}

impl WorkTimer {
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn start(&mut self) -> bool {
        self.countdown.start()
    }

    /// Pauses; remaining time is kept.
    pub fn stop(&mut self) {
        self.countdown.stop();
    }

    pub fn reset(&mut self) {
        self.countdown.stop();
        self.countdown.set_remaining(self.mode.seconds());
    }

    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn adjust_time(&mut self, delta_seconds: i64) -> bool {
        self.countdown.adjust(delta_seconds)
    }

    pub fn adjust_minutes(&mut self, minutes: i64) -> bool {
        self.adjust_time(minutes.saturating_mul(60))
    }

    pub fn tick(&mut self) -> Option<WorkCompletion> {
        if !self.countdown.tick() {
            return None;
        }
        Some(WorkCompletion {
            mode: self.mode,
            minutes: self.mode.minutes(),
        })
    }
}

/// Audio cue for the rendering layer; playback itself happens outside the core.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaCue {
    Play,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeditationTimer {
    countdown: Countdown,
}

impl Default for MeditationTimer {
    fn default() -> Self {
        Self {
            countdown: Countdown::new(MEDITATION_MINUTES * 60),
        }
    }
}

impl MeditationTimer {
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn start(&mut self) -> Option<MediaCue> {
        self.countdown.start().then_some(MediaCue::Play)
    }

    /// Ends the session: unlike the work timer, remaining time goes back to the default.
    pub fn stop(&mut self) -> MediaCue {
        self.countdown.stop();
        self.countdown.set_remaining(MEDITATION_MINUTES * 60);
        MediaCue::Stop
    }

    pub fn reset(&mut self) -> MediaCue {
        self.stop()
    }

    pub fn adjust_time(&mut self, delta_seconds: i64) -> bool {
        self.countdown.adjust(delta_seconds)
    }

    pub fn adjust_minutes(&mut self, minutes: i64) -> bool {
        self.adjust_time(minutes.saturating_mul(60))
    }

    pub fn tick(&mut self) -> Option<MediaCue> {
        if !self.countdown.tick() {
            return None;
        }
        Some(self.stop())
    }
}

/// Renders seconds as `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimerSnapshot {
    pub remaining: u32,
    pub display: String,
    pub running: bool,
    pub status: TimerStatus,
    pub mode: Option<TimerMode>,
}

impl From<&WorkTimer> for TimerSnapshot {
    fn from(timer: &WorkTimer) -> Self {
        Self {
            remaining: timer.countdown.remaining(),
            display: format_clock(timer.countdown.remaining()),
            running: timer.countdown.is_running(),
            status: timer.countdown.status(),
            mode: Some(timer.mode),
        }
    }
}

impl From<&MeditationTimer> for TimerSnapshot {
    fn from(timer: &MeditationTimer) -> Self {
        Self {
            remaining: timer.countdown.remaining(),
            display: format_clock(timer.countdown.remaining()),
            running: timer.countdown.is_running(),
            status: timer.countdown.status(),
            mode: None,
        }
    }
}
