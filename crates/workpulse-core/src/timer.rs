//! Focus countdown timer.
//!
//! The timer knows nothing about wall-clock time. Whoever drives it calls
//! [`Timer::tick`] once per second while it is running.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    #[default]
    Pomodoro,
    Deep,
    Marathon,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Pomodoro, TimerMode::Deep, TimerMode::Marathon];

    pub fn focus_secs(self) -> u32 {
        match self {
            TimerMode::Pomodoro => 25 * 60,
            TimerMode::Deep => 50 * 60,
            TimerMode::Marathon => 90 * 60,
        }
    }

    pub fn break_secs(self) -> u32 {
        match self {
            TimerMode::Pomodoro => 5 * 60,
            TimerMode::Deep => 10 * 60,
            TimerMode::Marathon => 15 * 60,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "pomodoro",
            TimerMode::Deep => "deep",
            TimerMode::Marathon => "marathon",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Pomodoro",
            TimerMode::Deep => "Deep Work",
            TimerMode::Marathon => "Marathon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        TimerMode::ALL.into_iter().find(|m| m.as_str() == s)
    }

    pub fn next(self) -> Self {
        match self {
            TimerMode::Pomodoro => TimerMode::Deep,
            TimerMode::Deep => TimerMode::Marathon,
            TimerMode::Marathon => TimerMode::Pomodoro,
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    Counted,
    /// Hit zero on this tick. The timer has stopped and flipped its break flag.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    mode: TimerMode,
    remaining_secs: u32,
    running: bool,
    on_break: bool,
    visible: bool,
}

impl Timer {
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            remaining_secs: mode.focus_secs(),
            running: false,
            on_break: false,
            visible: false,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn on_break(&self) -> bool {
        self.on_break
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn phase_secs(&self) -> u32 {
        if self.on_break {
            self.mode.break_secs()
        } else {
            self.mode.focus_secs()
        }
    }

    pub fn start(&mut self) {
        if self.remaining_secs == 0 {
            self.remaining_secs = self.phase_secs();
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Stop and hide.
    pub fn close(&mut self) {
        self.running = false;
        self.visible = false;
    }

    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.running = false;
        self.on_break = false;
        self.remaining_secs = mode.focus_secs();
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_secs = self.phase_secs();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            self.on_break = !self.on_break;
            return TickOutcome::Expired;
        }
        TickOutcome::Counted
    }

    /// `MM:SS`, or `H:MM:SS` past an hour.
    pub fn display(&self) -> String {
        let secs = self.remaining_secs;
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if h > 0 {
            format!("{h}:{m:02}:{s:02}")
        } else {
            format!("{m:02}:{s:02}")
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new(TimerMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_stopped_and_hidden() {
        let timer = Timer::new(TimerMode::Deep);
        assert!(!timer.is_running());
        assert!(!timer.is_visible());
        assert!(!timer.on_break());
        assert_eq!(timer.remaining_secs(), 50 * 60);
    }

    #[test]
    fn tick_is_idle_while_stopped() {
        let mut timer = Timer::default();
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining_secs(), 25 * 60);
    }

    #[test]
    fn running_countdown_decrements_by_one_until_zero() {
        let mut timer = Timer::default();
        timer.start();
        let mut last = timer.remaining_secs();
        loop {
            let outcome = timer.tick();
            assert_eq!(timer.remaining_secs(), last - 1);
            last = timer.remaining_secs();
            if outcome == TickOutcome::Expired {
                break;
            }
            assert_eq!(outcome, TickOutcome::Counted);
        }
        assert_eq!(timer.remaining_secs(), 0);
        assert!(!timer.is_running());
        assert!(timer.on_break());
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn start_after_expiry_loads_break_then_focus() {
        let mut timer = Timer::default();
        timer.start();
        while timer.tick() != TickOutcome::Expired {}

        timer.start();
        assert_eq!(timer.remaining_secs(), 5 * 60);
        while timer.tick() != TickOutcome::Expired {}
        assert!(!timer.on_break());

        timer.start();
        assert_eq!(timer.remaining_secs(), 25 * 60);
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let mut timer = Timer::default();
        timer.start();
        timer.tick();
        timer.tick();
        timer.pause();
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining_secs(), 25 * 60 - 2);
        timer.toggle();
        assert!(timer.is_running());
    }

    #[test]
    fn close_stops_and_hides() {
        let mut timer = Timer::default();
        timer.show();
        timer.start();
        timer.close();
        assert!(!timer.is_running());
        assert!(!timer.is_visible());
    }

    #[test]
    fn set_mode_resets_phase() {
        let mut timer = Timer::default();
        timer.start();
        timer.tick();
        timer.set_mode(TimerMode::Marathon);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 90 * 60);
        assert_eq!(timer.display(), "1:30:00");
    }

    #[test]
    fn reset_reloads_current_phase() {
        let mut timer = Timer::default();
        timer.start();
        timer.tick();
        timer.reset();
        assert_eq!(timer.display(), "25:00");
        assert!(!timer.is_running());
    }

    #[test]
    fn mode_parsing_and_cycling() {
        assert_eq!(TimerMode::from_str("deep"), Some(TimerMode::Deep));
        assert_eq!(TimerMode::from_str("sprint"), None);
        assert_eq!(TimerMode::Marathon.next(), TimerMode::Pomodoro);
    }
}
