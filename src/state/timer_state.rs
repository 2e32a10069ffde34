//! Stopwatch state structure and the values derived from it

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display shown before the first tick and after a reset
pub const INITIAL_DISPLAY: &str = "00:00";

/// Render elapsed seconds as `MM:SS`. Minutes keep growing past 59.
pub fn format_elapsed(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

/// Threshold after which the overtime alert fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeLimit {
    #[default]
    Unbounded,
    Seconds(i64),
}

impl TimeLimit {
    /// Parse user input from the settings prompt.
    ///
    /// Anything that is not a 32-bit signed integer (including an empty or
    /// missing value) falls back to `Unbounded`. Zero and negative values are
    /// kept as-is.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|raw| raw.parse::<i32>().ok())
            .map(|seconds| TimeLimit::Seconds(i64::from(seconds)))
            .unwrap_or(TimeLimit::Unbounded)
    }

    /// Whether `elapsed_seconds` is strictly past this limit
    pub fn is_exceeded_by(&self, elapsed_seconds: u64) -> bool {
        match self {
            TimeLimit::Unbounded => false,
            TimeLimit::Seconds(limit) => i128::from(elapsed_seconds) > i128::from(*limit),
        }
    }

    /// Alerts are only shown for strictly positive limits
    pub fn allows_alert(&self) -> bool {
        matches!(self, TimeLimit::Seconds(limit) if *limit > 0)
    }

    pub fn seconds(&self) -> Option<i64> {
        match self {
            TimeLimit::Unbounded => None,
            TimeLimit::Seconds(limit) => Some(*limit),
        }
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLimit::Unbounded => write!(f, "unbounded"),
            TimeLimit::Seconds(limit) => write!(f, "{}s", limit),
        }
    }
}

/// Tint of the progress indicator, cycled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorColor {
    #[default]
    Red,
    Green,
    Blue,
}

impl IndicatorColor {
    pub const CYCLE: [IndicatorColor; 3] = [
        IndicatorColor::Red,
        IndicatorColor::Green,
        IndicatorColor::Blue,
    ];

    /// Next color in the cycle, wrapping around
    pub fn next(self) -> Self {
        let index = Self::CYCLE.iter().position(|c| *c == self).unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }
}

/// Mutable state owned by the timer controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub elapsed_seconds: u64,
    pub running: bool,
    pub limit: TimeLimit,
    /// Set once the limit has been exceeded during the current run
    pub overtime: bool,
    pub indicator_color: IndicatorColor,
    /// Last rendered time string
    pub display: String,
    /// Display is styled as alerted
    pub alert_visual: bool,
}

impl TimerState {
    /// Create a zeroed, stopped state with an unbounded limit
    pub fn new() -> Self {
        Self::with_limit(TimeLimit::Unbounded)
    }

    pub fn with_limit(limit: TimeLimit) -> Self {
        Self {
            elapsed_seconds: 0,
            running: false,
            limit,
            overtime: false,
            indicator_color: IndicatorColor::default(),
            display: INITIAL_DISPLAY.to_string(),
            alert_visual: false,
        }
    }

    /// Return to the stopped, zeroed state. The limit and indicator color survive.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_seconds = 0;
        self.display = INITIAL_DISPLAY.to_string();
        self.alert_visual = false;
        self.overtime = false;
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            display: self.display.clone(),
            elapsed_seconds: self.elapsed_seconds,
            running: self.running,
            limit_seconds: self.limit.seconds(),
            overtime: self.overtime,
            alert_visual: self.alert_visual,
            indicator_color: self.indicator_color,
            indicator_visible: self.running,
            settings_enabled: !self.running,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// What a client needs to render the stopwatch screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub display: String,
    pub elapsed_seconds: u64,
    pub running: bool,
    /// `None` when no limit is set
    pub limit_seconds: Option<i64>,
    pub overtime: bool,
    pub alert_visual: bool,
    pub indicator_color: IndicatorColor,
    pub indicator_visible: bool,
    pub settings_enabled: bool,
}
