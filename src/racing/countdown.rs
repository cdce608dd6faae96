//! Countdown to the green light.
//!
//! Driven by the host's per-frame delta rather than the wall clock, so a
//! paused game pauses the countdown too.

use super::events::constants;

/// What a countdown tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still counting, whole seconds unchanged.
    Waiting,
    /// Whole seconds remaining dropped to this value.
    Tick(u32),
    /// Countdown reached zero.
    Expired,
}

/// Countdown timer for race starts.
#[derive(Debug, Clone)]
pub struct Countdown {
    /// Configured length in seconds.
    duration: f64,
    /// Seconds left.
    remaining: f64,
    /// Last whole-second value reported.
    last_whole: u32,
    running: bool,
}

impl Countdown {
    /// Create a countdown of `seconds`.
    pub fn new(seconds: f64) -> Result<Self, CountdownError> {
        if !seconds.is_finite() || seconds < 0.0 || seconds > constants::MAX_COUNTDOWN_SECONDS {
            return Err(CountdownError::InvalidDuration(seconds));
        }

        Ok(Self {
            duration: seconds,
            remaining: seconds,
            last_whole: whole_seconds(seconds),
            running: false,
        })
    }

    /// Start counting down. Returns the whole seconds shown first.
    pub fn start(&mut self) -> u32 {
        self.remaining = self.duration;
        self.last_whole = whole_seconds(self.duration);
        self.running = true;
        self.last_whole
    }

    /// Resume a countdown restored from a snapshot.
    pub fn resume(&mut self, remaining: f64) {
        self.remaining = remaining.clamp(0.0, self.duration);
        self.last_whole = whole_seconds(self.remaining);
        self.running = true;
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Seconds left; zero once expired.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop without expiring.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    /// Advance by `delta_seconds`.
    pub fn tick(&mut self, delta_seconds: f64) -> CountdownStep {
        if !self.running {
            return CountdownStep::Waiting;
        }

        self.remaining = (self.remaining - delta_seconds.max(0.0)).max(0.0);

        if self.remaining <= 0.0 {
            self.running = false;
            return CountdownStep::Expired;
        }

        let whole = whole_seconds(self.remaining);
        if whole < self.last_whole {
            self.last_whole = whole;
            CountdownStep::Tick(whole)
        } else {
            CountdownStep::Waiting
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            duration: constants::DEFAULT_COUNTDOWN_SECONDS,
            remaining: constants::DEFAULT_COUNTDOWN_SECONDS,
            last_whole: whole_seconds(constants::DEFAULT_COUNTDOWN_SECONDS),
            running: false,
        }
    }
}

fn whole_seconds(seconds: f64) -> u32 {
    seconds.max(0.0).ceil() as u32
}

/// Countdown errors.
#[derive(Debug, thiserror::Error)]
pub enum CountdownError {
    #[error("Invalid countdown duration: {0}s")]
    InvalidDuration(f64),
}
