//! Per-question countdown.
//!
//! The countdown is pure state: something else delivers ticks. Every `arm`
//! hands out a fresh [`TimerToken`], and a tick only counts if it carries the
//! token of the currently armed countdown. A tick that was already scheduled
//! when the countdown was disarmed (or re-armed for the next question) is
//! therefore stale and changes nothing.

/// Seconds allowed per question unless configured otherwise.
pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 30;

/// Identifies one arming of a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Outcome of delivering one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Token did not match the armed countdown, or nothing is armed.
    Stale,
    /// Still counting; carries the seconds left.
    Running(u32),
    /// Reached zero. Reported once; the countdown disarms itself.
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: u32,
    armed: Option<TimerToken>,
    issued: u64,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting down from `seconds`, invalidating any earlier token.
    pub fn arm(&mut self, seconds: u32) -> TimerToken {
        self.issued = self.issued.wrapping_add(1);
        let token = TimerToken(self.issued);
        self.remaining = seconds;
        self.armed = Some(token);
        token
    }

    /// Stops the countdown. `remaining` is left as it was.
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// Resets the displayed time without arming.
    pub fn reset(&mut self, seconds: u32) {
        self.armed = None;
        self.remaining = seconds;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    #[must_use]
    pub fn token(&self) -> Option<TimerToken> {
        self.armed
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn tick(&mut self, token: TimerToken) -> CountdownTick {
        if self.armed != Some(token) {
            return CountdownTick::Stale;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.armed = None;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }
}

/// Urgency band for rendering the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerBand {
    Calm,
    Warning,
    Critical,
}

impl TimerBand {
    #[must_use]
    pub fn for_remaining(seconds: u32) -> Self {
        match seconds {
            s if s > 20 => TimerBand::Calm,
            s if s > 10 => TimerBand::Warning,
            _ => TimerBand::Critical,
        }
    }
}

/// Share of the question time still left, in `[0, 1]`.
#[must_use]
pub fn fraction_remaining(remaining: u32, total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let fraction = remaining.min(total) as f32 / total as f32;
    fraction
}
