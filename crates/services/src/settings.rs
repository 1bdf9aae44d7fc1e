use std::time::Duration;

use quiz_core::timer::DEFAULT_SECONDS_PER_QUESTION;

/// Questions requested per quiz unless configured otherwise.
pub const DEFAULT_QUESTION_COUNT: u32 = 10;
/// How long a locked-in answer stays on screen before the quiz moves on.
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(500);

/// Tunables for a quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    question_count: u32,
    seconds_per_question: u32,
    feedback_delay: Duration,
    tick_interval: Duration,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
            seconds_per_question: DEFAULT_SECONDS_PER_QUESTION,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl QuizSettings {
    /// Zero is clamped to one question.
    #[must_use]
    pub fn with_question_count(mut self, count: u32) -> Self {
        self.question_count = count.max(1);
        self
    }

    /// Zero is clamped to one second.
    #[must_use]
    pub fn with_seconds_per_question(mut self, seconds: u32) -> Self {
        self.seconds_per_question = seconds.max(1);
        self
    }

    #[must_use]
    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}
