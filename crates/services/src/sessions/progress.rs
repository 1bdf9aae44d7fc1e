use quiz_core::model::{Difficulty, Question};
use quiz_core::timer::{TimerBand, fraction_remaining};

use super::state::{QuizSession, SessionStatus};

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

/// Read-only picture of a session for front-ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status: SessionStatus,
    pub difficulty: Difficulty,
    pub index: usize,
    pub total: usize,
    pub score: u32,
    pub time_remaining: u32,
    pub time_fraction: f32,
    pub band: TimerBand,
    pub question: Option<Question>,
    /// Whether the current answer is locked in and waiting to advance.
    pub locked: bool,
    pub selected: Option<usize>,
    pub progress: SessionProgress,
    pub error: Option<String>,
}

impl SessionView {
    pub(crate) fn from_session(session: &QuizSession) -> Self {
        let remaining = session.time_remaining();
        let locked = session.is_answer_locked();
        Self {
            status: session.status(),
            difficulty: session.difficulty(),
            index: session.current_index(),
            total: session.questions().len(),
            score: session.score(),
            time_remaining: remaining,
            time_fraction: fraction_remaining(remaining, session.seconds_per_question()),
            band: TimerBand::for_remaining(remaining),
            question: session.current_question().cloned(),
            locked,
            selected: if locked {
                session.answers().get(session.current_index())
            } else {
                None
            },
            progress: session.progress(),
            error: session.error().map(str::to_owned),
        }
    }

    /// Placeholder before any session exists.
    #[must_use]
    pub fn loading(difficulty: Difficulty) -> Self {
        Self {
            status: SessionStatus::Loading,
            difficulty,
            index: 0,
            total: 0,
            score: 0,
            time_remaining: 0,
            time_fraction: 0.0,
            band: TimerBand::Critical,
            question: None,
            locked: false,
            selected: None,
            progress: SessionProgress {
                total: 0,
                answered: 0,
                remaining: 0,
                is_complete: false,
            },
            error: None,
        }
    }
}
