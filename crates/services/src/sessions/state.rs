use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use quiz_core::model::{AnswerSheet, CompletedSession, Difficulty, Question};
use quiz_core::timer::{Countdown, CountdownTick, TimerToken};

use super::progress::{SessionProgress, SessionView};
use crate::error::SessionError;

//
// ─── STATUS & TOKENS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Active,
    Completed,
    Failed,
}

/// Identifies one load of the session; results for an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// The deferred "move on" step registered after an answer is locked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    ticket: LoadTicket,
    index: usize,
}

impl PendingAdvance {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Not active, or the current question was already answered.
    Ignored,
    Recorded {
        correct: bool,
        pending: PendingAdvance,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Ignored,
    Running(u32),
    /// Time ran out and the question was locked in with no answer.
    Expired(PendingAdvance),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Ignored,
    /// Moved to the next question; the countdown was re-armed.
    Next { index: usize, timer: TimerToken },
    /// The last question was finalized.
    Completed(CompletedSession),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session state machine.
///
/// Every method is a discrete, synchronous transition. Calls that arrive in a
/// state where they make no sense (late timer ticks, a second answer for the
/// same question, an advance after a restart) return an `Ignored` outcome and
/// leave the session untouched.
pub struct QuizSession {
    difficulty: Difficulty,
    status: SessionStatus,
    questions: Vec<Question>,
    answers: AnswerSheet,
    current: usize,
    score: u32,
    countdown: Countdown,
    seconds_per_question: u32,
    ticket: LoadTicket,
    pending: Option<PendingAdvance>,
    error: Option<String>,
}

impl QuizSession {
    /// A session waiting for its first load.
    #[must_use]
    pub fn new(difficulty: Difficulty, seconds_per_question: u32) -> Self {
        let mut countdown = Countdown::new();
        countdown.reset(seconds_per_question);
        Self {
            difficulty,
            status: SessionStatus::Loading,
            questions: Vec::new(),
            answers: AnswerSheet::default(),
            current: 0,
            score: 0,
            countdown,
            seconds_per_question,
            ticket: LoadTicket(0),
            pending: None,
            error: None,
        }
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Tear down the current run and enter `Loading` for `difficulty`.
    ///
    /// Disarms the countdown and cancels any pending advance. The returned ticket
    /// must accompany the matching [`load`](Self::load) or [`fail`](Self::fail).
    pub fn begin_loading(&mut self, difficulty: Difficulty) -> LoadTicket {
        self.countdown.reset(self.seconds_per_question);
        self.pending = None;
        self.difficulty = difficulty;
        self.status = SessionStatus::Loading;
        self.questions.clear();
        self.answers = AnswerSheet::default();
        self.current = 0;
        self.score = 0;
        self.error = None;
        self.ticket = LoadTicket(self.ticket.0.wrapping_add(1));
        debug!(%difficulty, "session loading");
        self.ticket
    }

    /// Install fetched questions and start the first countdown.
    ///
    /// Returns `Ok(None)` when `ticket` is stale.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestionsAvailable` (and enters `Failed`) if
    /// `questions` is empty.
    pub fn load(
        &mut self,
        ticket: LoadTicket,
        questions: Vec<Question>,
    ) -> Result<Option<TimerToken>, SessionError> {
        if ticket != self.ticket || self.status != SessionStatus::Loading {
            return Ok(None);
        }
        if questions.is_empty() {
            self.status = SessionStatus::Failed;
            self.error = Some(SessionError::NoQuestionsAvailable.to_string());
            return Err(SessionError::NoQuestionsAvailable);
        }

        self.answers = AnswerSheet::unanswered(questions.len());
        self.questions = questions;
        self.current = 0;
        self.score = 0;
        self.status = SessionStatus::Active;
        Ok(Some(self.countdown.arm(self.seconds_per_question)))
    }

    /// Record a failed load. Stale tickets are ignored.
    pub fn fail(&mut self, ticket: LoadTicket, message: impl Into<String>) {
        if ticket != self.ticket || self.status != SessionStatus::Loading {
            return;
        }
        self.status = SessionStatus::Failed;
        self.error = Some(message.into());
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    /// Lock in an answer (or no answer) for the current question.
    ///
    /// Only the first call per question has an effect; it disarms the countdown,
    /// records the choice, scores it, and registers a [`PendingAdvance`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAnswerIndex` for an out-of-range choice, with
    /// no state change.
    pub fn submit_answer(&mut self, choice: Option<usize>) -> Result<Submission, SessionError> {
        if self.status != SessionStatus::Active || self.pending.is_some() {
            return Ok(Submission::Ignored);
        }
        let Some(question) = self.questions.get(self.current) else {
            return Ok(Submission::Ignored);
        };
        if let Some(index) = choice {
            let options = question.options().len();
            if index >= options {
                return Err(SessionError::InvalidAnswerIndex { index, options });
            }
        }

        let correct = choice.is_some_and(|index| question.is_correct(index));
        self.countdown.disarm();
        self.answers.record(self.current, choice);
        if correct {
            self.score = self.score.saturating_add(1);
        }

        let pending = PendingAdvance {
            ticket: self.ticket,
            index: self.current,
        };
        self.pending = Some(pending);
        debug!(index = self.current, ?choice, correct, "answer locked in");
        Ok(Submission::Recorded { correct, pending })
    }

    /// Deliver one countdown tick. Expiry submits "no answer".
    pub fn tick(&mut self, token: TimerToken) -> Tick {
        if self.status != SessionStatus::Active {
            return Tick::Ignored;
        }
        match self.countdown.tick(token) {
            CountdownTick::Stale => Tick::Ignored,
            CountdownTick::Running(remaining) => Tick::Running(remaining),
            CountdownTick::Expired => match self.submit_answer(None) {
                Ok(Submission::Recorded { pending, .. }) => Tick::Expired(pending),
                Ok(Submission::Ignored) | Err(_) => Tick::Ignored,
            },
        }
    }

    /// Run the deferred step registered by an answer.
    ///
    /// `completed_at` stamps the snapshot if this finalizes the last question.
    pub fn advance(&mut self, pending: PendingAdvance, completed_at: DateTime<Utc>) -> Advance {
        if self.status != SessionStatus::Active || self.pending != Some(pending) {
            return Advance::Ignored;
        }
        self.pending = None;

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            let timer = self.countdown.arm(self.seconds_per_question);
            return Advance::Next {
                index: self.current,
                timer,
            };
        }

        self.status = SessionStatus::Completed;
        self.countdown.disarm();
        match CompletedSession::new(self.questions.clone(), self.answers.clone(), self.score) {
            Ok(snapshot) => Advance::Completed(snapshot.with_completed_at(completed_at)),
            Err(err) => {
                // Unreachable while submit_answer validates indices; keep the session usable.
                self.status = SessionStatus::Failed;
                self.error = Some(err.to_string());
                Advance::Ignored
            }
        }
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.status {
            SessionStatus::Active => self.questions.get(self.current),
            _ => None,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.countdown.token()
    }

    /// True while the current answer is locked in and shown before advancing.
    #[must_use]
    pub fn is_answer_locked(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }

    /// Recount correct answers from the answer sheet.
    #[must_use]
    pub fn recount_score(&self) -> u32 {
        let count = self
            .questions
            .iter()
            .zip(self.answers.slots())
            .filter(|(q, slot)| slot.is_some_and(|i| q.is_correct(i)))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let finalized = match self.status {
            SessionStatus::Completed => total,
            _ => self.current + usize::from(self.pending.is_some()),
        };
        SessionProgress {
            total,
            answered: self.answers.answered_count(),
            remaining: total.saturating_sub(finalized),
            is_complete: self.status == SessionStatus::Completed,
        }
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::from_session(self)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("difficulty", &self.difficulty)
            .field("status", &self.status)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("time_remaining", &self.countdown.remaining())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn question(n: usize) -> Question {
        Question::new(
            format!("Q{n}"),
            vec!["right".into(), "wrong".into(), "other".into()],
            "right",
        )
        .unwrap()
    }

    fn active_session(len: usize) -> (QuizSession, TimerToken) {
        let mut session = QuizSession::new(Difficulty::Medium, 30);
        let ticket = session.begin_loading(Difficulty::Medium);
        let token = session
            .load(ticket, (0..len).map(question).collect())
            .unwrap()
            .unwrap();
        (session, token)
    }

    fn pending_of(submission: Submission) -> PendingAdvance {
        match submission {
            Submission::Recorded { pending, .. } => pending,
            Submission::Ignored => panic!("expected a recorded answer"),
        }
    }

    #[test]
    fn load_activates_with_fresh_state() {
        let (session, _) = active_session(3);
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.answers().slots(), &[None, None, None]);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.time_remaining(), 30);
        assert!(session.timer_token().is_some());
    }

    #[test]
    fn empty_load_fails() {
        let mut session = QuizSession::new(Difficulty::Easy, 30);
        let ticket = session.begin_loading(Difficulty::Easy);
        assert!(matches!(
            session.load(ticket, Vec::new()),
            Err(SessionError::NoQuestionsAvailable)
        ));
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session.error().is_some());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut session = QuizSession::new(Difficulty::Easy, 30);
        let old = session.begin_loading(Difficulty::Easy);
        let new = session.begin_loading(Difficulty::Hard);

        assert_eq!(session.load(old, vec![question(0)]).unwrap(), None);
        session.fail(old, "late failure");
        assert_eq!(session.status(), SessionStatus::Loading);

        assert!(session.load(new, vec![question(0)]).unwrap().is_some());
        assert_eq!(session.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn correct_answer_scores_and_locks() {
        let (mut session, token) = active_session(2);
        let submission = session.submit_answer(Some(0)).unwrap();
        assert!(matches!(submission, Submission::Recorded { correct: true, .. }));
        assert_eq!(session.score(), 1);
        assert!(session.is_answer_locked());
        assert_eq!(session.tick(token), Tick::Ignored);
    }

    #[test]
    fn second_submission_for_same_question_is_a_no_op() {
        let (mut session, _) = active_session(2);
        session.submit_answer(Some(1)).unwrap();
        let answers = session.answers().clone();
        let score = session.score();

        assert_eq!(session.submit_answer(Some(0)).unwrap(), Submission::Ignored);
        assert_eq!(session.answers(), &answers);
        assert_eq!(session.score(), score);
    }

    #[test]
    fn invalid_index_is_rejected_without_mutation() {
        let (mut session, token) = active_session(2);
        assert!(matches!(
            session.submit_answer(Some(3)),
            Err(SessionError::InvalidAnswerIndex { index: 3, options: 3 })
        ));
        assert!(!session.is_answer_locked());
        assert_eq!(session.answers().slots(), &[None, None]);
        assert_eq!(session.tick(token), Tick::Running(29));
    }

    #[test]
    fn expiry_matches_submitting_no_answer() {
        let mut timed = QuizSession::new(Difficulty::Medium, 2);
        let ticket = timed.begin_loading(Difficulty::Medium);
        let token = timed.load(ticket, vec![question(0), question(1)]).unwrap().unwrap();
        assert_eq!(timed.tick(token), Tick::Running(1));
        let Tick::Expired(pending) = timed.tick(token) else {
            panic!("expected expiry");
        };

        let mut manual = QuizSession::new(Difficulty::Medium, 2);
        let ticket = manual.begin_loading(Difficulty::Medium);
        manual.load(ticket, vec![question(0), question(1)]).unwrap();
        let manual_pending = pending_of(manual.submit_answer(None).unwrap());

        assert_eq!(timed.answers(), manual.answers());
        assert_eq!(timed.score(), manual.score());
        assert_eq!(pending.index(), manual_pending.index());
        assert_eq!(timed.submit_answer(Some(0)).unwrap(), Submission::Ignored);
    }

    #[test]
    fn manual_answer_beats_late_expiry() {
        let mut session = QuizSession::new(Difficulty::Medium, 1);
        let ticket = session.begin_loading(Difficulty::Medium);
        let token = session.load(ticket, vec![question(0), question(1)]).unwrap().unwrap();

        session.submit_answer(Some(0)).unwrap();
        assert_eq!(session.tick(token), Tick::Ignored);
        assert_eq!(session.answers().get(0), Some(0));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn advance_moves_on_and_rearms() {
        let (mut session, first) = active_session(2);
        let pending = pending_of(session.submit_answer(Some(2)).unwrap());

        let Advance::Next { index, timer } = session.advance(pending, fixed_now()) else {
            panic!("expected next question");
        };
        assert_eq!(index, 1);
        assert_ne!(timer, first);
        assert!(!session.is_answer_locked());
        assert_eq!(session.time_remaining(), 30);
        assert_eq!(session.tick(first), Tick::Ignored);
        assert_eq!(session.advance(pending, fixed_now()), Advance::Ignored);
    }

    #[test]
    fn last_answer_completes_with_snapshot() {
        let (mut session, _) = active_session(2);
        let p = pending_of(session.submit_answer(Some(0)).unwrap());
        session.advance(p, fixed_now());
        let p = pending_of(session.submit_answer(None).unwrap());

        let Advance::Completed(snapshot) = session.advance(p, fixed_now()) else {
            panic!("expected completion");
        };
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(snapshot.answers().slots(), &[Some(0), None]);
        assert_eq!(snapshot.score(), 1);
        assert_eq!(snapshot.completed_at(), Some(fixed_now()));
        assert_eq!(session.submit_answer(Some(0)).unwrap(), Submission::Ignored);
    }

    #[test]
    fn restart_cancels_pending_advance_and_resets() {
        let (mut session, token) = active_session(2);
        let pending = pending_of(session.submit_answer(Some(0)).unwrap());

        let ticket = session.begin_loading(Difficulty::Medium);
        assert_eq!(session.advance(pending, fixed_now()), Advance::Ignored);
        assert_eq!(session.tick(token), Tick::Ignored);
        assert_eq!(session.status(), SessionStatus::Loading);
        assert_eq!(session.score(), 0);

        session.load(ticket, vec![question(0), question(1)]).unwrap();
        assert_eq!(session.answers().slots(), &[None, None]);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn score_always_matches_recount() {
        let (mut session, _) = active_session(5);
        let choices = [Some(0), Some(1), None, Some(0), Some(2)];
        for choice in choices {
            let p = pending_of(session.submit_answer(choice).unwrap());
            assert_eq!(session.score(), session.recount_score());
            session.advance(p, fixed_now());
            assert_eq!(session.score(), session.recount_score());
        }
        assert_eq!(session.score(), 2);
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn unanswered_slots_stay_empty_ahead_of_current() {
        let (mut session, _) = active_session(4);
        let p = pending_of(session.submit_answer(Some(1)).unwrap());
        session.advance(p, fixed_now());
        let current = session.current_index();
        assert!(session.answers().slots()[current + 1..].iter().all(Option::is_none));
    }

    #[test]
    fn progress_counts_finalized_questions() {
        let (mut session, _) = active_session(3);
        assert_eq!(session.progress().remaining, 3);
        let p = pending_of(session.submit_answer(None).unwrap());
        let progress = session.progress();
        assert_eq!(progress.answered, 0);
        assert_eq!(progress.remaining, 2);
        session.advance(p, fixed_now());
        assert_eq!(session.progress().remaining, 2);
    }
}
