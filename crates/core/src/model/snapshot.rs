use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerSheet, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("{answers} answers recorded for {questions} questions")]
    LengthMismatch { questions: usize, answers: usize },

    #[error("answer {choice} for question {index} is out of range")]
    AnswerOutOfRange { index: usize, choice: usize },

    #[error("stored score {stored} does not match recomputed score {actual}")]
    ScoreMismatch { stored: u32, actual: u32 },
}

/// Immutable results of a finished quiz, decoupled from the live session.
///
/// Persisted as `{ "userAnswers": [..], "score": n, "questions": [..] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot", into = "RawSnapshot")]
pub struct CompletedSession {
    questions: Vec<Question>,
    answers: AnswerSheet,
    score: u32,
    completed_at: Option<DateTime<Utc>>,
}

impl CompletedSession {
    /// Build a snapshot, checking it is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the answer sheet does not line up with the questions
    /// or if `score` differs from the number of correct answers.
    pub fn new(
        questions: Vec<Question>,
        answers: AnswerSheet,
        score: u32,
    ) -> Result<Self, SnapshotError> {
        if questions.len() != answers.len() {
            return Err(SnapshotError::LengthMismatch {
                questions: questions.len(),
                answers: answers.len(),
            });
        }

        let mut actual = 0_u32;
        for (index, (question, slot)) in questions.iter().zip(answers.slots()).enumerate() {
            let Some(choice) = *slot else { continue };
            if choice >= question.options().len() {
                return Err(SnapshotError::AnswerOutOfRange { index, choice });
            }
            if question.is_correct(choice) {
                actual = actual.saturating_add(1);
            }
        }
        if actual != score {
            return Err(SnapshotError::ScoreMismatch {
                stored: score,
                actual,
            });
        }

        Ok(Self {
            questions,
            answers,
            score,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn with_completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
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
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    user_answers: Vec<Option<usize>>,
    score: u32,
    questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawSnapshot> for CompletedSession {
    type Error = SnapshotError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let snapshot = CompletedSession::new(
            raw.questions,
            AnswerSheet::from_slots(raw.user_answers),
            raw.score,
        )?;
        Ok(match raw.completed_at {
            Some(at) => snapshot.with_completed_at(at),
            None => snapshot,
        })
    }
}

impl From<CompletedSession> for RawSnapshot {
    fn from(s: CompletedSession) -> Self {
        Self {
            user_answers: s.answers.slots().to_vec(),
            score: s.score,
            questions: s.questions,
            completed_at: s.completed_at,
        }
    }
}
