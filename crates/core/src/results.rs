use crate::model::CompletedSession;

//
// ─── PER-QUESTION STATUS ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Correct,
    Incorrect,
    Unanswered,
}

impl AnswerStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerStatus::Correct => "correct",
            AnswerStatus::Incorrect => "incorrect",
            AnswerStatus::Unanswered => "unanswered",
        }
    }
}

/// One row of the answer summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub index: usize,
    pub question: String,
    pub correct_answer: String,
    pub selected_answer: Option<String>,
    pub status: AnswerStatus,
}

//
// ─── SCORE MESSAGE ─────────────────────────────────────────────────────────────
//

/// Headline shown above the summary, picked from the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMessage {
    Perfect,
    Excellent,
    GoodJob,
    KeepTrying,
    BetterLuckNextTime,
}

impl ScoreMessage {
    #[must_use]
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            100.. => ScoreMessage::Perfect,
            80..=99 => ScoreMessage::Excellent,
            60..=79 => ScoreMessage::GoodJob,
            40..=59 => ScoreMessage::KeepTrying,
            _ => ScoreMessage::BetterLuckNextTime,
        }
    }

    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            ScoreMessage::Perfect => "Perfect!",
            ScoreMessage::Excellent => "Excellent!",
            ScoreMessage::GoodJob => "Good job!",
            ScoreMessage::KeepTrying => "Keep trying!",
            ScoreMessage::BetterLuckNextTime => "Better luck next time!",
        }
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Derived summary of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    pub questions: Vec<QuestionResult>,
    pub total: usize,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub unanswered_count: u32,
    pub percentage: u32,
    pub message: ScoreMessage,
}

impl QuizResults {
    #[must_use]
    pub fn statuses(&self) -> Vec<AnswerStatus> {
        self.questions.iter().map(|q| q.status).collect()
    }
}

/// What the results screen has to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    /// No completed quiz is available (missing or empty snapshot).
    Absent,
    Ready(QuizResults),
}

impl ResultsView {
    #[must_use]
    pub fn results(&self) -> Option<&QuizResults> {
        match self {
            ResultsView::Absent => None,
            ResultsView::Ready(results) => Some(results),
        }
    }
}

/// `round(100 * score / total)`, or 0 when there are no questions.
#[must_use]
pub fn percentage_of(score: u32, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let total = u64::try_from(total).unwrap_or(u64::MAX);
    let scaled = u64::from(score) * 100;
    // Round half up, matching Math.round for non-negative values.
    let rounded = (scaled * 2 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Reconcile a completed quiz's answers against its questions.
///
/// Pure; a missing snapshot or one without questions yields `ResultsView::Absent`.
#[must_use]
pub fn derive_results(snapshot: Option<&CompletedSession>) -> ResultsView {
    let Some(snapshot) = snapshot else {
        return ResultsView::Absent;
    };
    if snapshot.questions().is_empty() {
        return ResultsView::Absent;
    }

    let answers = snapshot.answers();
    let questions: Vec<QuestionResult> = snapshot
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = answers.get(index);
            let status = match selected {
                None => AnswerStatus::Unanswered,
                Some(choice) if question.is_correct(choice) => AnswerStatus::Correct,
                Some(_) => AnswerStatus::Incorrect,
            };
            QuestionResult {
                index,
                question: question.text().to_owned(),
                correct_answer: question.correct_answer().to_owned(),
                selected_answer: selected
                    .and_then(|choice| question.option(choice))
                    .map(str::to_owned),
                status,
            }
        })
        .collect();

    let score = snapshot.score();
    let answered = u32::try_from(answers.answered_count()).unwrap_or(u32::MAX);
    let unanswered = u32::try_from(answers.unanswered_count()).unwrap_or(u32::MAX);
    let percentage = percentage_of(score, snapshot.total());

    ResultsView::Ready(QuizResults {
        total: questions.len(),
        questions,
        correct_count: score,
        incorrect_count: answered.saturating_sub(score),
        unanswered_count: unanswered,
        percentage,
        message: ScoreMessage::for_percentage(percentage),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSheet, Question};

    fn question(options: &[&str], correct: &str) -> Question {
        Question::new(
            "Q",
            options.iter().map(|o| (*o).to_string()).collect(),
            correct,
        )
        .unwrap()
    }

    #[test]
    fn mixed_answers_produce_statuses_and_counts() {
        let snapshot = CompletedSession::new(
            vec![question(&["A", "B"], "B"), question(&["C", "D"], "C")],
            AnswerSheet::from_slots(vec![Some(1), None]),
            1,
        )
        .unwrap();

        let ResultsView::Ready(results) = derive_results(Some(&snapshot)) else {
            panic!("expected results");
        };
        assert_eq!(
            results.statuses(),
            vec![AnswerStatus::Correct, AnswerStatus::Unanswered]
        );
        assert_eq!(results.correct_count, 1);
        assert_eq!(results.incorrect_count, 0);
        assert_eq!(results.unanswered_count, 1);
        assert_eq!(results.percentage, 50);
        assert_eq!(results.questions[0].selected_answer.as_deref(), Some("B"));
        assert_eq!(results.questions[1].selected_answer, None);
    }

    #[test]
    fn incorrect_answers_are_counted() {
        let snapshot = CompletedSession::new(
            vec![
                question(&["A", "B"], "B"),
                question(&["C", "D"], "C"),
                question(&["E", "F"], "E"),
            ],
            AnswerSheet::from_slots(vec![Some(0), Some(0), Some(1)]),
            1,
        )
        .unwrap();

        let results = derive_results(Some(&snapshot));
        let results = results.results().unwrap();
        assert_eq!(
            results.statuses(),
            vec![
                AnswerStatus::Incorrect,
                AnswerStatus::Correct,
                AnswerStatus::Incorrect
            ]
        );
        assert_eq!(results.incorrect_count, 2);
        assert_eq!(results.percentage, 33);
        assert_eq!(results.message, ScoreMessage::BetterLuckNextTime);
    }

    #[test]
    fn missing_or_empty_snapshot_is_absent() {
        assert_eq!(derive_results(None), ResultsView::Absent);
        let empty = CompletedSession::new(Vec::new(), AnswerSheet::default(), 0).unwrap();
        assert_eq!(derive_results(Some(&empty)), ResultsView::Absent);
        assert_eq!(percentage_of(0, 0), 0);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage_of(1, 8), 13);
        assert_eq!(percentage_of(2, 3), 67);
        assert_eq!(percentage_of(10, 10), 100);
    }

    #[test]
    fn score_messages_follow_thresholds() {
        assert_eq!(ScoreMessage::for_percentage(100), ScoreMessage::Perfect);
        assert_eq!(ScoreMessage::for_percentage(80), ScoreMessage::Excellent);
        assert_eq!(ScoreMessage::for_percentage(60), ScoreMessage::GoodJob);
        assert_eq!(ScoreMessage::for_percentage(40), ScoreMessage::KeepTrying);
        assert_eq!(
            ScoreMessage::for_percentage(39),
            ScoreMessage::BetterLuckNextTime
        );
    }
}
