use std::collections::HashMap;

use async_trait::async_trait;
use rand::rng;
use rand::seq::SliceRandom;
use tracing::debug;

use quiz_core::model::{Difficulty, Question};

use super::QuestionProvider;
use crate::error::ProviderError;

const BUNDLED_QUESTIONS: &str = include_str!("../../data/questions.json");

/// Question set shipped with the binary, keyed by difficulty.
///
/// Options keep the order they were authored in; only the question order is
/// shuffled per fetch.
#[derive(Debug, Clone, Default)]
pub struct LocalQuestionBank {
    questions: HashMap<Difficulty, Vec<Question>>,
}

impl LocalQuestionBank {
    /// Load the bundled question set.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Malformed` if the bundled JSON does not parse or
    /// contains an invalid question.
    pub fn bundled() -> Result<Self, ProviderError> {
        Self::from_json(BUNDLED_QUESTIONS)
    }

    /// Parse a bank shaped like `{ "easy": [..], "medium": [..], "hard": [..] }`.
    ///
    /// Missing difficulties are treated as empty.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Malformed` on invalid JSON or questions.
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        let questions: HashMap<Difficulty, Vec<Question>> =
            serde_json::from_str(json).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(Self { questions })
    }

    #[must_use]
    pub fn from_questions(questions: HashMap<Difficulty, Vec<Question>>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn available(&self, difficulty: Difficulty) -> usize {
        self.questions.get(&difficulty).map_or(0, Vec::len)
    }
}

#[async_trait]
impl QuestionProvider for LocalQuestionBank {
    async fn fetch(
        &self,
        count: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, ProviderError> {
        if count == 0 {
            return Err(ProviderError::InvalidCount);
        }
        let Some(pool) = self.questions.get(&difficulty).filter(|p| !p.is_empty()) else {
            return Err(ProviderError::NoQuestionsAvailable);
        };

        let mut selected = pool.clone();
        selected.as_mut_slice().shuffle(&mut rng());
        selected.truncate(usize::try_from(count).unwrap_or(usize::MAX));

        debug!(%difficulty, count = selected.len(), "serving local questions");
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bundled_bank_covers_every_difficulty() {
        let bank = LocalQuestionBank::bundled().unwrap();
        for difficulty in Difficulty::ALL {
            assert!(bank.available(difficulty) >= 10, "{difficulty} too small");
        }
    }

    #[tokio::test]
    async fn fetch_truncates_to_available() {
        let bank = LocalQuestionBank::bundled().unwrap();
        let available = bank.available(Difficulty::Hard);

        let some = bank.fetch(3, Difficulty::Hard).await.unwrap();
        assert_eq!(some.len(), 3);

        let all = bank.fetch(500, Difficulty::Hard).await.unwrap();
        assert_eq!(all.len(), available);
        let unique: HashSet<_> = all.iter().map(Question::text).collect();
        assert_eq!(unique.len(), available);
    }

    #[tokio::test]
    async fn empty_difficulty_reports_no_questions() {
        let bank = LocalQuestionBank::from_json(r#"{"easy": []}"#).unwrap();
        assert!(matches!(
            bank.fetch(5, Difficulty::Easy).await,
            Err(ProviderError::NoQuestionsAvailable)
        ));
        assert!(matches!(
            bank.fetch(5, Difficulty::Hard).await,
            Err(ProviderError::NoQuestionsAvailable)
        ));
    }

    #[tokio::test]
    async fn zero_count_is_rejected() {
        let bank = LocalQuestionBank::bundled().unwrap();
        assert!(matches!(
            bank.fetch(0, Difficulty::Easy).await,
            Err(ProviderError::InvalidCount)
        ));
    }

    #[test]
    fn invalid_bundled_question_is_malformed() {
        let err = LocalQuestionBank::from_json(
            r#"{"easy": [{"question":"Q","options":["A","A"],"correctAnswer":"A"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
