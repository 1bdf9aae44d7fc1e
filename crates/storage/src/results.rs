use std::sync::Arc;

use quiz_core::model::CompletedSession;
use tracing::{debug, warn};

use crate::repository::{KeyValueStore, StorageError};

/// Key holding the JSON snapshot of the most recent completed quiz.
pub const LATEST_RESULTS_KEY: &str = "quizResults";
/// Key holding the best score seen so far.
pub const HIGH_SCORE_KEY: &str = "quizHighScore";

/// Persists completed quizzes and the running high score.
///
/// Injected wherever results are written or read; all state lives in the
/// backing [`KeyValueStore`]. Corrupt entries are removed and reported as
/// absent rather than failing the caller.
#[derive(Clone)]
pub struct ResultStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ResultStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Store `snapshot` as the latest result and raise the high score if beaten.
    ///
    /// Returns the high score after the update.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or either write fails.
    pub async fn save(&self, snapshot: &CompletedSession) -> Result<u32, StorageError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(LATEST_RESULTS_KEY, &json).await?;

        let previous = self.load_high_score().await?;
        let high_score = previous.max(snapshot.score());
        if high_score != previous || self.kv.get(HIGH_SCORE_KEY).await?.is_none() {
            self.kv
                .set(HIGH_SCORE_KEY, &high_score.to_string())
                .await?;
        }
        debug!(score = snapshot.score(), high_score, "stored quiz results");
        Ok(high_score)
    }

    /// Most recently stored snapshot, or `None` if nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    pub async fn load_latest(&self) -> Result<Option<CompletedSession>, StorageError> {
        let Some(raw) = self.kv.get(LATEST_RESULTS_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<CompletedSession>(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!(error = %err, "discarding unreadable stored results");
                self.kv.remove(LATEST_RESULTS_KEY).await?;
                Ok(None)
            }
        }
    }

    /// Best score stored so far, 0 if none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    pub async fn load_high_score(&self) -> Result<u32, StorageError> {
        let Some(raw) = self.kv.get(HIGH_SCORE_KEY).await? else {
            return Ok(0);
        };
        match raw.trim().parse::<u32>() {
            Ok(score) => Ok(score),
            Err(err) => {
                warn!(error = %err, value = %raw, "discarding unreadable high score");
                self.kv.remove(HIGH_SCORE_KEY).await?;
                Ok(0)
            }
        }
    }

    /// Forget the latest snapshot. The high score is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(LATEST_RESULTS_KEY).await
    }

    /// Forget the high score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn reset_high_score(&self) -> Result<(), StorageError> {
        self.kv.remove(HIGH_SCORE_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryKeyValueStore;
    use quiz_core::model::{AnswerSheet, Question};

    fn snapshot_with_score(score: u32) -> CompletedSession {
        let questions: Vec<Question> = (0..10)
            .map(|i| {
                Question::new(format!("Q{i}"), vec!["right".into(), "wrong".into()], "right")
                    .unwrap()
            })
            .collect();
        let slots = (0..10)
            .map(|i| if i < score { Some(0) } else { Some(1) })
            .collect();
        CompletedSession::new(questions, AnswerSheet::from_slots(slots), score).unwrap()
    }

    fn store() -> (InMemoryKeyValueStore, ResultStore) {
        let kv = InMemoryKeyValueStore::new();
        let results = ResultStore::new(Arc::new(kv.clone()));
        (kv, results)
    }

    #[tokio::test]
    async fn high_score_only_increases() {
        let (kv, results) = store();
        kv.set(HIGH_SCORE_KEY, "5").await.unwrap();

        assert_eq!(results.save(&snapshot_with_score(7)).await.unwrap(), 7);
        assert_eq!(results.load_high_score().await.unwrap(), 7);

        assert_eq!(results.save(&snapshot_with_score(3)).await.unwrap(), 7);
        assert_eq!(results.load_high_score().await.unwrap(), 7);

        let latest = results.load_latest().await.unwrap().unwrap();
        assert_eq!(latest.score(), 3);
    }

    #[tokio::test]
    async fn first_save_writes_high_score_even_when_zero() {
        let (kv, results) = store();
        results.save(&snapshot_with_score(0)).await.unwrap();
        assert_eq!(kv.get(HIGH_SCORE_KEY).await.unwrap().as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn empty_store_reports_absent() {
        let (_kv, results) = store();
        assert!(results.load_latest().await.unwrap().is_none());
        assert_eq!(results.load_high_score().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_entries_are_cleared() {
        let (kv, results) = store();
        kv.set(LATEST_RESULTS_KEY, "{not json").await.unwrap();
        kv.set(HIGH_SCORE_KEY, "lots").await.unwrap();

        assert!(results.load_latest().await.unwrap().is_none());
        assert_eq!(results.load_high_score().await.unwrap(), 0);
        assert_eq!(kv.get(LATEST_RESULTS_KEY).await.unwrap(), None);
        assert_eq!(kv.get(HIGH_SCORE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn inconsistent_snapshot_is_treated_as_corrupt() {
        let (kv, results) = store();
        kv.set(
            LATEST_RESULTS_KEY,
            r#"{"userAnswers":[0],"score":0,"questions":[{"question":"Q","options":["A","B"],"correctAnswer":"A"}]}"#,
        )
        .await
        .unwrap();
        assert!(results.load_latest().await.unwrap().is_none());
        assert_eq!(kv.get(LATEST_RESULTS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_keeps_high_score() {
        let (_kv, results) = store();
        results.save(&snapshot_with_score(4)).await.unwrap();
        results.clear().await.unwrap();
        assert!(results.load_latest().await.unwrap().is_none());
        assert_eq!(results.load_high_score().await.unwrap(), 4);
    }
}
