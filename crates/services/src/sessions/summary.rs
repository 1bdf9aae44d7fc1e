use std::sync::Arc;

use quiz_core::model::CompletedSession;
use quiz_core::results::{ResultsView, derive_results};
use storage::ResultStore;
use storage::repository::InMemoryKeyValueStore;

use crate::error::SessionError;

/// Everything the results screen needs.
///
/// Presentation-agnostic: counts and statuses only, no formatted strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsScreen {
    pub view: ResultsView,
    pub high_score: u32,
}

/// Facade over the result store for the results screen.
#[derive(Clone)]
pub struct QuizSummaryService {
    results: ResultStore,
}

impl QuizSummaryService {
    #[must_use]
    pub fn new(results: ResultStore) -> Self {
        Self { results }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(ResultStore::new(Arc::new(InMemoryKeyValueStore::new())))
    }

    #[must_use]
    pub fn store(&self) -> &ResultStore {
        &self.results
    }

    /// Latest stored quiz, derived for display, plus the high score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on backend failures. Unreadable stored
    /// data is not an error; it yields `ResultsView::Absent`.
    pub async fn latest(&self) -> Result<ResultsScreen, SessionError> {
        let snapshot = self.results.load_latest().await?;
        let high_score = self.results.load_high_score().await?;
        Ok(ResultsScreen {
            view: derive_results(snapshot.as_ref()),
            high_score,
        })
    }

    /// Persist a completed quiz; returns the high score after the update.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn record(&self, snapshot: &CompletedSession) -> Result<u32, SessionError> {
        Ok(self.results.save(snapshot).await?)
    }

    /// Forget the latest results, keeping the high score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), SessionError> {
        Ok(self.results.clear().await?)
    }
}
