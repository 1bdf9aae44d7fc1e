use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use quiz_core::model::{Difficulty, Question};

use super::{LocalQuestionBank, QuestionProvider};
use crate::error::ProviderError;

/// Tries a primary source and falls back to the local bank on any failure.
#[derive(Clone)]
pub struct FallbackProvider {
    primary: Option<Arc<dyn QuestionProvider>>,
    local: LocalQuestionBank,
}

impl FallbackProvider {
    #[must_use]
    pub fn new(primary: Arc<dyn QuestionProvider>, local: LocalQuestionBank) -> Self {
        Self {
            primary: Some(primary),
            local,
        }
    }

    /// Serve only the local bank, never touching the network.
    #[must_use]
    pub fn local_only(local: LocalQuestionBank) -> Self {
        Self {
            primary: None,
            local,
        }
    }
}

#[async_trait]
impl QuestionProvider for FallbackProvider {
    async fn fetch(
        &self,
        count: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, ProviderError> {
        if count == 0 {
            return Err(ProviderError::InvalidCount);
        }

        if let Some(primary) = &self.primary {
            match primary.fetch(count, difficulty).await {
                Ok(questions) if !questions.is_empty() => return Ok(questions),
                Ok(_) => warn!(%difficulty, "primary source returned no questions, using local set"),
                Err(err) => warn!(error = %err, %difficulty, "primary source failed, using local set"),
            }
        } else {
            info!(%difficulty, "using local questions");
        }

        self.local.fetch(count, difficulty).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuestionProvider for Failing {
        async fn fetch(&self, _: u32, _: Difficulty) -> Result<Vec<Question>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::ResponseCode(5))
        }
    }

    struct Fixed(Vec<Question>);

    #[async_trait]
    impl QuestionProvider for Fixed {
        async fn fetch(&self, _: u32, _: Difficulty) -> Result<Vec<Question>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    fn remote_question() -> Question {
        Question::new("Remote?", vec!["yes".into(), "no".into()], "yes").unwrap()
    }

    #[tokio::test]
    async fn primary_success_is_returned() {
        let provider = FallbackProvider::new(
            Arc::new(Fixed(vec![remote_question()])),
            LocalQuestionBank::bundled().unwrap(),
        );
        let questions = provider.fetch(10, Difficulty::Easy).await.unwrap();
        assert_eq!(questions, vec![remote_question()]);
    }

    #[tokio::test]
    async fn failure_falls_back_to_local_bank() {
        let failing = Arc::new(Failing {
            calls: AtomicUsize::new(0),
        });
        let provider = FallbackProvider::new(failing.clone(), LocalQuestionBank::bundled().unwrap());

        let questions = provider.fetch(10, Difficulty::Medium).await.unwrap();
        assert_eq!(questions.len(), 10);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_primary_result_falls_back() {
        let provider = FallbackProvider::new(
            Arc::new(Fixed(Vec::new())),
            LocalQuestionBank::bundled().unwrap(),
        );
        assert_eq!(provider.fetch(2, Difficulty::Hard).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn both_sources_empty_is_fatal() {
        let provider = FallbackProvider::new(
            Arc::new(Failing {
                calls: AtomicUsize::new(0),
            }),
            LocalQuestionBank::from_questions(HashMap::new()),
        );
        assert!(matches!(
            provider.fetch(10, Difficulty::Easy).await,
            Err(ProviderError::NoQuestionsAvailable)
        ));
    }

    #[tokio::test]
    async fn local_only_never_calls_primary() {
        let provider = FallbackProvider::local_only(LocalQuestionBank::bundled().unwrap());
        assert_eq!(provider.fetch(4, Difficulty::Easy).await.unwrap().len(), 4);
    }
}
