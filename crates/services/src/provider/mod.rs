//! Question sources.
//!
//! `FallbackProvider` is what the quiz loop normally talks to: it asks the
//! remote Open Trivia DB first and falls back to the bundled local bank on
//! any failure.

mod decode;
mod fallback;
mod local;
mod open_trivia;

use async_trait::async_trait;
use quiz_core::model::{Difficulty, Question};

use crate::error::ProviderError;

pub use decode::decode_entities;
pub use fallback::FallbackProvider;
pub use local::LocalQuestionBank;
pub use open_trivia::{OPEN_TRIVIA_BASE_URL, OpenTriviaProvider};

/// Supplies an ordered question list for a quiz.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch up to `count` questions of the given difficulty.
    ///
    /// Returned questions are validated: unique options containing the correct
    /// answer, plain text without markup or entities.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the source is unavailable or exhausted.
    async fn fetch(
        &self,
        count: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, ProviderError>;
}
