//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by question providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("question count must be at least 1")]
    InvalidCount,
    #[error("question source returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("question source returned response code {0}")]
    ResponseCode(i64),
    #[error("malformed question payload: {0}")]
    Malformed(String),
    #[error("no questions available")]
    NoQuestionsAvailable,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the quiz session and its loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("answer index {index} is out of range for {options} options")]
    InvalidAnswerIndex { index: usize, options: usize },
    #[error("no questions available")]
    NoQuestionsAvailable,
    #[error("quiz is not completed")]
    NotCompleted,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
