#![forbid(unsafe_code)]

pub mod error;
pub mod provider;
pub mod sessions;
pub mod settings;

pub use quiz_core::Clock;

pub use error::{ProviderError, SessionError};
pub use provider::{FallbackProvider, LocalQuestionBank, OpenTriviaProvider, QuestionProvider};
pub use settings::QuizSettings;

pub use sessions::{
    QuizLoopService, QuizSession, QuizSummaryService, ResultsScreen, SessionStatus, SessionView,
    Submission, View,
};
