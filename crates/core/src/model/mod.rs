mod answer;
mod difficulty;
mod question;
mod snapshot;

pub use answer::AnswerSheet;
pub use difficulty::{Difficulty, DifficultyError};
pub use question::{Question, QuestionError};
pub use snapshot::{CompletedSession, SnapshotError};
