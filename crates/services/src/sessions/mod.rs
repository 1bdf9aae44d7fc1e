mod navigation;
mod progress;
mod state;
mod summary;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use navigation::View;
pub use progress::{SessionProgress, SessionView};
pub use state::{
    Advance, LoadTicket, PendingAdvance, QuizSession, SessionStatus, Submission, Tick,
};
pub use summary::{QuizSummaryService, ResultsScreen};
pub use workflow::QuizLoopService;
