//! Command-line definitions for the `quiz` binary.

use clap::{Args, Parser, Subcommand};
use quiz_core::model::Difficulty;
use quiz_core::timer::DEFAULT_SECONDS_PER_QUESTION;
use services::provider::OPEN_TRIVIA_BASE_URL;
use services::settings::DEFAULT_QUESTION_COUNT;

/// Timed multiple-choice trivia in the terminal
#[derive(Parser, Debug)]
#[command(name = "quiz")]
#[command(author, version, about = "Timed multiple-choice trivia quiz")]
#[command(long_about = r#"
Answers are locked in on the first choice; each question has its own countdown
and an expired timer counts as no answer. Results and the all-time high score
are kept in a local SQLite database.

Example:
  quiz
  quiz play --difficulty hard --count 5
  quiz results
  quiz clear --all
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub play: PlayArgs,

    /// SQLite database holding results and the high score
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = "sqlite:quiz.sqlite3")]
    pub db: String,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum Command {
    /// Play a quiz (default)
    Play,
    /// Show the most recent results and the high score
    Results,
    /// Forget the most recent results
    Clear {
        /// Reset the high score as well
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Question difficulty: easy, medium or hard
    #[arg(short, long, global = true, env = "QUIZ_DIFFICULTY", default_value_t = Difficulty::Medium)]
    pub difficulty: Difficulty,

    /// Number of questions per quiz
    #[arg(short = 'n', long, global = true, default_value_t = DEFAULT_QUESTION_COUNT)]
    pub count: u32,

    /// Seconds allowed per question
    #[arg(short, long, global = true, default_value_t = DEFAULT_SECONDS_PER_QUESTION)]
    pub seconds: u32,

    /// Never contact the remote trivia service
    #[arg(long, global = true)]
    pub local_only: bool,

    /// Base URL of the Open Trivia DB compatible service
    #[arg(long, global = true, env = "QUIZ_API_URL", default_value = OPEN_TRIVIA_BASE_URL)]
    pub api_url: String,
}
