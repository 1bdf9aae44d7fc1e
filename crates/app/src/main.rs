//! `quiz` binary: wires storage, question sources and the quiz loop together.

mod cli;
mod terminal;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use services::{
    Clock, FallbackProvider, LocalQuestionBank, OpenTriviaProvider, QuestionProvider,
    QuizLoopService, QuizSettings, QuizSummaryService,
};
use storage::ResultStore;

use cli::{Cli, Command, PlayArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Open + migrate SQLite here so services stay storage-agnostic.
    let db_url = normalize_sqlite_url(&cli.db);
    let store = ResultStore::sqlite(&db_url)
        .await
        .with_context(|| format!("failed to open result database {db_url}"))?;
    let summaries = QuizSummaryService::new(store);

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            info!(%db_url, difficulty = %cli.play.difficulty, "starting quiz");
            let provider = build_provider(&cli.play)?;
            let settings = QuizSettings::default()
                .with_question_count(cli.play.count)
                .with_seconds_per_question(cli.play.seconds);
            let quiz = QuizLoopService::new(Clock::default(), provider, summaries, settings);
            terminal::play(quiz, cli.play.difficulty).await
        }
        Command::Results => {
            let screen = summaries.latest().await?;
            terminal::print_results(&screen);
            Ok(())
        }
        Command::Clear { all } => {
            summaries.clear().await?;
            if all {
                summaries.store().reset_high_score().await?;
                println!("Cleared stored results and the high score.");
            } else {
                println!("Cleared stored results.");
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_provider(args: &PlayArgs) -> Result<Arc<dyn QuestionProvider>> {
    let local = LocalQuestionBank::bundled().context("bundled question set is invalid")?;
    let provider = if args.local_only {
        FallbackProvider::local_only(local)
    } else {
        FallbackProvider::new(Arc::new(OpenTriviaProvider::new(args.api_url.clone())), local)
    };
    Ok(Arc::new(provider))
}

/// Turn relative file URLs into absolute `sqlite://` URLs.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite::memory:")
        || trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
