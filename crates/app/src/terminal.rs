//! Line-based terminal front-end for the quiz loop.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use quiz_core::model::Difficulty;
use quiz_core::results::{AnswerStatus, ResultsView};
use quiz_core::timer::TimerBand;
use services::{
    QuizLoopService, ResultsScreen, SessionError, SessionStatus, SessionView, Submission, View,
};

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(usize),
    Skip,
    Restart,
    Difficulty(Difficulty),
    Results,
    Save,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Ok(number) = line.parse::<usize>() {
            return match number {
                0 => Input::Unknown(line.to_owned()),
                n => Input::Answer(n - 1),
            };
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        match command.as_str() {
            "s" | "skip" => Input::Skip,
            "r" | "restart" => Input::Restart,
            "d" | "difficulty" => match words.next().map(str::parse::<Difficulty>) {
                Some(Ok(level)) => Input::Difficulty(level),
                _ => Input::Unknown(line.to_owned()),
            },
            "results" => Input::Results,
            "save" => Input::Save,
            "h" | "help" | "?" => Input::Help,
            "q" | "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(line.to_owned()),
        }
    }
}

/// Tracks what has already been printed so view updates only print changes.
#[derive(Debug, Default)]
struct Screen {
    status: Option<SessionStatus>,
    index: Option<usize>,
    band: Option<TimerBand>,
    locked: bool,
}

impl Screen {
    fn update(&mut self, view: &SessionView) {
        let status_changed = self.status != Some(view.status);
        let index_changed = self.index != Some(view.index);
        self.status = Some(view.status);
        self.index = Some(view.index);

        match view.status {
            SessionStatus::Loading if status_changed => {
                println!("Loading {} questions...", view.difficulty);
            }
            SessionStatus::Failed if status_changed => {
                let reason = view.error.as_deref().unwrap_or("unknown error");
                println!("Could not start the quiz: {reason}");
                println!("Type 'r' to retry or 'd <easy|medium|hard>' to switch difficulty.");
            }
            SessionStatus::Completed if status_changed => {
                println!();
                println!("Quiz complete! Final score {}/{}.", view.score, view.total);
            }
            SessionStatus::Active if status_changed || index_changed => {
                self.band = Some(view.band);
                self.locked = view.locked;
                print_question(view);
            }
            SessionStatus::Active => {
                if view.locked && !self.locked && view.selected.is_none() {
                    if view.time_remaining == 0 {
                        println!("Time's up!");
                    }
                    if let Some(question) = &view.question {
                        println!("The answer was: {}", question.correct_answer());
                    }
                } else if !view.locked && self.band != Some(view.band) {
                    println!("{}", timer_line(view.time_remaining, view.band));
                }
                self.band = Some(view.band);
                self.locked = view.locked;
            }
            _ => {}
        }
    }
}

fn timer_line(remaining: u32, band: TimerBand) -> String {
    match band {
        TimerBand::Calm => format!("Time left: {remaining}s"),
        TimerBand::Warning => format!("Time left: {remaining}s (hurry up)"),
        TimerBand::Critical => format!("Time left: {remaining}s (almost out!)"),
    }
}

fn print_question(view: &SessionView) {
    let Some(question) = &view.question else {
        return;
    };
    println!();
    println!(
        "Question {}/{}  [{}]  score {}",
        view.index + 1,
        view.total,
        view.difficulty,
        view.score
    );
    println!("{}", question.text());
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
    println!("{}", timer_line(view.time_remaining, view.band));
}

fn print_help() {
    println!("Commands:");
    println!("  <number>          answer with that option");
    println!("  s, skip           skip the question");
    println!("  r, restart        start over");
    println!("  d <level>         switch difficulty (easy, medium, hard)");
    println!("  results           show the latest stored results");
    println!("  save              retry storing results after a failure");
    println!("  q, quit           leave");
}

/// Print a results screen.
pub fn print_results(screen: &ResultsScreen) {
    match &screen.view {
        ResultsView::Absent => println!("No quiz results yet."),
        ResultsView::Ready(results) => {
            println!();
            println!("{}", results.message.text());
            println!(
                "Score: {}/{} ({}%)",
                results.correct_count, results.total, results.percentage
            );
            println!(
                "Correct {}  Incorrect {}  Unanswered {}",
                results.correct_count, results.incorrect_count, results.unanswered_count
            );
            for item in &results.questions {
                let marker = match item.status {
                    AnswerStatus::Correct => "+",
                    AnswerStatus::Incorrect => "x",
                    AnswerStatus::Unanswered => "-",
                };
                println!("{marker} {}. {}", item.index + 1, item.question);
                match &item.selected_answer {
                    Some(selected) if item.status == AnswerStatus::Correct => {
                        println!("     {selected}");
                    }
                    Some(selected) => {
                        println!("     yours: {selected}  correct: {}", item.correct_answer);
                    }
                    None => println!("     no answer  correct: {}", item.correct_answer),
                }
            }
        }
    }
    println!("High score: {}", screen.high_score);
}

async fn show_results(quiz: &QuizLoopService) {
    match quiz.results().await {
        Ok(screen) => print_results(&screen),
        Err(err) => println!("Could not read results: {err}"),
    }
}

/// Why an answer had no effect in the given state.
fn ignored_message(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Active => "This question is already answered.",
        SessionStatus::Loading => "Questions are still loading.",
        SessionStatus::Completed => "The quiz is over. Type 'r' to play again.",
        SessionStatus::Failed => "No quiz is running. Type 'r' to retry.",
    }
}

async fn answer(quiz: &QuizLoopService, choice: Option<usize>) {
    match quiz.submit_answer(choice).await {
        Ok(Submission::Recorded { correct: true, .. }) => println!("Correct!"),
        Ok(Submission::Recorded { correct: false, .. }) => {
            if choice.is_some() {
                match quiz.view().await.question {
                    Some(question) => println!("Wrong. The answer was: {}", question.correct_answer()),
                    None => println!("Wrong."),
                }
            }
        }
        Ok(Submission::Ignored) => println!("{}", ignored_message(quiz.view().await.status)),
        Err(SessionError::InvalidAnswerIndex { options, .. }) => {
            println!("Pick a number between 1 and {options}.");
        }
        Err(err) => println!("{err}"),
    }
}

fn report_start(result: Result<(), SessionError>) {
    if let Err(err) = result {
        debug!(error = %err, "quiz did not start");
    }
}

/// Run an interactive quiz until the user quits or stdin closes.
///
/// # Errors
///
/// Returns an error if reading from stdin fails.
pub async fn play(quiz: QuizLoopService, difficulty: Difficulty) -> Result<()> {
    let mut views = quiz.subscribe();
    let mut navigation = quiz.navigation();
    let mut screen = Screen::default();
    println!("Type 'help' for commands.");

    report_start(quiz.start(difficulty).await);
    screen.update(&views.borrow_and_update().clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                screen.update(&view);
            }
            changed = navigation.changed() => {
                if changed.is_err() {
                    break;
                }
                let target = *navigation.borrow_and_update();
                if target == View::Results {
                    show_results(&quiz).await;
                    println!("Type 'r' to play again or 'q' to quit.");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match Input::parse(&line) {
                    Input::Answer(choice) => answer(&quiz, Some(choice)).await,
                    Input::Skip => answer(&quiz, None).await,
                    Input::Restart => report_start(quiz.restart().await),
                    Input::Difficulty(level) => report_start(quiz.change_difficulty(level).await),
                    Input::Results => show_results(&quiz).await,
                    Input::Save => match quiz.finalize_results().await {
                        Ok(high_score) => debug!(high_score, "results stored on retry"),
                        Err(SessionError::NotCompleted) => println!("Nothing to save."),
                        Err(err) => println!("Still could not save results: {err}"),
                    },
                    Input::Help => print_help(),
                    Input::Quit => break,
                    Input::Unknown(text) if text.is_empty() => {}
                    Input::Unknown(text) => println!("Unknown command {text:?}. Type 'help'."),
                }
            }
        }
    }

    quiz.shutdown();
    Ok(())
}
