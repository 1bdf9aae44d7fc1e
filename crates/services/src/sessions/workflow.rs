use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use quiz_core::model::{CompletedSession, Difficulty};
use quiz_core::timer::TimerToken;

use super::navigation::View;
use super::progress::SessionView;
use super::state::{Advance, PendingAdvance, QuizSession, Submission, Tick};
use super::summary::{QuizSummaryService, ResultsScreen};
use crate::error::{ProviderError, SessionError};
use crate::provider::QuestionProvider;
use crate::settings::QuizSettings;
use crate::Clock;

/// Background work bound to the current question.
#[derive(Default)]
struct Tasks {
    ticker: Option<JoinHandle<()>>,
    advance: Option<JoinHandle<()>>,
}

impl Tasks {
    fn replace_ticker(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.ticker.replace(handle) {
            old.abort();
        }
    }

    fn replace_advance(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.advance.replace(handle) {
            old.abort();
        }
    }

    fn abort_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn abort_all(&mut self) {
        self.abort_ticker();
        if let Some(handle) = self.advance.take() {
            handle.abort();
        }
    }
}

struct Shared {
    clock: Clock,
    settings: QuizSettings,
    provider: Arc<dyn QuestionProvider>,
    summaries: QuizSummaryService,
    session: Mutex<QuizSession>,
    tasks: StdMutex<Tasks>,
    /// Bumped by every `start`; a hand-off only navigates within its own run.
    run: AtomicU64,
    /// Completed snapshot not yet confirmed stored.
    unsaved: StdMutex<Option<CompletedSession>>,
    view_tx: watch::Sender<SessionView>,
    nav_tx: watch::Sender<View>,
}

/// Drives a [`QuizSession`] in real time.
///
/// All transitions happen under one async mutex, so user answers, countdown
/// ticks, and the deferred advance are serialized; whichever reaches a
/// question first wins. The countdown runs as a tokio task per question and
/// is aborted on every path that leaves the question.
#[derive(Clone)]
pub struct QuizLoopService {
    shared: Arc<Shared>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        provider: Arc<dyn QuestionProvider>,
        summaries: QuizSummaryService,
        settings: QuizSettings,
    ) -> Self {
        let difficulty = Difficulty::default();
        let session = QuizSession::new(difficulty, settings.seconds_per_question());
        let (view_tx, _) = watch::channel(SessionView::loading(difficulty));
        let (nav_tx, _) = watch::channel(View::Quiz);
        Self {
            shared: Arc::new(Shared {
                clock,
                settings,
                provider,
                summaries,
                session: Mutex::new(session),
                tasks: StdMutex::new(Tasks::default()),
                run: AtomicU64::new(0),
                unsaved: StdMutex::new(None),
                view_tx,
                nav_tx,
            }),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.shared.settings
    }

    /// Receives a fresh [`SessionView`] after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.shared.view_tx.subscribe()
    }

    /// Receives the screen the front-end should show.
    #[must_use]
    pub fn navigation(&self) -> watch::Receiver<View> {
        self.shared.nav_tx.subscribe()
    }

    pub async fn view(&self) -> SessionView {
        self.shared.session.lock().await.view()
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Load questions for `difficulty` and start the first countdown.
    ///
    /// Anything in flight for the previous run is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestionsAvailable` when no source has questions,
    /// or `SessionError::Provider` for other provider failures. The session is left
    /// in `Failed` and can be retried with another `start`.
    pub async fn start(&self, difficulty: Difficulty) -> Result<(), SessionError> {
        let ticket = {
            let mut session = self.shared.session.lock().await;
            self.tasks().abort_all();
            self.shared.run.fetch_add(1, Ordering::SeqCst);
            let ticket = session.begin_loading(difficulty);
            self.publish(&session);
            ticket
        };

        let fetched = self
            .shared
            .provider
            .fetch(self.shared.settings.question_count(), difficulty)
            .await;

        let mut session = self.shared.session.lock().await;
        let result = match fetched {
            Ok(questions) => match session.load(ticket, questions) {
                Ok(Some(token)) => {
                    info!(%difficulty, total = session.questions().len(), "quiz started");
                    self.spawn_ticker(token);
                    Ok(())
                }
                Ok(None) => {
                    debug!(%difficulty, "discarding superseded question load");
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Err(err) => {
                error!(error = %err, %difficulty, "failed to load questions");
                session.fail(ticket, err.to_string());
                Err(match err {
                    ProviderError::NoQuestionsAvailable => SessionError::NoQuestionsAvailable,
                    other => SessionError::Provider(other),
                })
            }
        };
        self.publish(&session);
        result
    }

    /// Start over with the current difficulty and return to the quiz screen.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub async fn restart(&self) -> Result<(), SessionError> {
        let difficulty = self.shared.session.lock().await.difficulty();
        self.shared.nav_tx.send_replace(View::Quiz);
        self.start(difficulty).await
    }

    /// Switch difficulty, which restarts the quiz with a new question set.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub async fn change_difficulty(&self, difficulty: Difficulty) -> Result<(), SessionError> {
        self.shared.nav_tx.send_replace(View::Quiz);
        self.start(difficulty).await
    }

    /// Cancel the countdown and any pending advance.
    ///
    /// A completed quiz that is already being stored is not cancelled. The
    /// session keeps its last state; a later `start` resumes normally.
    pub fn shutdown(&self) {
        self.tasks().abort_all();
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    /// Lock in the user's answer for the current question.
    ///
    /// `None` means the user chose not to answer. Duplicate and late calls are
    /// reported as `Submission::Ignored`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAnswerIndex` for an out-of-range choice.
    pub async fn submit_answer(&self, choice: Option<usize>) -> Result<Submission, SessionError> {
        let mut session = self.shared.session.lock().await;
        let submission = session.submit_answer(choice)?;
        if let Submission::Recorded { pending, .. } = submission {
            self.tasks().abort_ticker();
            self.schedule_advance(pending);
            self.publish(&session);
        }
        Ok(submission)
    }

    //
    // ─── RESULTS ───────────────────────────────────────────────────────────────
    //

    /// Latest stored results and high score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on backend failures.
    pub async fn results(&self) -> Result<ResultsScreen, SessionError> {
        self.shared.summaries.latest().await
    }

    /// Retry storing a completed quiz whose hand-off failed.
    ///
    /// Navigates to the results screen once stored. Returns the high score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` if nothing is waiting to be stored, or
    /// `SessionError::Storage` if the retry fails as well.
    pub async fn finalize_results(&self) -> Result<u32, SessionError> {
        let snapshot = self
            .unsaved()
            .clone()
            .ok_or(SessionError::NotCompleted)?;
        self.hand_off(snapshot, None).await
    }

    //
    // ─── BACKGROUND TASKS ──────────────────────────────────────────────────────
    //

    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.shared
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn unsaved(&self) -> MutexGuard<'_, Option<CompletedSession>> {
        self.shared
            .unsaved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &QuizSession) {
        self.shared.view_tx.send_replace(session.view());
    }

    fn spawn_ticker(&self, token: TimerToken) {
        let this = self.clone();
        let handle = tokio::spawn(async move { this.run_ticker(token).await });
        self.tasks().replace_ticker(handle);
    }

    async fn run_ticker(self, token: TimerToken) {
        let interval = self.shared.settings.tick_interval();
        loop {
            tokio::time::sleep(interval).await;
            let mut session = self.shared.session.lock().await;
            match session.tick(token) {
                Tick::Running(_) => self.publish(&session),
                Tick::Expired(pending) => {
                    debug!(index = pending.index(), "time is up");
                    self.schedule_advance(pending);
                    self.publish(&session);
                    return;
                }
                Tick::Ignored => return,
            }
        }
    }

    fn schedule_advance(&self, pending: PendingAdvance) {
        let this = self.clone();
        let delay = self.shared.settings.feedback_delay();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.run_advance(pending).await;
        });
        self.tasks().replace_advance(handle);
    }

    async fn run_advance(self, pending: PendingAdvance) {
        let (outcome, run) = {
            let mut session = self.shared.session.lock().await;
            let outcome = session.advance(pending, self.shared.clock.now());
            match &outcome {
                Advance::Next { timer, .. } => self.spawn_ticker(*timer),
                Advance::Completed(snapshot) => {
                    // Detach this task so a restart cannot abort the save.
                    drop(self.tasks().advance.take());
                    *self.unsaved() = Some(snapshot.clone());
                }
                Advance::Ignored => {}
            }
            self.publish(&session);
            (outcome, self.shared.run.load(Ordering::SeqCst))
        };

        if let Advance::Completed(snapshot) = outcome {
            info!(score = snapshot.score(), total = snapshot.total(), "quiz completed");
            if let Err(err) = self.hand_off(snapshot, Some(run)).await {
                error!(error = %err, "failed to store quiz results");
            }
        }
    }

    /// Store the snapshot, then switch to the results screen.
    ///
    /// With `run` set, navigation is skipped if a new run started meanwhile.
    /// The snapshot stays in `unsaved` until a save succeeds.
    async fn hand_off(
        &self,
        snapshot: CompletedSession,
        run: Option<u64>,
    ) -> Result<u32, SessionError> {
        let high_score = self.shared.summaries.record(&snapshot).await?;
        {
            let mut unsaved = self.unsaved();
            if unsaved.as_ref() == Some(&snapshot) {
                *unsaved = None;
            }
        }

        if run.is_none_or(|run| run == self.shared.run.load(Ordering::SeqCst)) {
            self.shared.nav_tx.send_replace(View::Results);
        } else {
            debug!("quiz restarted while storing results; staying on the quiz");
        }
        Ok(high_score)
    }
}
