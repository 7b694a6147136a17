use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::LocalQuizCache;
use crate::error::Error;
use crate::models::attempt::Attempt;
use crate::models::quiz::Quiz;
use crate::services::quiz_store::QuizStore;
use crate::services::scratch::ScratchSlot;

/// Where the quiz driving a session came from. Generated and
/// quick-practice quizzes are ephemeral: they have no persistent id and
/// their attempts are never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOrigin {
    Stored,
    Generated,
    QuickPractice,
}

impl QuizOrigin {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, QuizOrigin::Generated | QuizOrigin::QuickPractice)
    }
}

/// Graded view of one question after the session finished.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionResult {
    pub question: String,
    pub options: Vec<String>,
    pub selected_answers: Vec<String>,
    pub correct_answers: Vec<String>,
    pub is_correct: bool,
    pub explanation: String,
}

/// Final grading of a session. Computed once, on the transition to
/// Finished, and stable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub score: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub results: Vec<QuestionResult>,
}

/// One timed quiz attempt. Owns all of its mutable state: the current
/// question index, one selected-answer set per question and the
/// countdown. Nothing is shared between session instances.
///
/// Constructing the session is the Loading -> InProgress transition;
/// `finish` (explicit or forced by the countdown reaching zero) is the
/// only way into the terminal Finished state.
pub struct QuizSession {
    id: Uuid,
    quiz: Quiz,
    origin: QuizOrigin,
    current_index: usize,
    answers: Vec<BTreeSet<String>>,
    time_left: u64,
    outcome: Option<SessionOutcome>,
    attempt_recorded: bool,
}

impl QuizSession {
    /// Rejects quizzes with an empty question set; they never reach
    /// InProgress. The countdown starts at `duration_minutes * 60`
    /// seconds, or one minute per question when no duration is set.
    pub fn new(quiz: Quiz, origin: QuizOrigin) -> Result<Self, Error> {
        if quiz.questions.is_empty() {
            return Err(Error::EmptyQuiz);
        }

        let duration_minutes = quiz
            .duration_minutes
            .unwrap_or(quiz.questions.len() as u32);
        let answers = vec![BTreeSet::new(); quiz.questions.len()];
        let session = QuizSession {
            id: Uuid::new_v4(),
            quiz,
            origin,
            current_index: 0,
            answers,
            time_left: u64::from(duration_minutes) * 60,
            outcome: None,
            attempt_recorded: false,
        };
        debug!(
            session = %session.id,
            title = %session.quiz.title,
            questions = session.quiz.questions.len(),
            seconds = session.time_left,
            "quiz session started"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn origin(&self) -> QuizOrigin {
        self.origin
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The grading, once the session finished.
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn selected_answers(&self, index: usize) -> Option<&BTreeSet<String>> {
        self.answers.get(index)
    }

    /// Adds or removes `option` in the answer set of question `index`.
    /// Idempotent on repeated identical calls; ignored once finished or
    /// for an out-of-range index.
    pub fn select_option(&mut self, index: usize, option: &str, checked: bool) {
        if self.is_finished() {
            return;
        }
        let Some(selection) = self.answers.get_mut(index) else {
            return;
        };
        if checked {
            selection.insert(option.to_string());
        } else {
            selection.remove(option);
        }
    }

    /// Moves to the next question; no-op on the last one.
    pub fn next(&mut self) {
        if self.current_index + 1 < self.quiz.questions.len() {
            self.current_index += 1;
        }
    }

    /// Moves to the previous question; no-op on the first one.
    pub fn previous(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// One second of countdown. Reaching zero forces the transition to
    /// Finished exactly as if the user had submitted. Returns whether
    /// the session is finished, so timer loops know when to stop.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return true;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            info!(session = %self.id, "time elapsed, submitting quiz");
            self.finish();
            return true;
        }
        false
    }

    /// Grades every question and enters the terminal Finished state.
    /// Idempotent: a second call returns the outcome computed by the
    /// first one.
    pub fn finish(&mut self) -> &SessionOutcome {
        if self.outcome.is_none() {
            let outcome = self.grade();
            info!(
                session = %self.id,
                score = outcome.score,
                total = outcome.total_questions,
                "quiz session finished"
            );
            self.outcome = Some(outcome);
        }
        self.outcome.as_ref().unwrap()
    }

    /// A question is correct iff the selected-answer set equals the
    /// correct-answer set, order of picks irrelevant.
    fn grade(&self) -> SessionOutcome {
        let results: Vec<QuestionResult> = self
            .quiz
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, selection)| {
                let selected: Vec<String> = selection.iter().cloned().collect();
                let mut correct = question.correct_answers.clone();
                correct.sort();
                correct.dedup();
                let is_correct = selected == correct;
                QuestionResult {
                    question: question.question.clone(),
                    options: question.options.clone(),
                    selected_answers: selected,
                    correct_answers: question.correct_answers.clone(),
                    is_correct,
                    explanation: question.explanation.clone(),
                }
            })
            .collect();

        let score = results.iter().filter(|r| r.is_correct).count();
        let total_questions = self.quiz.questions.len();
        let percentage = ((score as f64 / total_questions as f64) * 100.0).round() as u32;
        SessionOutcome {
            score,
            total_questions,
            percentage,
            results,
        }
    }
}

/// The repeating one-second callback behind a running session. Spawned
/// on session start, stops itself when the session finishes and is
/// aborted on drop, so no tick can mutate a torn-down session.
pub struct CountdownTimer {
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    pub fn spawn(session: Arc<Mutex<QuizSession>>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately; swallow it so the
            // countdown starts a full second after spawn.
            interval.tick().await;
            loop {
                interval.tick().await;
                if session.lock().await.tick() {
                    break;
                }
            }
        });
        CountdownTimer { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// What to load a session from.
pub enum QuizRequest {
    /// A quiz persisted in the store (or, offline, in the local cache).
    Stored(ObjectId),
    /// The ephemeral quiz stashed in the scratch slot by the catalog or
    /// the generation dialog.
    Ephemeral,
}

/// Whether the attempt record made it to the store. Grading always
/// succeeds first; a persistence failure never reopens the session or
/// loses the computed score.
pub enum PersistenceStatus {
    Saved,
    /// Ephemeral quiz, or the attempt was already recorded.
    Skipped,
    Failed(Error),
}

pub struct CompletedSession {
    pub outcome: SessionOutcome,
    pub persistence: PersistenceStatus,
}

/// Orchestrates one attempt end to end: loading the quiz from the right
/// source, and recording the attempt on completion.
pub struct SessionService {
    store: Arc<QuizStore>,
    cache: Arc<LocalQuizCache>,
    scratch: Arc<ScratchSlot>,
}

impl SessionService {
    pub fn new(store: Arc<QuizStore>, cache: Arc<LocalQuizCache>, scratch: Arc<ScratchSlot>) -> Self {
        SessionService {
            store,
            cache,
            scratch,
        }
    }

    /// Loading phase. A missing quiz or an empty question set is fatal
    /// to the session; the caller redirects and nothing is retried.
    /// `offline` is the caller's connectivity observation; only then is
    /// the local cache consulted.
    pub async fn load(&self, request: QuizRequest, offline: bool) -> Result<QuizSession, Error> {
        match request {
            QuizRequest::Ephemeral => {
                let (origin, quiz) = self.scratch.take().await.ok_or(Error::QuizNotFound)?;
                QuizSession::new(quiz, origin)
            }
            QuizRequest::Stored(id) => {
                let quiz = if offline {
                    self.cache.get(&id)?
                } else {
                    self.store.get_quiz(id).await?
                };
                let quiz = quiz.ok_or(Error::QuizNotFound)?;
                QuizSession::new(quiz, QuizOrigin::Stored)
            }
        }
    }

    /// Finishes the session (idempotent) and records the attempt
    /// exactly once for stored quizzes. Ephemeral quizzes are never
    /// persisted. A failed write is reported but not retried.
    pub async fn complete(&self, session: &mut QuizSession, user_id: &str) -> CompletedSession {
        let outcome = session.finish().clone();

        if session.origin.is_ephemeral() || session.attempt_recorded {
            return CompletedSession {
                outcome,
                persistence: PersistenceStatus::Skipped,
            };
        }
        session.attempt_recorded = true;

        let persistence = match Attempt::from_outcome(&session.quiz, user_id, &outcome) {
            Ok(attempt) => match self.store.save_attempt(&attempt).await {
                Ok(()) => PersistenceStatus::Saved,
                Err(err) => {
                    warn!(session = %session.id, error = %err, "failed to record attempt");
                    PersistenceStatus::Failed(err)
                }
            },
            Err(err) => {
                warn!(session = %session.id, error = %err, "failed to record attempt");
                PersistenceStatus::Failed(err)
            }
        };

        CompletedSession {
            outcome,
            persistence,
        }
    }
}
