use thiserror::Error;

use crate::services::catalog::QUICK_PRACTICE_MIN_POOL;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested quiz does not exist in the store, cache or scratch slot.
    #[error("quiz not found")]
    QuizNotFound,

    /// A quiz with zero questions can never enter a session.
    #[error("quiz contains no questions")]
    EmptyQuiz,

    /// Not enough pooled questions to assemble a quick-practice quiz.
    #[error(
        "not enough questions for quick practice: {available} available, {} required",
        QUICK_PRACTICE_MIN_POOL
    )]
    NotEnoughQuestions { available: usize },

    /// Operation needs a persistent quiz id (cache writes, attempt records).
    #[error("quiz has no persistent id")]
    MissingQuizId,

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),

    #[error(transparent)]
    Cache(#[from] rusqlite::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The generation service answered with a non-success status.
    #[error("generation service returned {status}: {message}")]
    GenerationApi { status: u16, message: String },

    /// The generated quiz came back but violates the quiz schema.
    #[error("generated quiz failed validation: {0}")]
    InvalidGeneratedQuiz(String),
}
