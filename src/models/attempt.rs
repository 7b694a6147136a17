use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::quiz::Quiz;
use crate::services::session::SessionOutcome;

/// Persisted record of one completed quiz session. Written once at
/// completion and never mutated afterward. `user_id` is the opaque id
/// issued by the external auth system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub user_id: String,
    pub quiz_id: ObjectId,
    pub quiz_title: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub correct_answers: u32,
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    /// Builds the record for a graded session. Fails when the quiz has
    /// no persistent id, which is what distinguishes ephemeral quizzes
    /// from stored ones.
    pub fn from_outcome(quiz: &Quiz, user_id: &str, outcome: &SessionOutcome) -> Result<Self, Error> {
        let quiz_id = quiz.id.ok_or(Error::MissingQuizId)?;
        Ok(Attempt {
            user_id: user_id.to_string(),
            quiz_id,
            quiz_title: quiz.title.clone(),
            score: outcome.score as u32,
            total_questions: outcome.total_questions as u32,
            percentage: outcome.percentage,
            correct_answers: outcome.score as u32,
            created_at: Utc::now(),
        })
    }
}
