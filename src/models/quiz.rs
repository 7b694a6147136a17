use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quiz document as stored in the `quizzes` collection and in the
/// offline cache. Field names follow the established wire contract, so
/// documents written by older clients keep deserializing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub access_type: AccessType,
    /// Countdown length. Sessions fall back to one minute per question
    /// when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Expected to equal `questions.len()`; not enforced by the engine.
    pub total_questions: u32,
    pub questions: Vec<Question>,
    #[serde(rename = "isMockExam", default)]
    pub is_mock_exam: bool,
    #[serde(rename = "scheduledFor", skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub question: String,
    /// Unique by value within one question.
    pub options: Vec<String>,
    /// Every entry must verbatim equal one of `options`.
    #[serde(rename = "correctAnswers")]
    pub correct_answers: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Free,
    Premium,
}
