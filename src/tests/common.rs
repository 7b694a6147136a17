use bson::oid::ObjectId;
use chrono::Utc;

use crate::models::quiz::{AccessType, Difficulty, Question, Quiz};

pub fn question(text: &str, options: &[&str], correct: &[&str]) -> Question {
    Question {
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answers: correct.iter().map(|c| c.to_string()).collect(),
        explanation: format!("Explanation for {text}"),
    }
}

/// A free quiz with `n` four-option questions, each with "A" as the
/// single correct answer.
pub fn sample_quiz(n: usize) -> Quiz {
    let questions = (0..n)
        .map(|i| question(&format!("Question {}?", i + 1), &["A", "B", "C", "D"], &["A"]))
        .collect::<Vec<_>>();
    Quiz {
        id: None,
        title: "Sample Quiz".to_string(),
        description: "A quiz for tests".to_string(),
        category: "General".to_string(),
        difficulty: Difficulty::Medium,
        access_type: AccessType::Free,
        duration_minutes: Some(10),
        total_questions: n as u32,
        questions,
        is_mock_exam: false,
        scheduled_for: None,
        created_at: Utc::now(),
    }
}

/// Same as `sample_quiz` but carrying a persistent id, as a quiz
/// fetched from the store would.
pub fn stored_quiz(n: usize) -> Quiz {
    let mut quiz = sample_quiz(n);
    quiz.id = Some(ObjectId::new());
    quiz
}
