use std::collections::HashSet;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::models::quiz::{AccessType, Difficulty, Question, Quiz};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct GenerateQuizRequest {
    pub topic: String,
    pub number_of_questions: u32,
    pub difficulty: Difficulty,
}

/// Gateway to the generative-text service. Sends a structured prompt,
/// parses the JSON answer and validates it against the quiz schema
/// before handing it to anyone else. Callers branch on the returned
/// `Result`; a failure leaves them free to retry by calling again.
pub struct GenerationClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GenerationClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gemini_api_key.clone(), config.gemini_model.clone())
    }

    pub async fn generate(&self, request: &GenerateQuizRequest) -> Result<Quiz, Error> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await.unwrap_or_else(|_| "<no body>".into());
        if !status.is_success() {
            return Err(Error::GenerationApi {
                status: status.as_u16(),
                message: text,
            });
        }

        let response: GeminiResponse = serde_json::from_str(&text)?;
        let payload = extract_payload_text(response)?;
        let quiz = quiz_from_payload(&payload, request)?;
        info!(
            topic = %request.topic,
            questions = quiz.questions.len(),
            "quiz generated"
        );
        Ok(quiz)
    }
}

pub(crate) fn build_prompt(request: &GenerateQuizRequest) -> String {
    let difficulty = match request.difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    };
    format!(
        "You are an expert educator designing material for competitive exam preparation. \
Create an exceptional, intellectually stimulating quiz on the topic below.\n\
\n\
Topic: {topic}\n\
Difficulty: {difficulty}\n\
Number of questions: {count}\n\
\n\
Respond with a single JSON object of the shape\n\
{{\"quiz\": {{\"title\": string, \"description\": string, \"category\": string, \
\"difficulty\": \"{difficulty}\", \"duration_minutes\": number, \"questions\": \
[{{\"question\": string, \"options\": [string], \"correctAnswers\": [string], \
\"explanation\": string}}]}}}}\n\
\n\
Requirements:\n\
- Questions must test analysis and applied understanding, not rote recall.\n\
- Incorrect options must be plausible distractors based on common mistakes.\n\
- CRUCIAL: every entry of correctAnswers must be an EXACT, verbatim copy of one \
entry of options.\n\
- Each explanation must state why the correct answers are right and why the \
other options are wrong.\n\
- duration_minutes should be realistic, one to two minutes per question.",
        topic = request.topic,
        difficulty = difficulty,
        count = request.number_of_questions,
    )
}

fn extract_payload_text(response: GeminiResponse) -> Result<String, Error> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| Error::InvalidGeneratedQuiz("empty model response".to_string()))
}

/// Parses the model's JSON payload and runs schema validation. The rest
/// of the crate only ever sees quizzes that passed this.
pub(crate) fn quiz_from_payload(payload: &str, request: &GenerateQuizRequest) -> Result<Quiz, Error> {
    let parsed: GeneratedPayload = serde_json::from_str(payload)?;
    let draft = parsed.quiz;
    validate_draft(&draft)?;
    if draft.questions.len() != request.number_of_questions as usize {
        warn!(
            requested = request.number_of_questions,
            received = draft.questions.len(),
            "generated quiz has a different question count than requested"
        );
    }
    Ok(draft.into_quiz())
}

pub(crate) fn validate_draft(draft: &QuizDraft) -> Result<(), Error> {
    if draft.questions.is_empty() {
        return Err(Error::InvalidGeneratedQuiz("no questions".to_string()));
    }
    for (index, question) in draft.questions.iter().enumerate() {
        let options: HashSet<&str> = question.options.iter().map(String::as_str).collect();
        if options.len() != question.options.len() {
            return Err(Error::InvalidGeneratedQuiz(format!(
                "question {index} has duplicate options"
            )));
        }
        if question.correct_answers.is_empty() {
            return Err(Error::InvalidGeneratedQuiz(format!(
                "question {index} has no correct answers"
            )));
        }
        for answer in &question.correct_answers {
            if !options.contains(answer.as_str()) {
                return Err(Error::InvalidGeneratedQuiz(format!(
                    "question {index}: correct answer {answer:?} does not match any option"
                )));
            }
        }
    }
    Ok(())
}

/// The shape the model is asked to produce. Missing the persistence
/// metadata a stored `Quiz` carries.
#[derive(Debug, Deserialize)]
pub(crate) struct QuizDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub questions: Vec<Question>,
}

impl QuizDraft {
    fn into_quiz(self) -> Quiz {
        let total_questions = self.questions.len() as u32;
        Quiz {
            id: None,
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            access_type: AccessType::Free,
            duration_minutes: Some(self.duration_minutes),
            total_questions,
            questions: self.questions,
            is_mock_exam: false,
            scheduled_for: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedPayload {
    pub quiz: QuizDraft,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiPart>,
}
