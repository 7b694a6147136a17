use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use tracing::debug;

use crate::error::Error;
use crate::models::attempt::Attempt;
use crate::models::quiz::Quiz;

/// Gateway to the remote document store: quiz documents plus the
/// append-only attempt records.
pub struct QuizStore {
    quiz_collection: Collection<Quiz>,
    attempt_collection: Collection<Attempt>,
}

impl QuizStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            quiz_collection: db.collection("quizzes"),
            attempt_collection: db.collection("attempts"),
        }
    }

    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>, Error> {
        let mut cursor = self.quiz_collection.find(doc! {}).await?;
        let mut quizzes = Vec::new();
        while let Some(quiz) = cursor.try_next().await? {
            quizzes.push(quiz);
        }
        Ok(quizzes)
    }

    pub async fn get_quiz(&self, id: ObjectId) -> Result<Option<Quiz>, Error> {
        Ok(self.quiz_collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn create_quiz(&self, quiz: Quiz) -> Result<ObjectId, Error> {
        let insert_result = self.quiz_collection.insert_one(quiz).await?;
        let id = insert_result
            .inserted_id
            .as_object_id()
            .ok_or(Error::MissingQuizId)?;
        debug!(quiz = %id, "quiz created");
        Ok(id)
    }

    pub async fn update_quiz(&self, id: ObjectId, quiz: Quiz) -> Result<(), Error> {
        let result = self
            .quiz_collection
            .replace_one(doc! { "_id": id }, quiz)
            .await?;
        if result.matched_count == 0 {
            return Err(Error::QuizNotFound);
        }
        Ok(())
    }

    pub async fn delete_quiz(&self, id: ObjectId) -> Result<(), Error> {
        let result = self.quiz_collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(Error::QuizNotFound);
        }
        Ok(())
    }

    /// Appends one attempt record. Records are never updated afterward.
    pub async fn save_attempt(&self, attempt: &Attempt) -> Result<(), Error> {
        self.attempt_collection.insert_one(attempt).await?;
        debug!(user = %attempt.user_id, quiz = %attempt.quiz_id, "attempt recorded");
        Ok(())
    }

    /// A user's attempt history, most recent first.
    pub async fn attempts_for_user(&self, user_id: &str) -> Result<Vec<Attempt>, Error> {
        let mut cursor = self
            .attempt_collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut attempts = Vec::new();
        while let Some(attempt) = cursor.try_next().await? {
            attempts.push(attempt);
        }
        Ok(attempts)
    }
}
