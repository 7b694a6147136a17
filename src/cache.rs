use std::path::Path;
use std::sync::Mutex;

use bson::oid::ObjectId;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::Error;
use crate::models::quiz::Quiz;

/// Durable per-client store of full quiz documents, keyed by quiz id.
/// The session engine and catalog only read from it when the caller
/// reports no connectivity; it is filled by collaborator code syncing
/// quizzes down while online.
pub struct LocalQuizCache {
    conn: Mutex<Connection>,
}

impl LocalQuizCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS quizzes (id TEXT PRIMARY KEY, document TEXT NOT NULL)",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Stores or replaces the cached copy of a quiz. Only persisted
    /// quizzes can be cached; ephemeral ones have no id to key on.
    pub fn put(&self, quiz: &Quiz) -> Result<(), Error> {
        let id = quiz.id.ok_or(Error::MissingQuizId)?;
        let document = serde_json::to_string(quiz)?;
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT OR REPLACE INTO quizzes (id, document) VALUES (?1, ?2)",
            params![id.to_hex(), document],
        )?;
        debug!(quiz = %id, "quiz cached locally");
        Ok(())
    }

    pub fn get(&self, id: &ObjectId) -> Result<Option<Quiz>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM quizzes WHERE id = ?1",
                params![id.to_hex()],
                |row| row.get(0),
            )
            .optional()?;
        match document {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    pub fn get_all(&self) -> Result<Vec<Quiz>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut statement = conn.prepare("SELECT document FROM quizzes")?;
        let rows = statement.query_map([], |row| row.get::<_, String>(0))?;

        let mut quizzes = Vec::new();
        for document in rows {
            quizzes.push(serde_json::from_str(&document?)?);
        }
        Ok(quizzes)
    }
}
