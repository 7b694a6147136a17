use tokio::sync::Mutex;

use crate::models::quiz::Quiz;
use crate::services::session::QuizOrigin;

/// Single-slot hand-off for ephemeral quizzes between the catalog (or
/// the generation dialog) and the session engine. Taking the quiz
/// empties the slot, so a finished ephemeral session cannot be
/// restarted from stale state.
#[derive(Default)]
pub struct ScratchSlot {
    slot: Mutex<Option<(QuizOrigin, Quiz)>>,
}

impl ScratchSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stash(&self, origin: QuizOrigin, quiz: Quiz) {
        *self.slot.lock().await = Some((origin, quiz));
    }

    pub async fn take(&self) -> Option<(QuizOrigin, Quiz)> {
        self.slot.lock().await.take()
    }
}
