use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::cache::LocalQuizCache;
use crate::error::Error;
use crate::models::quiz::{AccessType, Difficulty, Question, Quiz};
use crate::services::quiz_store::QuizStore;

/// Number of questions a quick-practice quiz aims for.
pub const QUICK_PRACTICE_SIZE: usize = 15;
/// Below this many pooled questions, quick practice is refused.
pub const QUICK_PRACTICE_MIN_POOL: usize = 5;

/// Catalog browsing: the general quiz listing, its client-side filters
/// and the quick-practice assembly. Falls back to the local cache when
/// the caller reports no connectivity.
pub struct QuizCatalog {
    store: Arc<QuizStore>,
    cache: Arc<LocalQuizCache>,
}

impl QuizCatalog {
    pub fn new(store: Arc<QuizStore>, cache: Arc<LocalQuizCache>) -> Self {
        QuizCatalog { store, cache }
    }

    /// All quizzes eligible for the general listing. Mock exams are
    /// scheduled events and stay out of it.
    pub async fn browse(&self, offline: bool) -> Result<Vec<Quiz>, Error> {
        let all = if offline {
            self.cache.get_all()?
        } else {
            self.store.list_quizzes().await?
        };
        Ok(all.into_iter().filter(|q| !q.is_mock_exam).collect())
    }

    /// Assembles an ephemeral quick-practice quiz from the accessible
    /// question pool. The result is never persisted.
    pub async fn quick_practice(&self, elevated_access: bool, offline: bool) -> Result<Quiz, Error> {
        let quizzes = self.browse(offline).await?;
        build_quick_practice(&quizzes, elevated_access, &mut rand::thread_rng())
    }
}

/// Pools every question of the accessible quizzes (free ones, or all of
/// them for elevated access), shuffles, and keeps the first
/// `QUICK_PRACTICE_SIZE`. Refused outright when fewer than
/// `QUICK_PRACTICE_MIN_POOL` questions are available.
pub fn build_quick_practice<R: Rng>(
    quizzes: &[Quiz],
    elevated_access: bool,
    rng: &mut R,
) -> Result<Quiz, Error> {
    let mut pool: Vec<Question> = quizzes
        .iter()
        .filter(|q| elevated_access || q.access_type == AccessType::Free)
        .flat_map(|q| q.questions.iter().cloned())
        .collect();

    if pool.len() < QUICK_PRACTICE_MIN_POOL {
        return Err(Error::NotEnoughQuestions {
            available: pool.len(),
        });
    }

    pool.shuffle(rng);
    pool.truncate(QUICK_PRACTICE_SIZE);
    info!(questions = pool.len(), "quick practice assembled");

    Ok(Quiz {
        id: None,
        title: "Quick Practice".to_string(),
        description: "A session of random questions to test your knowledge.".to_string(),
        category: "Mixed".to_string(),
        difficulty: Difficulty::Medium,
        access_type: AccessType::Free,
        duration_minutes: Some(QUICK_PRACTICE_SIZE as u32),
        total_questions: pool.len() as u32,
        questions: pool,
        is_mock_exam: false,
        scheduled_for: None,
        created_at: Utc::now(),
    })
}

/// Client-side catalog filters. `None` / empty search means "all".
#[derive(Debug, Default, Clone)]
pub struct QuizFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub access_type: Option<AccessType>,
}

impl QuizFilter {
    pub fn matches(&self, quiz: &Quiz) -> bool {
        let search_ok = match &self.search {
            Some(term) => quiz.title.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        };
        search_ok
            && self.category.as_ref().map_or(true, |c| &quiz.category == c)
            && self.difficulty.map_or(true, |d| quiz.difficulty == d)
            && self.access_type.map_or(true, |a| quiz.access_type == a)
    }
}

pub fn filter_quizzes(quizzes: Vec<Quiz>, filter: &QuizFilter) -> Vec<Quiz> {
    quizzes.into_iter().filter(|q| filter.matches(q)).collect()
}
