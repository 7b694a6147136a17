use std::sync::Arc;

use bson::oid::ObjectId;

use crate::cache::LocalQuizCache;
use crate::db::init_db;
use crate::error::Error;
use crate::models::attempt::Attempt;
use crate::services::catalog::QuizCatalog;
use crate::services::quiz_store::QuizStore;
use crate::services::scratch::ScratchSlot;
use crate::services::session::{
    PersistenceStatus, QuizOrigin, QuizRequest, QuizSession, SessionService,
};

use super::common::{sample_quiz, stored_quiz};

/// Service wiring against a database that is never reached: the driver
/// connects lazily, so cache, scratch and grading paths run without a
/// server.
async fn offline_services() -> (Arc<QuizStore>, Arc<LocalQuizCache>, Arc<ScratchSlot>) {
    let db = Arc::new(init_db("mongodb://localhost:27017").await.unwrap());
    (
        Arc::new(QuizStore::new(db)),
        Arc::new(LocalQuizCache::open_in_memory().unwrap()),
        Arc::new(ScratchSlot::new()),
    )
}

#[test]
fn cache_round_trips_a_quiz_structurally() {
    let cache = LocalQuizCache::open_in_memory().unwrap();
    let quiz = stored_quiz(3);

    cache.put(&quiz).unwrap();
    let fetched = cache.get(&quiz.id.unwrap()).unwrap().unwrap();

    // Same options order, same correct-answer set.
    assert_eq!(fetched, quiz);
}

#[test]
fn cache_put_replaces_the_previous_document() {
    let cache = LocalQuizCache::open_in_memory().unwrap();
    let mut quiz = stored_quiz(2);
    cache.put(&quiz).unwrap();

    quiz.title = "Renamed".to_string();
    cache.put(&quiz).unwrap();

    assert_eq!(cache.get_all().unwrap().len(), 1);
    let fetched = cache.get(&quiz.id.unwrap()).unwrap().unwrap();
    assert_eq!(fetched.title, "Renamed");
}

#[test]
fn cache_misses_return_none() {
    let cache = LocalQuizCache::open_in_memory().unwrap();
    assert!(cache.get(&ObjectId::new()).unwrap().is_none());
}

#[test]
fn cache_refuses_quizzes_without_an_id() {
    let cache = LocalQuizCache::open_in_memory().unwrap();
    assert!(matches!(
        cache.put(&sample_quiz(1)),
        Err(Error::MissingQuizId)
    ));
}

#[test]
fn cache_lists_every_stored_quiz() {
    let cache = LocalQuizCache::open_in_memory().unwrap();
    for _ in 0..3 {
        cache.put(&stored_quiz(1)).unwrap();
    }
    assert_eq!(cache.get_all().unwrap().len(), 3);
}

#[tokio::test]
async fn scratch_slot_hands_a_quiz_over_once() {
    let scratch = ScratchSlot::new();
    scratch
        .stash(QuizOrigin::Generated, sample_quiz(2))
        .await;

    let (origin, quiz) = scratch.take().await.expect("slot should be filled");
    assert_eq!(origin, QuizOrigin::Generated);
    assert_eq!(quiz.questions.len(), 2);

    // Taking empties the slot.
    assert!(scratch.take().await.is_none());
}

#[tokio::test]
async fn scratch_slot_keeps_only_the_latest_quiz() {
    let scratch = ScratchSlot::new();
    scratch
        .stash(QuizOrigin::Generated, sample_quiz(2))
        .await;
    scratch
        .stash(QuizOrigin::QuickPractice, sample_quiz(5))
        .await;

    let (origin, quiz) = scratch.take().await.unwrap();
    assert_eq!(origin, QuizOrigin::QuickPractice);
    assert_eq!(quiz.questions.len(), 5);
}

#[tokio::test]
async fn ephemeral_sessions_are_never_persisted() {
    let (store, cache, scratch) = offline_services().await;
    scratch
        .stash(QuizOrigin::QuickPractice, sample_quiz(3))
        .await;
    let service = SessionService::new(store, cache, scratch);

    let mut session = service.load(QuizRequest::Ephemeral, false).await.unwrap();
    session.select_option(0, "A", true);

    let completed = service.complete(&mut session, "user-1").await;
    assert_eq!(completed.outcome.score, 1);
    assert!(matches!(completed.persistence, PersistenceStatus::Skipped));

    // The scratch slot was emptied on load; a second ephemeral load is
    // a load failure, not a replay.
    assert!(matches!(
        service.load(QuizRequest::Ephemeral, false).await,
        Err(Error::QuizNotFound)
    ));
}

#[tokio::test]
async fn offline_load_reads_the_local_cache() {
    let (store, cache, scratch) = offline_services().await;
    let quiz = stored_quiz(2);
    cache.put(&quiz).unwrap();
    let service = SessionService::new(store, cache, scratch);

    let session = service
        .load(QuizRequest::Stored(quiz.id.unwrap()), true)
        .await
        .unwrap();
    assert_eq!(session.quiz().id, quiz.id);
    assert_eq!(session.origin(), QuizOrigin::Stored);

    assert!(matches!(
        service.load(QuizRequest::Stored(ObjectId::new()), true).await,
        Err(Error::QuizNotFound)
    ));
}

#[tokio::test]
async fn offline_browsing_lists_cached_quizzes_without_mock_exams() {
    let (store, cache, _) = offline_services().await;
    cache.put(&stored_quiz(1)).unwrap();
    cache.put(&stored_quiz(1)).unwrap();
    let mut mock_exam = stored_quiz(1);
    mock_exam.is_mock_exam = true;
    cache.put(&mock_exam).unwrap();

    let catalog = QuizCatalog::new(store, cache);
    let listing = catalog.browse(true).await.unwrap();
    assert_eq!(listing.len(), 2);
    assert!(listing.iter().all(|q| !q.is_mock_exam));
}

/// Round-trip against a live MongoDB, in the shape the application
/// uses. Needs MONGODB_TEST_URI, hence ignored by default.
#[tokio::test]
#[ignore = "requires a running MongoDB (set MONGODB_TEST_URI)"]
async fn store_round_trips_quizzes_and_attempts() {
    dotenv::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let uri = std::env::var("MONGODB_TEST_URI").expect("MONGODB_TEST_URI must be set for tests");
    let db = Arc::new(init_db(&uri).await.unwrap());
    for collection in ["quizzes", "attempts"] {
        db.collection::<bson::Document>(collection)
            .drop()
            .await
            .unwrap();
    }

    let store = QuizStore::new(db);
    let quiz = sample_quiz(3);
    let id = store.create_quiz(quiz.clone()).await.unwrap();

    let fetched = store.get_quiz(id).await.unwrap().expect("quiz should exist");
    assert_eq!(fetched.questions, quiz.questions);
    assert_eq!(fetched.title, quiz.title);

    let mut session = QuizSession::new(fetched.clone(), QuizOrigin::Stored).unwrap();
    session.select_option(0, "A", true);
    let outcome = session.finish().clone();
    let attempt = Attempt::from_outcome(&fetched, "user-42", &outcome).unwrap();
    store.save_attempt(&attempt).await.unwrap();

    let history = store.attempts_for_user("user-42").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].score, 1);
    assert_eq!(history[0].quiz_id, id);

    store.delete_quiz(id).await.unwrap();
    assert!(store.get_quiz(id).await.unwrap().is_none());
}
