//! End-to-end session tests over the full stack: engine, mocks, and the
//! JSON store, driven on a paused clock so latencies are exact.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::{task, time};
use uuid::Uuid;

use quizdeck_core::engine::{EngineConfig, QuizEngine};
use quizdeck_core::metrics::Badge;
use quizdeck_core::model::{Difficulty, Question, QuestionKind, QuizDraft};
use quizdeck_core::session::SessionState;
use quizdeck_core::traits::{Analysis, AttemptStore};
use quizdeck_providers::mock::{MockAnalyzer, MockGenerator};
use quizdeck_store::JsonQuizStore;

fn questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            text: format!("Question {i}"),
            options: vec!["right".into(), "wrong".into()],
            correct_index: 0,
        })
        .collect()
}

fn draft(topic: &str, difficulty: Difficulty, count: u32) -> QuizDraft {
    QuizDraft {
        topic: topic.into(),
        difficulty: Some(difficulty),
        kind: Some(QuestionKind::MultipleChoice),
        question_count: Some(count),
        description: None,
        tags: vec![],
    }
}

fn engine_over(store: Arc<JsonQuizStore>, question_sets: HashMap<String, Vec<Question>>) -> QuizEngine {
    QuizEngine::new(
        Arc::new(MockGenerator::new(question_sets)),
        Arc::new(MockAnalyzer::new(Analysis {
            strong_topics: vec!["fundamentals".into()],
            weak_topics: vec![],
            study_materials: vec!["notes".into()],
            badges: vec![],
        })),
        store,
        EngineConfig {
            user: "tester".into(),
            ..EngineConfig::default()
        },
    )
}

async fn settle() {
    for _ in 0..10 {
        task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn e2e_mixed_run_scores_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonQuizStore::new(dir.path().join("history.json")));
    let mut sets = HashMap::new();
    sets.insert("Graphs".to_string(), questions(3));
    let engine = engine_over(Arc::clone(&store), sets);

    let mut host = engine
        .start_quiz(draft("Graphs", Difficulty::Easy, 3))
        .await
        .unwrap();

    // Correct in 5s.
    time::advance(Duration::from_secs(5)).await;
    host.submit_answer(0).await;
    host.advance().await;

    // Let the authoritative countdown expire question 1.
    time::advance(Duration::from_secs(16)).await;
    settle().await;
    assert_eq!(
        host.session().await.state(),
        SessionState::Revealing { index: 1 }
    );
    host.advance().await;

    // Wrong in 10s.
    time::advance(Duration::from_secs(10)).await;
    host.submit_answer(1).await;
    assert_eq!(host.advance().await, SessionState::Completed);

    let session = host.session().await;
    let outcome = engine.complete(&session).await;
    assert!(outcome.save_error.is_none());

    let record = &outcome.record;
    assert_eq!(record.score, 1);
    assert_eq!(record.skipped, 1);
    assert_eq!(record.accuracy, 33);
    assert_eq!(record.total_time, "00:30");
    assert_eq!(record.average_time, "00:10");
    assert_eq!(record.fastest_time, "00:05");
    assert_eq!(record.slowest_time, "00:15");
    assert!(record.badges.contains(&Badge::Beginner));
    assert!(record.badges.contains(&Badge::SpeedDemon));
    assert_eq!(record.strong_topics, vec!["fundamentals"]);

    let stored = store
        .find_quiz("tester", record.quiz_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.attempts.len(), 1);
    assert_eq!(stored.questions.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn e2e_retake_reuses_questions_with_hard_budget() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonQuizStore::new(dir.path().join("history.json")));
    let mut sets = HashMap::new();
    sets.insert("Lifetimes".to_string(), questions(5));
    let engine = engine_over(Arc::clone(&store), sets);

    let mut host = engine
        .start_quiz(draft("Lifetimes", Difficulty::Hard, 5))
        .await
        .unwrap();
    let quiz_id = host.session().await.quiz_id();

    loop {
        host.submit_answer(0).await;
        if host.advance().await == SessionState::Completed {
            break;
        }
    }
    {
        let session = host.session().await;
        let outcome = engine.complete(&session).await;
        assert_eq!(outcome.record.accuracy, 100);
    }

    let mut retake = engine.retake(quiz_id).await.unwrap();
    {
        let session = retake.session().await;
        assert_eq!(session.quiz_id(), quiz_id);
        assert_eq!(session.time_budget(), Duration::from_secs(35));
        assert_eq!(session.questions().len(), 5);
        assert_eq!(session.scorecard().score, 0);
    }
    assert_eq!(retake.remaining(), Duration::from_secs(35));

    loop {
        retake.submit_answer(1).await;
        if retake.advance().await == SessionState::Completed {
            break;
        }
    }
    let session = retake.session().await;
    let outcome = engine.complete(&session).await;
    assert_eq!(outcome.record.accuracy, 0);
    assert!(outcome.record.badges.contains(&Badge::Challenger));

    let stored = store.find_quiz("tester", quiz_id).await.unwrap().unwrap();
    assert_eq!(stored.attempts.len(), 2);
    assert_eq!(stored.attempts[0].accuracy, 100);
    assert_eq!(stored.attempts[1].accuracy, 0);
}

#[tokio::test(start_paused = true)]
async fn e2e_unknown_topic_fails_generation() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonQuizStore::new(dir.path().join("history.json")));
    let engine = engine_over(store, HashMap::new());

    let err = engine
        .start_quiz(draft("Unmapped", Difficulty::Easy, 3))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("generation failed"));
}
