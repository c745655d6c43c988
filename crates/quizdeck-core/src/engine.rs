//! Central quiz engine orchestrator.
//!
//! Coordinates the collaborators around a session's lifecycle: question
//! generation before a session starts, analysis and persistence after it
//! completes. The session itself (timing, scoring, state) never touches a
//! collaborator, so generator latency or store outages cannot distort a
//! live countdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::attempt::AttemptRecord;
use crate::error::Error;
use crate::host::SessionHost;
use crate::model::{Question, QuizDraft};
use crate::retake::rehydrate;
use crate::session::Session;
use crate::traits::{
    Analysis, AttemptAnalyzer, AttemptStore, GenerationRequest, QuestionGenerator, QuizDocument,
};

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// User whose attempt history the store reads and writes.
    pub user: String,
    /// Generation attempts before giving up (invalid output counts).
    pub max_generation_attempts: u32,
    /// Delay between generation attempts.
    pub retry_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user: "default".to_string(),
            max_generation_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// A completed run's outcome, scored before any collaborator I/O.
///
/// The record is always present: a failed save is reported alongside it in
/// `save_error`, never by discarding the computed results.
#[derive(Debug)]
pub struct CompletedAttempt {
    pub record: AttemptRecord,
    /// True when the analyzer failed and the insights were zeroed.
    pub analysis_degraded: bool,
    pub save_error: Option<Error>,
}

/// The central quiz engine.
pub struct QuizEngine {
    generator: Arc<dyn QuestionGenerator>,
    analyzer: Arc<dyn AttemptAnalyzer>,
    store: Arc<dyn AttemptStore>,
    config: EngineConfig,
}

impl QuizEngine {
    pub fn new(
        generator: Arc<dyn QuestionGenerator>,
        analyzer: Arc<dyn AttemptAnalyzer>,
        store: Arc<dyn AttemptStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            generator,
            analyzer,
            store,
            config,
        }
    }

    /// Validate a draft, generate its question set, and start a hosted
    /// session at question 0 under a fresh quiz id.
    pub async fn start_quiz(&self, draft: QuizDraft) -> Result<SessionHost, Error> {
        let config = draft.validate()?;
        let quiz_id = Uuid::new_v4();
        let request = GenerationRequest::from_config(&config);

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_generation_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.config.retry_delay).await;
            }
            tracing::info!(
                generator = self.generator.name(),
                topic = %config.topic,
                attempt,
                "requesting question set"
            );
            match self.generator.generate(&request).await {
                Ok(questions) => match check_question_set(questions, config.question_count) {
                    Ok(questions) => {
                        tracing::info!(%quiz_id, count = questions.len(), "quiz ready");
                        let session = Session::begin(quiz_id, config, questions);
                        return Ok(SessionHost::from_session(session));
                    }
                    Err(reason) => {
                        tracing::warn!(attempt, %reason, "generated question set rejected");
                        last_error = reason;
                    }
                },
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "generation attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::GenerationFailed(format!(
            "after {} attempts: {last_error}",
            self.config.max_generation_attempts
        )))
    }

    /// Load a stored quiz and start a fresh hosted run over the identical
    /// question set, keeping the original quiz id.
    pub async fn retake(&self, quiz_id: Uuid) -> Result<SessionHost, Error> {
        let document = self
            .store
            .find_quiz(&self.config.user, quiz_id)
            .await
            .map_err(|e| Error::PersistenceFailed(e.to_string()))?
            .ok_or(Error::QuizNotFound(quiz_id))?;

        let session = rehydrate(document)?;
        tracing::info!(%quiz_id, "retake session started");
        Ok(SessionHost::from_session(session))
    }

    /// Score a completed session, analyze it, and persist the attempt.
    ///
    /// The record is computed synchronously first; analyzer failure
    /// degrades to empty insights and store failure is surfaced next to
    /// the record, so the caller always gets the results.
    pub async fn complete(&self, session: &Session) -> CompletedAttempt {
        assert!(
            session.is_completed(),
            "complete called before the session finished"
        );

        // Score first so the breakdown exists even if analysis hangs up.
        let provisional = AttemptRecord::build(session, &Analysis::default(), Utc::now());

        let (analysis, analysis_degraded) =
            match self.analyzer.analyze(&provisional.breakdown).await {
                Ok(analysis) => (analysis, false),
                Err(e) => {
                    tracing::warn!(
                        analyzer = self.analyzer.name(),
                        error = %e,
                        "analysis failed, continuing without insights"
                    );
                    (Analysis::default(), true)
                }
            };

        let record = AttemptRecord::build(session, &analysis, provisional.taken_at);
        let quiz = QuizDocument::from_session(session);
        let save_error = match self
            .store
            .append_attempt(&self.config.user, &quiz, &record)
            .await
        {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(quiz_id = %record.quiz_id, error = %e, "attempt save failed");
                Some(Error::PersistenceFailed(e.to_string()))
            }
        };

        CompletedAttempt {
            record,
            analysis_degraded,
            save_error,
        }
    }

    /// Retry persisting a record whose first save failed.
    pub async fn retry_save(&self, session: &Session, record: &AttemptRecord) -> Result<(), Error> {
        let quiz = QuizDocument::from_session(session);
        self.store
            .append_attempt(&self.config.user, &quiz, record)
            .await
            .map_err(|e| Error::PersistenceFailed(e.to_string()))
    }

    /// Stored quiz documents for the configured user, for history views.
    pub async fn history(&self) -> Result<Vec<QuizDocument>, Error> {
        self.store
            .list_quizzes(&self.config.user)
            .await
            .map_err(|e| Error::PersistenceFailed(e.to_string()))
    }
}

/// Validate a generated question set. The count must match exactly; a
/// surplus is as much a contract violation as a shortfall.
fn check_question_set(questions: Vec<Question>, expected: u32) -> Result<Vec<Question>, String> {
    if questions.len() as u32 != expected {
        return Err(format!(
            "expected {expected} questions, got {}",
            questions.len()
        ));
    }
    for (i, question) in questions.iter().enumerate() {
        question.validate().map_err(|reason| format!("question {i}: {reason}"))?;
    }
    Ok(questions)
}
