//! Engine error types.
//!
//! The taxonomy separates client-correctable problems (configuration),
//! retryable collaborator failures (generation), terminal retake-path
//! failures (missing or malformed stored quiz), and persistence failures
//! that must never discard an already-computed result.

use thiserror::Error;
use uuid::Uuid;

/// A reason a quiz draft failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("difficulty is not set")]
    MissingDifficulty,
    #[error("question kind is not set")]
    MissingKind,
    #[error("question count is not set")]
    MissingCount,
    #[error("question count {0} is below the minimum of 3")]
    TooFewQuestions(u32),
}

/// Errors surfaced by the quiz engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration is incomplete or inconsistent. Correctable by the
    /// caller before any session starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The question-generation collaborator returned an error, an empty
    /// set, or malformed questions. Retryable.
    #[error("question generation failed: {0}")]
    GenerationFailed(String),

    /// Retake path: no stored quiz under this id. Terminal.
    #[error("quiz {0} not found")]
    QuizNotFound(Uuid),

    /// Retake path: the stored document cannot seed a session. Terminal.
    #[error("stored quiz is malformed: {0}")]
    MalformedQuiz(String),

    /// The attempt store rejected a write. The computed record is still
    /// returned to the caller alongside this error.
    #[error("failed to persist attempt: {0}")]
    PersistenceFailed(String),
}

impl Error {
    /// Whether retrying the same call can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::GenerationFailed(_) | Error::PersistenceFailed(_)
        )
    }
}
