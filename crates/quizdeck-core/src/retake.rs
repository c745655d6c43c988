//! Rehydrating a stored quiz into a fresh session.
//!
//! A retake reuses the identical question set under the same quiz id, so
//! attempt history accumulates per quiz. The stored document is validated
//! before any countdown starts; storage contents are not trusted to still
//! satisfy the invariants they had when written.

use crate::error::Error;
use crate::session::Session;
use crate::traits::QuizDocument;

/// Build a fresh session from a stored quiz document.
///
/// The session starts at question 0 with a zeroed scorecard and the time
/// budget resolved from the stored difficulty. Past attempts in the
/// document do not leak into the new run.
pub fn rehydrate(document: QuizDocument) -> Result<Session, Error> {
    if document.questions.is_empty() {
        return Err(Error::MalformedQuiz(format!(
            "quiz {} has no questions",
            document.quiz_id
        )));
    }
    for (i, question) in document.questions.iter().enumerate() {
        if let Err(reason) = question.validate() {
            return Err(Error::MalformedQuiz(format!(
                "quiz {} question {i}: {reason}",
                document.quiz_id
            )));
        }
    }

    Ok(Session::begin(
        document.quiz_id,
        document.config,
        document.questions,
    ))
}
