//! The timed session state machine.
//!
//! A [`Session`] owns the question set and the results accumulator for one
//! run and is the single source of truth for what happened on each
//! question. Only one question is ever live at a time, so the machine is
//! single-writer: each answer slot is decided exactly once, either by a
//! submission or by a timeout, and the loser of that race is a defined
//! no-op.
//!
//! Lifecycle: `InProgress(0) -> Revealing(0) -> InProgress(1) -> ... ->
//! Completed`. `Completed` is terminal; a new run requires a fresh
//! [`Session::begin`]. Configuration and generation happen before a
//! session exists (see [`crate::engine`]); a retake enters directly at
//! `InProgress(0)` (see [`crate::retake`]).

use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::model::{AnswerRecord, Question, QuizConfig, Scorecard, Selection};

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Question `index` is live and its countdown is running.
    InProgress { index: usize },
    /// Question `index` has been decided; awaiting [`Session::advance`].
    Revealing { index: usize },
    /// All questions decided. Terminal.
    Completed,
}

/// Result of a submission or timeout event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The event decided question `index`.
    Recorded { index: usize, is_correct: bool },
    /// The slot was already decided by the other event; nothing changed.
    Ignored,
}

/// One timed quiz run.
#[derive(Debug)]
pub struct Session {
    quiz_id: Uuid,
    config: QuizConfig,
    questions: Vec<Question>,
    /// Per-question countdown, resolved once from difficulty at start.
    budget: Duration,
    scorecard: Scorecard,
    state: SessionState,
    question_started_at: Instant,
}

impl Session {
    /// Start a session over `questions`, entering `InProgress(0)`.
    ///
    /// Resolves the time budget from the configured difficulty and zeroes
    /// a scorecard sized to the question set. Panics on an empty question
    /// set; both entry paths validate before calling this.
    pub fn begin(quiz_id: Uuid, config: QuizConfig, questions: Vec<Question>) -> Self {
        assert!(!questions.is_empty(), "session started with no questions");
        let scorecard = Scorecard::new(questions.len());
        Self {
            quiz_id,
            budget: config.difficulty.time_budget(),
            config,
            questions,
            scorecard,
            state: SessionState::InProgress { index: 0 },
            question_started_at: Instant::now(),
        }
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn scorecard(&self) -> &Scorecard {
        &self.scorecard
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The per-question countdown duration for this session.
    pub fn time_budget(&self) -> Duration {
        self.budget
    }

    /// The question that is live or being revealed, if any.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress { index } | SessionState::Revealing { index } => {
                Some(&self.questions[index])
            }
            SessionState::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Record a submitted answer for the live question.
    ///
    /// Latency is the whole seconds elapsed since the question went live.
    /// An out-of-range `choice` is recorded as an incorrect answer. In
    /// `Revealing` (the submit/timeout race window) this is a no-op;
    /// calling it on a completed session is a driver bug and panics.
    pub fn submit_answer(&mut self, choice: usize) -> Transition {
        let index = match self.state {
            SessionState::InProgress { index } => index,
            SessionState::Revealing { .. } => return Transition::Ignored,
            SessionState::Completed => {
                panic!("submit_answer called on a completed session")
            }
        };

        let elapsed = self.question_started_at.elapsed().as_secs();
        let is_correct = self.questions[index].correct_index == choice;
        self.decide(AnswerRecord {
            question_index: index,
            selection: Selection::Answered(choice),
            is_correct,
            time_taken_secs: elapsed,
        })
    }

    /// Record a timeout for the live question.
    ///
    /// Always charges the full time budget rather than observed elapsed
    /// time, keeping the metric deterministic under scheduler jitter. Same
    /// race and contract rules as [`Session::submit_answer`].
    pub fn expire_current(&mut self) -> Transition {
        let index = match self.state {
            SessionState::InProgress { index } => index,
            SessionState::Revealing { .. } => return Transition::Ignored,
            SessionState::Completed => {
                panic!("expire_current called on a completed session")
            }
        };

        self.decide(AnswerRecord {
            question_index: index,
            selection: Selection::Skipped,
            is_correct: false,
            time_taken_secs: self.budget.as_secs(),
        })
    }

    fn decide(&mut self, record: AnswerRecord) -> Transition {
        let index = record.question_index;
        let is_correct = record.is_correct;
        self.scorecard.record(record);
        self.state = SessionState::Revealing { index };
        Transition::Recorded { index, is_correct }
    }

    /// Move on from a decided question: either the next question goes live
    /// with a fresh countdown, or the session completes.
    ///
    /// Valid only in `Revealing`; anything else is a driver bug.
    pub fn advance(&mut self) -> SessionState {
        let index = match self.state {
            SessionState::Revealing { index } => index,
            other => panic!("advance called in {other:?}"),
        };

        self.state = if index + 1 < self.questions.len() {
            self.question_started_at = Instant::now();
            SessionState::InProgress { index: index + 1 }
        } else {
            debug_assert!(self.scorecard.is_complete());
            SessionState::Completed
        };
        self.state
    }
}
