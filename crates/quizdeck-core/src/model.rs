//! Core data model types for quizdeck.
//!
//! These are the fundamental types the entire quizdeck system uses to
//! represent quiz configurations, questions, and recorded answers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Minimum number of questions a quiz may have.
pub const MIN_QUESTION_COUNT: u32 = 3;

/// Quiz difficulty. Determines the per-question time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// The per-question countdown duration. Resolved once at session start
    /// and re-applied identically for every question in the session.
    pub fn time_budget(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_secs(15),
            Difficulty::Medium => Duration::from_secs(25),
            Difficulty::Hard => Duration::from_secs(35),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The kind of questions a quiz contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "true-false")]
    TrueFalse,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple-choice"),
            QuestionKind::TrueFalse => write!(f, "true-false"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "multiple_choice" | "mc" => Ok(QuestionKind::MultipleChoice),
            "true-false" | "true_false" | "tf" => Ok(QuestionKind::TrueFalse),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A quiz being configured. Difficulty, kind, and count stay optional until
/// [`QuizDraft::validate`] promotes the draft to a [`QuizConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizDraft {
    /// Subject of the quiz (e.g. "Arrays").
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub kind: Option<QuestionKind>,
    #[serde(default)]
    pub question_count: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QuizDraft {
    /// Check the draft and promote it to a complete configuration.
    ///
    /// Pure and side-effect free; the same check guards both the generation
    /// request and any path that would start a session.
    pub fn validate(&self) -> Result<QuizConfig, ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        let difficulty = self.difficulty.ok_or(ConfigError::MissingDifficulty)?;
        let kind = self.kind.ok_or(ConfigError::MissingKind)?;
        let question_count = self.question_count.ok_or(ConfigError::MissingCount)?;
        if question_count < MIN_QUESTION_COUNT {
            return Err(ConfigError::TooFewQuestions(question_count));
        }

        Ok(QuizConfig {
            topic: self.topic.trim().to_string(),
            difficulty,
            kind,
            question_count,
            description: self.description.clone(),
            tags: self.tags.clone(),
        })
    }
}

/// A validated quiz configuration. Every field is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub topic: String,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
    pub question_count: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A single quiz question. Immutable once a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to the candidate.
    pub text: String,
    /// Ordered answer options (at least two).
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_index: usize,
}

impl Question {
    /// Check structural invariants: at least two options and an in-range
    /// correct index. Used on both the generation and retake paths.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("question text is empty".into());
        }
        if self.options.len() < 2 {
            return Err(format!(
                "question has {} option(s), need at least 2",
                self.options.len()
            ));
        }
        if self.correct_index >= self.options.len() {
            return Err(format!(
                "correct_index {} out of range for {} options",
                self.correct_index,
                self.options.len()
            ));
        }
        Ok(())
    }
}

/// What the candidate did on one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// An option index was submitted before the countdown expired.
    Answered(usize),
    /// The countdown expired with no submission.
    Skipped,
}

impl Selection {
    pub fn is_skipped(self) -> bool {
        matches!(self, Selection::Skipped)
    }
}

/// The immutable outcome written to a question slot, whether from an
/// explicit submission or a timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selection: Selection,
    pub is_correct: bool,
    pub time_taken_secs: u64,
}

/// The running results accumulator for one session.
///
/// Mutated only by the session state machine: each slot transitions from
/// `None` to `Some` exactly once, and the aggregate counters move in
/// lockstep with the slot writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scorecard {
    /// Number of correct answers so far.
    pub score: u32,
    /// Total answer time so far, in whole seconds.
    pub total_time_secs: u64,
    /// Per-question answer time, zero until the slot is written.
    pub question_times: Vec<u64>,
    /// Per-question outcome, written exactly once per slot.
    pub answers: Vec<Option<AnswerRecord>>,
}

impl Scorecard {
    /// A zeroed scorecard sized to `question_count`.
    pub fn new(question_count: usize) -> Self {
        Self {
            score: 0,
            total_time_secs: 0,
            question_times: vec![0; question_count],
            answers: vec![None; question_count],
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Whether slot `index` has already been decided.
    pub fn is_recorded(&self, index: usize) -> bool {
        self.answers[index].is_some()
    }

    /// Write the outcome for one question slot.
    ///
    /// Panics if the slot was already written; callers guard the
    /// double-fire race before reaching this point.
    pub fn record(&mut self, record: AnswerRecord) {
        let index = record.question_index;
        assert!(
            self.answers[index].is_none(),
            "answer slot {index} written twice"
        );
        if record.is_correct {
            self.score += 1;
        }
        self.total_time_secs += record.time_taken_secs;
        self.question_times[index] = record.time_taken_secs;
        self.answers[index] = Some(record);
    }

    /// Number of correct answers recorded so far.
    pub fn correct_count(&self) -> u32 {
        self.score
    }

    /// True once every slot has been written.
    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }
}
