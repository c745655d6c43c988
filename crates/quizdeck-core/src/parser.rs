//! TOML quiz file parser.
//!
//! Loads hand-authored quizzes from TOML files and directories, for
//! running sessions without a generation backend and for lint-style
//! validation in tooling.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Difficulty, Question, QuestionKind, QuizConfig, QuizDraft};

/// A quiz loaded from a local file: validated config plus question set.
#[derive(Debug, Clone)]
pub struct LocalQuiz {
    pub config: QuizConfig,
    pub questions: Vec<Question>,
}

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    topic: String,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    kind: Option<QuestionKind>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    text: String,
    #[serde(default)]
    options: Vec<String>,
    correct_index: usize,
}

/// Parse a single TOML file into a `LocalQuiz`.
pub fn parse_quiz_file(path: &Path) -> Result<LocalQuiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `LocalQuiz` (useful for testing).
///
/// Applies the same configuration and question validation that a
/// generated quiz gets, so a local file cannot smuggle in a session the
/// engine would reject.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<LocalQuiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions: Vec<Question> = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            text: q.text,
            options: q.options,
            correct_index: q.correct_index,
        })
        .collect();

    let draft = QuizDraft {
        topic: parsed.quiz.topic,
        difficulty: parsed.quiz.difficulty,
        kind: parsed.quiz.kind,
        question_count: Some(questions.len() as u32),
        description: parsed.quiz.description,
        tags: parsed.quiz.tags,
    };
    let config = draft
        .validate()
        .with_context(|| format!("invalid quiz header: {}", source_path.display()))?;

    for (i, question) in questions.iter().enumerate() {
        if let Err(reason) = question.validate() {
            anyhow::bail!("{}: question {i}: {reason}", source_path.display());
        }
    }

    Ok(LocalQuiz { config, questions })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<LocalQuiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz_file(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Index of the offending question (if applicable).
    pub question_index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Lint a parsed quiz for issues that are legal but probably mistakes.
pub fn validate_quiz(quiz: &LocalQuiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question text
    let mut seen = std::collections::HashSet::new();
    for (i, question) in quiz.questions.iter().enumerate() {
        if !seen.insert(question.text.trim()) {
            warnings.push(ValidationWarning {
                question_index: Some(i),
                message: format!("duplicate question text: {}", question.text.trim()),
            });
        }
    }

    // Duplicate options within a question
    for (i, question) in quiz.questions.iter().enumerate() {
        let mut options = std::collections::HashSet::new();
        for option in &question.options {
            if !options.insert(option.trim()) {
                warnings.push(ValidationWarning {
                    question_index: Some(i),
                    message: format!("duplicate option: {}", option.trim()),
                });
            }
        }
    }

    // True/false quizzes should have exactly two options per question
    if quiz.config.kind == QuestionKind::TrueFalse {
        for (i, question) in quiz.questions.iter().enumerate() {
            if question.options.len() != 2 {
                warnings.push(ValidationWarning {
                    question_index: Some(i),
                    message: format!(
                        "true/false question has {} options",
                        question.options.len()
                    ),
                });
            }
        }
    }

    warnings
}
