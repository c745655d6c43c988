//! Collaborator trait definitions.
//!
//! These async traits are implemented by the `quizdeck-providers` crate
//! (question generation and attempt analysis) and the `quizdeck-store`
//! crate (attempt persistence). The engine only ever talks to these
//! boundaries at the edges of a session: generation before question 0
//! goes live, analysis and persistence after completion — never
//! mid-question.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attempt::{AttemptRecord, QuestionOutcome};
use crate::model::{Difficulty, Question, QuestionKind, QuizConfig};

// ---------------------------------------------------------------------------
// Question generation
// ---------------------------------------------------------------------------

/// Trait for backends that produce a question set from a configuration.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Human-readable generator name (e.g. "openai").
    fn name(&self) -> &str;

    /// Produce an ordered question set for the request.
    ///
    /// The engine validates the result; an empty or short set is treated
    /// as a failed generation, not a smaller quiz.
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<Question>>;
}

/// Input to the question-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
    pub question_count: u32,
}

impl GenerationRequest {
    pub fn from_config(config: &QuizConfig) -> Self {
        Self {
            topic: config.topic.clone(),
            difficulty: config.difficulty,
            kind: config.kind,
            question_count: config.question_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Attempt analysis
// ---------------------------------------------------------------------------

/// Trait for backends that infer strengths and study material from a
/// completed attempt's per-question breakdown.
#[async_trait]
pub trait AttemptAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Analyze a completed attempt. A failure here degrades the attempt to
    /// empty insights; it never blocks scoring or persistence.
    async fn analyze(&self, breakdown: &[QuestionOutcome]) -> anyhow::Result<Analysis>;
}

/// Output of the analysis collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub strong_topics: Vec<String>,
    #[serde(default)]
    pub weak_topics: Vec<String>,
    #[serde(default)]
    pub study_materials: Vec<String>,
    /// Extra badge titles, appended after the derived badge set.
    #[serde(default)]
    pub badges: Vec<String>,
}

// ---------------------------------------------------------------------------
// Attempt persistence
// ---------------------------------------------------------------------------

/// Trait for the persistence collaborator.
///
/// Documents are keyed by `(user, quiz_id)`; appending an attempt for an
/// existing key accumulates history under the same document.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Upsert-by-append: create the quiz document from `quiz` if this is
    /// the first save, then push the attempt onto its history. On merge
    /// the existing document's question set wins; `quiz.attempts` is
    /// ignored either way.
    async fn append_attempt(
        &self,
        user: &str,
        quiz: &QuizDocument,
        record: &AttemptRecord,
    ) -> anyhow::Result<()>;

    /// Look up a stored quiz document for the retake path.
    async fn find_quiz(&self, user: &str, quiz_id: Uuid) -> anyhow::Result<Option<QuizDocument>>;

    /// All stored quiz documents for a user, for history display.
    async fn list_quizzes(&self, user: &str) -> anyhow::Result<Vec<QuizDocument>>;
}

/// The stored shape of one quiz and its attempt history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDocument {
    pub quiz_id: Uuid,
    pub config: QuizConfig,
    pub questions: Vec<Question>,
    /// Append-only attempt history, oldest first.
    #[serde(default)]
    pub attempts: Vec<AttemptRecord>,
}

impl QuizDocument {
    /// Document shell for a session, with empty history. Used as the
    /// upsert seed when saving an attempt.
    pub fn from_session(session: &crate::session::Session) -> Self {
        Self {
            quiz_id: session.quiz_id(),
            config: session.config().clone(),
            questions: session.questions().to_vec(),
            attempts: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// JSON payload extraction
// ---------------------------------------------------------------------------

/// Extract a JSON payload from possibly markdown-fenced model output.
///
/// Handles:
/// - ```json fenced blocks (first one wins)
/// - generic ``` blocks (if no json-tagged block exists)
/// - raw JSON with no fences (returned as-is)
pub fn extract_json_block(response: &str) -> String {
    let mut json_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_blocks.push(current.clone());
            } else {
                generic_blocks.push(current.clone());
            }
            current.clear();
            continue;
        }

        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    // A truncated (unclosed) block still counts.
    if in_block && !current.is_empty() {
        if is_json_block {
            json_blocks.push(current);
        } else {
            generic_blocks.push(current);
        }
    }

    if let Some(block) = json_blocks.into_iter().next() {
        return block;
    }
    if let Some(block) = generic_blocks.into_iter().next() {
        return block;
    }
    response.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_fenced_block() {
        let input = "Here are your questions:\n\n```json\n[{\"text\": \"Q\"}]\n```\n\nEnjoy!";
        assert_eq!(extract_json_block(input), "[{\"text\": \"Q\"}]");
    }

    #[test]
    fn extract_prefers_json_over_generic() {
        let input = "```\nnot it\n```\n\n```json\n{\"a\": 1}\n```\n";
        assert_eq!(extract_json_block(input), "{\"a\": 1}");
    }

    #[test]
    fn extract_generic_block_fallback() {
        let input = "```\n[1, 2, 3]\n```";
        assert_eq!(extract_json_block(input), "[1, 2, 3]");
    }

    #[test]
    fn extract_raw_passthrough() {
        let input = "[{\"text\": \"plain\"}]";
        assert_eq!(extract_json_block(input), input);
    }

    #[test]
    fn extract_truncated_unclosed_block() {
        let input = "```json\n{\"unterminated\": true}";
        assert_eq!(extract_json_block(input), "{\"unterminated\": true}");
    }

    #[test]
    fn generation_request_mirrors_config() {
        let config = QuizConfig {
            topic: "Sorting".into(),
            difficulty: Difficulty::Medium,
            kind: QuestionKind::TrueFalse,
            question_count: 4,
            description: None,
            tags: vec![],
        };
        let request = GenerationRequest::from_config(&config);
        assert_eq!(request.topic, "Sorting");
        assert_eq!(request.question_count, 4);
        assert_eq!(request.kind, QuestionKind::TrueFalse);
    }
}
