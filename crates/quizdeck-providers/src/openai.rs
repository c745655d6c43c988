//! OpenAI-compatible chat backend.
//!
//! One HTTP client serves both collaborator roles: question generation
//! and attempt analysis. Any server speaking the `/v1/chat/completions`
//! shape works via `base_url`.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizdeck_core::attempt::QuestionOutcome;
use quizdeck_core::model::{Question, QuestionKind};
use quizdeck_core::traits::{
    extract_json_block, Analysis, AttemptAnalyzer, GenerationRequest, QuestionGenerator,
};

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const GENERATION_SYSTEM_PROMPT: &str = "You are a quiz author. Respond ONLY with a JSON array of question objects, each with keys \"text\", \"options\" (array of strings), and \"correct_index\" (zero-based integer). No explanations, no markdown.";
const ANALYSIS_SYSTEM_PROMPT: &str = "You are a study coach reviewing quiz results. Respond ONLY with a JSON object with keys \"strong_topics\", \"weak_topics\", \"study_materials\", and \"badges\", each an array of strings. No explanations, no markdown.";

/// OpenAI-compatible API backend.
pub struct OpenAiBackend {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }

    async fn chat(&self, system_prompt: &str, user_prompt: String) -> anyhow::Result<String> {
        let start = Instant::now();
        let body = ChatRequest {
            model: self.model.clone(),
            temperature: 0.2,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            }
        })?;

        tracing::debug!(
            model = %api_response.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "chat completion finished"
        );

        Ok(api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

fn generation_prompt(request: &GenerationRequest) -> String {
    let format_hint = match request.kind {
        QuestionKind::MultipleChoice => "multiple-choice questions with 4 options each",
        QuestionKind::TrueFalse => {
            "true/false questions with exactly the options [\"True\", \"False\"]"
        }
    };
    format!(
        "Write {count} {format_hint} about \"{topic}\" at {difficulty} difficulty. \
         Exactly one option per question is correct.",
        count = request.question_count,
        topic = request.topic,
        difficulty = request.difficulty,
    )
}

#[async_trait]
impl QuestionGenerator for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(topic = %request.topic))]
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<Question>> {
        let content = self
            .chat(GENERATION_SYSTEM_PROMPT, generation_prompt(request))
            .await?;

        let payload = extract_json_block(&content);
        let questions: Vec<Question> = serde_json::from_str(&payload).map_err(|e| {
            ProviderError::InvalidPayload(format!("question set is not valid JSON: {e}"))
        })?;
        Ok(questions)
    }
}

#[async_trait]
impl AttemptAnalyzer for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, breakdown), fields(questions = breakdown.len()))]
    async fn analyze(&self, breakdown: &[QuestionOutcome]) -> anyhow::Result<Analysis> {
        let results = serde_json::to_string_pretty(breakdown)?;
        let prompt = format!(
            "Here are the per-question results of a quiz attempt:\n\n{results}\n\n\
             Identify what the candidate is strong at, what needs work, and what to study next."
        );

        let content = self.chat(ANALYSIS_SYSTEM_PROMPT, prompt).await?;
        let payload = extract_json_block(&content);
        let analysis: Analysis = serde_json::from_str(&payload).map_err(|e| {
            ProviderError::InvalidPayload(format!("analysis is not valid JSON: {e}"))
        })?;
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdeck_core::model::Difficulty;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: "Arrays".into(),
            difficulty: Difficulty::Easy,
            kind: QuestionKind::MultipleChoice,
            question_count: 3,
        }
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": content, "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1-mini"
        })
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;
        let questions = r#"[
            {"text": "Q0", "options": ["a", "b"], "correct_index": 0},
            {"text": "Q1", "options": ["a", "b"], "correct_index": 1},
            {"text": "Q2", "options": ["a", "b"], "correct_index": 0}
        ]"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(questions)))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("test-key", Some(server.uri()), None);
        let result = backend.generate(&request()).await.unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[1].correct_index, 1);
    }

    #[tokio::test]
    async fn generation_unwraps_markdown_fences() {
        let server = MockServer::start().await;
        let content = "Here you go:\n```json\n[{\"text\": \"Q\", \"options\": [\"a\", \"b\"], \"correct_index\": 0}]\n```";

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(content)))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None);
        let result = backend.generate(&request()).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "Q");
    }

    #[tokio::test]
    async fn non_json_payload_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body("I would rather chat about the weather.")),
            )
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None);
        let err = backend.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn server_error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None);
        let err = backend.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn successful_analysis() {
        let server = MockServer::start().await;
        let analysis = r#"{
            "strong_topics": ["indexing"],
            "weak_topics": ["slicing"],
            "study_materials": ["chapter 4"],
            "badges": ["Array Ace"]
        }"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(analysis)))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None);
        let breakdown = vec![QuestionOutcome {
            question: "Q".into(),
            options: vec!["a".into(), "b".into()],
            correct_answer: "a".into(),
            your_answer: "b".into(),
            is_correct: false,
            time_taken: "00:09".into(),
        }];

        let result = backend.analyze(&breakdown).await.unwrap();
        assert_eq!(result.strong_topics, vec!["indexing"]);
        assert_eq!(result.badges, vec!["Array Ace"]);
    }

    #[tokio::test]
    async fn missing_analysis_fields_default_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body(r#"{"weak_topics": ["everything"]}"#)),
            )
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None);
        let result = backend.analyze(&[]).await.unwrap();
        assert_eq!(result.weak_topics, vec!["everything"]);
        assert!(result.strong_topics.is_empty());
        assert!(result.badges.is_empty());
    }
}
