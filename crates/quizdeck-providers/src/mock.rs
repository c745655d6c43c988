//! Mock collaborators for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizdeck_core::attempt::QuestionOutcome;
use quizdeck_core::model::Question;
use quizdeck_core::traits::{
    Analysis, AttemptAnalyzer, GenerationRequest, QuestionGenerator,
};

/// What the generator returns when no topic mapping matches.
enum Fallback {
    /// Fail the call.
    Fail,
    /// Always the same question set, possibly empty.
    Fixed(Vec<Question>),
    /// Placeholder questions sized to the request.
    SizedToRequest,
}

/// A mock question generator for exercising the engine without API calls.
///
/// Returns configurable question sets based on topic substring matching.
pub struct MockGenerator {
    /// Map of topic substring → question set.
    responses: HashMap<String, Vec<Question>>,
    fallback: Fallback,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockGenerator {
    /// Create a mock with the given topic→questions mappings and no fallback.
    pub fn new(responses: HashMap<String, Vec<Question>>) -> Self {
        Self::with_fallback(responses, Fallback::Fail)
    }

    /// Create a mock that always returns the same question set.
    pub fn with_fixed_questions(questions: Vec<Question>) -> Self {
        Self::with_fallback(HashMap::new(), Fallback::Fixed(questions))
    }

    /// Create a mock sized to the request: `n` placeholder questions with
    /// two options and option 0 correct.
    pub fn sized_to_request() -> Self {
        Self::with_fallback(HashMap::new(), Fallback::SizedToRequest)
    }

    fn with_fallback(responses: HashMap<String, Vec<Question>>, fallback: Fallback) -> Self {
        Self {
            responses,
            fallback,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this generator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this generator.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

fn placeholder_questions(n: u32) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            text: format!("Placeholder question {i}"),
            options: vec!["Correct".to_string(), "Incorrect".to_string()],
            correct_index: 0,
        })
        .collect()
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<Question>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some((_, questions)) = self
            .responses
            .iter()
            .find(|(key, _)| request.topic.contains(key.as_str()))
        {
            return Ok(questions.clone());
        }

        match &self.fallback {
            Fallback::Fixed(questions) => Ok(questions.clone()),
            Fallback::SizedToRequest => Ok(placeholder_questions(request.question_count)),
            Fallback::Fail => anyhow::bail!("no mock questions for topic: {}", request.topic),
        }
    }
}

/// A mock analyzer with a fixed verdict, optionally failing the first
/// `fail_first` calls to exercise degradation paths.
pub struct MockAnalyzer {
    analysis: Analysis,
    fail_first: AtomicU32,
    call_count: AtomicU32,
}

impl MockAnalyzer {
    pub fn new(analysis: Analysis) -> Self {
        Self {
            analysis,
            fail_first: AtomicU32::new(0),
            call_count: AtomicU32::new(0),
        }
    }

    /// An analyzer that returns empty insights.
    pub fn silent() -> Self {
        Self::new(Analysis::default())
    }

    /// Make the first `n` calls fail before succeeding.
    pub fn failing_first(mut self, n: u32) -> Self {
        self.fail_first = AtomicU32::new(n);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AttemptAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, _breakdown: &[QuestionOutcome]) -> anyhow::Result<Analysis> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let remaining = self.fail_first.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::Relaxed);
            anyhow::bail!("mock analyzer failure ({remaining} left)");
        }
        Ok(self.analysis.clone())
    }
}
