//! quizdeck-providers — Generation and analysis backends.
//!
//! Implements the `QuestionGenerator` and `AttemptAnalyzer` traits for
//! OpenAI-compatible APIs, plus offline mocks for tests and demos.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_analyzer, create_generator, load_config, ProviderConfig, QuizdeckConfig};
pub use error::ProviderError;
