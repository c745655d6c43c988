//! Backend configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizdeck_core::traits::{AttemptAnalyzer, QuestionGenerator};

use crate::mock::{MockAnalyzer, MockGenerator};
use crate::openai::OpenAiBackend;

/// Configuration for a single backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    /// Offline backend with placeholder questions and empty insights.
    Mock,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            ProviderConfig::Mock => f.debug_struct("Mock").finish(),
        }
    }
}

/// Top-level quizdeck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizdeckConfig {
    /// Backend configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default backend to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// User whose attempt history is read and written.
    #[serde(default = "default_user")]
    pub user: String,
    /// Generation attempts before giving up.
    #[serde(default = "default_attempts")]
    pub max_generation_attempts: u32,
    /// Delay between generation attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Attempt history file.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_user() -> String {
    "default".to_string()
}
fn default_attempts() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./quizdeck-history.json")
}

impl Default for QuizdeckConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            user: default_user(),
            max_generation_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
            store_path: default_store_path(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a backend config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
        ProviderConfig::Mock => ProviderConfig::Mock,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizdeck.toml` in the current directory
/// 2. `~/.config/quizdeck/config.toml`
///
/// Environment variable override: `QUIZDECK_OPENAI_KEY`.
pub fn load_config() -> Result<QuizdeckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizdeckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizdeck.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizdeckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizdeckConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("QUIZDECK_OPENAI_KEY") {
        config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(ProviderConfig::OpenAI { api_key, .. }) = config.providers.get_mut("openai") {
            *api_key = key;
        }
    }

    // Resolve env vars in all backend configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdeck"))
}

/// Create a question generator from a backend configuration.
pub fn create_generator(config: &ProviderConfig) -> Result<Arc<dyn QuestionGenerator>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => Ok(Arc::new(OpenAiBackend::new(
            api_key,
            base_url.clone(),
            model.clone(),
        ))),
        ProviderConfig::Mock => Ok(Arc::new(MockGenerator::sized_to_request())),
    }
}

/// Create an attempt analyzer from a backend configuration.
pub fn create_analyzer(config: &ProviderConfig) -> Result<Arc<dyn AttemptAnalyzer>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => Ok(Arc::new(OpenAiBackend::new(
            api_key,
            base_url.clone(),
            model.clone(),
        ))),
        ProviderConfig::Mock => Ok(Arc::new(MockAnalyzer::silent())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZDECK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZDECK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZDECK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZDECK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizdeckConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.user, "default");
        assert_eq!(config.max_generation_attempts, 3);
    }

    #[test]
    fn parse_provider_config() {
        // Top-level keys must precede the table headers or TOML folds
        // them into the last table.
        let toml_str = r#"
default_provider = "openai"
user = "alex"

[providers.openai]
type = "openai"
api_key = "sk-test"
model = "gpt-4.1-mini"

[providers.offline]
type = "mock"
"#;
        let config: QuizdeckConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.user, "alex");
        assert_eq!(config.default_provider, "openai");
        assert!(matches!(
            config.providers.get("offline"),
            Some(ProviderConfig::Mock)
        ));
    }

    #[test]
    fn explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizdeck.toml");
        std::fs::write(&path, "user = \"casey\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.user, "casey");

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn mock_factories() {
        assert!(create_generator(&ProviderConfig::Mock).is_ok());
        assert!(create_analyzer(&ProviderConfig::Mock).is_ok());
    }
}
