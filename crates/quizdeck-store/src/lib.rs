//! quizdeck-store — JSON attempt-history persistence.
//!
//! Stores quiz documents and their attempt histories in a single JSON
//! file, keyed by user. Writes go through an internal lock so concurrent
//! saves from one process cannot interleave; the whole file is rewritten
//! on every save, which is fine at attempt-history scale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use quizdeck_core::attempt::AttemptRecord;
use quizdeck_core::traits::{AttemptStore, QuizDocument};

/// Per-user quiz documents, as serialized to disk.
type StoreData = HashMap<String, Vec<QuizDocument>>;

/// File-backed attempt store.
pub struct JsonQuizStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonQuizStore {
    /// Open a store at `path`. The file is created on first save; a
    /// missing file reads as an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreData> {
        if !self.path.exists() {
            return Ok(StoreData::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read store: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse store: {}", self.path.display()))
    }

    fn save(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write store: {}", self.path.display()))
    }
}

#[async_trait]
impl AttemptStore for JsonQuizStore {
    async fn append_attempt(
        &self,
        user: &str,
        quiz: &QuizDocument,
        record: &AttemptRecord,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load()?;
        let documents = data.entry(user.to_string()).or_default();

        match documents.iter_mut().find(|d| d.quiz_id == quiz.quiz_id) {
            Some(existing) => existing.attempts.push(record.clone()),
            None => {
                let mut document = quiz.clone();
                document.attempts = vec![record.clone()];
                documents.push(document);
            }
        }

        self.save(&data)?;
        tracing::debug!(user, quiz_id = %quiz.quiz_id, "attempt appended");
        Ok(())
    }

    async fn find_quiz(&self, user: &str, quiz_id: Uuid) -> Result<Option<QuizDocument>> {
        let data = self.load()?;
        Ok(data
            .get(user)
            .and_then(|documents| documents.iter().find(|d| d.quiz_id == quiz_id))
            .cloned())
    }

    async fn list_quizzes(&self, user: &str) -> Result<Vec<QuizDocument>> {
        let data = self.load()?;
        Ok(data.get(user).cloned().unwrap_or_default())
    }
}
