//! The `quizdeck take` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use uuid::Uuid;

use quizdeck_core::host::SessionHost;
use quizdeck_core::model::QuizDraft;
use quizdeck_core::parser::parse_quiz_file;
use quizdeck_core::session::Session;

use super::play::{build_engine, complete_and_report, parse_script, run_session};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    topic: Option<String>,
    difficulty: String,
    kind: String,
    count: u32,
    file: Option<PathBuf>,
    script: Option<String>,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (engine, _config) = build_engine(config_path.as_deref(), offline)?;
    let script = script.as_deref().map(parse_script).transpose()?;

    let mut host = match file {
        Some(path) => {
            let quiz = parse_quiz_file(&path)?;
            println!(
                "Loaded \"{}\" ({} questions, {})",
                quiz.config.topic,
                quiz.questions.len(),
                quiz.config.difficulty
            );
            SessionHost::from_session(Session::begin(Uuid::new_v4(), quiz.config, quiz.questions))
        }
        None => {
            let topic = topic.context("either --topic or --file is required")?;
            let draft = QuizDraft {
                topic,
                difficulty: Some(difficulty.parse().map_err(|e: String| anyhow::anyhow!(e))?),
                kind: Some(kind.parse().map_err(|e: String| anyhow::anyhow!(e))?),
                question_count: Some(count),
                description: None,
                tags: vec![],
            };
            println!("Generating your quiz...");
            engine.start_quiz(draft).await?
        }
    };

    run_session(&mut host, script.as_deref()).await?;

    let session = host.session().await;
    complete_and_report(&engine, &session).await;
    println!("\nRetake any time: quizdeck retake --quiz-id {}", session.quiz_id());

    Ok(())
}
