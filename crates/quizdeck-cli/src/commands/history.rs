//! The `quizdeck history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::play::build_engine;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (engine, config) = build_engine(config_path.as_deref(), true)?;

    let quizzes = engine.history().await?;
    if quizzes.is_empty() {
        println!("No attempts yet for user '{}'.", config.user);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Quiz ID",
        "Topic",
        "Difficulty",
        "Attempts",
        "Best",
        "Last taken",
    ]);

    for quiz in &quizzes {
        let best = quiz
            .attempts
            .iter()
            .map(|a| a.accuracy)
            .max()
            .unwrap_or(0);
        let last_taken = quiz
            .attempts
            .last()
            .map(|a| a.taken_at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(quiz.quiz_id),
            Cell::new(&quiz.config.topic),
            Cell::new(quiz.config.difficulty),
            Cell::new(quiz.attempts.len()),
            Cell::new(format!("{best}%")),
            Cell::new(last_taken),
        ]);
    }

    println!("{table}");
    Ok(())
}
