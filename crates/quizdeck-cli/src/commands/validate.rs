//! The `quizdeck validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quizzes = if quiz_path.is_dir() {
        quizdeck_core::parser::load_quiz_directory(&quiz_path)?
    } else {
        vec![quizdeck_core::parser::parse_quiz_file(&quiz_path)?]
    };

    let mut total_warnings = 0;

    for quiz in &quizzes {
        println!(
            "Quiz: {} ({} questions, {})",
            quiz.config.topic,
            quiz.questions.len(),
            quiz.config.difficulty
        );

        let warnings = quizdeck_core::parser::validate_quiz(quiz);
        for w in &warnings {
            let prefix = w
                .question_index
                .map(|i| format!("  [question {i}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
