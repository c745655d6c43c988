//! The `quizdeck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizdeck.toml
    if std::path::Path::new("quizdeck.toml").exists() {
        println!("quizdeck.toml already exists, skipping.");
    } else {
        std::fs::write("quizdeck.toml", SAMPLE_CONFIG)?;
        println!("Created quizdeck.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizdeck.toml with your API key");
    println!("  2. Run: quizdeck validate --quiz quizzes/example.toml");
    println!("  3. Run: quizdeck take --file quizzes/example.toml --offline");
    println!("  4. Run: quizdeck take --topic \"Arrays\" --difficulty easy");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdeck configuration
# Top-level settings must stay above the [providers.*] tables.

default_provider = "openai"
user = "default"
max_generation_attempts = 3
store_path = "./quizdeck-history.json"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
model = "gpt-4.1-mini"

[providers.offline]
type = "mock"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
topic = "Rust basics"
difficulty = "easy"
kind = "multiple-choice"
description = "A starter quiz to try the session flow"
tags = ["example"]

[[questions]]
text = "Which keyword declares an immutable binding?"
options = ["let", "mut", "const fn", "static mut"]
correct_index = 0

[[questions]]
text = "What does `Vec::new()` allocate up front?"
options = ["Nothing", "One element", "A fixed 16 bytes", "A page"]
correct_index = 0

[[questions]]
text = "`String` and `&str` are the same type."
options = ["True", "False"]
correct_index = 1
"#;
