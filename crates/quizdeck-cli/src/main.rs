//! quizdeck CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizdeck", version, about = "Timed quiz sessions in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a new quiz
    Take {
        /// Quiz topic (e.g. "Arrays")
        #[arg(long)]
        topic: Option<String>,

        /// Difficulty: easy, medium, hard
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Question kind: multiple-choice, true-false
        #[arg(long, default_value = "multiple-choice")]
        kind: String,

        /// Number of questions
        #[arg(long, default_value = "5")]
        count: u32,

        /// Take a hand-authored quiz from a TOML file instead of generating
        #[arg(long, conflicts_with = "topic")]
        file: Option<PathBuf>,

        /// Answer script, e.g. "0,skip,2" (zero-based option index or "skip")
        #[arg(long)]
        script: Option<String>,

        /// Use the offline mock backend instead of a configured provider
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Retake a stored quiz under its original quiz id
    Retake {
        /// Quiz id from `quizdeck history`
        #[arg(long)]
        quiz_id: uuid::Uuid,

        /// Answer script, e.g. "0,skip,2"
        #[arg(long)]
        script: Option<String>,

        /// Use the offline mock backend for analysis
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Show stored quizzes and attempt history
    History {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizdeck=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            topic,
            difficulty,
            kind,
            count,
            file,
            script,
            offline,
            config,
        } => {
            commands::take::execute(topic, difficulty, kind, count, file, script, offline, config)
                .await
        }
        Commands::Retake {
            quiz_id,
            script,
            offline,
            config,
        } => commands::retake::execute(quiz_id, script, offline, config).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::History { config } => commands::history::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
