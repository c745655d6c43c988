//! Shared session-driving machinery for `take` and `retake`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tokio::sync::mpsc;

use quizdeck_core::attempt::{AttemptRecord, SKIPPED_LABEL};
use quizdeck_core::engine::{CompletedAttempt, EngineConfig, QuizEngine};
use quizdeck_core::host::SessionHost;
use quizdeck_core::session::{Session, SessionState};
use quizdeck_providers::config::{create_analyzer, create_generator, load_config_from};
use quizdeck_providers::{ProviderConfig, QuizdeckConfig};
use quizdeck_store::JsonQuizStore;

/// Build the engine from config, or from offline mocks.
pub fn build_engine(
    config_path: Option<&Path>,
    offline: bool,
) -> Result<(QuizEngine, QuizdeckConfig)> {
    let config = load_config_from(config_path)?;

    let provider_config = if offline {
        ProviderConfig::Mock
    } else {
        config
            .providers
            .get(&config.default_provider)
            .cloned()
            .with_context(|| {
                format!(
                    "provider '{}' not found in config (run `quizdeck init`, or pass --offline). Available: {:?}",
                    config.default_provider,
                    config.providers.keys().collect::<Vec<_>>()
                )
            })?
    };

    let generator = create_generator(&provider_config)?;
    let analyzer = create_analyzer(&provider_config)?;
    let store = Arc::new(JsonQuizStore::new(config.store_path.clone()));

    let engine = QuizEngine::new(
        generator,
        analyzer,
        store,
        EngineConfig {
            user: config.user.clone(),
            max_generation_attempts: config.max_generation_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        },
    );
    Ok((engine, config))
}

/// One scripted step of a non-interactive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Answer(usize),
    Skip,
}

/// Parse an answer script like "0,skip,2".
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>> {
    script
        .split(',')
        .map(|step| {
            let step = step.trim();
            if step.eq_ignore_ascii_case("skip") {
                Ok(ScriptStep::Skip)
            } else {
                step.parse::<usize>()
                    .map(ScriptStep::Answer)
                    .map_err(|_| anyhow::anyhow!("invalid script step: '{step}'"))
            }
        })
        .collect()
}

/// Drive a hosted session to completion, interactively or from a script.
pub async fn run_session(host: &mut SessionHost, script: Option<&[ScriptStep]>) -> Result<()> {
    let (question_count, budget) = {
        let session = host.session().await;
        (session.questions().len(), session.time_budget())
    };
    if let Some(steps) = script {
        anyhow::ensure!(
            steps.len() == question_count,
            "script has {} steps but the quiz has {question_count} questions",
            steps.len()
        );
    }
    let mut input = match script {
        Some(_) => None,
        None => Some(spawn_stdin_lines()),
    };

    let mut index = 0;
    loop {
        {
            let session = host.session().await;
            let Some(question) = session.current_question() else {
                break;
            };
            println!(
                "\nQuestion {}/{} ({}s):",
                index + 1,
                question_count,
                budget.as_secs()
            );
            println!("  {}", question.text);
            for (i, option) in question.options.iter().enumerate() {
                println!("  [{i}] {option}");
            }
        }

        match script {
            Some(steps) => match steps[index] {
                ScriptStep::Answer(choice) => {
                    host.submit_answer(choice).await;
                }
                ScriptStep::Skip => {
                    host.expire_current().await;
                }
            },
            None => match prompt_choice(
                input.as_mut().expect("interactive runs read stdin"),
                host.remaining(),
            )
            .await
            {
                Some(choice) => {
                    host.submit_answer(choice).await;
                }
                None => {
                    println!("  Time's up!");
                    host.expire_current().await;
                }
            },
        }

        {
            let session = host.session().await;
            let question = session.current_question().expect("question under reveal");
            let record = session.scorecard().answers[index]
                .as_ref()
                .expect("decided question has a record");
            if record.is_correct {
                println!("  Correct!");
            } else {
                println!(
                    "  Incorrect. The answer was: {}",
                    question.options[question.correct_index]
                );
            }
        }

        if host.advance().await == SessionState::Completed {
            break;
        }
        index += 1;
    }

    Ok(())
}

/// Lines typed on stdin, fed by one long-lived reader thread.
///
/// A prompt that times out leaves no dangling read on stdin: the reader
/// keeps running, and whatever the user was mid-typing arrives on the
/// channel for the next prompt instead of being swallowed. The thread
/// exits on EOF or when the receiver is dropped.
fn spawn_stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(line.clone()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

/// Read an option index from stdin, racing the question countdown.
///
/// Returns `None` on timeout or EOF; the host's background timer has
/// already charged a timed-out question by then. Unparseable input burns
/// time until the countdown decides, matching what a lagging answer would
/// do.
async fn prompt_choice(
    lines: &mut mpsc::UnboundedReceiver<String>,
    remaining: Duration,
) -> Option<usize> {
    let deadline = tokio::time::Instant::now() + remaining;
    loop {
        let line = tokio::select! {
            line = lines.recv() => line?,
            _ = tokio::time::sleep_until(deadline) => return None,
        };

        match line.trim().parse::<usize>() {
            Ok(choice) => return Some(choice),
            Err(_) => println!("  Enter an option number:"),
        }
    }
}

/// Complete the session, retrying a failed save once, and print results.
pub async fn complete_and_report(engine: &QuizEngine, session: &Session) {
    let mut outcome = engine.complete(session).await;
    if outcome.save_error.is_some() {
        eprintln!("Save failed, retrying...");
        outcome.save_error = engine.retry_save(session, &outcome.record).await.err();
    }
    print_attempt(&outcome);
}

/// Print the scored record, insights, and per-question breakdown.
fn print_attempt(outcome: &CompletedAttempt) {
    let record = &outcome.record;
    println!(
        "\n{}: {}/{} correct ({}%)",
        record.topic, record.score, record.question_count, record.accuracy
    );
    println!(
        "Total {}  avg {}  fastest {}  slowest {}",
        record.total_time, record.average_time, record.fastest_time, record.slowest_time
    );
    println!(
        "Speed {}/100  Consistency {}/100",
        record.speed_score, record.consistency_score
    );

    let badges: Vec<String> = record.badges.iter().map(ToString::to_string).collect();
    println!("Badges: {}", badges.join(", "));

    if outcome.analysis_degraded {
        println!("(insights unavailable for this attempt)");
    } else {
        print_list("Strong topics", &record.strong_topics);
        print_list("Needs work", &record.weak_topics);
        print_list("Study next", &record.study_materials);
    }

    println!("\n{}", breakdown_table(record));

    if let Some(err) = &outcome.save_error {
        eprintln!("Warning: attempt was not saved: {err}");
        eprintln!("Your results above are complete; history will miss this attempt.");
    }
}

fn print_list(label: &str, items: &[String]) {
    if !items.is_empty() {
        println!("{label}: {}", items.join(", "));
    }
}

fn breakdown_table(record: &AttemptRecord) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Time"]);

    for (i, row) in record.breakdown.iter().enumerate() {
        let verdict = if row.is_correct {
            "ok"
        } else if row.your_answer == SKIPPED_LABEL {
            "timeout"
        } else {
            "wrong"
        };
        table.add_row(vec![
            Cell::new(format!("{} [{verdict}]", i + 1)),
            Cell::new(&row.question),
            Cell::new(&row.your_answer),
            Cell::new(&row.correct_answer),
            Cell::new(&row.time_taken),
        ]);
    }
    table
}
