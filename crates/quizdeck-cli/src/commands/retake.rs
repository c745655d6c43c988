//! The `quizdeck retake` command.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use super::play::{build_engine, complete_and_report, parse_script, run_session};

pub async fn execute(
    quiz_id: Uuid,
    script: Option<String>,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (engine, _config) = build_engine(config_path.as_deref(), offline)?;
    let script = script.as_deref().map(parse_script).transpose()?;

    let mut host = engine.retake(quiz_id).await?;
    {
        let session = host.session().await;
        println!(
            "Retaking \"{}\" ({} questions, {})",
            session.config().topic,
            session.questions().len(),
            session.config().difficulty
        );
    }

    run_session(&mut host, script.as_deref()).await?;

    let session = host.session().await;
    complete_and_report(&engine, &session).await;

    Ok(())
}
