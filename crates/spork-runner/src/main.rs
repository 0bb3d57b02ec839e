use tracing_subscriber::EnvFilter;

use spork_platformer::config::EngineConfig;
use spork_runner::config::RunnerConfig;
use spork_runner::error::RunnerError;
use spork_runner::game_loop::{MatchSession, RunnerCommand, spawn_match};
use spork_runner::load_level;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "runner failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), RunnerError> {
    let mut config = RunnerConfig::load();
    // A level path on the command line overrides the config file.
    if let Some(path) = std::env::args().nth(1) {
        config.level_path = Some(path.into());
    }
    let engine_config = EngineConfig::load();
    let level = load_level(config.level_path.as_deref())?;

    tracing::info!(mode = %config.mode, difficulty = ?config.difficulty, "Turbo Spork runner starting");

    let MatchSession {
        commands,
        mut events,
        handle,
    } = spawn_match(config, engine_config, level);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = commands.send(RunnerCommand::Stop);
        }
    });

    let logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if !event.is_time_update() {
                tracing::debug!(?event, "match event");
            }
        }
    });

    let result = handle.await?;
    let _ = logger.await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
