use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use spork_core::events::MatchEvent;
use spork_core::input::KeyState;
use spork_core::player::EntityRole;
use spork_platformer::GameEngine;
use spork_platformer::config::EngineConfig;
use spork_platformer::input::{AiInput, InputSource, ManualInput};
use spork_platformer::level::LevelDefinition;

use crate::config::{MatchMode, RunnerConfig};

/// Commands sent from the host to the match loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerCommand {
    Pause,
    Resume,
    Restart,
    Stop,
    Keys(KeyState),
}

/// Overall match winner as reported in the result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Human,
    Ai,
    /// First slot in `ai_vs_ai` mode.
    Ai1,
    /// Second slot in `ai_vs_ai` mode.
    Ai2,
    /// Stopped or timed out before anyone reached the goal.
    None,
}

/// Summary printed when a match ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub mode: MatchMode,
    pub winner: Winner,
    pub time_ms: f64,
    pub deaths: u32,
}

/// Map the role that reached the goal to the winner for `mode`.
pub fn attribute_winner(mode: MatchMode, role: EntityRole) -> Winner {
    match (mode, role) {
        (MatchMode::HumanVsAi, EntityRole::Human) => Winner::Human,
        (MatchMode::HumanVsAi, EntityRole::Ai) => Winner::Ai,
        (MatchMode::AiVsAi, EntityRole::Human) => Winner::Ai1,
        (MatchMode::AiVsAi, EntityRole::Ai) => Winner::Ai2,
    }
}

/// Build an engine with the input sources `config.mode` calls for.
pub fn build_engine(config: &RunnerConfig, engine_config: EngineConfig) -> GameEngine {
    let first: Box<dyn InputSource> = match config.mode {
        MatchMode::HumanVsAi => Box::new(ManualInput),
        MatchMode::AiVsAi => Box::new(AiInput::new(
            config.rival_difficulty,
            engine_config.ai.clone(),
        )),
    };
    let second = Box::new(AiInput::new(config.difficulty, engine_config.ai.clone()));
    GameEngine::new(engine_config, first, Some(second))
}

/// Apply a host command. Returns `false` when the match should end.
pub fn apply_command(engine: &mut GameEngine, command: RunnerCommand, now_ms: f64) -> bool {
    match command {
        RunnerCommand::Pause => engine.pause(),
        RunnerCommand::Resume => engine.resume(now_ms),
        RunnerCommand::Restart => engine.restart(now_ms),
        RunnerCommand::Keys(keys) => engine.set_key_state(keys),
        RunnerCommand::Stop => return false,
    }
    true
}

/// Handles to a running match.
pub struct MatchSession {
    pub commands: mpsc::UnboundedSender<RunnerCommand>,
    /// Every engine event, in emission order.
    pub events: mpsc::UnboundedReceiver<MatchEvent>,
    pub handle: JoinHandle<MatchResult>,
}

/// Spawn the match loop as a tokio task.
pub fn spawn_match(
    config: RunnerConfig,
    engine_config: EngineConfig,
    level: LevelDefinition,
) -> MatchSession {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let engine = build_engine(&config, engine_config);
        run_match_loop(engine, &config, &level, cmd_rx, event_tx).await
    });

    MatchSession {
        commands: cmd_tx,
        events: event_rx,
        handle,
    }
}

/// Forward queued engine events and return the first goal contact, if any.
fn forward_events(
    engine_rx: &std_mpsc::Receiver<MatchEvent>,
    event_tx: &mpsc::UnboundedSender<MatchEvent>,
) -> Option<(EntityRole, f64)> {
    let mut first_goal = None;
    for event in engine_rx.try_iter() {
        if let MatchEvent::GoalReached { role, elapsed_ms } = event
            && first_goal.is_none()
        {
            first_goal = Some((role, elapsed_ms));
        }
        // Nobody listening is fine.
        let _ = event_tx.send(event);
    }
    first_goal
}

/// The host frame loop: one engine frame per interval tick until someone
/// reaches the goal, the time limit passes or a `Stop` arrives.
async fn run_match_loop(
    mut engine: GameEngine,
    config: &RunnerConfig,
    level: &LevelDefinition,
    mut cmd_rx: mpsc::UnboundedReceiver<RunnerCommand>,
    event_tx: mpsc::UnboundedSender<MatchEvent>,
) -> MatchResult {
    let (engine_tx, engine_rx) = std_mpsc::channel();
    engine.subscribe(Box::new(engine_tx));

    let origin = Instant::now();
    let now_ms = || origin.elapsed().as_secs_f64() * 1000.0;

    engine.load_level(level);
    engine.start(now_ms());
    forward_events(&engine_rx, &event_tx);

    let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / config.tick_rate));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let time_limit = config.time_limit_ms();
    let mut commands_open = true;

    let goal = loop {
        tokio::select! {
            _ = interval.tick() => {
                engine.frame(now_ms());
            }
            cmd = cmd_rx.recv(), if commands_open => match cmd {
                Some(cmd) => {
                    tracing::debug!(?cmd, "runner command");
                    if !apply_command(&mut engine, cmd, now_ms()) {
                        tracing::info!("match stopped by host");
                        break None;
                    }
                },
                None => commands_open = false,
            },
        }

        if let Some(goal) = forward_events(&engine_rx, &event_tx) {
            break Some(goal);
        }
        if let Some(limit) = time_limit
            && engine.elapsed_ms() >= limit
        {
            tracing::info!(limit_ms = limit, "match time limit reached");
            break None;
        }
    };

    engine.stop();
    forward_events(&engine_rx, &event_tx);

    let result = match goal {
        Some((role, elapsed_ms)) => MatchResult {
            mode: config.mode,
            winner: attribute_winner(config.mode, role),
            time_ms: elapsed_ms,
            deaths: engine.deaths(),
        },
        None => MatchResult {
            mode: config.mode,
            winner: Winner::None,
            time_ms: engine.elapsed_ms(),
            deaths: engine.deaths(),
        },
    };
    tracing::info!(
        winner = ?result.winner,
        time_ms = result.time_ms,
        deaths = result.deaths,
        "match finished"
    );
    engine.destroy();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use spork_core::game_trait::MatchState;

    #[test]
    fn winner_attribution_per_mode() {
        assert_eq!(
            attribute_winner(MatchMode::HumanVsAi, EntityRole::Human),
            Winner::Human
        );
        assert_eq!(
            attribute_winner(MatchMode::HumanVsAi, EntityRole::Ai),
            Winner::Ai
        );
        assert_eq!(
            attribute_winner(MatchMode::AiVsAi, EntityRole::Human),
            Winner::Ai1
        );
        assert_eq!(
            attribute_winner(MatchMode::AiVsAi, EntityRole::Ai),
            Winner::Ai2
        );
    }

    #[test]
    fn result_serializes_with_snake_case_names() {
        let result = MatchResult {
            mode: MatchMode::AiVsAi,
            winner: Winner::Ai2,
            time_ms: 1500.0,
            deaths: 2,
        };
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["mode"], "ai_vs_ai");
        assert_eq!(json["winner"], "ai2");
        assert_eq!(json["time_ms"], 1500.0);
        assert_eq!(json["deaths"], 2);
        assert_eq!(
            serde_json::to_value(Winner::None).unwrap(),
            serde_json::json!("none")
        );
    }

    #[test]
    fn build_engine_always_has_an_ai_slot() {
        for mode in [MatchMode::HumanVsAi, MatchMode::AiVsAi] {
            let config = RunnerConfig {
                mode,
                ..Default::default()
            };
            let mut engine = build_engine(&config, EngineConfig::default());
            engine.load_level(&LevelDefinition::training_grounds());
            assert!(engine.ai().is_some());
        }
    }

    #[test]
    fn commands_drive_the_lifecycle() {
        let mut engine = build_engine(&RunnerConfig::default(), EngineConfig::default());
        engine.load_level(&LevelDefinition::training_grounds());
        engine.start(0.0);

        assert!(apply_command(&mut engine, RunnerCommand::Pause, 10.0));
        assert_eq!(engine.state(), MatchState::Paused);
        assert!(apply_command(&mut engine, RunnerCommand::Resume, 20.0));
        assert_eq!(engine.state(), MatchState::Playing);
        assert!(apply_command(
            &mut engine,
            RunnerCommand::Keys(KeyState::from_keys(["d"])),
            30.0
        ));
        engine.advance(1.0);
        assert!(engine.human().vx > 0.0);
        assert!(apply_command(&mut engine, RunnerCommand::Restart, 40.0));
        assert_eq!(engine.elapsed_ms(), 0.0);
        assert!(!apply_command(&mut engine, RunnerCommand::Stop, 50.0));
    }
}
