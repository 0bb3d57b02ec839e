//! Match loop smoke tests: real tokio interval, real engine, real AI.

use std::time::Duration;

use spork_core::events::MatchEvent;
use spork_core::game_trait::MatchState;
use spork_core::player::EntityRole;
use spork_platformer::config::EngineConfig;
use spork_platformer::level::{GoalDef, LevelDefinition, PlatformDef};
use spork_runner::config::{MatchMode, RunnerConfig};
use spork_runner::game_loop::{MatchResult, RunnerCommand, Winner, spawn_match};

/// Floor under the default spawn with the goal sitting on top of it.
fn goal_at_spawn() -> LevelDefinition {
    LevelDefinition {
        goal: Some(GoalDef {
            x: Some(40.0),
            y: Some(470.0),
            w: Some(60.0),
            h: Some(60.0),
        }),
        platforms: vec![PlatformDef {
            x: 0.0,
            y: 502.0,
            w: Some(960.0),
            h: Some(20.0),
            ..Default::default()
        }],
        ..Default::default()
    }
}

async fn finish(handle: tokio::task::JoinHandle<MatchResult>) -> MatchResult {
    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("match did not finish in time")
        .expect("match task panicked")
}

#[tokio::test]
async fn human_at_goal_wins_first_tick() {
    let session = spawn_match(
        RunnerConfig::default(),
        EngineConfig::default(),
        goal_at_spawn(),
    );
    let mut events = session.events;
    let result = finish(session.handle).await;

    assert_eq!(result.mode, MatchMode::HumanVsAi);
    assert_eq!(result.winner, Winner::Human);
    assert_eq!(result.deaths, 0);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&MatchEvent::StateChanged {
        state: MatchState::Ready
    }));
    assert!(seen.contains(&MatchEvent::StateChanged {
        state: MatchState::Won
    }));
    let first_goal = seen.iter().find_map(|e| match e {
        MatchEvent::GoalReached { role, .. } => Some(*role),
        _ => None,
    });
    assert_eq!(first_goal, Some(EntityRole::Human));
}

#[tokio::test]
async fn ai_vs_ai_credits_the_first_slot() {
    let config = RunnerConfig {
        mode: MatchMode::AiVsAi,
        ..Default::default()
    };
    let session = spawn_match(config, EngineConfig::default(), goal_at_spawn());
    let result = finish(session.handle).await;
    assert_eq!(result.mode, MatchMode::AiVsAi);
    assert_eq!(result.winner, Winner::Ai1);
}

#[tokio::test]
async fn time_limit_ends_without_winner() {
    let config = RunnerConfig {
        max_match_secs: 0.2,
        ..Default::default()
    };
    let session = spawn_match(
        config,
        EngineConfig::default(),
        LevelDefinition::training_grounds(),
    );
    let result = finish(session.handle).await;
    assert_eq!(result.winner, Winner::None);
    assert!(result.time_ms >= 200.0);
    assert_eq!(result.deaths, 0);
}

#[tokio::test]
async fn stop_command_ends_the_match() {
    let config = RunnerConfig {
        max_match_secs: 0.0,
        ..Default::default()
    };
    let session = spawn_match(
        config,
        EngineConfig::default(),
        LevelDefinition::training_grounds(),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.commands.send(RunnerCommand::Stop).unwrap();
    let result = finish(session.handle).await;
    assert_eq!(result.winner, Winner::None);
}

#[tokio::test]
async fn paused_match_does_not_accumulate_time() {
    let config = RunnerConfig {
        max_match_secs: 0.0,
        ..Default::default()
    };
    let session = spawn_match(
        config,
        EngineConfig::default(),
        LevelDefinition::training_grounds(),
    );
    session.commands.send(RunnerCommand::Pause).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    session.commands.send(RunnerCommand::Stop).unwrap();
    let result = finish(session.handle).await;
    // At most the interval's immediate first tick ran before the pause.
    assert!(result.time_ms < 100.0, "time_ms = {}", result.time_ms);
}
