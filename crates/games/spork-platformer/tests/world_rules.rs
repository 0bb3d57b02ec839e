//! End-to-end checks of the world rules through the public engine API.

use spork_core::events::MatchEvent;
use spork_core::game_trait::MatchState;
use spork_core::input::KeyState;
use spork_core::test_helpers::{count_deaths, drain_significant, event_channel};
use spork_platformer::GameEngine;
use spork_platformer::ai::{AiConfig, Difficulty};
use spork_platformer::config::EngineConfig;
use spork_platformer::input::{AiInput, ManualInput};
use spork_platformer::level::{CollapsePhase, LevelDefinition, PlatformDef, PointDef, SpikeDef};

fn platform(x: f32, y: f32, w: f32, kind: &str) -> PlatformDef {
    PlatformDef {
        x,
        y,
        w: Some(w),
        h: Some(20.0),
        kind: Some(kind.to_string()),
        ..Default::default()
    }
}

fn manual(def: &LevelDefinition) -> GameEngine {
    let mut engine = GameEngine::new(EngineConfig::default(), Box::new(ManualInput), None);
    engine.load_level(def);
    engine.start(0.0);
    engine
}

#[test]
fn collapsing_platform_holds_for_its_delay_then_falls_away() {
    let mut collapsing = platform(0.0, 500.0, 200.0, "collapsing");
    collapsing.delay = Some(20.0);
    let def = LevelDefinition {
        spawn: Some(PointDef { x: 50.0, y: 478.0 }),
        platforms: vec![collapsing],
        ..Default::default()
    };
    let mut engine = manual(&def);

    // First tick: the human lands and triggers it.
    engine.advance(1.0);
    let plat = &engine.level().unwrap().platforms[0];
    assert!(plat.is_triggered());
    assert!(engine.human().on_ground);

    // The landing tick already counts down: 18 more ticks at rest, then it
    // drops on the 20th.
    for _ in 0..18 {
        engine.advance(1.0);
        let plat = &engine.level().unwrap().platforms[0];
        assert_eq!(plat.rect.y, 500.0);
        assert!(engine.human().on_ground);
    }

    engine.advance(1.0);
    let mut last_y = engine.level().unwrap().platforms[0].rect.y;
    assert!(last_y > 500.0, "falling after the countdown");

    let mut last_step = 0.0;
    for _ in 0..100 {
        engine.advance(1.0);
        let plat = &engine.level().unwrap().platforms[0];
        if !plat.active {
            assert_eq!(plat.collapse.unwrap().phase, CollapsePhase::Gone);
            return;
        }
        let step = plat.rect.y - last_y;
        assert!(step > last_step, "accelerates downward");
        last_step = step;
        last_y = plat.rect.y;
    }
    panic!("collapsed platform never went inactive");
}

#[test]
fn rider_is_carried_by_horizontal_mover() {
    let mut mover = platform(100.0, 400.0, 120.0, "moving");
    mover.axis = Some("x".to_string());
    mover.range = Some(200.0);
    mover.speed = Some(2.0);
    let def = LevelDefinition {
        spawn: Some(PointDef { x: 150.0, y: 378.0 }),
        platforms: vec![mover],
        ..Default::default()
    };
    let mut engine = manual(&def);
    engine.advance(1.0);
    engine.advance(1.0);

    for _ in 0..20 {
        let before = engine.human().x;
        engine.advance(1.0);
        let dx = engine.level().unwrap().platforms[0].last_dx;
        assert!(engine.human().on_ground);
        assert!((engine.human().x - before - dx).abs() < 1e-3);
    }
}

#[test]
fn spike_contact_kills_and_counts_once() {
    let def = LevelDefinition {
        platforms: vec![platform(0.0, 500.0, 960.0, "static")],
        spikes: vec![SpikeDef {
            x: 90.0,
            y: 480.0,
            ..Default::default()
        }],
        ..Default::default()
    };
    let mut engine = manual(&def);
    let (obs, rx) = event_channel();
    engine.subscribe(obs);
    engine.set_key_state(KeyState::from_keys(["ArrowRight"]));

    for _ in 0..20 {
        engine.advance(1.0);
    }
    let events = drain_significant(&rx);
    assert_eq!(count_deaths(&events), 1);
    assert_eq!(engine.deaths(), 1);
    assert!(engine.effects().flash > 0.0);
}

#[test]
fn ai_vs_ai_runs_with_ai_in_the_human_slot() {
    let mut engine = GameEngine::new(
        EngineConfig::default(),
        Box::new(AiInput::new(Difficulty::Hard, AiConfig::default())),
        Some(Box::new(AiInput::new(Difficulty::Easy, AiConfig::default()))),
    );
    engine.load_level(&LevelDefinition::training_grounds());
    engine.start(0.0);
    let (obs, rx) = event_channel();
    engine.subscribe(obs);

    for _ in 0..600 {
        engine.advance(1.0);
        if engine.state() != MatchState::Playing {
            break;
        }
    }
    // Whatever happened, the engine stayed consistent.
    let events = drain_significant(&rx);
    assert_eq!(count_deaths(&events) as u32, engine.deaths());
    assert!(engine.human().x >= 0.0 && engine.human().x <= 960.0 - 22.0);
    if engine.state() == MatchState::Won {
        assert!(events.iter().any(|e| matches!(e, MatchEvent::MatchWon { .. })));
    }
    assert!(engine.snapshot().encode().is_ok());
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn landing_is_exact_for_any_clamped_delta(
            drop in 0.0f32..300.0,
            dts in proptest::collection::vec(0.05f32..=3.0, 200),
        ) {
            let def = LevelDefinition {
                spawn: Some(PointDef { x: 100.0, y: 478.0 - drop }),
                platforms: vec![platform(0.0, 500.0, 960.0, "static")],
                ..Default::default()
            };
            let mut engine = manual(&def);
            for dt in dts {
                engine.advance(dt);
                let h = engine.human();
                if h.on_ground {
                    prop_assert_eq!(h.y, 500.0 - h.h);
                    prop_assert_eq!(h.vy, 0.0);
                }
                prop_assert!(h.y + h.h <= 500.0 + 1e-3, "overlapped the floor");
            }
        }
    }
}
