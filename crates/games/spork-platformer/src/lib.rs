pub mod ai;
pub mod config;
pub mod hazards;
pub mod input;
pub mod level;
pub mod physics;
pub mod schedule;

use rand::SeedableRng;
use rand::rngs::StdRng;

use spork_core::events::MatchEvent;
use spork_core::game_trait::{MatchObserver, MatchState};
use spork_core::input::KeyState;
use spork_core::player::EntityRole;
use spork_core::snapshot::{
    EffectCounters, EntitySnapshot, PlatformSnapshot, RectData, SpikeSnapshot, WorldSnapshot,
};
use spork_core::time::frame_delta;

use config::EngineConfig;
use input::{InputContext, InputSource};
use level::{DEFAULT_GOAL, Level, LevelDefinition};
use physics::{PlayerState, StepOutcome, step_entity};
use schedule::Scheduler;

/// The simulation engine: owns the live level, both entities and the match
/// lifecycle, and reports everything that happens through observers.
///
/// The engine never reads a clock. Hosts pass their own millisecond
/// timestamps to [`start`](Self::start), [`frame`](Self::frame) and
/// friends, or drive it deterministically with [`advance`](Self::advance).
pub struct GameEngine {
    config: EngineConfig,
    template: Option<LevelDefinition>,
    level: Option<Level>,
    human: PlayerState,
    ai: Option<PlayerState>,
    human_input: Box<dyn InputSource>,
    ai_input: Option<Box<dyn InputSource>>,
    keys: KeyState,
    state: MatchState,
    running: bool,
    destroyed: bool,
    last_frame_ms: f64,
    elapsed_ms: f64,
    frame: u64,
    deaths: u32,
    effects: EffectCounters,
    respawn: Scheduler,
    rng: StdRng,
    observers: Vec<Box<dyn MatchObserver>>,
}

impl GameEngine {
    /// Create an engine. Passing an `ai` source enables the second entity.
    pub fn new(
        config: EngineConfig,
        human: Box<dyn InputSource>,
        ai: Option<Box<dyn InputSource>>,
    ) -> Self {
        let human_state = PlayerState::new(&config.physics);
        let ai_state = ai.as_ref().map(|_| PlayerState::new(&config.physics));
        let rng = StdRng::seed_from_u64(config.jitter_seed);
        Self {
            config,
            template: None,
            level: None,
            human: human_state,
            ai: ai_state,
            human_input: human,
            ai_input: ai,
            keys: KeyState::default(),
            state: MatchState::Idle,
            running: false,
            destroyed: false,
            last_frame_ms: 0.0,
            elapsed_ms: 0.0,
            frame: 0,
            deaths: 0,
            effects: EffectCounters::default(),
            respawn: Scheduler::new(),
            rng,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn MatchObserver>) {
        if !self.destroyed {
            self.observers.push(observer);
        }
    }

    // ================================================================
    // Lifecycle
    // ================================================================

    /// Install a level template and build a fresh overlay. Leaves the match
    /// in `Ready` with the death counter cleared.
    pub fn load_level(&mut self, def: &LevelDefinition) {
        if self.destroyed {
            return;
        }
        self.stop();
        self.template = Some(def.clone());
        self.rebuild();
        self.elapsed_ms = 0.0;
        self.deaths = 0;

        if let Some(level) = &self.level {
            tracing::info!(
                name = %level.name,
                platforms = level.platforms.len(),
                spikes = level.spikes.len(),
                human = self.human_input.label(),
                ai = ?self.ai_input.as_ref().map(|s| s.label()),
                "level loaded"
            );
        }
        self.set_state(MatchState::Ready);
    }

    /// Begin ticking a freshly loaded level. Only valid from `Ready`: a
    /// paused match continues through [`resume`](Self::resume), a won one
    /// through [`restart`](Self::restart).
    pub fn start(&mut self, now_ms: f64) {
        if self.destroyed {
            return;
        }
        if self.level.is_none() {
            tracing::warn!("start called with no level loaded");
            return;
        }
        if self.state != MatchState::Ready {
            tracing::warn!(state = %self.state, "start ignored outside the ready state");
            return;
        }
        self.begin(now_ms);
    }

    fn begin(&mut self, now_ms: f64) {
        self.running = true;
        self.last_frame_ms = now_ms;
        self.set_state(MatchState::Playing);
    }

    /// Suspend ticking and cancel any pending respawn. Only valid while playing.
    pub fn pause(&mut self) {
        if self.state != MatchState::Playing {
            return;
        }
        self.running = false;
        self.respawn.cancel();
        self.set_state(MatchState::Paused);
    }

    /// Resume from `Paused`. A human left dead by the pause gets a fresh
    /// grace delay.
    pub fn resume(&mut self, now_ms: f64) {
        if self.state != MatchState::Paused || self.destroyed {
            return;
        }
        self.running = true;
        self.last_frame_ms = now_ms;
        if !self.human.alive && !self.human.won {
            self.respawn.schedule(now_ms, self.config.respawn_delay_ms);
        }
        self.set_state(MatchState::Playing);
    }

    /// Rebuild the overlay and entities from the template and start again.
    /// The death counter is kept.
    pub fn restart(&mut self, now_ms: f64) {
        if self.template.is_none() || self.destroyed {
            return;
        }
        self.stop();
        self.rebuild();
        self.elapsed_ms = 0.0;
        tracing::info!(deaths = self.deaths, "match restarted");
        self.begin(now_ms);
    }

    /// Like [`restart`](Self::restart) but also zeroes the death counter.
    pub fn full_restart(&mut self, now_ms: f64) {
        if self.template.is_none() || self.destroyed {
            return;
        }
        self.deaths = 0;
        self.restart(now_ms);
    }

    /// Stop the frame loop and cancel any pending respawn. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        if self.respawn.cancel().is_some() {
            tracing::debug!("pending respawn cancelled");
        }
    }

    /// Stop and release every observer. Idempotent; nothing fires afterward.
    pub fn destroy(&mut self) {
        self.stop();
        self.observers.clear();
        self.destroyed = true;
    }

    pub fn set_key_state(&mut self, keys: KeyState) {
        self.keys = keys;
    }

    // ================================================================
    // Frame loop
    // ================================================================

    /// Run one host frame at host time `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        if !self.running {
            return;
        }
        if self.respawn.poll(now_ms).is_some() {
            self.respawn_all();
        }

        let dt = frame_delta(
            now_ms - self.last_frame_ms,
            self.config.frame_ms,
            self.config.max_frame_multiple,
        );
        self.last_frame_ms = now_ms;

        if self.state == MatchState::Playing {
            self.elapsed_ms += f64::from(dt) * self.config.frame_ms;
            self.frame += 1;
            self.update(dt);
            self.emit(MatchEvent::TimeUpdate {
                elapsed_ms: self.elapsed_ms,
            });
        }
    }

    /// Run one frame `dt` nominal frames after the previous one.
    pub fn advance(&mut self, dt: f32) {
        let now = self.last_frame_ms + f64::from(dt) * self.config.frame_ms;
        self.frame(now);
    }

    fn update(&mut self, dt: f32) {
        let Some(level) = self.level.as_mut() else {
            return;
        };

        let human_outcome = if self.human.is_active() {
            let ctx = InputContext {
                entity: &self.human,
                level,
                keys: &self.keys,
            };
            let intent = self.human_input.intent(&ctx);
            step_entity(&mut self.human, intent, level, &self.config, dt)
        } else {
            StepOutcome::Continue
        };

        let mut ai_outcome = StepOutcome::Continue;
        if let (Some(ai), Some(source)) = (self.ai.as_mut(), self.ai_input.as_mut()) {
            if ai.is_active() {
                let ctx = InputContext {
                    entity: ai,
                    level,
                    keys: &self.keys,
                };
                let intent = source.intent(&ctx);
                ai_outcome = step_entity(ai, intent, level, &self.config, dt);
                if matches!(ai_outcome, StepOutcome::HitSpike(_) | StepOutcome::FellOut) {
                    // The opponent is not scored: straight back to spawn.
                    ai.respawn_at(level.spawn_x, level.spawn_y);
                } else if ai_outcome == StepOutcome::ReachedGoal {
                    ai.won = true;
                }
            }
        }

        // Entity outcomes, then hazards, then effect decay.
        match human_outcome {
            StepOutcome::HitSpike(_) | StepOutcome::FellOut => self.human_died(),
            StepOutcome::ReachedGoal => self.human_won(),
            StepOutcome::Continue => {},
        }
        match ai_outcome {
            StepOutcome::HitSpike(_) | StepOutcome::FellOut => {
                tracing::debug!("ai died, respawned at spawn");
                self.emit(MatchEvent::Respawned {
                    role: EntityRole::Ai,
                });
            },
            StepOutcome::ReachedGoal => {
                tracing::info!(elapsed_ms = self.elapsed_ms, "ai reached the goal");
                self.emit(MatchEvent::GoalReached {
                    role: EntityRole::Ai,
                    elapsed_ms: self.elapsed_ms,
                });
            },
            StepOutcome::Continue => {},
        }

        let (cx, cy) = self.human.center();
        let revealed = match self.level.as_mut() {
            Some(level) => {
                hazards::update_platforms(level, &self.config.hazards, &mut self.rng, dt);
                hazards::update_spikes(level, dt);
                hazards::reveal_spikes(level, cx, cy)
            },
            None => Vec::new(),
        };
        hazards::decay_effects(&mut self.effects, dt);

        for index in revealed {
            self.emit(MatchEvent::SpikeRevealed { index });
        }
    }

    fn human_died(&mut self) {
        if !self.human.alive {
            return;
        }
        self.human.alive = false;
        self.deaths += 1;
        hazards::trigger_death_effects(&mut self.effects);
        self.emit(MatchEvent::Death {
            deaths: self.deaths,
        });
        self.respawn
            .schedule(self.last_frame_ms, self.config.respawn_delay_ms);
        tracing::debug!(
            deaths = self.deaths,
            respawn_at_ms = ?self.respawn.due_at(),
            "human died"
        );
    }

    fn human_won(&mut self) {
        if self.human.won {
            return;
        }
        self.human.won = true;
        tracing::info!(
            elapsed_ms = self.elapsed_ms,
            deaths = self.deaths,
            "human reached the goal"
        );
        self.emit(MatchEvent::GoalReached {
            role: EntityRole::Human,
            elapsed_ms: self.elapsed_ms,
        });
        self.set_state(MatchState::Won);
        self.emit(MatchEvent::MatchWon {
            elapsed_ms: self.elapsed_ms,
            deaths: self.deaths,
        });
    }

    /// Grace delay expired: fresh overlay, the human and any unfinished AI
    /// back at spawn.
    fn respawn_all(&mut self) {
        let Some(template) = &self.template else {
            return;
        };
        let level = Level::from_definition(template, &self.config);
        self.human.respawn_at(level.spawn_x, level.spawn_y);
        // An opponent that already finished stays finished.
        let ai_respawned = match self.ai.as_mut() {
            Some(ai) if !ai.won => {
                ai.respawn_at(level.spawn_x, level.spawn_y);
                true
            },
            _ => false,
        };
        self.level = Some(level);
        tracing::debug!("respawned after death");
        self.emit(MatchEvent::Respawned {
            role: EntityRole::Human,
        });
        if ai_respawned {
            self.emit(MatchEvent::Respawned {
                role: EntityRole::Ai,
            });
        }
    }

    /// Fresh overlay, entities, effects, jitter stream and input sources.
    fn rebuild(&mut self) {
        let Some(template) = &self.template else {
            return;
        };
        let level = Level::from_definition(template, &self.config);
        self.human.respawn_at(level.spawn_x, level.spawn_y);
        if let Some(ai) = self.ai.as_mut() {
            ai.respawn_at(level.spawn_x, level.spawn_y);
        }
        self.level = Some(level);
        self.effects = EffectCounters::default();
        self.rng = StdRng::seed_from_u64(self.config.jitter_seed);
        self.human_input.reset();
        if let Some(source) = self.ai_input.as_mut() {
            source.reset();
        }
    }

    fn set_state(&mut self, state: MatchState) {
        self.state = state;
        tracing::info!(%state, "match state changed");
        self.emit(MatchEvent::StateChanged { state });
    }

    fn emit(&mut self, event: MatchEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }

    // ================================================================
    // Accessors
    // ================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn human(&self) -> &PlayerState {
        &self.human
    }

    pub fn ai(&self) -> Option<&PlayerState> {
        self.ai.as_ref()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn effects(&self) -> EffectCounters {
        self.effects
    }

    pub fn respawn_pending(&self) -> bool {
        self.respawn.is_pending()
    }

    /// Everything a renderer needs for the current frame.
    pub fn snapshot(&self) -> WorldSnapshot {
        let entity = |role: EntityRole, p: &PlayerState| EntitySnapshot {
            role,
            bounds: p.bounds().into(),
            facing: p.facing,
            alive: p.alive,
            won: p.won,
            on_ground: p.on_ground,
        };
        let mut entities = vec![entity(EntityRole::Human, &self.human)];
        if let Some(ai) = &self.ai {
            entities.push(entity(EntityRole::Ai, ai));
        }

        let (level_name, width, height, goal, platforms, spikes) = match &self.level {
            Some(level) => (
                level.name.clone(),
                level.width,
                level.height,
                RectData::from(level.goal),
                level
                    .platforms
                    .iter()
                    .map(|p| PlatformSnapshot {
                        bounds: p.collision_rect().into(),
                        kind: p.kind.as_str().to_string(),
                        active: p.active,
                        triggered: p.is_triggered(),
                        jitter: p.jitter,
                    })
                    .collect(),
                level
                    .spikes
                    .iter()
                    .map(|s| SpikeSnapshot {
                        bounds: s.rect.into(),
                        dir: s.dir.as_str().to_string(),
                        active: s.active,
                        visible: s.visible,
                    })
                    .collect(),
            ),
            None => (
                String::new(),
                self.config.nominal_width,
                self.config.nominal_height,
                RectData::from(DEFAULT_GOAL),
                Vec::new(),
                Vec::new(),
            ),
        };

        WorldSnapshot {
            state: self.state,
            frame: self.frame,
            elapsed_ms: self.elapsed_ms,
            deaths: self.deaths,
            level_name,
            width,
            height,
            entities,
            platforms,
            spikes,
            goal,
            effects: self.effects,
        }
    }
}
