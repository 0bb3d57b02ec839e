use std::collections::VecDeque;

use spork_core::input::InputIntent;

use crate::ai::pathfinding::{self, Waypoint, has_support};
use crate::ai::{AiConfig, Difficulty};
use crate::level::{Level, Rect};
use crate::physics::PlayerState;

/// Ticks per second of think interval.
const TICKS_PER_SECOND: u64 = 60;

/// Path-following opponent. Produces one [`InputIntent`] per simulation tick.
#[derive(Debug, Clone)]
pub struct AiController {
    difficulty: Difficulty,
    config: AiConfig,
    frame_count: u64,
    path: VecDeque<Waypoint>,
    target: Option<Waypoint>,
    stuck_count: u32,
    last_sample: (f32, f32),
    plans: u64,
}

impl AiController {
    pub fn new(difficulty: Difficulty, config: AiConfig) -> Self {
        Self {
            difficulty,
            config,
            frame_count: 0,
            path: VecDeque::new(),
            target: None,
            stuck_count: 0,
            last_sample: (0.0, 0.0),
            plans: 0,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Remaining waypoints, next first.
    pub fn path(&self) -> impl Iterator<Item = &Waypoint> {
        self.path.iter()
    }

    pub fn target(&self) -> Option<Waypoint> {
        self.target
    }

    /// Number of plans computed since the last reset.
    pub fn plans(&self) -> u64 {
        self.plans
    }

    /// Forget the current route and counters, ready for a fresh match.
    pub fn reset(&mut self) {
        self.path.clear();
        self.target = None;
        self.stuck_count = 0;
        self.frame_count = 0;
    }

    /// Decide this tick's input for `entity` on the current `level`.
    pub fn decide(&mut self, entity: &PlayerState, level: &Level) -> InputIntent {
        self.frame_count += 1;
        let mut intent = InputIntent::IDLE;

        if self.sample_stuck(entity) {
            intent.jump = true;
        }

        let think_ticks = (self.difficulty.think_interval() * TICKS_PER_SECOND).max(1);
        if self.frame_count % think_ticks == 0 || self.path.is_empty() {
            self.replan(entity, level);
        }

        if let Some(next) = self.path.front() {
            let dist = (entity.x - next.x).hypot(entity.y - next.y);
            if dist < self.config.waypoint_radius {
                self.path.pop_front();
                if self.path.is_empty() {
                    self.replan(entity, level);
                }
            }
        }

        self.target = self.path.front().copied();
        let Some(target) = self.target else {
            return intent;
        };

        let dx = target.x - entity.x;
        if dx.abs() > self.config.horizontal_deadzone {
            if dx > 0.0 {
                intent.move_right = true;
            } else {
                intent.move_left = true;
            }
        }

        if entity.on_ground && self.should_jump(entity, target, level) {
            intent.jump = true;
        }
        let heading = if dx > 0.0 { 1.0 } else { -1.0 };
        if entity.on_ground && self.danger_ahead(entity, level, heading) {
            intent.jump = true;
        }

        intent
    }

    /// Every stuck window, compare against the previous sample. Returns true
    /// when too many consecutive samples saw no movement.
    fn sample_stuck(&mut self, entity: &PlayerState) -> bool {
        let window = self.config.stuck_window.max(1);
        if self.frame_count % window == 0 {
            let dx = (entity.x - self.last_sample.0).abs();
            let dy = (entity.y - self.last_sample.1).abs();
            if dx < self.config.stuck_threshold && dy < self.config.stuck_threshold {
                self.stuck_count += 1;
            } else {
                self.stuck_count = 0;
            }
            self.last_sample = (entity.x, entity.y);
        }

        if self.stuck_count > self.config.stuck_limit {
            tracing::debug!(x = entity.x, y = entity.y, "ai stuck, forcing jump");
            self.stuck_count = 0;
            return true;
        }
        false
    }

    fn replan(&mut self, entity: &PlayerState, level: &Level) {
        let plan = pathfinding::find_path(level, entity.x, entity.y, &self.config);
        self.plans += 1;
        tracing::debug!(
            waypoints = plan.waypoints.len(),
            expansions = plan.expansions,
            fallback = plan.fallback,
            "ai replanned"
        );
        self.path = plan.waypoints.into();
    }

    fn should_jump(&self, entity: &PlayerState, target: Waypoint, level: &Level) -> bool {
        let dy = target.y - entity.y;
        let dx = (target.x - entity.x).abs();
        if dy < -self.config.jump_rise && dx < self.config.jump_reach {
            return true;
        }

        let direction = if target.x > entity.x { 1.0 } else { -1.0 };
        let probe_x = entity.x + direction * self.config.gap_probe_ahead;
        let probe_y = entity.y + self.config.gap_probe_below;
        !has_support(level, probe_x, probe_y, &self.config)
    }

    fn danger_ahead(&self, entity: &PlayerState, level: &Level, heading: f32) -> bool {
        let size = self.config.danger_probe_size;
        let probe = Rect::new(
            entity.x + heading * self.config.danger_probe_ahead,
            entity.y,
            size,
            size,
        );
        level
            .spikes
            .iter()
            .any(|s| s.is_dangerous() && probe.overlaps(&s.rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, PhysicsConfig};
    use crate::level::{LevelDefinition, PlatformDef, SpikeDef};

    fn flat_level(spikes: Vec<SpikeDef>) -> Level {
        let def = LevelDefinition {
            platforms: vec![PlatformDef {
                x: 0.0,
                y: 500.0,
                w: Some(960.0),
                h: Some(40.0),
                ..Default::default()
            }],
            spikes,
            ..Default::default()
        };
        Level::from_definition(&def, &EngineConfig::default())
    }

    fn entity_at(x: f32, y: f32, on_ground: bool) -> PlayerState {
        let mut e = PlayerState::new(&PhysicsConfig::default());
        e.respawn_at(x, y);
        e.on_ground = on_ground;
        e
    }

    fn controller(difficulty: Difficulty) -> AiController {
        AiController::new(difficulty, AiConfig::default())
    }

    #[test]
    fn heads_toward_goal() {
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Normal);
        let entity = entity_at(50.0, 478.0, false);
        let intents: Vec<InputIntent> = (0..3).map(|_| ai.decide(&entity, &level)).collect();
        assert!(intents.iter().any(|i| i.move_right));
        assert!(intents.iter().all(|i| !i.move_left));
        assert!(ai.target().is_some());
    }

    #[test]
    fn airborne_follower_does_not_jump_on_its_own() {
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Normal);
        let entity = entity_at(50.0, 478.0, false);
        for _ in 0..100 {
            assert!(!ai.decide(&entity, &level).jump);
        }
    }

    #[test]
    fn grounded_follower_hops_when_probe_finds_no_ground() {
        // The gap probe looks below the feet, so a grounded follower with a
        // target always finds "no ground" and hops.
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Normal);
        let intent = ai.decide(&entity_at(50.0, 478.0, true), &level);
        assert!(intent.jump);
    }

    #[test]
    fn motionless_entity_gets_forced_jump_after_four_windows() {
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Easy);
        let entity = entity_at(50.0, 478.0, false);

        let jumps: Vec<u64> = (1..=200u64)
            .filter(|_| ai.decide(&entity, &level).jump)
            .collect();
        // Sample at tick 30 moves off the (0,0) baseline; ticks 60..150 are stuck.
        assert_eq!(jumps, vec![150]);
    }

    #[test]
    fn moving_entity_is_never_stuck() {
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Easy);
        for tick in 0..300 {
            let entity = entity_at(50.0 + tick as f32 * 0.2, 300.0, false);
            assert!(!ai.decide(&entity, &level).jump);
        }
    }

    #[test]
    fn reached_waypoint_is_popped() {
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Normal);
        let entity = entity_at(50.0, 478.0, false);
        ai.decide(&entity, &level);
        // Start cell center (45, 465) is within the waypoint radius.
        assert_ne!(ai.path().next(), Some(&Waypoint { x: 45.0, y: 465.0 }));
    }

    #[test]
    fn hard_replans_every_second() {
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Hard);
        let entity = entity_at(50.0, 478.0, false);
        for _ in 0..59 {
            ai.decide(&entity, &level);
        }
        assert_eq!(ai.plans(), 1);
        ai.decide(&entity, &level);
        assert_eq!(ai.plans(), 2);
    }

    #[test]
    fn danger_probe_sees_visible_spike_only() {
        let spike = SpikeDef {
            x: 95.0,
            y: 480.0,
            ..Default::default()
        };
        let mut level = flat_level(vec![spike]);
        let ai = controller(Difficulty::Normal);
        let entity = entity_at(50.0, 478.0, true);

        assert!(ai.danger_ahead(&entity, &level, 1.0));
        assert!(!ai.danger_ahead(&entity, &level, -1.0));

        level.spikes[0].visible = false;
        assert!(!ai.danger_ahead(&entity, &level, 1.0));
    }

    #[test]
    fn reset_clears_route_and_counters() {
        let level = flat_level(vec![]);
        let mut ai = controller(Difficulty::Normal);
        let entity = entity_at(50.0, 478.0, false);
        for _ in 0..45 {
            ai.decide(&entity, &level);
        }
        ai.reset();
        assert_eq!(ai.path().count(), 0);
        assert!(ai.target().is_none());
        assert_eq!(ai.frame_count, 0);
        assert_eq!(ai.stuck_count, 0);
    }
}
