use serde::{Deserialize, Serialize};

use spork_core::time::{FRAME_MS, MAX_FRAME_MULTIPLE};

use crate::ai::AiConfig;

/// Gravity added to vertical velocity each frame (+y is down).
pub const GRAVITY: f32 = 0.55;
/// Horizontal speed while a direction is held.
pub const MOVE_SPEED: f32 = 4.0;
/// Vertical velocity set by a jump.
pub const JUMP_IMPULSE: f32 = -10.2;
/// Multiplicative horizontal decay with no direction held.
pub const FRICTION: f32 = 0.78;
/// Terminal fall speed.
pub const MAX_FALL_SPEED: f32 = 13.0;
/// Frames after leaving ground during which a jump is still honored.
pub const COYOTE_FRAMES: u32 = 7;
/// Frames a jump press stays pending.
pub const JUMP_BUFFER_FRAMES: u32 = 5;
/// Entity width and height.
pub const ENTITY_SIZE: f32 = 22.0;

/// Per-frame movement tuning shared by both entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub friction: f32,
    pub max_fall_speed: f32,
    pub coyote_frames: u32,
    pub jump_buffer_frames: u32,
    pub entity_width: f32,
    pub entity_height: f32,
    /// Horizontal speed below which friction snaps velocity to zero.
    pub velocity_snap: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            move_speed: MOVE_SPEED,
            jump_impulse: JUMP_IMPULSE,
            friction: FRICTION,
            max_fall_speed: MAX_FALL_SPEED,
            coyote_frames: COYOTE_FRAMES,
            jump_buffer_frames: JUMP_BUFFER_FRAMES,
            entity_width: ENTITY_SIZE,
            entity_height: ENTITY_SIZE,
            velocity_snap: 0.1,
        }
    }
}

/// Trap tuning and the defaults applied to partial level definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Countdown (frames) for collapsing platforms without a `delay`.
    pub collapse_delay: f32,
    /// Downward acceleration of a collapsed platform.
    pub collapse_fall_accel: f32,
    /// How far below the level a falling platform travels before it is gone.
    pub offscreen_margin: f32,
    /// Peak-to-peak horizontal jitter while a collapse counts down.
    pub jitter_amplitude: f32,
    /// Spike hitboxes are shrunk by this much on every side.
    pub spike_inset: f32,
    pub spike_size: f32,
    pub trigger_distance: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    pub platform_range: f32,
    pub platform_speed: f32,
    pub spike_range: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            collapse_delay: 40.0,
            collapse_fall_accel: 0.5,
            offscreen_margin: 50.0,
            jitter_amplitude: 4.0,
            spike_inset: 3.0,
            spike_size: 20.0,
            trigger_distance: 80.0,
            platform_width: 60.0,
            platform_height: 20.0,
            platform_range: 100.0,
            platform_speed: 1.0,
            spike_range: 60.0,
        }
    }
}

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub hazards: HazardConfig,
    pub ai: AiConfig,
    pub frame_ms: f64,
    pub max_frame_multiple: f32,
    pub respawn_delay_ms: f64,
    /// Distance below the level bottom at which an entity counts as fallen.
    pub fall_margin: f32,
    pub nominal_width: f32,
    pub nominal_height: f32,
    pub jitter_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            hazards: HazardConfig::default(),
            ai: AiConfig::default(),
            frame_ms: FRAME_MS,
            max_frame_multiple: MAX_FRAME_MULTIPLE,
            respawn_delay_ms: 500.0,
            fall_margin: 100.0,
            nominal_width: 960.0,
            nominal_height: 540.0,
            jitter_seed: 42,
        }
    }
}

impl EngineConfig {
    /// Load config from `$SPORK_ENGINE_CONFIG` or `config/engine.toml`.
    /// Falls back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("SPORK_ENGINE_CONFIG")
            .unwrap_or_else(|_| "config/engine.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    EngineConfig::default()
                },
            },
            Err(_) => EngineConfig::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = EngineConfig::from_toml("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = EngineConfig::from_toml(
            r#"
            respawn_delay_ms = 250.0

            [physics]
            gravity = 0.8

            [ai]
            cell_size = 40.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.respawn_delay_ms, 250.0);
        assert_eq!(cfg.physics.gravity, 0.8);
        assert_eq!(cfg.physics.move_speed, MOVE_SPEED);
        assert_eq!(cfg.ai.cell_size, 40.0);
        assert_eq!(cfg.hazards, HazardConfig::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(EngineConfig::from_toml("physics = 3").is_err());
    }
}
