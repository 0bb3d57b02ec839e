use serde::{Deserialize, Serialize};

use spork_core::input::InputIntent;
use spork_core::player::Facing;

use crate::config::{EngineConfig, PhysicsConfig};
use crate::level::{Level, Platform, PlatformKind, Rect};

/// How far above a platform top the previous-frame feet may sit and still
/// count as approaching from above.
const LAND_TOLERANCE: f32 = 0.5;

/// State of one simulated entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub on_ground: bool,
    pub coyote_frames: u32,
    pub jump_buffer: u32,
    pub alive: bool,
    pub won: bool,
    pub facing: Facing,
}

impl PlayerState {
    pub fn new(physics: &PhysicsConfig) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            w: physics.entity_width,
            h: physics.entity_height,
            on_ground: false,
            coyote_frames: 0,
            jump_buffer: 0,
            alive: true,
            won: false,
            facing: Facing::Right,
        }
    }

    /// Place at the spawn point with every transient flag cleared.
    pub fn respawn_at(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.on_ground = false;
        self.coyote_frames = 0;
        self.jump_buffer = 0;
        self.alive = true;
        self.won = false;
        self.facing = Facing::Right;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn center(&self) -> (f32, f32) {
        self.bounds().center()
    }

    /// Still taking part in the simulation.
    pub fn is_active(&self) -> bool {
        self.alive && !self.won
    }
}

/// What happened to an entity during its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    HitSpike(usize),
    FellOut,
    ReachedGoal,
}

/// Apply one frame of input: horizontal velocity, jump buffering and coyote time.
pub fn apply_input(player: &mut PlayerState, intent: InputIntent, physics: &PhysicsConfig) {
    match intent.horizontal() {
        -1 => {
            player.vx = -physics.move_speed;
            player.facing = Facing::Left;
        },
        1 => {
            player.vx = physics.move_speed;
            player.facing = Facing::Right;
        },
        _ => {
            player.vx *= physics.friction;
            if player.vx.abs() < physics.velocity_snap {
                player.vx = 0.0;
            }
        },
    }

    if intent.jump {
        player.jump_buffer = physics.jump_buffer_frames;
    } else {
        player.jump_buffer = player.jump_buffer.saturating_sub(1);
    }
    if player.on_ground {
        player.coyote_frames = physics.coyote_frames;
    } else {
        player.coyote_frames = player.coyote_frames.saturating_sub(1);
    }

    if player.jump_buffer > 0 && player.coyote_frames > 0 {
        player.vy = physics.jump_impulse;
        player.on_ground = false;
        player.coyote_frames = 0;
        player.jump_buffer = 0;
    }
}

/// Gravity (clamped to terminal speed) and position integration.
pub fn integrate(player: &mut PlayerState, physics: &PhysicsConfig, dt: f32) {
    player.vy = (player.vy + physics.gravity * dt).min(physics.max_fall_speed);
    player.x += player.vx * dt;
    player.y += player.vy * dt;
}

/// Resolve overlap against every active platform.
///
/// `prev_y` is the entity's y before integration: an entity whose feet were
/// at or above a platform top last frame and are below it now lands on it
/// even if it moved further than the platform is thick.
pub fn resolve_collisions(player: &mut PlayerState, prev_y: f32, platforms: &mut [Platform]) {
    player.on_ground = false;

    for plat in platforms.iter_mut() {
        if !plat.active {
            continue;
        }
        let solid = plat.collision_rect();
        let horizontal = player.x < solid.right() && player.x + player.w > solid.x;

        let swept_landing = player.vy >= 0.0
            && horizontal
            && prev_y + player.h <= solid.y + LAND_TOLERANCE
            && player.y + player.h > solid.y;
        if swept_landing {
            land_on(player, plat, solid.y);
            continue;
        }

        if !player.bounds().overlaps(&solid) {
            continue;
        }

        let overlap_top = player.y + player.h - solid.y;
        let overlap_bottom = solid.bottom() - player.y;
        let overlap_left = player.x + player.w - solid.x;
        let overlap_right = solid.right() - player.x;
        let min_overlap = overlap_top
            .min(overlap_bottom)
            .min(overlap_left)
            .min(overlap_right);

        if min_overlap == overlap_top && player.vy >= 0.0 {
            land_on(player, plat, solid.y);
        } else if min_overlap == overlap_bottom && player.vy <= 0.0 {
            // Head bump
            player.y = solid.bottom();
            player.vy = 0.0;
        } else if min_overlap == overlap_left {
            player.x = solid.x - player.w;
            player.vx = 0.0;
        } else if min_overlap == overlap_right {
            player.x = solid.right();
            player.vx = 0.0;
        }
    }
}

fn land_on(player: &mut PlayerState, plat: &mut Platform, top: f32) {
    player.y = top - player.h;
    player.vy = 0.0;
    player.on_ground = true;
    match plat.kind {
        PlatformKind::Moving => player.x += plat.last_dx,
        PlatformKind::Collapsing => {
            let (x, y) = (plat.rect.x, plat.rect.y);
            if let Some(collapse) = plat.collapse.as_mut() {
                if collapse.trigger() {
                    tracing::debug!(x, y, "collapse triggered");
                }
            }
        },
        PlatformKind::Static => {},
    }
}

/// First visible spike whose inset hitbox overlaps the entity.
pub fn touching_spike(player: &PlayerState, level: &Level, inset: f32) -> Option<usize> {
    let bounds = player.bounds();
    level
        .spikes
        .iter()
        .position(|s| s.is_dangerous() && bounds.overlaps(&s.hitbox(inset)))
}

/// Run one full entity step: input, physics, collision, then the hazard,
/// goal and bounds checks, in that order.
pub fn step_entity(
    player: &mut PlayerState,
    intent: InputIntent,
    level: &mut Level,
    config: &EngineConfig,
    dt: f32,
) -> StepOutcome {
    if !player.is_active() {
        return StepOutcome::Continue;
    }

    apply_input(player, intent, &config.physics);
    let prev_y = player.y;
    integrate(player, &config.physics, dt);
    resolve_collisions(player, prev_y, &mut level.platforms);

    if let Some(index) = touching_spike(player, level, config.hazards.spike_inset) {
        return StepOutcome::HitSpike(index);
    }
    if player.bounds().overlaps(&level.goal) {
        return StepOutcome::ReachedGoal;
    }

    player.x = player.x.clamp(0.0, (level.width - player.w).max(0.0));
    if player.y > level.height + config.fall_margin {
        return StepOutcome::FellOut;
    }
    StepOutcome::Continue
}
