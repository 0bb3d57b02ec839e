use rand::Rng;
use rand::rngs::StdRng;

use spork_core::snapshot::EffectCounters;

use crate::config::HazardConfig;
use crate::level::{Axis, CollapsePhase, Level, Oscillator, Spike};

const DEATH_SHAKE: f32 = 8.0;
const DEATH_FLASH: f32 = 0.4;
const SHAKE_DECAY: f32 = 0.9;
const SHAKE_CUTOFF: f32 = 0.5;
const FLASH_DECAY_PER_FRAME: f32 = 0.03;

impl Oscillator {
    /// Advance by `dt` frames, turning around at either end of the range.
    /// Returns the new `(x, y)` position.
    pub fn step(&mut self, dt: f32) -> (f32, f32) {
        self.offset += self.speed * dt * self.direction;
        if self.offset >= self.range {
            self.offset = self.range;
            self.direction = -1.0;
        } else if self.offset <= -self.range {
            self.offset = -self.range;
            self.direction = 1.0;
        }
        match self.axis {
            Axis::X => (self.anchor_x + self.offset, self.anchor_y),
            Axis::Y => (self.anchor_x, self.anchor_y + self.offset),
        }
    }
}

/// Advance collapsing and moving platforms by `dt` frames.
pub fn update_platforms(level: &mut Level, hazards: &HazardConfig, rng: &mut StdRng, dt: f32) {
    let gone_below = level.height + hazards.offscreen_margin;
    for plat in level.platforms.iter_mut().filter(|p| p.active) {
        if let Some(collapse) = plat.collapse.as_mut() {
            if let CollapsePhase::CountingDown { remaining } = collapse.phase {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    collapse.phase = CollapsePhase::CountingDown { remaining };
                    plat.jitter = jitter(rng, hazards.jitter_amplitude);
                } else {
                    collapse.phase = CollapsePhase::Falling { speed: 0.0 };
                }
            }
            if let CollapsePhase::Falling { speed } = collapse.phase {
                let speed = speed + hazards.collapse_fall_accel * dt;
                plat.rect.y += speed * dt;
                plat.jitter = 0.0;
                if plat.rect.y > gone_below {
                    collapse.phase = CollapsePhase::Gone;
                    plat.active = false;
                    tracing::debug!(x = plat.rect.x, "collapsed platform gone");
                } else {
                    collapse.phase = CollapsePhase::Falling { speed };
                }
            }
        }

        if let Some(motion) = plat.motion.as_mut() {
            let prev_x = plat.rect.x;
            let (x, y) = motion.step(dt);
            plat.rect.x = x;
            plat.rect.y = y;
            plat.last_dx = x - prev_x;
        }
    }
}

fn jitter(rng: &mut StdRng, amplitude: f32) -> f32 {
    let half = amplitude / 2.0;
    if half > 0.0 {
        rng.random_range(-half..half)
    } else {
        0.0
    }
}

/// Advance patrolling spikes by `dt` frames.
pub fn update_spikes(level: &mut Level, dt: f32) {
    for spike in level.spikes.iter_mut().filter(|s| s.active) {
        if let Some(motion) = spike.motion.as_mut() {
            let (x, y) = motion.step(dt);
            spike.rect.x = x;
            spike.rect.y = y;
        }
    }
}

fn within_trigger_range(spike: &Spike, cx: f32, cy: f32) -> bool {
    let (sx, sy) = spike.rect.center();
    (cx - sx).hypot(cy - sy) < spike.trigger_distance
}

/// Reveal hidden spikes whose trigger distance contains the point
/// `(cx, cy)`. Returns the indices that became visible.
pub fn reveal_spikes(level: &mut Level, cx: f32, cy: f32) -> Vec<usize> {
    let mut revealed = Vec::new();
    for (index, spike) in level.spikes.iter_mut().enumerate() {
        if spike.hidden && !spike.visible && within_trigger_range(spike, cx, cy) {
            spike.visible = true;
            revealed.push(index);
        }
    }
    revealed
}

pub fn trigger_death_effects(effects: &mut EffectCounters) {
    effects.shake = DEATH_SHAKE;
    effects.flash = DEATH_FLASH;
}

pub fn decay_effects(effects: &mut EffectCounters, dt: f32) {
    if effects.shake > 0.0 {
        effects.shake *= SHAKE_DECAY;
        if effects.shake < SHAKE_CUTOFF {
            effects.shake = 0.0;
        }
    }
    if effects.flash > 0.0 {
        effects.flash = (effects.flash - FLASH_DECAY_PER_FRAME * dt).max(0.0);
    }
}
