use serde::{Deserialize, Serialize};

use spork_core::snapshot::RectData;

use crate::config::EngineConfig;

pub const DEFAULT_LEVEL_NAME: &str = "Custom Level";
pub const DEFAULT_SPAWN: PointDef = PointDef { x: 50.0, y: 480.0 };
pub const DEFAULT_GOAL: Rect = Rect {
    x: 860.0,
    y: 460.0,
    w: 40.0,
    h: 60.0,
};

#[derive(Debug)]
pub enum LevelError {
    Parse(String),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid level definition: {e}"),
        }
    }
}

impl std::error::Error for LevelError {}

/// Axis-aligned rectangle, +y down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Inclusive point test.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn inset(&self, amount: f32) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            w: self.w - amount * 2.0,
            h: self.h - amount * 2.0,
        }
    }
}

impl From<Rect> for RectData {
    fn from(r: Rect) -> Self {
        RectData {
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
        }
    }
}

// ================================================================
// Level definition (what the editor and backend hand us)
// ================================================================

/// Spawn point. A missing coordinate falls back to the default spawn's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDef {
    #[serde(default = "default_spawn_x")]
    pub x: f32,
    #[serde(default = "default_spawn_y")]
    pub y: f32,
}

fn default_spawn_x() -> f32 {
    DEFAULT_SPAWN.x
}

fn default_spawn_y() -> f32 {
    DEFAULT_SPAWN.y
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalDef {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub w: Option<f32>,
    pub h: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    pub w: Option<f32>,
    pub h: Option<f32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub axis: Option<String>,
    pub range: Option<f32>,
    pub speed: Option<f32>,
    pub delay: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpikeDef {
    pub x: f32,
    pub y: f32,
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub dir: Option<String>,
    pub hidden: Option<bool>,
    pub trigger_dist: Option<f32>,
    pub axis: Option<String>,
    pub range: Option<f32>,
    pub speed: Option<f32>,
}

/// Immutable level template. Every field is optional; defaults are applied
/// when the runtime [`Level`] is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelDefinition {
    pub name: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub spawn: Option<PointDef>,
    pub goal: Option<GoalDef>,
    pub platforms: Vec<PlatformDef>,
    pub spikes: Vec<SpikeDef>,
}

impl LevelDefinition {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        serde_json::to_string_pretty(self).map_err(|e| LevelError::Parse(e.to_string()))
    }

    /// Built-in level exercising every platform and spike behavior.
    pub fn training_grounds() -> Self {
        let platform = |x: f32, y: f32, w: f32, kind: &str| PlatformDef {
            x,
            y,
            w: Some(w),
            h: Some(20.0),
            kind: Some(kind.to_string()),
            ..Default::default()
        };
        let spike = |x: f32, y: f32| SpikeDef {
            x,
            y,
            w: Some(20.0),
            h: Some(20.0),
            dir: Some("up".to_string()),
            ..Default::default()
        };

        let mut moving = platform(420.0, 400.0, 90.0, "moving");
        moving.axis = Some("x".to_string());
        moving.range = Some(60.0);
        moving.speed = Some(1.0);

        let mut collapsing = platform(600.0, 440.0, 90.0, "collapsing");
        collapsing.delay = Some(30.0);

        let mut hidden = spike(330.0, 480.0);
        hidden.hidden = Some(true);
        hidden.trigger_dist = Some(60.0);

        let mut patrol = spike(760.0, 480.0);
        patrol.axis = Some("x".to_string());
        patrol.range = Some(20.0);
        patrol.speed = Some(0.5);

        LevelDefinition {
            name: Some("Training Grounds".to_string()),
            width: Some(960.0),
            height: Some(540.0),
            spawn: Some(DEFAULT_SPAWN),
            goal: Some(GoalDef {
                x: Some(880.0),
                y: Some(440.0),
                w: Some(40.0),
                h: Some(60.0),
            }),
            platforms: vec![
                platform(0.0, 500.0, 300.0, "static"),
                platform(360.0, 500.0, 260.0, "static"),
                moving,
                collapsing,
                platform(700.0, 500.0, 260.0, "static"),
            ],
            spikes: vec![hidden, patrol],
        }
    }
}

// ================================================================
// Runtime overlay
// ================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Static,
    Moving,
    Collapsing,
}

impl PlatformKind {
    /// Missing or unknown types are treated as static.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("moving") => PlatformKind::Moving,
            Some("collapsing") => PlatformKind::Collapsing,
            _ => PlatformKind::Static,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Static => "static",
            PlatformKind::Moving => "moving",
            PlatformKind::Collapsing => "collapsing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpikeDir {
    Up,
    Down,
    Left,
    Right,
}

impl SpikeDir {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("down") => SpikeDir::Down,
            Some("left") => SpikeDir::Left,
            Some("right") => SpikeDir::Right,
            _ => SpikeDir::Up,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpikeDir::Up => "up",
            SpikeDir::Down => "down",
            SpikeDir::Left => "left",
            SpikeDir::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw {
            Some("x") => Some(Axis::X),
            Some("y") => Some(Axis::Y),
            _ => None,
        }
    }
}

/// Back-and-forth motion around a fixed anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    pub axis: Axis,
    pub range: f32,
    pub speed: f32,
    /// +1.0 or -1.0.
    pub direction: f32,
    pub offset: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl Oscillator {
    pub fn new(axis: Axis, range: f32, speed: f32, anchor_x: f32, anchor_y: f32) -> Self {
        Self {
            axis,
            range,
            speed,
            direction: 1.0,
            offset: 0.0,
            anchor_x,
            anchor_y,
        }
    }
}

/// Collapse progress. Only ever moves forward through the variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollapsePhase {
    Armed,
    CountingDown { remaining: f32 },
    Falling { speed: f32 },
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collapse {
    pub delay: f32,
    pub phase: CollapsePhase,
}

impl Collapse {
    pub fn new(delay: f32) -> Self {
        Self {
            delay,
            phase: CollapsePhase::Armed,
        }
    }

    /// Start the countdown. Returns true only on the first call.
    pub fn trigger(&mut self) -> bool {
        if self.phase == CollapsePhase::Armed {
            self.phase = CollapsePhase::CountingDown {
                remaining: self.delay,
            };
            true
        } else {
            false
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.phase != CollapsePhase::Armed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
    /// Participates in collision while true.
    pub active: bool,
    pub motion: Option<Oscillator>,
    pub collapse: Option<Collapse>,
    /// Horizontal displacement from the last hazard step, carried onto riders.
    pub last_dx: f32,
    /// Horizontal shake while a collapse counts down.
    pub jitter: f32,
}

impl Platform {
    fn build(def: &PlatformDef, config: &EngineConfig) -> Self {
        let hz = &config.hazards;
        let kind = PlatformKind::parse(def.kind.as_deref());
        let rect = Rect::new(
            def.x,
            def.y,
            positive_or(def.w, hz.platform_width),
            positive_or(def.h, hz.platform_height),
        );
        let motion = (kind == PlatformKind::Moving).then(|| {
            Oscillator::new(
                // Anything but an explicit "x" moves vertically.
                Axis::parse(def.axis.as_deref()).unwrap_or(Axis::Y),
                positive_or(def.range, hz.platform_range),
                def.speed.filter(|s| *s != 0.0).unwrap_or(hz.platform_speed),
                rect.x,
                rect.y,
            )
        });
        let collapse = (kind == PlatformKind::Collapsing)
            .then(|| Collapse::new(positive_or(def.delay, hz.collapse_delay)));
        Self {
            rect,
            kind,
            active: true,
            motion,
            collapse,
            last_dx: 0.0,
            jitter: 0.0,
        }
    }

    /// The rectangle used for collision this frame, jitter included.
    pub fn collision_rect(&self) -> Rect {
        Rect {
            x: self.rect.x + self.jitter,
            ..self.rect
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.collapse.is_some_and(|c| c.is_triggered())
    }

    /// Whether pathfinding may count on this platform staying put.
    pub fn is_reliable_support(&self) -> bool {
        self.active && !self.is_triggered()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub rect: Rect,
    pub dir: SpikeDir,
    pub active: bool,
    /// Collision applies only while both `active` and `visible`.
    pub visible: bool,
    pub hidden: bool,
    pub trigger_distance: f32,
    pub motion: Option<Oscillator>,
}

impl Spike {
    fn build(def: &SpikeDef, config: &EngineConfig) -> Self {
        let hz = &config.hazards;
        let rect = Rect::new(
            def.x,
            def.y,
            positive_or(def.w, hz.spike_size),
            positive_or(def.h, hz.spike_size),
        );
        let hidden = def.hidden.unwrap_or(false);
        let motion = match (Axis::parse(def.axis.as_deref()), def.speed) {
            (Some(axis), Some(speed)) if speed != 0.0 => Some(Oscillator::new(
                axis,
                positive_or(def.range, hz.spike_range),
                speed,
                rect.x,
                rect.y,
            )),
            _ => None,
        };
        Self {
            rect,
            dir: SpikeDir::parse(def.dir.as_deref()),
            active: true,
            visible: !hidden,
            hidden,
            trigger_distance: positive_or(def.trigger_dist, hz.trigger_distance),
            motion,
        }
    }

    pub fn is_dangerous(&self) -> bool {
        self.active && self.visible
    }

    pub fn hitbox(&self, inset: f32) -> Rect {
        self.rect.inset(inset)
    }
}

/// Runtime overlay: the mutable per-match state derived from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub goal: Rect,
    pub platforms: Vec<Platform>,
    pub spikes: Vec<Spike>,
}

impl Level {
    /// Build a fresh overlay from the template, applying field defaults.
    pub fn from_definition(def: &LevelDefinition, config: &EngineConfig) -> Self {
        let spawn = def.spawn.unwrap_or(DEFAULT_SPAWN);
        let goal = def.goal.map_or(DEFAULT_GOAL, |g| Rect {
            x: g.x.unwrap_or(DEFAULT_GOAL.x),
            y: g.y.unwrap_or(DEFAULT_GOAL.y),
            w: positive_or(g.w, DEFAULT_GOAL.w),
            h: positive_or(g.h, DEFAULT_GOAL.h),
        });
        Self {
            name: def
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LEVEL_NAME.to_string()),
            width: positive_or(def.width, config.nominal_width),
            height: positive_or(def.height, config.nominal_height),
            spawn_x: spawn.x,
            spawn_y: spawn.y,
            goal,
            platforms: def
                .platforms
                .iter()
                .map(|p| Platform::build(p, config))
                .collect(),
            spikes: def.spikes.iter().map(|s| Spike::build(s, config)).collect(),
        }
    }
}

fn positive_or(value: Option<f32>, fallback: f32) -> f32 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(fallback)
}
