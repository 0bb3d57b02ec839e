use serde::{Deserialize, Serialize};

use crate::game_trait::MatchState;
use crate::player::{EntityRole, Facing};

/// Upper bound for an encoded snapshot, matching a generous level size.
pub const MAX_SNAPSHOT_SIZE: usize = 256 * 1024;

#[derive(Debug)]
pub enum SnapshotError {
    Encode(String),
    Decode(String),
    TooLarge(usize),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "snapshot encode error: {e}"),
            Self::Decode(e) => write!(f, "snapshot decode error: {e}"),
            Self::TooLarge(size) => write!(
                f,
                "snapshot too large: {size} bytes (max {MAX_SNAPSHOT_SIZE})"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Axis-aligned rectangle in level coordinates (+y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RectData {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub role: EntityRole,
    pub bounds: RectData,
    pub facing: Facing,
    pub alive: bool,
    pub won: bool,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    pub bounds: RectData,
    /// `static`, `moving` or `collapsing`.
    pub kind: String,
    pub active: bool,
    pub triggered: bool,
    /// Horizontal jitter applied while a collapse is counting down.
    pub jitter: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeSnapshot {
    pub bounds: RectData,
    /// `up`, `down`, `left` or `right`.
    pub dir: String,
    pub active: bool,
    pub visible: bool,
}

/// Decaying feedback counters; renderers turn these into shake and flash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectCounters {
    pub shake: f32,
    pub flash: f32,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub state: MatchState,
    pub frame: u64,
    pub elapsed_ms: f64,
    pub deaths: u32,
    pub level_name: String,
    pub width: f32,
    pub height: f32,
    pub entities: Vec<EntitySnapshot>,
    pub platforms: Vec<PlatformSnapshot>,
    pub spikes: Vec<SpikeSnapshot>,
    pub goal: RectData,
    pub effects: EffectCounters,
}

impl WorldSnapshot {
    /// Encode as msgpack for a renderer on the other side of a channel.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let bytes =
            rmp_serde::to_vec_named(self).map_err(|e| SnapshotError::Encode(e.to_string()))?;
        if bytes.len() > MAX_SNAPSHOT_SIZE {
            return Err(SnapshotError::TooLarge(bytes.len()));
        }
        Ok(bytes)
    }

    pub fn decode(data: &[u8]) -> Result<Self, SnapshotError> {
        if data.len() > MAX_SNAPSHOT_SIZE {
            return Err(SnapshotError::TooLarge(data.len()));
        }
        rmp_serde::from_slice(data).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}
