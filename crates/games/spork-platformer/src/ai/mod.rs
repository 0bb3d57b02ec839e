//! Computer-controlled opponent: grid A* planning plus locomotion heuristics.

pub mod controller;
pub mod pathfinding;

use serde::{Deserialize, Serialize};

pub use controller::AiController;
pub use pathfinding::{Plan, Waypoint};

/// Opponent skill tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Seconds between full replans; one second is 60 controller ticks.
    pub fn think_interval(&self) -> u64 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 3,
            Difficulty::Hard => 1,
        }
    }

    /// Frames of reaction delay. Configured but not yet consumed.
    pub fn reaction_delay(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 2,
            Difficulty::Hard => 0,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Tuning for the planner and the path follower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Grid cell size used to quantize positions for A*.
    pub cell_size: f32,
    /// Node expansions before the planner gives up and falls back.
    pub max_expansions: usize,
    /// A waypoint closer than this counts as reached.
    pub waypoint_radius: f32,
    /// Ticks between stuck samples.
    pub stuck_window: u64,
    /// Per-axis displacement below which a sample counts as stuck.
    pub stuck_threshold: f32,
    /// Stuck samples tolerated before a forced jump.
    pub stuck_limit: u32,
    /// Horizontal distance to a waypoint below which no direction is held.
    pub horizontal_deadzone: f32,
    /// Horizontal slack when checking a platform for support.
    pub support_margin: f32,
    /// How far above a platform top a point still counts as supported.
    pub support_band: f32,
    pub gap_probe_ahead: f32,
    pub gap_probe_below: f32,
    pub danger_probe_ahead: f32,
    pub danger_probe_size: f32,
    /// Jump when the waypoint is this far above...
    pub jump_rise: f32,
    /// ...and horizontally within this reach.
    pub jump_reach: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            max_expansions: 500,
            waypoint_radius: 30.0,
            stuck_window: 30,
            stuck_threshold: 5.0,
            stuck_limit: 3,
            horizontal_deadzone: 10.0,
            support_margin: 20.0,
            support_band: 60.0,
            gap_probe_ahead: 60.0,
            gap_probe_below: 30.0,
            danger_probe_ahead: 40.0,
            danger_probe_size: 20.0,
            jump_rise: 30.0,
            jump_reach: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harder_tiers_replan_more_often() {
        assert!(Difficulty::Hard.think_interval() < Difficulty::Normal.think_interval());
        assert!(Difficulty::Normal.think_interval() < Difficulty::Easy.think_interval());
        assert_eq!(Difficulty::Hard.reaction_delay(), 0);
    }

    #[test]
    fn difficulty_parse_is_case_insensitive() {
        assert_eq!(Difficulty::parse("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("insane"), None);
        assert_eq!(Difficulty::default(), Difficulty::Normal);
    }
}
