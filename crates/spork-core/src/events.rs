use serde::{Deserialize, Serialize};

use crate::game_trait::MatchState;
use crate::player::EntityRole;

/// Outbound notification raised by the engine.
///
/// Events are delivered in emission order, exactly once, to every
/// subscribed observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    /// Lifecycle transition.
    StateChanged { state: MatchState },
    /// Raised once per playing tick after the simulation step.
    TimeUpdate { elapsed_ms: f64 },
    /// The scored (human-slot) entity died.
    Death { deaths: u32 },
    /// An entity touched the goal for the first time since its last reset.
    GoalReached { role: EntityRole, elapsed_ms: f64 },
    /// The match reached its terminal `Won` state.
    MatchWon { elapsed_ms: f64, deaths: u32 },
    /// A hidden spike became visible.
    SpikeRevealed { index: usize },
    /// An entity was placed back at the spawn point.
    Respawned { role: EntityRole },
}

impl MatchEvent {
    pub fn is_time_update(&self) -> bool {
        matches!(self, MatchEvent::TimeUpdate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_msgpack_roundtrip() {
        let events = vec![
            MatchEvent::StateChanged {
                state: MatchState::Playing,
            },
            MatchEvent::GoalReached {
                role: EntityRole::Ai,
                elapsed_ms: 1234.5,
            },
            MatchEvent::MatchWon {
                elapsed_ms: 2000.0,
                deaths: 3,
            },
        ];
        let bytes = rmp_serde::to_vec_named(&events).unwrap();
        let decoded: Vec<MatchEvent> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(events, decoded);
    }

    #[test]
    fn time_update_predicate() {
        assert!(MatchEvent::TimeUpdate { elapsed_ms: 0.0 }.is_time_update());
        assert!(!MatchEvent::Death { deaths: 1 }.is_time_update());
    }
}
