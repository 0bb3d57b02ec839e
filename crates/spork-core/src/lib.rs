pub mod events;
pub mod game_trait;
pub mod input;
pub mod player;
pub mod snapshot;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::mpsc;

    use crate::events::MatchEvent;
    use crate::game_trait::{MatchObserver, MatchState};
    use crate::player::EntityRole;

    /// Create a boxed observer plus the receiver that collects its events.
    pub fn event_channel() -> (Box<dyn MatchObserver>, mpsc::Receiver<MatchEvent>) {
        let (tx, rx) = mpsc::channel();
        (Box::new(tx), rx)
    }

    /// Drain everything currently queued on the receiver.
    pub fn drain(rx: &mpsc::Receiver<MatchEvent>) -> Vec<MatchEvent> {
        rx.try_iter().collect()
    }

    /// Drain and drop the per-tick `TimeUpdate` noise.
    pub fn drain_significant(rx: &mpsc::Receiver<MatchEvent>) -> Vec<MatchEvent> {
        rx.try_iter().filter(|e| !e.is_time_update()).collect()
    }

    /// All state transitions in `events`, in order.
    pub fn states(events: &[MatchEvent]) -> Vec<MatchState> {
        events
            .iter()
            .filter_map(|e| match e {
                MatchEvent::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn count_deaths(events: &[MatchEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, MatchEvent::Death { .. }))
            .count()
    }

    pub fn goal_roles(events: &[MatchEvent]) -> Vec<EntityRole> {
        events
            .iter()
            .filter_map(|e| match e {
                MatchEvent::GoalReached { role, .. } => Some(*role),
                _ => None,
            })
            .collect()
    }

    pub fn count_wins(events: &[MatchEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, MatchEvent::MatchWon { .. }))
            .count()
    }
}
