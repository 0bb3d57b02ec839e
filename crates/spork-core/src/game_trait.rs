use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::events::MatchEvent;

/// Lifecycle state of a match.
///
/// `Idle` until a level is loaded, `Ready` with the simulation frozen,
/// `Playing` while ticking, `Paused` while suspended, `Won` once the scored
/// entity reaches the goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    #[default]
    Idle,
    Ready,
    Playing,
    Paused,
    Won,
}

impl MatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchState::Idle => "idle",
            MatchState::Ready => "ready",
            MatchState::Playing => "playing",
            MatchState::Paused => "paused",
            MatchState::Won => "won",
        }
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of engine notifications.
///
/// Observers are invoked synchronously from inside the engine call that
/// produced the event, so they must not block.
pub trait MatchObserver: Send {
    fn notify(&mut self, event: &MatchEvent);
}

impl MatchObserver for mpsc::Sender<MatchEvent> {
    fn notify(&mut self, event: &MatchEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(event.clone());
    }
}

impl<F> MatchObserver for F
where
    F: FnMut(&MatchEvent) + Send,
{
    fn notify(&mut self, event: &MatchEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_observer_forwards() {
        let (tx, rx) = mpsc::channel();
        let mut observer: Box<dyn MatchObserver> = Box::new(tx);
        observer.notify(&MatchEvent::Death { deaths: 1 });
        assert_eq!(rx.try_recv().unwrap(), MatchEvent::Death { deaths: 1 });
    }

    #[test]
    fn channel_observer_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut observer: Box<dyn MatchObserver> = Box::new(tx);
        observer.notify(&MatchEvent::Death { deaths: 1 });
    }

    #[test]
    fn closure_observer() {
        let mut count = 0;
        {
            let mut observer = |_: &MatchEvent| count += 1;
            observer.notify(&MatchEvent::TimeUpdate { elapsed_ms: 1.0 });
            observer.notify(&MatchEvent::TimeUpdate { elapsed_ms: 2.0 });
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn state_names() {
        assert_eq!(MatchState::Paused.to_string(), "paused");
        assert_eq!(MatchState::default(), MatchState::Idle);
    }
}
