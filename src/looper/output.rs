//! Output stream plumbing
//!
//! The latest state lives in a `watch` channel so it can be read at any time;
//! every emission is also pushed onto a `broadcast` channel for subscribers
//! that need each step in order.

use tokio::sync::{broadcast, watch};

use crate::domain::LooperState;

/// Publish side of the looper's output
pub(crate) struct StateOutput {
    latest: watch::Sender<LooperState>,
    history: broadcast::Sender<LooperState>,
}

impl StateOutput {
    pub(crate) fn new(history_capacity: usize) -> Self {
        let (latest, _) = watch::channel(LooperState::default());
        let (history, _) = broadcast::channel(history_capacity);
        Self { latest, history }
    }

    pub(crate) fn get(&self) -> LooperState {
        *self.latest.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<LooperState> {
        self.latest.subscribe()
    }

    pub(crate) fn updates(&self) -> broadcast::Receiver<LooperState> {
        self.history.subscribe()
    }

    /// Replace the current state and notify subscribers.
    pub(crate) fn publish(&self, state: LooperState) {
        self.latest.send_replace(state);
        // no receivers is fine
        let _ = self.history.send(state);
    }

    pub(crate) fn update(&self, f: impl FnOnce(LooperState) -> LooperState) -> LooperState {
        let next = f(self.get());
        self.publish(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Phase;

    #[test]
    fn test_initial_state_is_idle() {
        let output = StateOutput::new(4);
        assert_eq!(output.get(), LooperState::default());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let output = StateOutput::new(4);
        output.publish(LooperState::new(Phase::Linear, 2));
        assert_eq!(output.get(), LooperState::new(Phase::Linear, 2));
    }

    #[test]
    fn test_updates_arrive_in_order() {
        let output = StateOutput::new(8);
        let mut rx = output.updates();

        output.publish(LooperState::new(Phase::Linear, 0));
        output.update(|s| s.with_index(1));
        output.update(|s| s.with_phase(Phase::Decaying));

        assert_eq!(rx.try_recv().unwrap(), LooperState::new(Phase::Linear, 0));
        assert_eq!(rx.try_recv().unwrap(), LooperState::new(Phase::Linear, 1));
        assert_eq!(rx.try_recv().unwrap(), LooperState::new(Phase::Decaying, 1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_watch_sees_latest() {
        let output = StateOutput::new(4);
        let mut rx = output.subscribe();
        assert!(!rx.has_changed().unwrap());

        output.publish(LooperState::new(Phase::Linear, 1));
        output.publish(LooperState::new(Phase::Linear, 2));

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), LooperState::new(Phase::Linear, 2));
    }
}
