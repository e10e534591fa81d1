//! Optional integration helper: a bounded buffer of emitted action events for
//! embedders that want to poll instead of being called back synchronously.
//! Not wired into `Engine` by default.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::model::ActionEvent;

/// Drops the oldest buffered event before inserting a new one once the
/// buffer is full, so a slow or absent drain never applies backpressure to
/// the worker thread.
pub struct ActionBus {
    capacity: usize,
    queue: Mutex<VecDeque<ActionEvent>>,
}

impl ActionBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn publish(&self, event: ActionEvent) {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(event);
    }

    /// Remove and return every buffered event, oldest first.
    pub fn drain(&self) -> Vec<ActionEvent> {
        let mut queue = self.queue.lock().unwrap();
        queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(callback: &str, t: f64) -> ActionEvent {
        ActionEvent {
            callback: callback.to_string(),
            triggered_at: t,
        }
    }

    #[test]
    fn drain_returns_oldest_first() {
        let bus = ActionBus::new(10);
        bus.publish(ev("a", 0.0));
        bus.publish(ev("b", 1.0));
        let drained = bus.drain();
        assert_eq!(drained, vec![ev("a", 0.0), ev("b", 1.0)]);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn overflow_drops_oldest_entry() {
        let bus = ActionBus::new(2);
        bus.publish(ev("a", 0.0));
        bus.publish(ev("b", 1.0));
        bus.publish(ev("c", 2.0));
        assert_eq!(bus.drain(), vec![ev("b", 1.0), ev("c", 2.0)]);
    }
}
