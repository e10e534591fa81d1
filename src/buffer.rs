//! A time-windowed event queue shared by the keyboard and pointer handlers.
//!
//! Items older than the configured window are dropped whenever the buffer is
//! touched — there is no background sweep thread.

use std::collections::VecDeque;

/// Append-only queue that retains items within `window_s` seconds of "now".
///
/// The clock is injected as a closure rather than read from the system clock
/// directly, so tests can drive the buffer with synthetic timestamps. Single
/// producer / single consumer: no internal synchronization.
pub struct EventBuffer<T> {
    window_s: f64,
    now: Box<dyn Fn() -> f64 + Send>,
    items: VecDeque<(f64, T)>,
}

impl<T: Clone> EventBuffer<T> {
    pub fn new(window_s: f64, now: impl Fn() -> f64 + Send + 'static) -> Self {
        Self {
            window_s,
            now: Box::new(now),
            items: VecDeque::new(),
        }
    }

    /// Record `item` at the current time, then prune.
    pub fn add(&mut self, item: T) {
        let t = (self.now)();
        self.items.push_back((t, item));
        self.prune();
    }

    /// Prune, then return the buffered items oldest first.
    pub fn snapshot(&mut self) -> Vec<T> {
        self.prune();
        self.items.iter().map(|(_, item)| item.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&mut self) -> usize {
        self.prune();
        self.items.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        let cutoff = (self.now)() - self.window_s;
        while let Some((t, _)) = self.items.front() {
            if *t < cutoff {
                self.items.pop_front();
            } else {
                break;
            }
        }
    }
}
