//! Ingest pipeline for raw pointer events: sanitize, sample, buffer, match.

use crate::buffer::EventBuffer;
use crate::model::{InternalMoveEvent, RawPointerEvent};
use crate::pointer::matcher::PointerMatcher;

/// Default time window a pointer gesture's segments must all fall within.
pub const DEFAULT_WINDOW_SECONDS: f64 = 4.0;

/// Owns the move-sample buffer and matcher. Clicks are counted but never
/// matched against gestures — the channel is reserved for a future version.
pub struct PointerHandler {
    buffer: EventBuffer<InternalMoveEvent>,
    matcher: PointerMatcher,
    sampling_rate: u32,
    move_counter: u32,
    next_move_id: u64,
    next_click_id: u64,
}

impl PointerHandler {
    pub fn new(
        window_s: f64,
        matcher: PointerMatcher,
        sampling_rate: u32,
        now: impl Fn() -> f64 + Send + 'static,
    ) -> Self {
        Self {
            buffer: EventBuffer::new(window_s, now),
            matcher,
            sampling_rate: sampling_rate.max(1),
            move_counter: 0,
            next_move_id: 0,
            next_click_id: 0,
        }
    }

    /// Handle one raw event. Returns the callbacks newly matched, if any.
    pub fn handle(&mut self, raw: RawPointerEvent) -> Vec<String> {
        match raw {
            RawPointerEvent::Move { x, y } => self.handle_move(x, y),
            RawPointerEvent::Click { x, y, button, pressed } => {
                self.handle_click(x, y, button, pressed);
                Vec::new()
            }
        }
    }

    fn handle_move(&mut self, x: i32, y: i32) -> Vec<String> {
        if x < 0 || y < 0 {
            log::debug!(target: "gestura::pointer", "dropping move with negative coordinate ({x}, {y})");
            return Vec::new();
        }

        self.move_counter += 1;
        if self.move_counter % self.sampling_rate != 0 {
            return Vec::new();
        }

        let id = self.next_move_id;
        self.next_move_id += 1;
        self.buffer.add(InternalMoveEvent { id, x, y });

        let snapshot = self.buffer.snapshot();
        self.matcher.detect(&snapshot)
    }

    fn handle_click(&mut self, x: i32, y: i32, button: crate::model::Button, _pressed: bool) {
        if x < 0 || y < 0 {
            log::debug!(target: "gestura::pointer", "dropping click with negative coordinate ({x}, {y})");
            return;
        }
        let _ = button;
        self.next_click_id += 1;
    }
}
