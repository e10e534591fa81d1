//! Ingest pipeline for raw keyboard events: normalize, buffer, match, emit.

use crate::buffer::EventBuffer;
use crate::keyboard::matcher::KeyboardMatcher;
use crate::keyboard::normalize::normalize_key;
use crate::model::{InternalKeyEvent, RawKeyEvent};

/// Default time window a keyboard gesture's keys must all fall within.
pub const DEFAULT_WINDOW_SECONDS: f64 = 1.5;

/// Owns the key buffer and matcher and turns raw OS events into callback
/// names the worker should be told about. Key releases are ignored entirely
/// — only presses can start, extend, or complete a gesture.
pub struct KeyboardHandler {
    buffer: EventBuffer<InternalKeyEvent>,
    matcher: KeyboardMatcher,
    next_id: u64,
}

impl KeyboardHandler {
    pub fn new(
        window_s: f64,
        matcher: KeyboardMatcher,
        now: impl Fn() -> f64 + Send + 'static,
    ) -> Self {
        Self {
            buffer: EventBuffer::new(window_s, now),
            matcher,
            next_id: 0,
        }
    }

    /// Handle one raw event. Returns the callbacks newly matched, if any.
    pub fn handle(&mut self, raw: RawKeyEvent) -> Vec<String> {
        let key = normalize_key(&raw.key);
        if key.is_empty() {
            log::debug!(target: "gestura::keyboard", "dropping key event that normalized to empty: {:?}", raw.key);
            return Vec::new();
        }

        if !raw.pressed {
            log::debug!(target: "gestura::keyboard", "dropping key-release event for {key:?}");
            return Vec::new();
        }

        let id = self.next_id;
        self.next_id += 1;
        self.buffer.add(InternalKeyEvent {
            id,
            key: key.clone(),
            pressed: true,
        });

        let snapshot = self.buffer.snapshot();
        self.matcher.process_for_trigger(&key, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyboardGestureDef;
    use std::cell::Cell;
    use std::rc::Rc;

    fn pressed(key: &str) -> RawKeyEvent {
        RawKeyEvent {
            key: key.to_string(),
            pressed: true,
        }
    }

    fn released(key: &str) -> RawKeyEvent {
        RawKeyEvent {
            key: key.to_string(),
            pressed: false,
        }
    }

    fn clock() -> (impl Fn() -> f64, Rc<Cell<f64>>) {
        let t = Rc::new(Cell::new(0.0));
        let t2 = t.clone();
        (move || t2.get(), t)
    }

    #[test]
    fn ignores_key_releases() {
        let matcher =
            KeyboardMatcher::new(vec![KeyboardGestureDef::new("save", vec!["s".into()]).unwrap()]);
        let mut handler = KeyboardHandler::new(10.0, matcher, || 0.0);
        assert!(handler.handle(released("s")).is_empty());
    }

    #[test]
    fn fires_on_matching_press_sequence() {
        let matcher = KeyboardMatcher::new(vec![KeyboardGestureDef::new(
            "save",
            vec!["ctrl".into(), "s".into()],
        )
        .unwrap()]);
        let mut handler = KeyboardHandler::new(10.0, matcher, || 0.0);
        assert!(handler.handle(pressed("ctrl")).is_empty());
        assert_eq!(handler.handle(pressed("s")), vec!["save".to_string()]);
    }

    #[test]
    fn buffer_window_drops_stale_keys() {
        let matcher = KeyboardMatcher::new(vec![KeyboardGestureDef::new(
            "save",
            vec!["ctrl".into(), "s".into()],
        )
        .unwrap()]);
        let (now, clock) = clock();
        let mut handler = KeyboardHandler::new(1.0, matcher, now);
        handler.handle(pressed("ctrl"));
        clock.set(5.0);
        assert!(handler.handle(pressed("s")).is_empty());
    }

    #[test]
    fn normalizes_before_matching() {
        let matcher = KeyboardMatcher::new(vec![KeyboardGestureDef::new(
            "save",
            vec!["ctrl".into(), "s".into()],
        )
        .unwrap()]);
        let mut handler = KeyboardHandler::new(10.0, matcher, || 0.0);
        assert!(handler.handle(pressed("Control_L")).is_empty());
        assert_eq!(handler.handle(pressed("s")), vec!["save".to_string()]);
    }
}
