//! Matches buffered key-down events against registered keyboard gesture
//! sequences.

use std::collections::HashMap;

use crate::model::{InternalKeyEvent, KeyboardGestureDef};

/// Indexes gestures by their last key for fast candidate lookup, and tracks
/// the most recently reported match per callback so a sequence that stays
/// satisfied across ticks is only reported once.
pub struct KeyboardMatcher {
    gestures: Vec<KeyboardGestureDef>,
    by_last_key: HashMap<String, Vec<usize>>,
    last_reported_end_id: HashMap<String, u64>,
}

impl KeyboardMatcher {
    pub fn new(gestures: Vec<KeyboardGestureDef>) -> Self {
        let mut by_last_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, g) in gestures.iter().enumerate() {
            if let Some(last) = g.conditions.last() {
                by_last_key.entry(last.clone()).or_default().push(idx);
            }
        }
        Self {
            gestures,
            by_last_key,
            last_reported_end_id: HashMap::new(),
        }
    }

    /// Consider only gestures whose last condition equals `trigger_key`,
    /// against the full buffer snapshot `events` (oldest first). Returns the
    /// callbacks newly matched, in registration order.
    pub fn process_for_trigger(
        &mut self,
        trigger_key: &str,
        events: &[InternalKeyEvent],
    ) -> Vec<String> {
        let Some(candidates) = self.by_last_key.get(trigger_key) else {
            return Vec::new();
        };

        let mut fired = Vec::new();
        for &idx in candidates {
            let gesture = &self.gestures[idx];
            if let Some(end_id) = sequence_end_id(events, &gesture.conditions) {
                let already = self.last_reported_end_id.get(&gesture.callback).copied();
                if already != Some(end_id) {
                    self.last_reported_end_id
                        .insert(gesture.callback.clone(), end_id);
                    fired.push(gesture.callback.clone());
                }
            }
        }
        fired
    }
}

/// Returns the id of the last event in `events` if its tail, read in order,
/// equals `conditions` exactly and contiguously; `None` otherwise.
fn sequence_end_id(events: &[InternalKeyEvent], conditions: &[String]) -> Option<u64> {
    if conditions.len() > events.len() {
        return None;
    }
    let tail = &events[events.len() - conditions.len()..];
    if tail.iter().map(|e| &e.key).eq(conditions.iter()) {
        tail.last().map(|e| e.id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: u64, key: &str) -> InternalKeyEvent {
        InternalKeyEvent {
            id,
            key: key.to_string(),
            pressed: true,
        }
    }

    fn gesture(callback: &str, keys: &[&str]) -> KeyboardGestureDef {
        KeyboardGestureDef::new(callback, keys.iter().map(|k| k.to_string()).collect()).unwrap()
    }

    #[test]
    fn matches_contiguous_tail() {
        let mut m = KeyboardMatcher::new(vec![gesture("save", &["ctrl", "s"])]);
        let buf = vec![ev(1, "x"), ev(2, "ctrl"), ev(3, "s")];
        assert_eq!(m.process_for_trigger("s", &buf), vec!["save".to_string()]);
    }

    #[test]
    fn does_not_match_non_contiguous_tail() {
        let mut m = KeyboardMatcher::new(vec![gesture("save", &["ctrl", "s"])]);
        let buf = vec![ev(1, "ctrl"), ev(2, "x"), ev(3, "s")];
        assert!(m.process_for_trigger("s", &buf).is_empty());
    }

    #[test]
    fn order_matters() {
        let mut m = KeyboardMatcher::new(vec![gesture("jump", &["ctrl", "k"])]);
        let buf = vec![ev(1, "k"), ev(2, "ctrl")];
        assert!(m.process_for_trigger("ctrl", &buf).is_empty());
    }

    #[test]
    fn dedups_repeated_match_on_same_end_id() {
        let mut m = KeyboardMatcher::new(vec![gesture("save", &["ctrl", "s"])]);
        let buf = vec![ev(1, "ctrl"), ev(2, "s")];
        assert_eq!(m.process_for_trigger("s", &buf), vec!["save".to_string()]);
        assert!(m.process_for_trigger("s", &buf).is_empty());
    }

    #[test]
    fn fires_again_once_end_id_advances() {
        let mut m = KeyboardMatcher::new(vec![gesture("save", &["ctrl", "s"])]);
        let first = vec![ev(1, "ctrl"), ev(2, "s")];
        assert_eq!(m.process_for_trigger("s", &first), vec!["save".to_string()]);
        let second = vec![ev(1, "ctrl"), ev(2, "s"), ev(3, "ctrl"), ev(4, "s")];
        assert_eq!(
            m.process_for_trigger("s", &second),
            vec!["save".to_string()]
        );
    }

    #[test]
    fn single_key_gesture_matches_on_most_recent_event() {
        let mut m = KeyboardMatcher::new(vec![gesture("esc", &["esc"])]);
        let buf = vec![ev(1, "a"), ev(2, "esc")];
        assert_eq!(m.process_for_trigger("esc", &buf), vec!["esc".to_string()]);
    }

    #[test]
    fn empty_events_never_match() {
        let mut m = KeyboardMatcher::new(vec![gesture("esc", &["esc"])]);
        assert!(m.process_for_trigger("esc", &[]).is_empty());
    }
}
