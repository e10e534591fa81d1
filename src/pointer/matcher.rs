//! Matches extracted segments against registered ordered pointer gesture
//! conditions.

use std::collections::HashMap;

use crate::model::{Axis, InternalMoveEvent, PointerGestureDef, Segment, Trend};
use crate::pointer::segmenter::PointerSegmenter;

pub struct PointerMatcher {
    gestures: Vec<PointerGestureDef>,
    by_first_cond: HashMap<(Axis, Trend), Vec<usize>>,
    segmenter: PointerSegmenter,
    last_end_id: HashMap<String, u64>,
}

impl PointerMatcher {
    pub fn new(gestures: Vec<PointerGestureDef>, segmenter: PointerSegmenter) -> Self {
        let mut by_first_cond: HashMap<(Axis, Trend), Vec<usize>> = HashMap::new();
        for (idx, g) in gestures.iter().enumerate() {
            if let Some(first) = g.conditions.first() {
                by_first_cond
                    .entry((first.axis, first.trend))
                    .or_default()
                    .push(idx);
            }
        }
        Self {
            gestures,
            by_first_cond,
            segmenter,
            last_end_id: HashMap::new(),
        }
    }

    /// Extract segments from the buffer snapshot and report newly completed
    /// gestures (callback, end_id strictly greater than the last report).
    pub fn detect(&mut self, events: &[InternalMoveEvent]) -> Vec<String> {
        let segments = self.segmenter.extract(events);
        if segments.is_empty() {
            return Vec::new();
        }

        let mut fired = Vec::new();
        for seg in &segments {
            let Some(candidates) = self.by_first_cond.get(&(seg.axis, seg.trend)) else {
                continue;
            };
            for &idx in candidates {
                let gesture = &self.gestures[idx];
                let first_cond = &gesture.conditions[0];
                if seg.delta < first_cond.min_delta {
                    continue;
                }
                if let Some(end_id) = match_from(&segments, gesture, seg.end_id) {
                    let reported = self.last_end_id.get(&gesture.callback).copied();
                    if reported.map_or(true, |last| end_id > last) {
                        self.last_end_id.insert(gesture.callback.clone(), end_id);
                        fired.push(gesture.callback.clone());
                    }
                }
            }
        }
        fired
    }
}

/// Walk `gesture.conditions[1..]` in order, each time choosing the first
/// segment (in original order) whose `end_id >= last_end_id` and which
/// satisfies the condition. Returns the final `end_id` on full match.
fn match_from(segments: &[Segment], gesture: &PointerGestureDef, start_end_id: u64) -> Option<u64> {
    let mut last_end_id = start_end_id;
    for cond in &gesture.conditions[1..] {
        let chosen = segments.iter().find(|s| {
            s.end_id >= last_end_id
                && s.axis == cond.axis
                && s.trend == cond.trend
                && s.delta >= cond.min_delta
        })?;
        last_end_id = chosen.end_id;
    }
    Some(last_end_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PointerCond;

    fn mv(id: u64, x: i32, y: i32) -> InternalMoveEvent {
        InternalMoveEvent { id, x, y }
    }

    fn gesture(callback: &str, conds: Vec<PointerCond>) -> PointerGestureDef {
        PointerGestureDef::new(callback, conds).unwrap()
    }

    #[test]
    fn single_condition_gesture_fires_once() {
        let gestures = vec![gesture(
            "scroll",
            vec![PointerCond::new(Axis::Y, Trend::Up, 100).unwrap()],
        )];
        let mut matcher = PointerMatcher::new(gestures, PointerSegmenter::new(10));
        let events = vec![mv(0, 0, 0), mv(1, 0, -120)];
        assert_eq!(matcher.detect(&events), vec!["scroll".to_string()]);
        // replaying the same batch should not fire again (de-dup)
        assert!(matcher.detect(&events).is_empty());
    }

    #[test]
    fn multi_condition_gesture_requires_order() {
        let gestures = vec![gesture(
            "swipe",
            vec![
                PointerCond::new(Axis::Y, Trend::Up, 100).unwrap(),
                PointerCond::new(Axis::X, Trend::Left, 400).unwrap(),
            ],
        )];
        let mut matcher = PointerMatcher::new(gestures, PointerSegmenter::new(10));
        let events = vec![mv(0, 0, 0), mv(1, 0, -120), mv(2, -500, -120)];
        assert_eq!(matcher.detect(&events), vec!["swipe".to_string()]);
    }

    #[test]
    fn below_threshold_condition_never_fires() {
        let gestures = vec![gesture(
            "scroll",
            vec![PointerCond::new(Axis::Y, Trend::Up, 500).unwrap()],
        )];
        let mut matcher = PointerMatcher::new(gestures, PointerSegmenter::new(10));
        let events = vec![mv(0, 0, 0), mv(1, 0, -120)];
        assert!(matcher.detect(&events).is_empty());
    }

    #[test]
    fn fires_again_once_a_new_segment_extends_past_last_end_id() {
        let gestures = vec![gesture(
            "scroll",
            vec![PointerCond::new(Axis::Y, Trend::Up, 100).unwrap()],
        )];
        let mut matcher = PointerMatcher::new(gestures, PointerSegmenter::new(10));
        let first = vec![mv(0, 0, 0), mv(1, 0, -120)];
        assert_eq!(matcher.detect(&first), vec!["scroll".to_string()]);
        let second = vec![
            mv(0, 0, 0),
            mv(1, 0, -120),
            mv(2, 0, -100),
            mv(3, 0, -300),
        ];
        assert_eq!(matcher.detect(&second), vec!["scroll".to_string()]);
    }
}
