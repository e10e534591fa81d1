//! Converts a stream of raw `(x, y)` samples into directed axial segments,
//! tolerating small reversals ("jitter") via a lookahead confirmation rule.

use crate::model::{Axis, InternalMoveEvent, Segment, Trend};

/// Large single jumps are always treated as a real reversal regardless of
/// lookahead; smaller candidate reversals need this many confirming samples.
const DEFAULT_LOOKAHEAD: usize = 2;

pub struct PointerSegmenter {
    segment_min_delta: u32,
    jitter_max_delta: u32,
    lookahead: usize,
}

impl PointerSegmenter {
    pub fn new(segment_min_delta: u32) -> Self {
        Self {
            segment_min_delta,
            jitter_max_delta: segment_min_delta,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }

    /// Extract segments on both axes from a buffer snapshot, oldest first,
    /// concatenated and stably sorted by `start_id`.
    pub fn extract(&self, events: &[InternalMoveEvent]) -> Vec<Segment> {
        let mut segments = self.scan_axis(events, Axis::X);
        segments.extend(self.scan_axis(events, Axis::Y));
        segments.sort_by_key(|s| s.start_id);
        segments
    }

    fn scan_axis(&self, events: &[InternalMoveEvent], axis: Axis) -> Vec<Segment> {
        if events.len() < 2 {
            return Vec::new();
        }

        let value = |e: &InternalMoveEvent| match axis {
            Axis::X => e.x,
            Axis::Y => e.y,
        };

        let mut out = Vec::new();
        let mut start_index = 0usize;
        let mut start_value = value(&events[0]);
        let mut current_trend: Option<Trend> = None;

        let mut i = 1;
        while i < events.len() {
            let delta = value(&events[i]) - value(&events[i - 1]);
            if delta == 0 {
                i += 1;
                continue;
            }
            let new_trend = trend_of(axis, delta);

            match current_trend {
                None => {
                    current_trend = Some(new_trend);
                }
                Some(trend) if trend == new_trend => {}
                Some(trend) => {
                    if self.is_real_reversal(events, axis, i, trend, new_trend) {
                        let delta_total = (value(&events[i - 1]) - start_value).unsigned_abs();
                        if delta_total >= self.segment_min_delta {
                            out.push(Segment {
                                axis,
                                trend,
                                start_id: events[start_index].id,
                                end_id: events[i - 1].id,
                                delta: delta_total,
                            });
                        }
                        start_index = i - 1;
                        start_value = value(&events[i - 1]);
                        current_trend = Some(new_trend);
                    }
                    // jitter: state unchanged, continue the current run.
                }
            }
            i += 1;
        }

        if let Some(trend) = current_trend {
            let last = events.last().unwrap();
            let delta_total = (value(last) - start_value).unsigned_abs();
            if delta_total >= self.segment_min_delta {
                out.push(Segment {
                    axis,
                    trend,
                    start_id: events[start_index].id,
                    end_id: last.id,
                    delta: delta_total,
                });
            }
        }

        out
    }

    /// Decide whether the trend flip at `i` (from `current_trend` to
    /// `new_trend`) is a real reversal or sensor jitter.
    fn is_real_reversal(
        &self,
        events: &[InternalMoveEvent],
        axis: Axis,
        i: usize,
        current_trend: Trend,
        new_trend: Trend,
    ) -> bool {
        let value = |e: &InternalMoveEvent| match axis {
            Axis::X => e.x,
            Axis::Y => e.y,
        };

        let delta = value(&events[i]) - value(&events[i - 1]);
        if delta.unsigned_abs() >= self.jitter_max_delta {
            return true;
        }

        let mut confirm = 0usize;
        for offset in 1..=self.lookahead {
            let k = i + offset;
            if k >= events.len() {
                break;
            }
            let d = value(&events[k]) - value(&events[k - 1]);
            if d == 0 {
                continue;
            }
            let trend_k = trend_of(axis, d);
            if trend_k == current_trend {
                return false;
            }
            if trend_k == new_trend {
                confirm += 1;
            }
        }

        confirm >= self.lookahead
    }
}

fn trend_of(axis: Axis, delta: i32) -> Trend {
    match axis {
        Axis::X => {
            if delta > 0 {
                Trend::Right
            } else {
                Trend::Left
            }
        }
        Axis::Y => {
            if delta > 0 {
                Trend::Down
            } else {
                Trend::Up
            }
        }
    }
}
