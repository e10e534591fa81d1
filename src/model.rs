//! Shared data types that flow between the input handlers, the matchers, the
//! worker, and the policy engine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ConfigError;

/// A raw key event as delivered by an OS listener, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawKeyEvent {
    pub key: String,
    pub pressed: bool,
}

/// A pointer button, as reported on a click event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Left,
    Right,
    Middle,
}

/// A raw pointer event as delivered by an OS listener.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum RawPointerEvent {
    Move {
        x: i32,
        y: i32,
    },
    Click {
        x: i32,
        y: i32,
        button: Button,
        pressed: bool,
    },
}

/// A key-down event after normalization, tagged with a monotonic id local to
/// the keyboard handler. Only presses ever reach the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalKeyEvent {
    pub id: u64,
    pub key: String,
    pub pressed: bool,
}

/// The axis a pointer segment was extracted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// The direction a pointer segment travelled in. `Left`/`Right` only occur on
/// `Axis::X`; `Up`/`Down` only on `Axis::Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Left,
    Right,
    Up,
    Down,
}

impl Trend {
    fn matches_axis(self, axis: Axis) -> bool {
        match axis {
            Axis::X => matches!(self, Trend::Left | Trend::Right),
            Axis::Y => matches!(self, Trend::Up | Trend::Down),
        }
    }
}

/// A move sample after buffering, tagged with a monotonic id local to the
/// pointer handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalMoveEvent {
    pub id: u64,
    pub x: i32,
    pub y: i32,
}

/// A contiguous run of movement along one axis in one direction, as produced
/// by the segmenter. Invariant: `delta >= segment_min_delta` and
/// `start_id <= end_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub axis: Axis,
    pub trend: Trend,
    pub start_id: u64,
    pub end_id: u64,
    pub delta: u32,
}

/// One condition in a pointer gesture definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PointerCond {
    pub axis: Axis,
    pub trend: Trend,
    pub min_delta: u32,
}

impl PointerCond {
    pub fn new(axis: Axis, trend: Trend, min_delta: u32) -> Result<Self, ConfigError> {
        if !trend.matches_axis(axis) {
            return Err(ConfigError::InvalidAxisTrend { axis, trend });
        }
        Ok(Self {
            axis,
            trend,
            min_delta,
        })
    }
}

/// A keyboard gesture definition: an ordered, non-empty sequence of key
/// tokens that must appear contiguously at the tail of the key buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardGestureDef {
    pub callback: String,
    pub conditions: Vec<String>,
}

impl KeyboardGestureDef {
    pub fn new(callback: impl Into<String>, conditions: Vec<String>) -> Result<Self, ConfigError> {
        let callback = callback.into();
        if conditions.is_empty() {
            return Err(ConfigError::EmptyConditions { callback });
        }
        Ok(Self {
            callback,
            conditions,
        })
    }
}

/// A pointer gesture definition: an ordered, non-empty sequence of segment
/// conditions that must be satisfied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerGestureDef {
    pub callback: String,
    pub conditions: Vec<PointerCond>,
}

impl PointerGestureDef {
    pub fn new(
        callback: impl Into<String>,
        conditions: Vec<PointerCond>,
    ) -> Result<Self, ConfigError> {
        let callback = callback.into();
        if conditions.is_empty() {
            return Err(ConfigError::EmptyConditions { callback });
        }
        Ok(Self {
            callback,
            conditions,
        })
    }
}

/// Cooldown and rate-limit policy for one callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallbackPolicy {
    pub cooldown_seconds: f64,
    pub rate_window_seconds: f64,
    pub max_triggers: u32,
}

impl Default for CallbackPolicy {
    fn default() -> Self {
        Self {
            cooldown_seconds: 0.0,
            rate_window_seconds: 1.0,
            max_triggers: 1,
        }
    }
}

/// Partition of callback names by which input source(s) can trigger them.
/// Built once from a `ConfigBundle` and consulted by the worker to route
/// each trigger batch. `keyboard_only`, `pointer_only`, and `combined` are
/// pairwise disjoint and their union is every declared callback.
#[derive(Debug, Clone, Default)]
pub struct WorkerMap {
    pub keyboard_only: HashSet<String>,
    pub pointer_only: HashSet<String>,
    pub combined: HashSet<String>,
}

/// Which input source produced a `TriggerEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Stop,
    Keyboard,
    Pointer,
}

/// A single callback firing, submitted by a handler to the worker queue.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    pub source: TriggerSource,
    pub callback: String,
    pub timestamp: f64,
}

/// An action the worker hands to the embedder's sink after policy approval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEvent {
    pub callback: String,
    pub triggered_at: f64,
}
