//! Small builder for constructing a [`GestureRecord`] in code, for
//! embedders and tests that don't want to hand-write JSON.

use serde_json::json;

use crate::config::{GestureRecord, KeyboardSection, MouseSection, PolicySection};
use crate::model::{Axis, Trend};

/// Fluent builder mirroring the shape of one configuration-array entry.
pub struct ShortcutDef {
    callback: String,
    keyboard: Option<Vec<String>>,
    mouse: Option<Vec<(Axis, Trend, u32)>>,
    policy: Option<PolicySection>,
}

impl ShortcutDef {
    pub fn new(callback: impl Into<String>) -> Self {
        Self {
            callback: callback.into(),
            keyboard: None,
            mouse: None,
            policy: None,
        }
    }

    pub fn keyboard(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keyboard = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn mouse(mut self, conditions: impl IntoIterator<Item = (Axis, Trend, u32)>) -> Self {
        self.mouse = Some(conditions.into_iter().collect());
        self
    }

    pub fn policy(
        mut self,
        cooldown_seconds: Option<f64>,
        rate_window_seconds: Option<f64>,
        max_triggers: Option<u32>,
    ) -> Self {
        self.policy = Some(PolicySection {
            cooldown_seconds,
            rate_window_seconds,
            max_triggers,
        });
        self
    }

    pub fn build(self) -> GestureRecord {
        GestureRecord {
            callback: self.callback,
            keyboard: self.keyboard.map(|conditions| KeyboardSection { conditions }),
            mouse: self.mouse.map(|conds| MouseSection {
                conditions: conds
                    .into_iter()
                    .map(|(axis, trend, min_delta)| {
                        json!({
                            "axis": axis_str(axis),
                            "trend": trend_str(trend),
                            "min_delta": min_delta,
                        })
                    })
                    .collect(),
            }),
            policy: self.policy,
        }
    }
}

fn axis_str(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
    }
}

fn trend_str(trend: Trend) -> &'static str {
    match trend {
        Trend::Left => "left",
        Trend::Right => "right",
        Trend::Up => "up",
        Trend::Down => "down",
    }
}
