//! Parses an already-obtained JSON gesture configuration into the typed
//! bundle the rest of the crate consumes. Reading that JSON off disk is left
//! to the embedder — this module only covers the string/records -> bundle
//! transform.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{
    Axis, CallbackPolicy, KeyboardGestureDef, PointerCond, PointerGestureDef, Trend, WorkerMap,
};

const ALLOWED_MOUSE_COND_FIELDS: [&str; 3] = ["axis", "trend", "min_delta"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gesture {callback:?} has an empty condition list")]
    EmptyConditions { callback: String },

    #[error("trend {trend:?} is not valid for axis {axis:?}")]
    InvalidAxisTrend { axis: Axis, trend: Trend },

    #[error("unknown field {field:?} in mouse condition")]
    UnknownMouseField { field: String },

    #[error("invalid axis {0:?}")]
    InvalidAxis(String),

    #[error("invalid trend {0:?}")]
    InvalidTrend(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One record of the configuration array: a callback name plus whichever of
/// its keyboard/mouse/policy sections are present. A record with neither
/// `keyboard` nor `mouse` populated is a no-op.
#[derive(Debug, Clone, Deserialize)]
pub struct GestureRecord {
    pub callback: String,
    #[serde(default)]
    pub keyboard: Option<KeyboardSection>,
    #[serde(default)]
    pub mouse: Option<MouseSection>,
    #[serde(default)]
    pub policy: Option<PolicySection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyboardSection {
    #[serde(default)]
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MouseSection {
    #[serde(default)]
    pub conditions: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicySection {
    pub cooldown_seconds: Option<f64>,
    pub rate_window_seconds: Option<f64>,
    pub max_triggers: Option<u32>,
}

/// The typed result of parsing a configuration: every declared gesture,
/// every declared policy (defaults filled in), and the worker's callback
/// partition.
#[derive(Debug, Clone, Default)]
pub struct ConfigBundle {
    pub keyboard_gestures: Vec<KeyboardGestureDef>,
    pub pointer_gestures: Vec<PointerGestureDef>,
    pub policies: HashMap<String, CallbackPolicy>,
    pub worker_map: WorkerMap,
}

pub struct ConfigParser;

impl ConfigParser {
    /// Parse a raw JSON array of gesture records.
    pub fn parse_str(json: &str) -> Result<ConfigBundle, ConfigError> {
        let records: Vec<GestureRecord> = serde_json::from_str(json)?;
        Self::parse(records)
    }

    /// Build a `ConfigBundle` from already-deserialized records.
    pub fn parse(records: Vec<GestureRecord>) -> Result<ConfigBundle, ConfigError> {
        let mut keyboard_gestures = Vec::new();
        let mut pointer_gestures = Vec::new();
        let mut policies = HashMap::new();
        let mut kbd_callbacks = HashSet::new();
        let mut ptr_callbacks = HashSet::new();

        for record in records {
            if let Some(section) = &record.keyboard {
                if !section.conditions.is_empty() {
                    keyboard_gestures.push(KeyboardGestureDef::new(
                        record.callback.clone(),
                        section.conditions.clone(),
                    )?);
                    kbd_callbacks.insert(record.callback.clone());
                }
            }

            if let Some(section) = &record.mouse {
                if !section.conditions.is_empty() {
                    let conditions = section
                        .conditions
                        .iter()
                        .map(parse_pointer_cond)
                        .collect::<Result<Vec<_>, _>>()?;
                    pointer_gestures.push(PointerGestureDef::new(
                        record.callback.clone(),
                        conditions,
                    )?);
                    ptr_callbacks.insert(record.callback.clone());
                }
            }

            let defaults = CallbackPolicy::default();
            let section = record.policy.as_ref();
            policies.insert(
                record.callback.clone(),
                CallbackPolicy {
                    cooldown_seconds: section
                        .and_then(|s| s.cooldown_seconds)
                        .unwrap_or(defaults.cooldown_seconds),
                    rate_window_seconds: section
                        .and_then(|s| s.rate_window_seconds)
                        .unwrap_or(defaults.rate_window_seconds),
                    max_triggers: section
                        .and_then(|s| s.max_triggers)
                        .unwrap_or(defaults.max_triggers),
                },
            );
        }

        let combined: HashSet<String> = kbd_callbacks.intersection(&ptr_callbacks).cloned().collect();
        let keyboard_only: HashSet<String> = kbd_callbacks.difference(&combined).cloned().collect();
        let pointer_only: HashSet<String> = ptr_callbacks.difference(&combined).cloned().collect();

        Ok(ConfigBundle {
            keyboard_gestures,
            pointer_gestures,
            policies,
            worker_map: WorkerMap {
                keyboard_only,
                pointer_only,
                combined,
            },
        })
    }
}

fn parse_pointer_cond(value: &Value) -> Result<PointerCond, ConfigError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ConfigError::InvalidAxis("mouse condition is not an object".to_string()))?;

    for key in obj.keys() {
        if !ALLOWED_MOUSE_COND_FIELDS.contains(&key.as_str()) {
            return Err(ConfigError::UnknownMouseField {
                field: key.clone(),
            });
        }
    }

    let axis_str = obj
        .get("axis")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::InvalidAxis("missing".to_string()))?;
    let axis = match axis_str {
        "x" => Axis::X,
        "y" => Axis::Y,
        other => return Err(ConfigError::InvalidAxis(other.to_string())),
    };

    let trend_str = obj
        .get("trend")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::InvalidTrend("missing".to_string()))?;
    let trend = match trend_str {
        "left" => Trend::Left,
        "right" => Trend::Right,
        "up" => Trend::Up,
        "down" => Trend::Down,
        other => return Err(ConfigError::InvalidTrend(other.to_string())),
    };

    let min_delta = obj
        .get("min_delta")
        .and_then(Value::as_u64)
        .ok_or_else(|| ConfigError::InvalidAxis("missing min_delta".to_string()))? as u32;

    PointerCond::new(axis, trend, min_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keyboard_and_mouse_and_policy() {
        let json = r#"
        [
            {
                "callback": "exit",
                "keyboard": {"conditions": ["esc"]},
                "policy": {"cooldown_seconds": 1.0, "max_triggers": 1, "rate_window_seconds": 5.0}
            }
        ]
        "#;
        let bundle = ConfigParser::parse_str(json).unwrap();
        assert_eq!(bundle.keyboard_gestures.len(), 1);
        assert!(bundle.worker_map.keyboard_only.contains("exit"));
        assert_eq!(bundle.policies["exit"].cooldown_seconds, 1.0);
    }

    #[test]
    fn combined_callback_appears_in_both_sections() {
        let json = r#"
        [
            {
                "callback": "c",
                "keyboard": {"conditions": ["ctrl"]},
                "mouse": {"conditions": [{"axis": "y", "trend": "down", "min_delta": 20}]}
            }
        ]
        "#;
        let bundle = ConfigParser::parse_str(json).unwrap();
        assert!(bundle.worker_map.combined.contains("c"));
        assert!(!bundle.worker_map.keyboard_only.contains("c"));
        assert!(!bundle.worker_map.pointer_only.contains("c"));
    }

    #[test]
    fn policy_defaults_fill_missing_fields() {
        let json = r#"
        [
            {"callback": "x", "keyboard": {"conditions": ["a"]}, "policy": {}}
        ]
        "#;
        let bundle = ConfigParser::parse_str(json).unwrap();
        let policy = bundle.policies["x"];
        assert_eq!(policy.cooldown_seconds, 0.0);
        assert_eq!(policy.rate_window_seconds, 1.0);
        assert_eq!(policy.max_triggers, 1);
    }

    #[test]
    fn callback_without_policy_section_still_gets_a_default_policy() {
        let json = r#"
        [
            {"callback": "x", "keyboard": {"conditions": ["a"]}}
        ]
        "#;
        let bundle = ConfigParser::parse_str(json).unwrap();
        let policy = bundle.policies["x"];
        assert_eq!(policy.cooldown_seconds, 0.0);
        assert_eq!(policy.rate_window_seconds, 1.0);
        assert_eq!(policy.max_triggers, 1);
    }

    #[test]
    fn rejects_unknown_mouse_field() {
        let json = r#"
        [
            {"callback": "x", "mouse": {"conditions": [{"axis": "y", "trend": "up", "min_delta": 10, "bogus": 1}]}}
        ]
        "#;
        let err = ConfigParser::parse_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMouseField { .. }));
    }

    #[test]
    fn rejects_axis_trend_mismatch() {
        let json = r#"
        [
            {"callback": "x", "mouse": {"conditions": [{"axis": "x", "trend": "up", "min_delta": 10}]}}
        ]
        "#;
        let err = ConfigParser::parse_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAxisTrend { .. }));
    }

    #[test]
    fn empty_conditions_on_one_modality_is_a_noop_for_that_modality() {
        let json = r#"
        [
            {"callback": "x", "keyboard": {"conditions": []}, "mouse": {"conditions": [{"axis": "x", "trend": "left", "min_delta": 10}]}}
        ]
        "#;
        let bundle = ConfigParser::parse_str(json).unwrap();
        assert!(bundle.keyboard_gestures.is_empty());
        assert_eq!(bundle.pointer_gestures.len(), 1);
        assert!(bundle.worker_map.pointer_only.contains("x"));
    }
}
