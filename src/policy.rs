//! Per-callback cooldown and sliding-window rate limiting, applied just
//! before a recognized trigger becomes an action event.

use std::collections::{HashMap, VecDeque};

use crate::model::{CallbackPolicy, TriggerEvent};

#[derive(Default)]
struct CallbackState {
    // `None` until the first accepted execution, so a callback's very first
    // trigger is never rejected by its own cooldown.
    last_executed_at: Option<f64>,
    history: VecDeque<f64>,
}

/// Holds the registered policies and the runtime state they accumulate.
/// State for a callback is created lazily, on its first accepted or rejected
/// evaluation — a callback with no registered policy never gets an entry.
pub struct PolicyEngine {
    policies: HashMap<String, CallbackPolicy>,
    state: HashMap<String, CallbackState>,
}

impl PolicyEngine {
    pub fn new(policies: HashMap<String, CallbackPolicy>) -> Self {
        Self {
            policies,
            state: HashMap::new(),
        }
    }

    /// Decide whether `ev` should be published as an action. A callback with
    /// no registered policy always passes and never accumulates state.
    pub fn evaluate(&mut self, ev: &TriggerEvent) -> bool {
        let Some(policy) = self.policies.get(&ev.callback).copied() else {
            return true;
        };

        let state = self.state.entry(ev.callback.clone()).or_default();

        if policy.cooldown_seconds > 0.0 {
            if let Some(last) = state.last_executed_at {
                if ev.timestamp - last < policy.cooldown_seconds {
                    return false;
                }
            }
        }

        let cutoff = ev.timestamp - policy.rate_window_seconds;
        while matches!(state.history.front(), Some(&t) if t < cutoff) {
            state.history.pop_front();
        }
        if state.history.len() as u32 >= policy.max_triggers {
            return false;
        }

        state.last_executed_at = Some(ev.timestamp);
        state.history.push_back(ev.timestamp);
        true
    }
}
