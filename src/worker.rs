//! Single-consumer coordinator: fuses keyboard and pointer trigger batches,
//! resolves combined gestures within a sliding window, and routes surviving
//! triggers through the policy engine.

use std::collections::HashMap;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::model::{ActionEvent, TriggerEvent, TriggerSource, WorkerMap};
use crate::policy::PolicyEngine;

const QUEUE_CAPACITY: usize = 1024;
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

struct CombinedState {
    recent_kbd: HashMap<String, f64>,
    recent_ptr: HashMap<String, f64>,
}

impl CombinedState {
    fn new() -> Self {
        Self {
            recent_kbd: HashMap::new(),
            recent_ptr: HashMap::new(),
        }
    }
}

/// Owns the trigger queue and the thread that consumes it. Handlers submit
/// batches; nothing else touches the queue.
pub struct Worker {
    sender: Sender<TriggerEvent>,
    handle: Option<JoinHandle<()>>,
    now: Arc<dyn Fn() -> f64 + Send + Sync>,
    running: Arc<AtomicBool>,
}

impl Worker {
    /// Spawn the consumer thread immediately; the worker is running as soon
    /// as this returns.
    pub fn start(
        worker_map: WorkerMap,
        mut policy: PolicyEngine,
        combined_window_s: f64,
        action_sink: impl Fn(ActionEvent) + Send + Sync + 'static,
        now: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> Self {
        let (sender, receiver): (Sender<TriggerEvent>, Receiver<TriggerEvent>) =
            bounded(QUEUE_CAPACITY);
        let now = Arc::new(now);
        let running = Arc::new(AtomicBool::new(true));

        let handle = std::thread::spawn(move || {
            let mut combined = CombinedState::new();
            loop {
                let ev = match receiver.recv() {
                    Ok(ev) => ev,
                    Err(_) => break, // all senders dropped, nothing left to do
                };
                if ev.source == TriggerSource::Stop {
                    break;
                }

                let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                    handle_trigger(&ev, &worker_map, &mut combined, &mut policy, &action_sink, combined_window_s);
                }));
                if let Err(payload) = result {
                    log::error!(target: "gestura::worker", "trigger handler panicked: {}", panic_message(payload.as_ref()));
                }
            }
        });

        Self {
            sender,
            handle: Some(handle),
            now,
            running,
        }
    }

    /// Enqueue a batch of keyboard-sourced callbacks, all stamped with a
    /// single `now()` call so they share exactly one timestamp.
    pub fn submit_keyboard_triggers(&self, callbacks: Vec<String>) {
        self.submit(callbacks, TriggerSource::Keyboard);
    }

    /// Enqueue a batch of pointer-sourced callbacks.
    pub fn submit_pointer_triggers(&self, callbacks: Vec<String>) {
        self.submit(callbacks, TriggerSource::Pointer);
    }

    fn submit(&self, callbacks: Vec<String>, source: TriggerSource) {
        if callbacks.is_empty() || !self.running.load(Ordering::SeqCst) {
            return;
        }
        let timestamp = (self.now)();
        for callback in callbacks {
            let _ = self.sender.send(TriggerEvent {
                source,
                callback,
                timestamp,
            });
        }
    }

    /// Stop the consumer: enqueue the sentinel, then join with a 1-second
    /// deadline. If the thread hasn't finished by then, it is left detached
    /// and a warning is logged.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.sender.send(TriggerEvent {
            source: TriggerSource::Stop,
            callback: String::new(),
            timestamp: (self.now)(),
        });

        if let Some(handle) = self.handle.take() {
            let (done_tx, done_rx) = bounded::<()>(1);
            std::thread::spawn(move || {
                let _ = handle.join();
                let _ = done_tx.send(());
            });
            if done_rx.recv_timeout(JOIN_TIMEOUT).is_err() {
                log::warn!(target: "gestura::worker", "worker thread did not shut down within the deadline");
            }
        }
    }
}

fn handle_trigger(
    ev: &TriggerEvent,
    worker_map: &WorkerMap,
    combined: &mut CombinedState,
    policy: &mut PolicyEngine,
    action_sink: &(dyn Fn(ActionEvent) + Send + Sync),
    combined_window_s: f64,
) {
    if worker_map.keyboard_only.contains(&ev.callback) {
        if ev.source == TriggerSource::Keyboard {
            evaluate_and_publish(ev, policy, action_sink);
        }
    } else if worker_map.pointer_only.contains(&ev.callback) {
        if ev.source == TriggerSource::Pointer {
            evaluate_and_publish(ev, policy, action_sink);
        }
    } else if worker_map.combined.contains(&ev.callback) {
        handle_combined(ev, combined, policy, action_sink, combined_window_s);
    }
}

fn handle_combined(
    ev: &TriggerEvent,
    combined: &mut CombinedState,
    policy: &mut PolicyEngine,
    action_sink: &(dyn Fn(ActionEvent) + Send + Sync),
    combined_window_s: f64,
) {
    let cutoff = ev.timestamp - combined_window_s;
    combined.recent_kbd.retain(|_, t| *t >= cutoff);
    combined.recent_ptr.retain(|_, t| *t >= cutoff);

    let (own, other) = match ev.source {
        TriggerSource::Keyboard => (&mut combined.recent_kbd, &mut combined.recent_ptr),
        TriggerSource::Pointer => (&mut combined.recent_ptr, &mut combined.recent_kbd),
        TriggerSource::Stop => return,
    };

    if other.remove(&ev.callback).is_some() {
        own.remove(&ev.callback);
        evaluate_and_publish(ev, policy, action_sink);
    } else {
        own.insert(ev.callback.clone(), ev.timestamp);
    }
}

fn evaluate_and_publish(
    ev: &TriggerEvent,
    policy: &mut PolicyEngine,
    action_sink: &(dyn Fn(ActionEvent) + Send + Sync),
) {
    if policy.evaluate(ev) {
        action_sink(ActionEvent {
            callback: ev.callback.clone(),
            triggered_at: ev.timestamp,
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn worker_map_combined(callback: &str) -> WorkerMap {
        let mut combined = std::collections::HashSet::new();
        combined.insert(callback.to_string());
        WorkerMap {
            keyboard_only: Default::default(),
            pointer_only: Default::default(),
            combined,
        }
    }

    fn sink() -> (Arc<Mutex<Vec<ActionEvent>>>, impl Fn(ActionEvent) + Send + Sync) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events2 = events.clone();
        (events, move |ev: ActionEvent| events2.lock().unwrap().push(ev))
    }

    #[test]
    fn keyboard_only_callback_ignores_pointer_source() {
        let mut keyboard_only = std::collections::HashSet::new();
        keyboard_only.insert("exit".to_string());
        let worker_map = WorkerMap {
            keyboard_only,
            pointer_only: Default::default(),
            combined: Default::default(),
        };
        let (events, sink_fn) = sink();
        let mut worker = Worker::start(worker_map, PolicyEngine::new(HashMap::new()), 4.0, sink_fn, || 0.0);
        worker.submit_pointer_triggers(vec!["exit".to_string()]);
        worker.submit_keyboard_triggers(vec!["exit".to_string()]);
        worker.stop();
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn combined_callback_requires_both_sources_within_window() {
        let worker_map = worker_map_combined("c");
        let (events, sink_fn) = sink();
        let mut worker = Worker::start(worker_map, PolicyEngine::new(HashMap::new()), 4.0, sink_fn, || 0.0);
        worker.submit_keyboard_triggers(vec!["c".to_string()]);
        worker.submit_pointer_triggers(vec!["c".to_string()]);
        worker.stop();
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].callback, "c");
    }

    #[test]
    fn double_stop_is_a_noop() {
        let worker_map = worker_map_combined("c");
        let (_events, sink_fn) = sink();
        let mut worker = Worker::start(worker_map, PolicyEngine::new(HashMap::new()), 4.0, sink_fn, || 0.0);
        worker.stop();
        worker.stop();
    }
}
