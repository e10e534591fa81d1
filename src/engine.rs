//! The public facade: wires the keyboard and pointer handlers to the worker,
//! owns the OS listeners, and exposes the idempotent `start`/`stop` lifecycle
//! the embedder drives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock};
use std::time::Instant;

use crate::config::ConfigBundle;
use crate::keyboard::{self, KeyboardHandler, KeyboardMatcher};
use crate::listener::{
    KeyboardEventSink, Listener, PointerEventSink, RdevKeyboardListener, RdevPointerListener,
};
use crate::model::{ActionEvent, CallbackPolicy, WorkerMap};
use crate::policy::PolicyEngine;
use crate::pointer::{self, PointerHandler, PointerMatcher, PointerSegmenter};
use crate::worker::Worker;

/// Minimum total displacement, in pixels, for the segmenter to emit a
/// segment at all. Also doubles as the default jitter threshold.
pub const DEFAULT_SEGMENT_MIN_DELTA: u32 = 10;

/// Accept every pointer move sample by default (no downsampling).
pub const DEFAULT_SAMPLING_RATE: u32 = 1;

/// Default pairing window for combined keyboard+pointer gestures.
pub const DEFAULT_COMBINED_WINDOW_SECONDS: f64 = 4.0;

fn monotonic_seconds() -> f64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Installs a panic hook (once per process) that logs via `log::error!`
/// before deferring to whatever hook was previously registered. A listener
/// or sink callback panicking only unwinds its own OS thread, but without
/// this the diagnostic goes straight to stderr and bypasses the `log`
/// facade the rest of the crate uses.
fn install_panic_hook() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            log::error!(target: "gestura::engine", "thread panicked: {info}");
            previous(info);
        }));
    });
}

type KeyboardListenerFactory = Box<dyn Fn(KeyboardEventSink) -> Box<dyn Listener> + Send + Sync>;
type PointerListenerFactory = Box<dyn Fn(PointerEventSink) -> Box<dyn Listener> + Send + Sync>;

/// Owns every runtime piece of the engine: the handlers (touched only from
/// listener-callback threads), the worker (its own thread, started/stopped
/// with the facade), and the OS listeners. `start`/`stop` are idempotent —
/// calling either while already in the target state is a no-op.
pub struct Engine {
    keyboard_sink: KeyboardEventSink,
    pointer_sink: PointerEventSink,
    worker_map: WorkerMap,
    policies: HashMap<String, CallbackPolicy>,
    combined_window_s: f64,
    action_sink: Arc<dyn Fn(ActionEvent) + Send + Sync>,
    worker_slot: Arc<Mutex<Option<Worker>>>,
    keyboard_listener_factory: KeyboardListenerFactory,
    pointer_listener_factory: PointerListenerFactory,
    keyboard_listener: Mutex<Option<Box<dyn Listener>>>,
    pointer_listener: Mutex<Option<Box<dyn Listener>>>,
    running: AtomicBool,
}

impl Engine {
    /// Build an engine backed by the default `rdev` OS listeners.
    pub fn new(
        bundle: ConfigBundle,
        action_sink: impl Fn(ActionEvent) + Send + Sync + 'static,
    ) -> Self {
        Self::with_listeners(
            bundle,
            action_sink,
            |sink| Box::new(RdevKeyboardListener::new(sink)),
            |sink| Box::new(RdevPointerListener::new(sink)),
        )
    }

    /// Build an engine with injected listener factories — the seam tests use
    /// to replay synthetic input without touching the real OS input layer.
    pub fn with_listeners(
        bundle: ConfigBundle,
        action_sink: impl Fn(ActionEvent) + Send + Sync + 'static,
        keyboard_listener_factory: impl Fn(KeyboardEventSink) -> Box<dyn Listener> + Send + Sync + 'static,
        pointer_listener_factory: impl Fn(PointerEventSink) -> Box<dyn Listener> + Send + Sync + 'static,
    ) -> Self {
        install_panic_hook();

        let keyboard_matcher = KeyboardMatcher::new(bundle.keyboard_gestures);
        let segmenter = PointerSegmenter::new(DEFAULT_SEGMENT_MIN_DELTA);
        let pointer_matcher = PointerMatcher::new(bundle.pointer_gestures, segmenter);

        let keyboard_handler = Arc::new(Mutex::new(KeyboardHandler::new(
            keyboard::DEFAULT_WINDOW_SECONDS,
            keyboard_matcher,
            monotonic_seconds,
        )));
        let pointer_handler = Arc::new(Mutex::new(PointerHandler::new(
            pointer::DEFAULT_WINDOW_SECONDS,
            pointer_matcher,
            DEFAULT_SAMPLING_RATE,
            monotonic_seconds,
        )));

        let worker_slot: Arc<Mutex<Option<Worker>>> = Arc::new(Mutex::new(None));

        let kh = keyboard_handler.clone();
        let ws = worker_slot.clone();
        let keyboard_sink: KeyboardEventSink = Arc::new(move |raw| {
            let callbacks = kh.lock().unwrap().handle(raw);
            if callbacks.is_empty() {
                return;
            }
            if let Some(worker) = ws.lock().unwrap().as_ref() {
                worker.submit_keyboard_triggers(callbacks);
            }
        });

        let ph = pointer_handler.clone();
        let ws = worker_slot.clone();
        let pointer_sink: PointerEventSink = Arc::new(move |raw| {
            let callbacks = ph.lock().unwrap().handle(raw);
            if callbacks.is_empty() {
                return;
            }
            if let Some(worker) = ws.lock().unwrap().as_ref() {
                worker.submit_pointer_triggers(callbacks);
            }
        });

        Self {
            keyboard_sink,
            pointer_sink,
            worker_map: bundle.worker_map,
            policies: bundle.policies,
            combined_window_s: DEFAULT_COMBINED_WINDOW_SECONDS,
            action_sink: Arc::new(action_sink),
            worker_slot,
            keyboard_listener_factory: Box::new(keyboard_listener_factory),
            pointer_listener_factory: Box::new(pointer_listener_factory),
            keyboard_listener: Mutex::new(None),
            pointer_listener: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Start the worker, then the OS listeners. Returns `false` if the
    /// engine was already running.
    pub fn start(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }

        let action_sink = self.action_sink.clone();
        let worker = Worker::start(
            self.worker_map.clone(),
            PolicyEngine::new(self.policies.clone()),
            self.combined_window_s,
            move |ev| action_sink(ev),
            monotonic_seconds,
        );
        *self.worker_slot.lock().unwrap() = Some(worker);

        let mut keyboard_listener = (self.keyboard_listener_factory)(self.keyboard_sink.clone());
        if let Err(err) = keyboard_listener.start() {
            log::error!(target: "gestura::engine", "keyboard listener failed to start: {err}");
        }
        *self.keyboard_listener.lock().unwrap() = Some(keyboard_listener);

        let mut pointer_listener = (self.pointer_listener_factory)(self.pointer_sink.clone());
        if let Err(err) = pointer_listener.start() {
            log::error!(target: "gestura::engine", "pointer listener failed to start: {err}");
        }
        *self.pointer_listener.lock().unwrap() = Some(pointer_listener);

        true
    }

    /// Stop the OS listeners, then the worker. Returns `false` if the engine
    /// was already stopped.
    pub fn stop(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            return false;
        }

        if let Some(mut listener) = self.keyboard_listener.lock().unwrap().take() {
            listener.stop();
        }
        if let Some(mut listener) = self.pointer_listener.lock().unwrap().take() {
            listener.stop();
        }
        if let Some(mut worker) = self.worker_slot.lock().unwrap().take() {
            worker.stop();
        }

        true
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
