//! Gesture-recognition engine: turns raw keyboard and pointer input streams
//! into high-level action events.
//!
//! An embedder builds a [`config::ConfigBundle`] from a JSON configuration
//! (via [`config::ConfigParser`]), wraps it in an [`engine::Engine`] together
//! with an action sink, and drives the lifecycle with `start`/`stop`. Real OS
//! capture is backed by `rdev` by default; [`Engine::with_listeners`] is the
//! seam tests and alternative embedders use to inject their own input
//! source.
//!
//! [`Engine::with_listeners`]: engine::Engine::with_listeners

pub mod action_bus;
pub mod buffer;
pub mod config;
pub mod define;
pub mod engine;
pub mod keyboard;
pub mod listener;
pub mod model;
pub mod policy;
pub mod pointer;
pub mod worker;

pub use action_bus::ActionBus;
pub use config::{ConfigBundle, ConfigError, ConfigParser, GestureRecord};
pub use define::ShortcutDef;
pub use engine::Engine;
pub use listener::{KeyboardEventSink, Listener, PointerEventSink};
pub use model::{
    ActionEvent, Axis, Button, CallbackPolicy, KeyboardGestureDef, PointerCond,
    PointerGestureDef, RawKeyEvent, RawPointerEvent, Trend, WorkerMap,
};
