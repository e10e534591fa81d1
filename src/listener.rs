//! The OS listener contract the facade depends on, plus a default
//! implementation backed by `rdev` for real keyboard/pointer capture.
//!
//! Tests and embedders that want to replay synthetic input inject their own
//! `Listener` via `Engine::with_listeners` instead of using these defaults.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::model::{Button, RawKeyEvent, RawPointerEvent};

pub type KeyboardEventSink = Arc<dyn Fn(RawKeyEvent) + Send + Sync>;
pub type PointerEventSink = Arc<dyn Fn(RawPointerEvent) + Send + Sync>;

/// Something that can be started and stopped, delivering normalized events
/// to the sink it was constructed with.
pub trait Listener: Send {
    fn start(&mut self) -> Result<(), String>;
    fn stop(&mut self);
}

/// Keyboard listener backed by `rdev::listen`. `rdev` hands the whole OS
/// input stream to one global callback; per-platform hooks generally can't
/// be torn down cleanly once installed, so `stop()` flips a flag the
/// callback checks rather than unwinding the OS-level hook.
pub struct RdevKeyboardListener {
    sink: KeyboardEventSink,
    running: Arc<AtomicBool>,
}

impl RdevKeyboardListener {
    pub fn new(sink: KeyboardEventSink) -> Self {
        Self {
            sink,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Listener for RdevKeyboardListener {
    fn start(&mut self) -> Result<(), String> {
        self.running.store(true, Ordering::SeqCst);
        let sink = self.sink.clone();
        let running = self.running.clone();
        std::thread::spawn(move || {
            let result = rdev::listen(move |event| {
                if !running.load(Ordering::SeqCst) {
                    return;
                }
                match event.event_type {
                    rdev::EventType::KeyPress(key) => {
                        sink(RawKeyEvent {
                            key: normalize_rdev_key(key),
                            pressed: true,
                        });
                    }
                    rdev::EventType::KeyRelease(key) => {
                        sink(RawKeyEvent {
                            key: normalize_rdev_key(key),
                            pressed: false,
                        });
                    }
                    _ => {}
                }
            });
            if let Err(err) = result {
                log::error!(target: "gestura::listener", "keyboard listener stopped: {err:?}");
            }
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Pointer listener backed by `rdev::listen`. Same start/stop caveat as
/// `RdevKeyboardListener`.
pub struct RdevPointerListener {
    sink: PointerEventSink,
    running: Arc<AtomicBool>,
}

impl RdevPointerListener {
    pub fn new(sink: PointerEventSink) -> Self {
        Self {
            sink,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Listener for RdevPointerListener {
    fn start(&mut self) -> Result<(), String> {
        self.running.store(true, Ordering::SeqCst);
        let sink = self.sink.clone();
        let running = self.running.clone();
        std::thread::spawn(move || {
            let result = rdev::listen(move |event| {
                if !running.load(Ordering::SeqCst) {
                    return;
                }
                match event.event_type {
                    rdev::EventType::MouseMove { x, y } => {
                        sink(RawPointerEvent::Move {
                            x: x as i32,
                            y: y as i32,
                        });
                    }
                    rdev::EventType::ButtonPress(button) => {
                        if let Some(button) = normalize_rdev_button(button) {
                            sink(RawPointerEvent::Click {
                                x: 0,
                                y: 0,
                                button,
                                pressed: true,
                            });
                        }
                    }
                    rdev::EventType::ButtonRelease(button) => {
                        if let Some(button) = normalize_rdev_button(button) {
                            sink(RawPointerEvent::Click {
                                x: 0,
                                y: 0,
                                button,
                                pressed: false,
                            });
                        }
                    }
                    _ => {}
                }
            });
            if let Err(err) = result {
                log::error!(target: "gestura::listener", "pointer listener stopped: {err:?}");
            }
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn normalize_rdev_key(key: rdev::Key) -> String {
    use rdev::Key;
    let named = match key {
        Key::KeyA => "a",
        Key::KeyB => "b",
        Key::KeyC => "c",
        Key::KeyD => "d",
        Key::KeyE => "e",
        Key::KeyF => "f",
        Key::KeyG => "g",
        Key::KeyH => "h",
        Key::KeyI => "i",
        Key::KeyJ => "j",
        Key::KeyK => "k",
        Key::KeyL => "l",
        Key::KeyM => "m",
        Key::KeyN => "n",
        Key::KeyO => "o",
        Key::KeyP => "p",
        Key::KeyQ => "q",
        Key::KeyR => "r",
        Key::KeyS => "s",
        Key::KeyT => "t",
        Key::KeyU => "u",
        Key::KeyV => "v",
        Key::KeyW => "w",
        Key::KeyX => "x",
        Key::KeyY => "y",
        Key::KeyZ => "z",
        Key::Num0 => "0",
        Key::Num1 => "1",
        Key::Num2 => "2",
        Key::Num3 => "3",
        Key::Num4 => "4",
        Key::Num5 => "5",
        Key::Num6 => "6",
        Key::Num7 => "7",
        Key::Num8 => "8",
        Key::Num9 => "9",
        Key::Space => "space",
        Key::Return => "enter",
        Key::Tab => "tab",
        Key::Escape => "esc",
        Key::Backspace => "backspace",
        Key::Delete => "delete",
        Key::UpArrow => "up",
        Key::DownArrow => "down",
        Key::LeftArrow => "left",
        Key::RightArrow => "right",
        Key::ControlLeft | Key::ControlRight => "ctrl",
        Key::ShiftLeft | Key::ShiftRight => "shift",
        Key::Alt | Key::AltGr => "alt",
        Key::MetaLeft | Key::MetaRight => "cmd",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        other => return format!("{other:?}").to_lowercase(),
    };
    named.to_string()
}

fn normalize_rdev_button(button: rdev::Button) -> Option<Button> {
    match button {
        rdev::Button::Left => Some(Button::Left),
        rdev::Button::Right => Some(Button::Right),
        rdev::Button::Middle => Some(Button::Middle),
        rdev::Button::Unknown(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingListener {
        events: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Listener for RecordingListener {
        fn start(&mut self) -> Result<(), String> {
            self.events.lock().unwrap().push("start");
            Ok(())
        }
        fn stop(&mut self) {
            self.events.lock().unwrap().push("stop");
        }
    }

    #[test]
    fn fake_listener_records_lifecycle_calls() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut listener = RecordingListener {
            events: events.clone(),
        };
        listener.start().unwrap();
        listener.stop();
        assert_eq!(*events.lock().unwrap(), vec!["start", "stop"]);
    }
}
