//! Keyboard and pointer state, captured once per frame.
//!
//! Window events are folded into an [`InputCollector`]; at the start of each
//! frame the collector hands out an [`InputState`] value which the simulation
//! reads. Nothing here is global.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    ToggleView,
    ToggleRays,
    Quit,
}

impl Key {
    pub fn from_code(code: KeyCode) -> Option<Key> {
        Some(match code {
            KeyCode::KeyW => Key::Forward,
            KeyCode::KeyS => Key::Back,
            KeyCode::KeyA => Key::StrafeLeft,
            KeyCode::KeyD => Key::StrafeRight,
            KeyCode::ArrowLeft | KeyCode::KeyQ => Key::TurnLeft,
            KeyCode::ArrowRight | KeyCode::KeyE => Key::TurnRight,
            KeyCode::Digit1 => Key::ToggleView,
            KeyCode::Digit2 => Key::ToggleRays,
            KeyCode::Escape | KeyCode::Comma => Key::Quit,
            _ => return None,
        })
    }
}

/// Input for a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    /// Keys currently down.
    pub held: HashSet<Key>,
    /// Keys that went down since the previous frame.
    pub pressed: HashSet<Key>,
    /// Keys that went up since the previous frame.
    pub released: HashSet<Key>,
    /// `None` while the pointer is outside the window.
    pub pointer: Option<Point>,
    pub quit_requested: bool,
}

impl InputState {
    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    #[inline]
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// State with the given keys held (and not newly pressed).
    pub fn holding(keys: &[Key]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// State with the given keys newly pressed.
    pub fn pressing(keys: &[Key]) -> Self {
        let keys: HashSet<Key> = keys.iter().copied().collect();
        Self {
            held: keys.clone(),
            pressed: keys,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct InputCollector {
    state: InputState,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one window event into the running state.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.state.quit_requested = true,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if let Some(key) = Key::from_code(*code) {
                    self.key(key, *state, *repeat);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.pointer = Some(Point::new(position.x, position.y));
            }
            WindowEvent::CursorLeft { .. } => self.state.pointer = None,
            WindowEvent::Focused(false) => {
                // keys released while unfocused never reach us
                self.state.held.clear();
            }
            _ => {}
        }
    }

    fn key(&mut self, key: Key, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if !repeat && self.state.held.insert(key) {
                    self.state.pressed.insert(key);
                }
                if key == Key::Quit {
                    self.state.quit_requested = true;
                }
            }
            ElementState::Released => {
                if self.state.held.remove(&key) {
                    self.state.released.insert(key);
                }
            }
        }
    }

    /// Snapshot for this frame; clears the per-frame press/release sets.
    pub fn take_frame(&mut self) -> InputState {
        let frame = self.state.clone();
        self.state.pressed.clear();
        self.state.released.clear();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_edges_last_one_frame() {
        let mut input = InputCollector::new();
        input.key(Key::ToggleView, ElementState::Pressed, false);
        let first = input.take_frame();
        assert!(first.was_pressed(Key::ToggleView));
        assert!(first.is_held(Key::ToggleView));

        let second = input.take_frame();
        assert!(!second.was_pressed(Key::ToggleView));
        assert!(second.is_held(Key::ToggleView));

        input.key(Key::ToggleView, ElementState::Released, false);
        let third = input.take_frame();
        assert!(third.released.contains(&Key::ToggleView));
        assert!(!third.is_held(Key::ToggleView));
    }

    #[test]
    fn auto_repeat_is_not_a_new_press() {
        let mut input = InputCollector::new();
        input.key(Key::Forward, ElementState::Pressed, false);
        input.take_frame();
        input.key(Key::Forward, ElementState::Pressed, true);
        assert!(!input.take_frame().was_pressed(Key::Forward));
    }

    #[test]
    fn quit_key_requests_quit() {
        let mut input = InputCollector::new();
        assert!(!input.take_frame().quit_requested);
        input.key(Key::Quit, ElementState::Pressed, false);
        assert!(input.take_frame().quit_requested);
    }

    #[test]
    fn bindings() {
        assert_eq!(Key::from_code(KeyCode::KeyW), Some(Key::Forward));
        assert_eq!(Key::from_code(KeyCode::ArrowLeft), Some(Key::TurnLeft));
        assert_eq!(Key::from_code(KeyCode::Comma), Some(Key::Quit));
        assert_eq!(Key::from_code(KeyCode::KeyZ), None);
    }
}
