//! Keyboard-as-controller mapping.
//!
//! On desktop the keyboard drives the same focus and action machinery as a
//! gamepad.  Key-state changes arrive as push events; [`KeyboardController`]
//! remembers which keys are down and ORs the mapped buttons into each
//! frame's [`ControllerSnapshot`].

pub mod keycode;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub use keycode::KeyCode;

use crate::domain::input::{ControllerButton, ControllerSnapshot, KeyState};

/// One `key → button` pair, as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub button: ControllerButton,
}

impl KeyBinding {
    pub const fn new(key: KeyCode, button: ControllerButton) -> Self {
        Self { key, button }
    }
}

/// Built-in bindings used when configuration provides none.
pub const DEFAULT_BINDINGS: &[KeyBinding] = &[
    KeyBinding::new(KeyCode::ArrowUp, ControllerButton::Up),
    KeyBinding::new(KeyCode::ArrowRight, ControllerButton::Right),
    KeyBinding::new(KeyCode::ArrowDown, ControllerButton::Down),
    KeyBinding::new(KeyCode::ArrowLeft, ControllerButton::Left),
    KeyBinding::new(KeyCode::Enter, ControllerButton::A),
    KeyBinding::new(KeyCode::Escape, ControllerButton::B),
    KeyBinding::new(KeyCode::Backspace, ControllerButton::B),
    KeyBinding::new(KeyCode::Space, ControllerButton::X),
    KeyBinding::new(KeyCode::Tab, ControllerButton::Y),
    KeyBinding::new(KeyCode::KeyQ, ControllerButton::LB),
    KeyBinding::new(KeyCode::KeyE, ControllerButton::RB),
    KeyBinding::new(KeyCode::F1, ControllerButton::Start),
    KeyBinding::new(KeyCode::F2, ControllerButton::Back),
];

/// Lookup table from keys to controller buttons.  Several keys may map to the
/// same button; a key maps to at most one button (the first binding wins).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardMapping {
    bindings: Vec<KeyBinding>,
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self { bindings: DEFAULT_BINDINGS.to_vec() }
    }
}

impl KeyboardMapping {
    /// Builds a mapping from configured bindings; an empty list yields the
    /// built-in defaults.
    pub fn from_bindings(bindings: &[KeyBinding]) -> Self {
        if bindings.is_empty() {
            return Self::default();
        }
        Self { bindings: bindings.to_vec() }
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    pub fn button_for(&self, key: KeyCode) -> Option<ControllerButton> {
        self.bindings.iter().find(|b| b.key == key).map(|b| b.button)
    }
}

/// Tracks held keys and projects them onto controller buttons.
#[derive(Debug, Default)]
pub struct KeyboardController {
    mapping: KeyboardMapping,
    held: HashSet<KeyCode>,
}

impl KeyboardController {
    pub fn new(mapping: KeyboardMapping) -> Self {
        Self { mapping, held: HashSet::new() }
    }

    pub fn mapping(&self) -> &KeyboardMapping {
        &self.mapping
    }

    /// Records a key-state change pushed by the keyboard stream.
    pub fn apply(&mut self, state: KeyState) {
        if state.pressed {
            self.held.insert(state.key);
        } else {
            self.held.remove(&state.key);
        }
        trace!(key = ?state.key, pressed = state.pressed, "key state");
    }

    /// Presses every button whose key is held.  Buttons already pressed by the
    /// gamepad stay pressed.
    pub fn merge_into(&self, snapshot: &mut ControllerSnapshot) {
        for key in &self.held {
            if let Some(button) = self.mapping.button_for(*key) {
                snapshot.set_pressed(button, true);
            }
        }
    }

    /// Forgets every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
