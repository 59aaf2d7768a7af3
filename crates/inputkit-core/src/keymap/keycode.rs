//! Keyboard key identifiers.
//!
//! Keys are identified by their USB HID usage id (keyboard page 0x07), i.e.
//! by physical position rather than by the character they produce.  Desktop
//! drivers translate their native codes to HID before pushing a
//! [`KeyState`](crate::domain::input::KeyState) into the keyboard stream.
//!
//! Only keys a controller mapping can reasonably use are listed; anything
//! else arrives as [`KeyCode::Unknown`] and is ignored by the mapping.

use serde::{Deserialize, Serialize};

/// Physical keyboard key, valued by its HID usage id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeyCode {
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,

    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,

    PageUp = 0x4B,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,

    /// Any key without a variant above.
    Unknown = 0x0000,
}

impl KeyCode {
    /// Converts a raw HID usage id.  Unlisted values become [`KeyCode::Unknown`].
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x04 => KeyCode::KeyA,
            0x05 => KeyCode::KeyB,
            0x06 => KeyCode::KeyC,
            0x07 => KeyCode::KeyD,
            0x08 => KeyCode::KeyE,
            0x09 => KeyCode::KeyF,
            0x0A => KeyCode::KeyG,
            0x0B => KeyCode::KeyH,
            0x0C => KeyCode::KeyI,
            0x0D => KeyCode::KeyJ,
            0x0E => KeyCode::KeyK,
            0x0F => KeyCode::KeyL,
            0x10 => KeyCode::KeyM,
            0x11 => KeyCode::KeyN,
            0x12 => KeyCode::KeyO,
            0x13 => KeyCode::KeyP,
            0x14 => KeyCode::KeyQ,
            0x15 => KeyCode::KeyR,
            0x16 => KeyCode::KeyS,
            0x17 => KeyCode::KeyT,
            0x18 => KeyCode::KeyU,
            0x19 => KeyCode::KeyV,
            0x1A => KeyCode::KeyW,
            0x1B => KeyCode::KeyX,
            0x1C => KeyCode::KeyY,
            0x1D => KeyCode::KeyZ,
            0x28 => KeyCode::Enter,
            0x29 => KeyCode::Escape,
            0x2A => KeyCode::Backspace,
            0x2B => KeyCode::Tab,
            0x2C => KeyCode::Space,
            0x3A => KeyCode::F1,
            0x3B => KeyCode::F2,
            0x3C => KeyCode::F3,
            0x3D => KeyCode::F4,
            0x4B => KeyCode::PageUp,
            0x4E => KeyCode::PageDown,
            0x4F => KeyCode::ArrowRight,
            0x50 => KeyCode::ArrowLeft,
            0x51 => KeyCode::ArrowDown,
            0x52 => KeyCode::ArrowUp,
            0xE0 => KeyCode::ControlLeft,
            0xE1 => KeyCode::ShiftLeft,
            0xE2 => KeyCode::AltLeft,
            0xE3 => KeyCode::MetaLeft,
            0xE4 => KeyCode::ControlRight,
            0xE5 => KeyCode::ShiftRight,
            0xE6 => KeyCode::AltRight,
            0xE7 => KeyCode::MetaRight,
            _ => KeyCode::Unknown,
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` for Ctrl, Shift, Alt and Meta on either side.
    pub fn is_modifier(self) -> bool {
        (0xE0..=0xE7).contains(&self.as_u16())
    }
}
