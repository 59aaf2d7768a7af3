//! Platform-neutral input model.
//!
//! Platform drivers fill the *raw* types ([`ControllerSnapshot`],
//! [`RawTouchSample`], [`RawMouseSample`]) once per frame.  The transition
//! computer in [`super::transition`] turns raw samples into the *derived*
//! types ([`TouchState`], [`MouseState`]) that carry an edge-triggered
//! [`TouchPhase`].
//!
//! # Why abstract buttons? (for beginners)
//!
//! Every controller reports buttons with its own native codes.  The core only
//! ever sees [`ControllerButton`], a closed enumeration named after a generic
//! Xbox-style gamepad.  Triggers and the D-pad are modelled as buttons for
//! simplicity; the `Nav*` buttons are the "any direction" union of D-pad and
//! left stick that focus navigation listens to.

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use super::view::ViewId;
use crate::keymap::KeyCode;

/// Abstract controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ControllerButton {
    LT,
    LB,
    LSB,
    Up,
    Right,
    Down,
    Left,
    Back,
    Guide,
    Start,
    RSB,
    Y,
    B,
    A,
    X,
    RB,
    RT,
    NavUp,
    NavRight,
    NavDown,
    NavLeft,
}

impl ControllerButton {
    /// Number of distinct buttons.
    pub const COUNT: usize = 21;

    /// Every button, in declaration order.
    pub const ALL: [ControllerButton; Self::COUNT] = [
        ControllerButton::LT,
        ControllerButton::LB,
        ControllerButton::LSB,
        ControllerButton::Up,
        ControllerButton::Right,
        ControllerButton::Down,
        ControllerButton::Left,
        ControllerButton::Back,
        ControllerButton::Guide,
        ControllerButton::Start,
        ControllerButton::RSB,
        ControllerButton::Y,
        ControllerButton::B,
        ControllerButton::A,
        ControllerButton::X,
        ControllerButton::RB,
        ControllerButton::RT,
        ControllerButton::NavUp,
        ControllerButton::NavRight,
        ControllerButton::NavDown,
        ControllerButton::NavLeft,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for the four `Nav*` buttons.
    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            ControllerButton::NavUp
                | ControllerButton::NavRight
                | ControllerButton::NavDown
                | ControllerButton::NavLeft
        )
    }
}

/// Abstract analog axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl ControllerAxis {
    pub const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }
}

/// State of the controller (a gamepad, or a keyboard mapped onto one) in one frame.
///
/// A missing device is represented by [`ControllerSnapshot::default`]: nothing
/// pressed, every axis centred.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerSnapshot {
    buttons: [bool; ControllerButton::COUNT],
    axes: [f32; ControllerAxis::COUNT],
}

impl ControllerSnapshot {
    pub fn is_pressed(&self, button: ControllerButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn set_pressed(&mut self, button: ControllerButton, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    /// Returns the axis value, clamped to [-1, 1].
    pub fn axis(&self, axis: ControllerAxis) -> f32 {
        self.axes[axis.index()]
    }

    pub fn set_axis(&mut self, axis: ControllerAxis, value: f32) {
        self.axes[axis.index()] = value.clamp(-1.0, 1.0);
    }

    /// Buttons that are pressed in `self` but were not pressed in `previous`.
    pub fn newly_pressed<'a>(
        &'a self,
        previous: &'a ControllerSnapshot,
    ) -> impl Iterator<Item = ControllerButton> + 'a {
        ControllerButton::ALL
            .into_iter()
            .filter(move |b| self.is_pressed(*b) && !previous.is_pressed(*b))
    }

    /// Returns a copy with the `Nav*` buttons derived from the D-pad and the
    /// left stick (the stick counts once it passes `deadzone`).
    pub fn with_navigation(mut self, deadzone: f32) -> Self {
        let lx = self.axis(ControllerAxis::LeftX);
        let ly = self.axis(ControllerAxis::LeftY);
        let nav = [
            (ControllerButton::NavUp, ControllerButton::Up, ly <= -deadzone),
            (ControllerButton::NavRight, ControllerButton::Right, lx >= deadzone),
            (ControllerButton::NavDown, ControllerButton::Down, ly >= deadzone),
            (ControllerButton::NavLeft, ControllerButton::Left, lx <= -deadzone),
        ];
        for (nav_button, dpad, stick) in nav {
            let pressed = self.is_pressed(nav_button) || self.is_pressed(dpad) || stick;
            self.set_pressed(nav_button, pressed);
        }
        self
    }
}

/// Edge-triggered lifecycle stage of a touch or mouse-button contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TouchPhase {
    Start,
    Stay,
    End,
    #[default]
    None,
}

impl TouchPhase {
    /// `true` for `Start` and `Stay`.
    pub fn is_active(self) -> bool {
        matches!(self, TouchPhase::Start | TouchPhase::Stay)
    }
}

/// One physical contact as reported by the platform driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTouchSample {
    /// Small integer id, reused by the platform once the finger is released.
    pub finger_id: i32,
    pub pressed: bool,
    pub position: Point,
}

impl RawTouchSample {
    pub fn pressed(finger_id: i32, x: f32, y: f32) -> Self {
        Self { finger_id, pressed: true, position: Point::new(x, y) }
    }
}

/// A touch with its phase for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchState {
    pub finger_id: i32,
    pub phase: TouchPhase,
    pub position: Point,
    /// View that received the touch, assigned by hit-testing on `Start` and
    /// kept for the rest of the sequence.
    pub view: Option<ViewId>,
}

/// Mouse buttons that carry a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Raw mouse data for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawMouseSample {
    pub position: Point,
    /// Cursor movement since the previous poll.
    pub offset: Point,
    pub scroll: Point,
    pub left_button: bool,
    pub middle_button: bool,
    pub right_button: bool,
}

/// Mouse data with a phase per button.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseState {
    pub position: Point,
    pub offset: Point,
    pub scroll: Point,
    pub left_button: TouchPhase,
    pub middle_button: TouchPhase,
    pub right_button: TouchPhase,
    pub view: Option<ViewId>,
}

impl MouseState {
    pub fn phase(&self, button: MouseButton) -> TouchPhase {
        match button {
            MouseButton::Left => self.left_button,
            MouseButton::Middle => self.middle_button,
            MouseButton::Right => self.right_button,
        }
    }
}

/// Keyboard modifier bit flags attached to a [`KeyState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const SHIFT: u8 = 0x01;
    pub const CTRL: u8 = 0x02;
    pub const ALT: u8 = 0x04;
    pub const META: u8 = 0x08;

    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }
}

/// A keyboard key changing state, as pushed by the platform's keyboard stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    pub pressed: bool,
}
