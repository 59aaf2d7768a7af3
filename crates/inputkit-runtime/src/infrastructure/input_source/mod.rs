//! Input source infrastructure for the runtime.
//!
//! A platform backend (gamepad driver, touch panel, window system) implements
//! [`InputSource`].  The frame processor polls it once per frame for
//! controller, touch and mouse data, and subscribes to its push streams for
//! keyboard and mouse offsets.
//!
//! # Polled vs pushed input (for beginners)
//!
//! Gamepads and touch panels are *polled*: the backend reports "what is held
//! right now" whenever it is asked, and the frame processor turns consecutive
//! answers into `Start` / `Stay` / `End` phases.  Keyboards and mouse wheels
//! are *pushed*: the backend fires an [`Event`] for every change, and whoever
//! cares subscribes.
//!
//! A missing device is never an error.  A backend with no gamepad attached
//! returns [`ControllerSnapshot::default`]; one with no touch panel returns an
//! empty sample list.
//!
//! # Testability
//!
//! [`mock::ScriptedInputSource`] replays a prepared list of frames so tests
//! and the headless binary can drive the runtime without hardware.

use inputkit_core::{ControllerSnapshot, Event, KeyState, Point, RawMouseSample, RawTouchSample};

pub mod mock;

/// Trait abstracting a platform input backend.
pub trait InputSource: Send {
    /// Called at the very start of each frame, before anything is polled.
    /// Backends that pump an OS message queue do it here.
    fn runloop_start(&mut self) {}

    /// Current gamepad state.
    fn update_controller_state(&mut self) -> ControllerSnapshot;

    /// Every finger currently on the panel.
    fn update_touch_states(&mut self) -> Vec<RawTouchSample>;

    fn update_mouse_state(&mut self) -> RawMouseSample;

    /// Drives the rumble motors of `device`.  Both intensities at 0 stop it.
    fn send_rumble(&mut self, device: u16, low_frequency: u16, high_frequency: u16);

    /// Key-state changes, pushed as they arrive.
    fn keyboard_events(&self) -> &Event<KeyState>;

    /// Relative cursor movement, pushed as it arrives.
    fn cursor_offset_events(&self) -> &Event<Point>;

    /// Scroll wheel movement, pushed as it arrives.
    fn scroll_offset_events(&self) -> &Event<Point>;
}
