//! Scripted input source for tests and the headless demo.
//!
//! Replays a prepared list of [`ScriptedFrame`]s, one per call to
//! `runloop_start`, without any device or OS message loop.

use std::collections::VecDeque;

use inputkit_core::{
    ControllerAxis, ControllerButton, ControllerSnapshot, Event, KeyCode, KeyState, Modifiers, Point,
    RawMouseSample, RawTouchSample,
};

use super::InputSource;

/// Everything the backend reports during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedFrame {
    pub controller: ControllerSnapshot,
    pub touches: Vec<RawTouchSample>,
    pub mouse: RawMouseSample,
    /// Pushed on the keyboard stream when the frame starts.
    pub keys: Vec<KeyState>,
}

impl ScriptedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(mut self, button: ControllerButton) -> Self {
        self.controller.set_pressed(button, true);
        self
    }

    pub fn axis(mut self, axis: ControllerAxis, value: f32) -> Self {
        self.controller.set_axis(axis, value);
        self
    }

    pub fn touch(mut self, finger_id: i32, x: f32, y: f32) -> Self {
        self.touches.push(RawTouchSample::pressed(finger_id, x, y));
        self
    }

    pub fn mouse(mut self, mouse: RawMouseSample) -> Self {
        self.mouse = mouse;
        self
    }

    pub fn key(mut self, key: KeyCode, pressed: bool) -> Self {
        self.keys.push(KeyState { key, modifiers: Modifiers::default(), pressed });
        self
    }
}

/// A rumble request recorded by [`ScriptedInputSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleCommand {
    pub device: u16,
    pub low_frequency: u16,
    pub high_frequency: u16,
}

/// An [`InputSource`] that plays back a fixed script.
///
/// Once the script runs out every poll reports an idle device: nothing
/// pressed, no fingers, mouse at rest.
#[derive(Debug, Default)]
pub struct ScriptedInputSource {
    script: VecDeque<ScriptedFrame>,
    current: ScriptedFrame,
    frames_played: usize,
    rumble: Vec<RumbleCommand>,
    keyboard: Event<KeyState>,
    cursor: Event<Point>,
    scroll: Event<Point>,
}

impl ScriptedInputSource {
    pub fn new(frames: impl IntoIterator<Item = ScriptedFrame>) -> Self {
        Self { script: frames.into_iter().collect(), ..Self::default() }
    }

    /// Appends a frame to the end of the script.
    pub fn push_frame(&mut self, frame: ScriptedFrame) {
        self.script.push_back(frame);
    }

    /// Frames not yet played.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }

    pub fn frames_played(&self) -> usize {
        self.frames_played
    }

    /// Every rumble request received so far, oldest first.
    pub fn rumble_commands(&self) -> &[RumbleCommand] {
        &self.rumble
    }
}

impl InputSource for ScriptedInputSource {
    fn runloop_start(&mut self) {
        self.current = match self.script.pop_front() {
            Some(frame) => {
                self.frames_played += 1;
                frame
            }
            None => ScriptedFrame::default(),
        };

        for key in &self.current.keys {
            self.keyboard.fire(key);
        }
        if self.current.mouse.offset != Point::ZERO {
            self.cursor.fire(&self.current.mouse.offset);
        }
        if self.current.mouse.scroll != Point::ZERO {
            self.scroll.fire(&self.current.mouse.scroll);
        }
    }

    fn update_controller_state(&mut self) -> ControllerSnapshot {
        self.current.controller
    }

    fn update_touch_states(&mut self) -> Vec<RawTouchSample> {
        self.current.touches.clone()
    }

    fn update_mouse_state(&mut self) -> RawMouseSample {
        self.current.mouse
    }

    fn send_rumble(&mut self, device: u16, low_frequency: u16, high_frequency: u16) {
        self.rumble.push(RumbleCommand { device, low_frequency, high_frequency });
    }

    fn keyboard_events(&self) -> &Event<KeyState> {
        &self.keyboard
    }

    fn cursor_offset_events(&self) -> &Event<Point> {
        &self.cursor
    }

    fn scroll_offset_events(&self) -> &Event<Point> {
        &self.scroll
    }
}
