//! Edge detection: raw per-poll samples → phase-tagged per-frame states.
//!
//! The two `compute_*` functions are pure: they look only at this frame's raw
//! sample and last frame's derived state.  [`TouchTracker`] and
//! [`MouseTracker`] hold the "last frame" half between calls so the frame loop
//! does not have to.
//!
//! # Phase rules
//!
//! | last phase        | pressed now | phase now |
//! |-------------------|-------------|-----------|
//! | `None` / `End`    | yes         | `Start`   |
//! | `Start` / `Stay`  | yes         | `Stay`    |
//! | `Start` / `Stay`  | no / absent | `End`     |
//! | `None` / `End`    | no / absent | `None`    |
//!
//! A finger that ends is delivered once with `End` (keeping the view it was
//! bound to) and then forgotten, so the same id coming back later starts a
//! brand-new sequence.

use tracing::trace;

use super::geometry::Point;
use super::input::{MouseState, RawMouseSample, RawTouchSample, TouchPhase, TouchState};
use super::view::ViewId;

/// Computes the phase of a contact from its previous phase and whether it is
/// pressed in this frame.
pub fn compute_button_phase(last: TouchPhase, pressed: bool) -> TouchPhase {
    match (last.is_active(), pressed) {
        (true, true) => TouchPhase::Stay,
        (false, true) => TouchPhase::Start,
        (true, false) => TouchPhase::End,
        (false, false) => TouchPhase::None,
    }
}

/// Computes this frame's [`TouchState`] for one finger.
///
/// `last` is the finger's state in the previous frame, or
/// `TouchState::default()` when the finger was not tracked.  The owning view
/// is copied from `last`; binding a new view on `Start` is the caller's job.
pub fn compute_touch_state(current: &RawTouchSample, last: &TouchState) -> TouchState {
    TouchState {
        finger_id: current.finger_id,
        phase: compute_button_phase(last.phase, current.pressed),
        position: current.position,
        view: last.view,
    }
}

/// Computes this frame's [`MouseState`], one phase per button.
pub fn compute_mouse_state(current: &RawMouseSample, last: &MouseState) -> MouseState {
    MouseState {
        position: current.position,
        offset: current.offset,
        scroll: current.scroll,
        left_button: compute_button_phase(last.left_button, current.left_button),
        middle_button: compute_button_phase(last.middle_button, current.middle_button),
        right_button: compute_button_phase(last.right_button, current.right_button),
        view: last.view,
    }
}

/// Tracks active fingers across frames.
#[derive(Debug, Default)]
pub struct TouchTracker {
    /// Fingers that were in `Start` or `Stay` last frame.
    active: Vec<TouchState>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fingers currently down.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Derives this frame's touch states from the raw samples.
    ///
    /// `hit_test` is called once per new finger (`Start`) to bind it to a
    /// view.  Fingers that disappeared since last frame are reported with
    /// `End` at their last known position.
    ///
    /// Only the first sample for a given finger id is used; duplicates in the
    /// same frame are ignored.
    pub fn update<F>(&mut self, raw: &[RawTouchSample], mut hit_test: F) -> Vec<TouchState>
    where
        F: FnMut(Point) -> Option<ViewId>,
    {
        let mut frame: Vec<TouchState> = Vec::with_capacity(raw.len() + self.active.len());

        for sample in raw {
            if frame.iter().any(|t| t.finger_id == sample.finger_id) {
                trace!(finger_id = sample.finger_id, "duplicate touch sample ignored");
                continue;
            }
            let last = self
                .active
                .iter()
                .find(|t| t.finger_id == sample.finger_id)
                .copied()
                .unwrap_or_default();
            let mut state = compute_touch_state(sample, &last);
            if state.phase == TouchPhase::Start {
                state.view = hit_test(state.position);
            }
            if state.phase != TouchPhase::None {
                frame.push(state);
            }
        }

        // Fingers the platform stopped reporting are released.
        for last in &self.active {
            if !frame.iter().any(|t| t.finger_id == last.finger_id) {
                frame.push(TouchState { phase: TouchPhase::End, ..*last });
            }
        }

        self.active = frame.iter().filter(|t| t.phase.is_active()).copied().collect();
        frame
    }

    /// Forgets every tracked finger without reporting `End`.
    pub fn reset(&mut self) {
        self.active.clear();
    }
}

/// Tracks mouse button phases across frames.
#[derive(Debug, Default)]
pub struct MouseTracker {
    last: MouseState,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> &MouseState {
        &self.last
    }

    /// Derives this frame's mouse state.
    ///
    /// While the left button is held (or on its release frame) the view bound
    /// at press time is kept; otherwise the view under the cursor is resolved
    /// with `hit_test`.
    pub fn update<F>(&mut self, raw: &RawMouseSample, mut hit_test: F) -> MouseState
    where
        F: FnMut(Point) -> Option<ViewId>,
    {
        let mut state = compute_mouse_state(raw, &self.last);
        if !matches!(state.left_button, TouchPhase::Stay | TouchPhase::End) {
            state.view = hit_test(state.position);
        }
        self.last = state;
        state
    }
}
