//! Gesture recognizers and the state machine they share.
//!
//! A recognizer watches the pointer events aimed at its view and decides
//! whether a gesture (tap, pan, ...) is happening.  Several recognizers can
//! watch the same touch (a cell's tap and its scrolling list's pan), so the
//! [`arbiter`] makes sure only one of them ends up owning each sequence.
//!
//! # State machine (for beginners)
//!
//! ```text
//!              ┌──────────► Failed
//!              │
//! (new touch) Unsure ──► Start ──► Stay ──► End
//!              │           │        │
//!              └───────────┴────────┴─────► Interrupted
//! ```
//!
//! `End`, `Failed` and `Interrupted` are terminal until the next sequence.
//! A recognizer that reports an edge outside this graph has a bug: debug
//! builds panic, release builds log it and treat the recognizer as `Failed`.

pub mod arbiter;
pub mod pan;
pub mod tap;

use std::fmt;
use std::time::Duration;

use tracing::error;

use crate::domain::geometry::{Point, Rect};
use crate::domain::input::TouchPhase;

pub use arbiter::{ArbitrationOutcome, GestureArbiter, RecognizerRef};
pub use pan::{PanAxis, PanEvent, PanGestureRecognizer};
pub use tap::{TapEvent, TapGestureRecognizer};

/// Recognition state of a gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Forcibly ended; no callbacks will come.
    Interrupted,
    /// Watching the sequence, not yet sure it is this gesture.
    Unsure,
    /// Sure this is the gesture; owns the sequence from now on.
    Start,
    /// Gesture in progress.
    Stay,
    /// Final frame of the gesture.
    End,
    /// Conditions not met.
    Failed,
}

impl GestureState {
    /// `true` for `End`, `Failed` and `Interrupted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, GestureState::End | GestureState::Failed | GestureState::Interrupted)
    }

    /// `true` while the recognizer owns its sequence.
    pub fn is_active(self) -> bool {
        matches!(self, GestureState::Start | GestureState::Stay)
    }

    /// Whether a recognizer may report `next` while in `self`.  Reporting the
    /// current state again is always allowed.
    pub fn can_transition_to(self, next: GestureState) -> bool {
        if self == next {
            return true;
        }
        match self {
            GestureState::Unsure => matches!(
                next,
                GestureState::Start | GestureState::Failed | GestureState::Interrupted
            ),
            GestureState::Start | GestureState::Stay => matches!(
                next,
                GestureState::Stay | GestureState::End | GestureState::Interrupted
            ),
            GestureState::End | GestureState::Failed | GestureState::Interrupted => false,
        }
    }
}

/// Which pointer a sequence belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Touch { finger_id: i32 },
    /// The left mouse button.
    Mouse,
}

/// A phase-tagged pointer sample, as seen by recognizers and pointer handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub source: PointerSource,
    pub phase: TouchPhase,
    pub position: Point,
    /// Frame time.
    pub time: Duration,
}

/// What a recognizer returns for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recognition {
    pub state: GestureState,
    /// Asks the frame loop to play the default click feedback.
    pub play_default_sound: bool,
}

impl Recognition {
    pub fn silent(state: GestureState) -> Self {
        Self { state, play_default_sound: false }
    }

    pub fn with_sound(state: GestureState) -> Self {
        Self { state, play_default_sound: true }
    }
}

/// A gesture state machine attached to a view.
///
/// Implementations are only called while they are not terminal: `Unsure`
/// before any recognizer claimed the sequence, `Start`/`Stay` once they own it.
pub trait GestureRecognizer: Send {
    /// Consumes one event aimed at the owning view (whose boundary is
    /// `view_bounds`) and returns the new state.
    fn recognize(&mut self, event: &PointerEvent, view_bounds: Rect, state: GestureState) -> Recognition;

    /// Called when a new sequence begins, before its first event.
    fn reset(&mut self) {}

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Identifies a recognizer within its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecognizerId(pub u32);

/// A recognizer together with the state the arbiter tracks for it.
pub struct RecognizerSlot {
    id: RecognizerId,
    recognizer: Box<dyn GestureRecognizer>,
    state: GestureState,
    enabled: bool,
}

impl fmt::Debug for RecognizerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizerSlot")
            .field("id", &self.id)
            .field("name", &self.recognizer.name())
            .field("state", &self.state)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl RecognizerSlot {
    pub(crate) fn new(id: RecognizerId, recognizer: Box<dyn GestureRecognizer>) -> Self {
        Self { id, recognizer, state: GestureState::Failed, enabled: true }
    }

    pub fn id(&self) -> RecognizerId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.recognizer.name()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled recognizers are skipped by arbitration.  Disabling one that is
    /// mid-sequence interrupts it.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && !self.state.is_terminal() {
            self.interrupt(false);
        }
        self.enabled = enabled;
    }

    /// Ends the recognizer's participation in the current sequence.
    ///
    /// With `only_if_unsure` the call only affects a recognizer still in
    /// `Unsure`; one that already owns its sequence keeps going.
    pub fn interrupt(&mut self, only_if_unsure: bool) {
        if only_if_unsure && self.state != GestureState::Unsure {
            return;
        }
        self.state = GestureState::Interrupted;
    }

    /// Closes an owner that is still active when its pointer is released.
    pub(crate) fn finish(&mut self) {
        if self.state.is_active() {
            debug_assert!(self.state.can_transition_to(GestureState::End));
            self.state = GestureState::End;
        }
    }

    pub(crate) fn begin_sequence(&mut self) {
        self.state = GestureState::Unsure;
        self.recognizer.reset();
    }

    /// Runs the recognizer and validates the edge it reports.
    pub(crate) fn offer(&mut self, event: &PointerEvent, view_bounds: Rect) -> Recognition {
        let recognition = self.recognizer.recognize(event, view_bounds, self.state);
        if self.state.can_transition_to(recognition.state) {
            self.state = recognition.state;
            return recognition;
        }

        debug_assert!(
            false,
            "invalid gesture transition {:?} -> {:?} in {}",
            self.state,
            recognition.state,
            self.recognizer.name()
        );
        error!(
            recognizer = self.recognizer.name(),
            from = ?self.state,
            to = ?recognition.state,
            "invalid gesture transition, recognizer failed"
        );
        self.state = GestureState::Failed;
        Recognition::silent(GestureState::Failed)
    }
}
