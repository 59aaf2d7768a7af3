//! Audio/haptic feedback requested by the frame loop.
//!
//! The frame processor only decides *when* feedback is due; what a click
//! sounds like is up to the embedding application's [`FeedbackSink`].

use tracing::debug;

/// The feedback cues the frame loop can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// A recognizer asked for it, or an action consumed a button press.
    Click,
    /// Focus moved to another view.
    FocusChange,
    /// Navigation was blocked and the focused view shook.
    FocusError,
}

/// Receives feedback requests from the frame processor.
#[cfg_attr(test, mockall::automock)]
pub trait FeedbackSink: Send {
    fn play(&mut self, kind: FeedbackKind);
}

/// A sink that only logs.  Used by the headless binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn play(&mut self, kind: FeedbackKind) {
        debug!(?kind, "feedback");
    }
}
