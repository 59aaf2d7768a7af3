//! # inputkit-core
//!
//! Per-frame input handling for a tree of interactive views: raw platform
//! samples in, edge-triggered states, gesture ownership, focus changes and
//! highlight animation out.  Also hosts the two deferred-work queues the rest
//! of the frame loop relies on.
//!
//! This crate has no dependency on a platform, a renderer or an async
//! runtime.  The `inputkit-runtime` crate plugs it into an input source and a
//! frame clock.
//!
//! # Architecture overview (for beginners)
//!
//! One frame flows through the modules in this order:
//!
//! - **`domain::transition`** – turns this frame's raw touch/mouse samples and
//!   last frame's states into `Start` / `Stay` / `End` phases.
//!
//! - **`gesture`** – offers each phase-tagged pointer event to the gesture
//!   recognizers on the touched view and its ancestors; the arbiter lets
//!   exactly one of them own the sequence.
//!
//! - **`focus`** – controller navigation moves focus between views, fading
//!   the highlight in and out, or shakes it when there is nowhere to go.
//!
//! - **`domain::action`** – other controller buttons run the actions
//!   registered on the focused view or its ancestors.
//!
//! - **`tasks`** – work deferred to the start of the next frame (sync queue)
//!   or to a background thread (async queue).
//!
//! `domain::view` holds the tree all of these read and write, `event` the
//! subscribe/fire streams, and `keymap` the keyboard-to-controller mapping.

pub mod domain;
pub mod event;
pub mod focus;
pub mod gesture;
pub mod keymap;
pub mod tasks;

pub use domain::action::{collect_hints, dispatch_action, Action, ActionId, Dispatch, Hint};
pub use domain::geometry::{Point, Rect};
pub use domain::input::{
    ControllerAxis, ControllerButton, ControllerSnapshot, KeyState, Modifiers, MouseButton,
    MouseState, RawMouseSample, RawTouchSample, TouchPhase, TouchState,
};
pub use domain::transition::{
    compute_button_phase, compute_mouse_state, compute_touch_state, MouseTracker, TouchTracker,
};
pub use domain::view::{View, ViewId, ViewTree, ViewTreeError};
pub use event::{Event, SubscriptionId};
pub use focus::{FocusDirection, FocusManager, FocusSettings, HighlightAnimation, Navigation, ShakeAnimation};
pub use gesture::{
    GestureArbiter, GestureRecognizer, GestureState, PanGestureRecognizer, PointerEvent, PointerSource,
    Recognition, RecognizerId, TapGestureRecognizer,
};
pub use keymap::{KeyBinding, KeyCode, KeyboardController, KeyboardMapping};
pub use tasks::{AsyncTaskLoop, TaskLoopError, TaskScheduler};
