//! Domain layer: the input model, the view tree and everything derived from
//! them without touching a platform.
//!
//! - `geometry` – points and rectangles in logical coordinates
//! - `input` – controller, touch, mouse and keyboard data
//! - `transition` – raw samples → phase-tagged states
//! - `view` – the view tree arena
//! - `action` – button actions, dispatch and hints

pub mod action;
pub mod geometry;
pub mod input;
pub mod transition;
pub mod view;
