//! Application layer use cases for the runtime.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The *application* layer sits between the core (pure input and focus rules
//! in `inputkit_core`) and the infrastructure (devices, files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** core objects to fulfil a goal, such as "turn this
//!   frame's raw input into gestures, focus moves and actions".
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so a platform backend can be swapped without changing this code.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`frame`**    – The per-frame pipeline.  This runs every frame, so it
//!   never returns errors and never blocks.
//!
//! - **`feedback`** – The seam through which the pipeline asks for click and
//!   focus sounds.

pub mod feedback;
pub mod frame;
