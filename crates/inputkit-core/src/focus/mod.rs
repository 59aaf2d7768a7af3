//! Focus, highlight and shake.
//!
//! - `highlight` – the ease-out alpha animation of the focus highlight
//! - `shake` – the damped wobble played when navigation is blocked
//! - `manager` – who holds focus, and moving it around

pub mod highlight;
pub mod manager;
pub mod shake;

pub use highlight::{HighlightAnimation, DEFAULT_HIGHLIGHT_DURATION};
pub use manager::{find_next_focus, FocusManager, FocusSettings, Navigation};
pub use shake::{FocusDirection, ShakeAnimation};
