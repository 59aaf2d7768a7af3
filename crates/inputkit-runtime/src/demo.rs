//! Demo scene and scripted session for the headless binary.
//!
//! The scene is a sidebar of three focusable items next to a content panel
//! that carries a tap and a vertical pan recognizer.  The session walks
//! focus down the sidebar, runs an action, bumps into the bottom edge (shake),
//! taps and drags the panel, and clicks it with the mouse.

use inputkit_core::gesture::PanAxis;
use inputkit_core::{
    ControllerAxis, ControllerButton, KeyCode, PanGestureRecognizer, Point, RawMouseSample, Rect,
    TapGestureRecognizer, TaskScheduler, ViewId, ViewTree, ViewTreeError,
};
use tracing::{debug, info};

use crate::infrastructure::input_source::mock::ScriptedFrame;

/// Ids of the views the session interacts with.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoScene {
    pub sidebar_items: Vec<ViewId>,
    pub content: ViewId,
}

/// Builds the demo views into `tree`.  Item actions hand their work to the
/// async queue of `tasks`.
///
/// # Errors
///
/// Only fails if the tree rejects a child, which cannot happen for a fresh
/// tree.
pub fn build_scene(tree: &mut ViewTree, tasks: &TaskScheduler) -> Result<DemoScene, ViewTreeError> {
    let screen = tree.add_root("screen", Rect::new(0.0, 0.0, 1280.0, 720.0));
    let sidebar = tree.add_child(screen, "sidebar", Rect::new(0.0, 80.0, 240.0, 600.0))?;

    let mut sidebar_items = Vec::new();
    for i in 0..3 {
        let item = tree.add_child(sidebar, "item", Rect::new(20.0, 100.0 + i as f32 * 120.0, 200.0, 100.0))?;
        if let Some(view) = tree.get_mut(item) {
            view.set_focusable(true);
            view.set_focus_listener(|id| debug!(%id, "item focused"));
            let tasks = tasks.clone();
            view.register_action("Open", ControllerButton::A, false, move |id| {
                tasks.submit_async(move || info!(%id, "item opened"));
                true
            });
        }
        sidebar_items.push(item);
    }
    if let Some(view) = tree.get_mut(sidebar) {
        view.register_action("Back", ControllerButton::B, false, |_| true);
    }

    let content = tree.add_child(screen, "content", Rect::new(300.0, 80.0, 940.0, 600.0))?;
    if let Some(view) = tree.get_mut(content) {
        view.add_gesture_recognizer(Box::new(TapGestureRecognizer::new(|tap| {
            info!(x = tap.position.x, y = tap.position.y, "content tapped");
        })));
        view.add_gesture_recognizer(Box::new(PanGestureRecognizer::new(PanAxis::Vertical, |pan| {
            debug!(state = ?pan.state, dy = pan.translation().y, "content panned");
        })));
    }

    Ok(DemoScene { sidebar_items, content })
}

fn place(frames: &mut [ScriptedFrame], index: usize, frame: ScriptedFrame) {
    if let Some(slot) = frames.get_mut(index) {
        *slot = frame;
    }
}

/// A scripted session of exactly `len` frames.  Interactions scheduled past
/// the end are dropped.
pub fn scripted_session(len: u32) -> Vec<ScriptedFrame> {
    let mut frames = vec![ScriptedFrame::new(); len as usize];

    // Focus walk down the sidebar, confirm, then hit the bottom edge.
    place(&mut frames, 10, ScriptedFrame::new().press(ControllerButton::Down));
    place(&mut frames, 20, ScriptedFrame::new().press(ControllerButton::Down));
    place(&mut frames, 30, ScriptedFrame::new().press(ControllerButton::A));
    place(&mut frames, 40, ScriptedFrame::new().press(ControllerButton::Down));

    // Keyboard confirm, held for three frames.
    place(&mut frames, 50, ScriptedFrame::new().key(KeyCode::Enter, true));
    place(&mut frames, 53, ScriptedFrame::new().key(KeyCode::Enter, false));

    // Tap on the content panel.
    for i in 60..62 {
        place(&mut frames, i, ScriptedFrame::new().touch(0, 700.0, 400.0));
    }

    // Vertical drag.
    for (k, i) in (80..96).enumerate() {
        place(&mut frames, i, ScriptedFrame::new().touch(1, 700.0, 300.0 + k as f32 * 10.0));
    }

    // Left stick up.
    for i in 110..113 {
        place(&mut frames, i, ScriptedFrame::new().axis(ControllerAxis::LeftY, -0.9));
    }

    // Mouse click on the content panel.
    let at = Point::new(800.0, 500.0);
    for i in 130..132 {
        let held = RawMouseSample { position: at, left_button: true, ..Default::default() };
        place(&mut frames, i, ScriptedFrame::new().mouse(held));
    }
    place(&mut frames, 132, ScriptedFrame::new().mouse(RawMouseSample { position: at, ..Default::default() }));

    frames
}
