//! FrameProcessor: turns one frame of raw input into gestures, focus moves
//! and actions.
//!
//! # Frame order
//!
//! Every call to [`FrameProcessor::run_frame`] performs, in this order:
//!
//! 1. `runloop_start` on the input source (pushes keyboard and mouse-offset
//!    events to subscribers).
//! 2. The sync task queue is drained.
//! 3. The controller is polled, held keyboard keys are merged in, and the
//!    `Nav*` buttons are derived from the D-pad and left stick.
//! 4. Touches and the mouse are polled, phase-tracked, hit-tested, arbitrated
//!    and delivered to the view under the pointer.
//! 5. Controller buttons pressed this frame navigate focus (`Nav*`) or run
//!    the actions of the focused view chain (everything else).
//! 6. Animations advance and the hint list is refreshed if focus changed.
//!
//! Nothing here returns an error: a missing view or an idle device simply
//! produces nothing for that frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use inputkit_core::gesture::RecognizerRef;
use inputkit_core::{
    collect_hints, dispatch_action, ControllerButton, ControllerSnapshot, Dispatch, FocusDirection,
    FocusManager, GestureArbiter, Hint, KeyState, KeyboardController, KeyboardMapping, MouseTracker,
    Navigation, PointerEvent, PointerSource, SubscriptionId, TaskScheduler, TouchPhase, TouchTracker,
    ViewId, ViewTree, ViewTreeError,
};
use tracing::{debug, trace};

use crate::application::feedback::{FeedbackKind, FeedbackSink};
use crate::infrastructure::input_source::InputSource;

/// Per-frame tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSettings {
    /// Left-stick deflection at which it counts as a D-pad press.
    pub stick_deadzone: f32,
    pub keyboard_enabled: bool,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self { stick_deadzone: 0.5, keyboard_enabled: true }
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Sync tasks performed at the start of the frame.
    pub sync_tasks: usize,
    /// Pointer events (touch or left mouse button) arbitrated this frame.
    pub pointer_events: usize,
    /// Recognizers that claimed their sequence this frame.
    pub claims: Vec<RecognizerRef>,
    /// Result of the last navigation press, if any.
    pub navigation: Option<Navigation>,
    /// One entry per non-navigation button pressed this frame.
    pub dispatched: Vec<Dispatch>,
}

/// Drives the per-frame input pipeline for one input source.
pub struct FrameProcessor<S: InputSource> {
    source: S,
    settings: FrameSettings,
    touches: TouchTracker,
    mouse: MouseTracker,
    arbiter: GestureArbiter,
    focus: FocusManager,
    keyboard: KeyboardController,
    key_inbox: Arc<Mutex<Vec<KeyState>>>,
    key_subscription: Option<SubscriptionId>,
    hints_stale: Arc<AtomicBool>,
    hints: Vec<Hint>,
    tasks: TaskScheduler,
    previous: ControllerSnapshot,
    input_blocked: bool,
    feedback: Box<dyn FeedbackSink>,
}

impl<S: InputSource> FrameProcessor<S> {
    pub fn new(
        source: S,
        settings: FrameSettings,
        focus: FocusManager,
        keyboard: KeyboardMapping,
        tasks: TaskScheduler,
        feedback: Box<dyn FeedbackSink>,
    ) -> Self {
        let key_inbox = Arc::new(Mutex::new(Vec::new()));
        let key_subscription = settings.keyboard_enabled.then(|| {
            let inbox = Arc::clone(&key_inbox);
            source.keyboard_events().subscribe(move |state: &KeyState| {
                inbox.lock().unwrap_or_else(PoisonError::into_inner).push(*state);
            })
        });

        let hints_stale = Arc::new(AtomicBool::new(true));
        let stale = Arc::clone(&hints_stale);
        focus.focus_change_event().subscribe(move |_: &Option<ViewId>| {
            stale.store(true, Ordering::Release);
        });

        Self {
            source,
            settings,
            touches: TouchTracker::new(),
            mouse: MouseTracker::new(),
            arbiter: GestureArbiter::new(),
            focus,
            keyboard: KeyboardController::new(keyboard),
            key_inbox,
            key_subscription,
            hints_stale,
            hints: Vec::new(),
            tasks,
            previous: ControllerSnapshot::default(),
            input_blocked: false,
            feedback,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn settings(&self) -> &FrameSettings {
        &self.settings
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    pub fn arbiter(&self) -> &GestureArbiter {
        &self.arbiter
    }

    /// A handle for submitting deferred work from anywhere.
    pub fn tasks(&self) -> &TaskScheduler {
        &self.tasks
    }

    /// Hints for the current focus, as of the end of the last frame.
    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    pub fn is_input_blocked(&self) -> bool {
        self.input_blocked
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    /// Runs one frame at time `now`.
    pub fn run_frame(&mut self, tree: &mut ViewTree, now: Duration) -> FrameReport {
        let mut report = FrameReport::default();

        self.source.runloop_start();
        report.sync_tasks = self.tasks.perform_sync_tasks();

        let controller = self.poll_controller();

        let raw_touches = self.source.update_touch_states();
        let touches = self.touches.update(&raw_touches, |p| tree.hit_test(p));
        let raw_mouse = self.source.update_mouse_state();
        let mouse = self.mouse.update(&raw_mouse, |p| tree.hit_test(p));

        if !self.input_blocked {
            for touch in touches.iter().filter(|t| t.phase != TouchPhase::None) {
                let event = PointerEvent {
                    source: PointerSource::Touch { finger_id: touch.finger_id },
                    phase: touch.phase,
                    position: touch.position,
                    time: now,
                };
                self.process_pointer(tree, &event, touch.view, &mut report);
            }
            if mouse.left_button != TouchPhase::None {
                let event = PointerEvent {
                    source: PointerSource::Mouse,
                    phase: mouse.left_button,
                    position: mouse.position,
                    time: now,
                };
                self.process_pointer(tree, &event, mouse.view, &mut report);
            }
        }

        let pressed: Vec<ControllerButton> = controller.newly_pressed(&self.previous).collect();
        self.previous = controller;
        if !self.input_blocked {
            for button in pressed {
                self.process_button(tree, button, now, &mut report);
            }
        }

        self.focus.tick(tree, now);
        if self.hints_stale.swap(false, Ordering::AcqRel) {
            self.refresh_hints(tree);
        }

        trace!(
            sync_tasks = report.sync_tasks,
            pointer_events = report.pointer_events,
            fingers = self.touches.active_count(),
            "frame done"
        );
        report
    }

    fn poll_controller(&mut self) -> ControllerSnapshot {
        let mut controller = self.source.update_controller_state();

        let keys = std::mem::take(&mut *self.key_inbox.lock().unwrap_or_else(PoisonError::into_inner));
        for key in keys {
            self.keyboard.apply(key);
        }
        if self.settings.keyboard_enabled {
            self.keyboard.merge_into(&mut controller);
        }

        controller.with_navigation(self.settings.stick_deadzone)
    }

    fn process_pointer(
        &mut self,
        tree: &mut ViewTree,
        event: &PointerEvent,
        view: Option<ViewId>,
        report: &mut FrameReport,
    ) {
        let outcome = self.arbiter.process(tree, event, view);
        if outcome.claimed {
            if let Some(owner) = outcome.owner {
                report.claims.push(owner);
            }
        }

        if let Some(target) = view.and_then(|id| tree.get_mut(id)) {
            target.deliver_pointer(event);
        }

        if outcome.play_default_sound {
            self.feedback.play(FeedbackKind::Click);
        }
        report.pointer_events += 1;
    }

    fn process_button(&mut self, tree: &mut ViewTree, button: ControllerButton, now: Duration, report: &mut FrameReport) {
        if let Some(direction) = nav_direction(button) {
            let navigation = self.focus.navigate(tree, direction, now);
            let kind = match navigation {
                Navigation::Moved { .. } => FeedbackKind::FocusChange,
                Navigation::Blocked { .. } => FeedbackKind::FocusError,
            };
            self.feedback.play(kind);
            report.navigation = Some(navigation);
            return;
        }

        let Some(focused) = self.focus.focused() else {
            trace!(?button, "button pressed without focus");
            return;
        };
        let dispatch = dispatch_action(tree, focused, button);
        if let Dispatch::Consumed { view, action } = dispatch {
            debug!(?button, %view, ?action, "action consumed");
            self.feedback.play(FeedbackKind::Click);
        }
        report.dispatched.push(dispatch);
    }

    // ── Operations ────────────────────────────────────────────────────────────

    /// Moves focus to `view`.  See [`FocusManager::give_focus`].
    pub fn give_focus(&mut self, tree: &mut ViewTree, view: ViewId, now: Duration) -> bool {
        self.focus.give_focus(tree, view, now)
    }

    /// Recomputes the hint list from the current focus chain.
    pub fn refresh_hints(&mut self, tree: &ViewTree) {
        self.hints = collect_hints(tree, self.focus.focused());
    }

    /// Stops delivering input: every active gesture is interrupted and button
    /// presses are ignored until [`unblock_input`](Self::unblock_input).
    pub fn block_input(&mut self, tree: &mut ViewTree) {
        if self.input_blocked {
            return;
        }
        self.arbiter.cancel_all(tree);
        tree.interrupt_all_gestures(false);
        self.input_blocked = true;
        debug!("input blocked");
    }

    pub fn unblock_input(&mut self) {
        if self.input_blocked {
            self.input_blocked = false;
            debug!("input unblocked");
        }
    }

    /// Detaches `view` and its subtree.  Their recognizers are interrupted
    /// and focus is dropped if it was inside.
    ///
    /// # Errors
    ///
    /// [`ViewTreeError::UnknownView`] if `view` is not in `tree`.
    pub fn remove_view(&mut self, tree: &mut ViewTree, view: ViewId) -> Result<Vec<ViewId>, ViewTreeError> {
        let removed = tree.remove(view)?;
        self.focus.on_views_removed(&removed);
        debug!(%view, count = removed.len(), "views removed");
        Ok(removed)
    }

    /// Forwards a rumble request to the input source.
    pub fn rumble(&mut self, device: u16, low_frequency: u16, high_frequency: u16) {
        trace!(device, low_frequency, high_frequency, "rumble");
        self.source.send_rumble(device, low_frequency, high_frequency);
    }
}

impl<S: InputSource> Drop for FrameProcessor<S> {
    fn drop(&mut self) {
        if let Some(id) = self.key_subscription.take() {
            self.source.keyboard_events().unsubscribe(id);
        }
    }
}

fn nav_direction(button: ControllerButton) -> Option<FocusDirection> {
    match button {
        ControllerButton::NavUp => Some(FocusDirection::Up),
        ControllerButton::NavRight => Some(FocusDirection::Right),
        ControllerButton::NavDown => Some(FocusDirection::Down),
        ControllerButton::NavLeft => Some(FocusDirection::Left),
        _ => None,
    }
}
