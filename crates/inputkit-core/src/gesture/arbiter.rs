//! Arbitration: at most one recognizer owns a pointer sequence.
//!
//! # How a sequence is resolved (for beginners)
//!
//! 1. On `Start` the arbiter collects every enabled recognizer on the hit
//!    view's chain (the hit view first, then its parent, up to the root;
//!    registration order within a view) and resets them to `Unsure`.  A
//!    recognizer already taking part in another pointer's sequence is left
//!    out.
//! 2. Each following event is offered to the still-`Unsure` recognizers in
//!    that order.  The first one to report `Start` becomes the owner and every
//!    other `Unsure` recognizer is interrupted on the spot, so a lower-priority
//!    recognizer never sees the frame in which it lost.
//! 3. From then on only the owner receives events.
//! 4. When the pointer ends, an owner still in `Start` or `Stay` is moved to
//!    `End` and recognizers that never made up their mind are interrupted.
//!    The sequence is then forgotten.
//!
//! Sequences are keyed by [`PointerSource`], so two fingers on two different
//! lists are arbitrated independently.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::domain::input::TouchPhase;
use crate::domain::view::{ViewId, ViewTree};

use super::{GestureState, PointerEvent, PointerSource, RecognizerId};

/// Addresses a recognizer in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecognizerRef {
    pub view: ViewId,
    pub recognizer: RecognizerId,
}

/// Result of feeding one event to the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArbitrationOutcome {
    /// Owner of the sequence after this event, if any.
    pub owner: Option<RecognizerRef>,
    /// `true` in the frame the owner claimed the sequence.
    pub claimed: bool,
    /// Some recognizer asked for the default click feedback.
    pub play_default_sound: bool,
}

#[derive(Debug)]
struct Sequence {
    candidates: Vec<RecognizerRef>,
    owner: Option<RecognizerRef>,
}

/// Tracks the recognizers taking part in each active pointer sequence.
#[derive(Debug, Default)]
pub struct GestureArbiter {
    sequences: HashMap<PointerSource, Sequence>,
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sequences currently being arbitrated.
    pub fn active_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Owner of the sequence for `source`, if one claimed it.
    pub fn owner(&self, source: PointerSource) -> Option<RecognizerRef> {
        self.sequences.get(&source).and_then(|s| s.owner)
    }

    /// Feeds one event.  `target` is the view the sequence is bound to; it is
    /// only read on `Start`.
    pub fn process(
        &mut self,
        tree: &mut ViewTree,
        event: &PointerEvent,
        target: Option<ViewId>,
    ) -> ArbitrationOutcome {
        match event.phase {
            TouchPhase::None => return ArbitrationOutcome::default(),
            TouchPhase::Start => self.begin(tree, event.source, target),
            TouchPhase::Stay | TouchPhase::End => {}
        }

        let Some(sequence) = self.sequences.get_mut(&event.source) else {
            return ArbitrationOutcome::default();
        };

        let outcome = match sequence.owner {
            Some(owner) => {
                let sound = offer(tree, owner, event).is_some_and(|(_, sound)| sound);
                ArbitrationOutcome { owner: Some(owner), claimed: false, play_default_sound: sound }
            }
            None => resolve(tree, sequence, event),
        };

        if event.phase == TouchPhase::End {
            if let Some(sequence) = self.sequences.remove(&event.source) {
                if let Some(owner) = sequence.owner {
                    if let Some(slot) = slot_mut(tree, owner) {
                        slot.finish();
                    }
                }
                for candidate in &sequence.candidates {
                    if let Some(slot) = slot_mut(tree, *candidate) {
                        slot.interrupt(true);
                    }
                }
            }
        }
        outcome
    }

    /// Forcibly ends every active sequence, e.g. when input gets blocked.
    pub fn cancel_all(&mut self, tree: &mut ViewTree) {
        for (source, sequence) in self.sequences.drain() {
            trace!(?source, "gesture sequence cancelled");
            for candidate in &sequence.candidates {
                if let Some(slot) = slot_mut(tree, *candidate) {
                    slot.interrupt(false);
                }
            }
        }
    }

    fn begin(&mut self, tree: &mut ViewTree, source: PointerSource, target: Option<ViewId>) {
        // A `Start` without a matching `End` means the previous sequence was lost.
        if let Some(stale) = self.sequences.remove(&source) {
            for candidate in &stale.candidates {
                if let Some(slot) = slot_mut(tree, *candidate) {
                    slot.interrupt(false);
                }
            }
        }

        let Some(target) = target else {
            return;
        };

        // A recognizer takes part in one sequence at a time.
        let busy: HashSet<RecognizerRef> = self
            .sequences
            .values()
            .flat_map(|s| s.candidates.iter().copied())
            .collect();

        let chain: Vec<ViewId> = tree.chain(target).collect();
        let mut candidates = Vec::new();
        for view_id in chain {
            let Some(view) = tree.get_mut(view_id) else {
                continue;
            };
            for slot in view
                .gesture_recognizers_mut()
                .iter_mut()
                .filter(|s| s.is_enabled())
            {
                let candidate = RecognizerRef { view: view_id, recognizer: slot.id() };
                if busy.contains(&candidate) {
                    trace!(?source, view = %view_id, recognizer = slot.name(), "recognizer busy with another pointer");
                    continue;
                }
                slot.begin_sequence();
                candidates.push(candidate);
            }
        }

        trace!(?source, target = %target, candidates = candidates.len(), "gesture sequence started");
        if !candidates.is_empty() {
            self.sequences.insert(source, Sequence { candidates, owner: None });
        }
    }
}

/// Offers `event` to the unresolved candidates in priority order until one
/// claims the sequence.
fn resolve(tree: &mut ViewTree, sequence: &mut Sequence, event: &PointerEvent) -> ArbitrationOutcome {
    let mut outcome = ArbitrationOutcome::default();

    for candidate in sequence.candidates.clone() {
        let Some((state, sound)) = offer(tree, candidate, event) else {
            continue;
        };
        outcome.play_default_sound |= sound;

        if state.is_active() {
            debug!(
                view = %candidate.view,
                recognizer = ?candidate.recognizer,
                source = ?event.source,
                "gesture claimed sequence"
            );
            sequence.owner = Some(candidate);
            outcome.owner = Some(candidate);
            outcome.claimed = true;
            for other in sequence.candidates.iter().filter(|c| **c != candidate) {
                if let Some(slot) = slot_mut(tree, *other) {
                    slot.interrupt(true);
                }
            }
            break;
        }
    }
    outcome
}

/// Runs one recognizer if it can still take part.  Returns its new state and
/// sound request, or `None` if it was skipped.
fn offer(tree: &mut ViewTree, target: RecognizerRef, event: &PointerEvent) -> Option<(GestureState, bool)> {
    let view = tree.get_mut(target.view)?;
    let bounds = view.boundary();
    let slot = view.gesture_recognizer_mut(target.recognizer)?;
    if !slot.is_enabled() || slot.state().is_terminal() {
        return None;
    }
    let recognition = slot.offer(event, bounds);
    Some((recognition.state, recognition.play_default_sound))
}

fn slot_mut(tree: &mut ViewTree, target: RecognizerRef) -> Option<&mut super::RecognizerSlot> {
    tree.get_mut(target.view)?.gesture_recognizer_mut(target.recognizer)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::domain::geometry::{Point, Rect};
    use crate::gesture::{GestureRecognizer, Recognition};

    /// Claims on the first `Stay` frame when `eager`, otherwise never claims.
    struct Counting {
        eager: bool,
        calls: Arc<AtomicUsize>,
    }

    impl GestureRecognizer for Counting {
        fn recognize(&mut self, event: &PointerEvent, _: Rect, state: GestureState) -> Recognition {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = match (state, event.phase) {
                (GestureState::Unsure, TouchPhase::Stay) if self.eager => GestureState::Start,
                (GestureState::Start | GestureState::Stay, TouchPhase::Stay) => GestureState::Stay,
                (GestureState::Start | GestureState::Stay, TouchPhase::End) => GestureState::End,
                (current, _) => current,
            };
            Recognition::silent(next)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn counting(eager: bool) -> (Box<dyn GestureRecognizer>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(Counting { eager, calls: Arc::clone(&calls) }), calls)
    }

    fn touch(phase: TouchPhase) -> PointerEvent {
        PointerEvent {
            source: PointerSource::Touch { finger_id: 0 },
            phase,
            position: Point::new(5.0, 5.0),
            time: Duration::ZERO,
        }
    }

    fn state_of(tree: &ViewTree, r: RecognizerRef) -> GestureState {
        tree.get(r.view).unwrap().gesture_recognizer(r.recognizer).unwrap().state()
    }

    #[test]
    fn test_sequence_without_recognizers_is_not_tracked() {
        let mut tree = ViewTree::new();
        let view = tree.add_root("plain", Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut arbiter = GestureArbiter::new();

        let outcome = arbiter.process(&mut tree, &touch(TouchPhase::Start), Some(view));

        assert_eq!(outcome, ArbitrationOutcome::default());
        assert_eq!(arbiter.active_sequences(), 0);
    }

    #[test]
    fn test_claim_interrupts_other_unsure_recognizers_on_chain() {
        // Arrange: parent recognizer that never claims, child recognizer that claims
        let mut tree = ViewTree::new();
        let parent = tree.add_root("list", Rect::new(0.0, 0.0, 10.0, 10.0));
        let child = tree.add_child(parent, "cell", Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let (claimer, _) = counting(true);
        let (watcher, watcher_calls) = counting(false);
        let claimer = RecognizerRef {
            view: child,
            recognizer: tree.get_mut(child).unwrap().add_gesture_recognizer(claimer),
        };
        let watcher = RecognizerRef {
            view: parent,
            recognizer: tree.get_mut(parent).unwrap().add_gesture_recognizer(watcher),
        };
        let mut arbiter = GestureArbiter::new();

        // Act
        arbiter.process(&mut tree, &touch(TouchPhase::Start), Some(child));
        let claimed = arbiter.process(&mut tree, &touch(TouchPhase::Stay), Some(child));
        let calls_at_claim = watcher_calls.load(Ordering::SeqCst);
        arbiter.process(&mut tree, &touch(TouchPhase::Stay), Some(child));
        let ended = arbiter.process(&mut tree, &touch(TouchPhase::End), Some(child));

        // Assert
        assert!(claimed.claimed);
        assert_eq!(claimed.owner, Some(claimer));
        assert_eq!(state_of(&tree, watcher), GestureState::Interrupted);
        assert_eq!(calls_at_claim, 1, "watcher saw only the Start frame");
        assert_eq!(watcher_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ended.owner, Some(claimer));
        assert_eq!(state_of(&tree, claimer), GestureState::End);
        assert_eq!(arbiter.active_sequences(), 0);
    }

    #[test]
    fn test_unclaimed_sequence_leaves_no_recognizer_unsure() {
        let mut tree = ViewTree::new();
        let view = tree.add_root("view", Rect::new(0.0, 0.0, 10.0, 10.0));
        let (watcher, _) = counting(false);
        let id = tree.get_mut(view).unwrap().add_gesture_recognizer(watcher);
        let mut arbiter = GestureArbiter::new();

        arbiter.process(&mut tree, &touch(TouchPhase::Start), Some(view));
        let outcome = arbiter.process(&mut tree, &touch(TouchPhase::End), Some(view));

        assert_eq!(outcome.owner, None);
        assert_eq!(
            state_of(&tree, RecognizerRef { view, recognizer: id }),
            GestureState::Interrupted
        );
    }

    #[test]
    fn test_cancel_all_interrupts_owner() {
        let mut tree = ViewTree::new();
        let view = tree.add_root("view", Rect::new(0.0, 0.0, 10.0, 10.0));
        let (claimer, _) = counting(true);
        let id = tree.get_mut(view).unwrap().add_gesture_recognizer(claimer);
        let mut arbiter = GestureArbiter::new();
        arbiter.process(&mut tree, &touch(TouchPhase::Start), Some(view));
        arbiter.process(&mut tree, &touch(TouchPhase::Stay), Some(view));

        arbiter.cancel_all(&mut tree);

        assert_eq!(
            state_of(&tree, RecognizerRef { view, recognizer: id }),
            GestureState::Interrupted
        );
        assert_eq!(arbiter.owner(PointerSource::Touch { finger_id: 0 }), None);
    }

    #[test]
    fn test_second_finger_does_not_restart_recognizer_owned_by_first() {
        // Arrange: finger 0 owns the view's only recognizer
        let mut tree = ViewTree::new();
        let view = tree.add_root("list", Rect::new(0.0, 0.0, 10.0, 10.0));
        let (claimer, calls) = counting(true);
        let owner = RecognizerRef {
            view,
            recognizer: tree.get_mut(view).unwrap().add_gesture_recognizer(claimer),
        };
        let mut arbiter = GestureArbiter::new();
        let second = |phase| PointerEvent { source: PointerSource::Touch { finger_id: 1 }, ..touch(phase) };
        arbiter.process(&mut tree, &touch(TouchPhase::Start), Some(view));
        arbiter.process(&mut tree, &touch(TouchPhase::Stay), Some(view));
        arbiter.process(&mut tree, &touch(TouchPhase::Stay), Some(view));
        let calls_before = calls.load(Ordering::SeqCst);

        // Act
        let started = arbiter.process(&mut tree, &second(TouchPhase::Start), Some(view));
        let moved = arbiter.process(&mut tree, &second(TouchPhase::Stay), Some(view));

        // Assert
        assert_eq!(started, ArbitrationOutcome::default());
        assert_eq!(moved, ArbitrationOutcome::default());
        assert_eq!(state_of(&tree, owner), GestureState::Stay);
        assert_eq!(calls.load(Ordering::SeqCst), calls_before, "second finger never reached the owner");
        assert_eq!(arbiter.active_sequences(), 1);
        assert_eq!(arbiter.owner(PointerSource::Touch { finger_id: 0 }), Some(owner));

        arbiter.process(&mut tree, &second(TouchPhase::End), Some(view));
        assert_eq!(state_of(&tree, owner), GestureState::Stay);
        arbiter.process(&mut tree, &touch(TouchPhase::End), Some(view));
        assert_eq!(state_of(&tree, owner), GestureState::End);
        assert_eq!(arbiter.active_sequences(), 0);
    }

    #[test]
    fn test_free_recognizer_joins_second_finger_while_first_is_owned() {
        // Arrange: parent recognizer owned by finger 0, child free
        let mut tree = ViewTree::new();
        let parent = tree.add_root("list", Rect::new(0.0, 0.0, 10.0, 10.0));
        let child = tree.add_child(parent, "cell", Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let (outer, _) = counting(true);
        let outer = RecognizerRef {
            view: parent,
            recognizer: tree.get_mut(parent).unwrap().add_gesture_recognizer(outer),
        };
        let mut arbiter = GestureArbiter::new();
        arbiter.process(&mut tree, &touch(TouchPhase::Start), Some(parent));
        arbiter.process(&mut tree, &touch(TouchPhase::Stay), Some(parent));
        let (inner, _) = counting(true);
        let inner = RecognizerRef {
            view: child,
            recognizer: tree.get_mut(child).unwrap().add_gesture_recognizer(inner),
        };
        let second = |phase| PointerEvent { source: PointerSource::Touch { finger_id: 1 }, ..touch(phase) };

        // Act
        arbiter.process(&mut tree, &second(TouchPhase::Start), Some(child));
        let claimed = arbiter.process(&mut tree, &second(TouchPhase::Stay), Some(child));

        // Assert
        assert_eq!(claimed.owner, Some(inner));
        assert_eq!(state_of(&tree, outer), GestureState::Start);
        assert_eq!(arbiter.active_sequences(), 2);
    }

    #[test]
    fn test_tap_owner_is_ended_with_its_sequence() {
        // Arrange
        let mut tree = ViewTree::new();
        let view = tree.add_root("button", Rect::new(0.0, 0.0, 10.0, 10.0));
        let taps = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&taps);
        let tap = RecognizerRef {
            view,
            recognizer: tree.get_mut(view).unwrap().add_gesture_recognizer(Box::new(
                crate::gesture::TapGestureRecognizer::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )),
        };
        let mut arbiter = GestureArbiter::new();

        // Act
        arbiter.process(&mut tree, &touch(TouchPhase::Start), Some(view));
        let released = arbiter.process(&mut tree, &touch(TouchPhase::End), Some(view));

        // Assert
        assert!(released.claimed);
        assert_eq!(released.owner, Some(tap));
        assert_eq!(taps.load(Ordering::SeqCst), 1);
        assert_eq!(state_of(&tree, tap), GestureState::End);
        assert_eq!(arbiter.active_sequences(), 0);
    }
}
