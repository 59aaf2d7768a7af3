//! Focus ownership and directional navigation.
//!
//! [`FocusManager`] is the only writer of the focus flag and the highlight
//! animation.  Every transition fires the global focus-change event after the
//! views involved have been updated.

use std::time::Duration;

use rand_core::RngCore;
use tracing::{debug, trace};

use crate::domain::view::{ViewId, ViewTree};
use crate::event::Event;

use super::highlight::DEFAULT_HIGHLIGHT_DURATION;
use super::shake::{FocusDirection, ShakeAnimation};

/// Weight of the perpendicular distance when ranking navigation candidates.
const CROSS_AXIS_WEIGHT: f32 = 2.0;

/// Tunables for focus transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusSettings {
    pub highlight_duration: Duration,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self { highlight_duration: DEFAULT_HIGHLIGHT_DURATION }
    }
}

/// Result of [`FocusManager::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Focus moved to `to`.
    Moved { from: Option<ViewId>, to: ViewId },
    /// Nothing lies in that direction; `shaken` is the view that wobbled.
    Blocked { shaken: Option<ViewId> },
}

/// Picks the focusable view closest to `from` in `direction`.
///
/// A candidate qualifies when its centre lies strictly on the `direction`
/// side of `from`'s centre.  Candidates are ranked by distance along the
/// direction plus twice the distance across it; ties go to the lower id.
pub fn find_next_focus(tree: &ViewTree, from: ViewId, direction: FocusDirection) -> Option<ViewId> {
    let origin = tree.get(from)?.boundary().center();
    let (ux, uy) = direction.unit();

    let mut best: Option<(f32, ViewId)> = None;
    for candidate in tree.focusable_views() {
        if candidate == from {
            continue;
        }
        let Some(view) = tree.get(candidate) else {
            continue;
        };
        let d = view.boundary().center().offset_from(origin);
        let along = d.x * ux + d.y * uy;
        if along <= 0.0 {
            continue;
        }
        let across = (d.x * uy - d.y * ux).abs();
        let score = along + CROSS_AXIS_WEIGHT * across;
        if best.map_or(true, |(s, _)| score < s) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, id)| id)
}

/// Tracks the focused view and drives focus animations.
pub struct FocusManager {
    focused: Option<ViewId>,
    settings: FocusSettings,
    rng: Box<dyn RngCore + Send>,
    focus_changed: Event<Option<ViewId>>,
}

impl std::fmt::Debug for FocusManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusManager")
            .field("focused", &self.focused)
            .field("settings", &self.settings)
            .finish()
    }
}

impl FocusManager {
    /// `rng` supplies shake amplitudes; pass a seeded generator for
    /// reproducible animations.
    pub fn new(settings: FocusSettings, rng: Box<dyn RngCore + Send>) -> Self {
        Self { focused: None, settings, rng, focus_changed: Event::new() }
    }

    pub fn focused(&self) -> Option<ViewId> {
        self.focused
    }

    pub fn settings(&self) -> &FocusSettings {
        &self.settings
    }

    /// Fired with the new focus after every transition.
    pub fn focus_change_event(&self) -> &Event<Option<ViewId>> {
        &self.focus_changed
    }

    /// Moves focus to `view`.
    ///
    /// Returns `false` (and changes nothing) if `view` is missing from the
    /// tree or not focusable.  Giving focus to the focused view is a no-op
    /// that returns `true`.
    pub fn give_focus(&mut self, tree: &mut ViewTree, view: ViewId, now: Duration) -> bool {
        if !tree.get(view).is_some_and(|v| v.is_focusable()) {
            trace!(view = %view, "focus refused");
            return false;
        }
        if self.focused == Some(view) {
            return true;
        }

        let duration = self.settings.highlight_duration;
        if let Some(previous) = self.focused {
            if let Some(view) = tree.get_mut(previous) {
                view.lose_focus(now, duration);
            }
        }
        if let Some(next) = tree.get_mut(view) {
            next.gain_focus(now, duration);
        }

        debug!(from = ?self.focused, to = %view, "focus changed");
        self.focused = Some(view);
        self.focus_changed.fire(&self.focused);
        true
    }

    /// Removes focus from whatever holds it.
    pub fn clear_focus(&mut self, tree: &mut ViewTree, now: Duration) {
        let Some(previous) = self.focused.take() else {
            return;
        };
        if let Some(view) = tree.get_mut(previous) {
            view.lose_focus(now, self.settings.highlight_duration);
        }
        debug!(from = %previous, "focus cleared");
        self.focus_changed.fire(&None);
    }

    /// Moves focus one step in `direction`.
    ///
    /// Without a focused view the first focusable view is focused.  When
    /// nothing lies in that direction the focused view shakes instead.
    pub fn navigate(&mut self, tree: &mut ViewTree, direction: FocusDirection, now: Duration) -> Navigation {
        let from = self.focused.filter(|id| tree.contains(*id));

        let target = match from {
            Some(from) => find_next_focus(tree, from, direction),
            None => tree.focusable_views().first().copied(),
        };

        if let Some(to) = target {
            if self.give_focus(tree, to, now) {
                return Navigation::Moved { from, to };
            }
        }

        if let Some(view) = from {
            self.shake(tree, view, direction, now);
        }
        trace!(?direction, "navigation blocked");
        Navigation::Blocked { shaken: from }
    }

    /// Starts a shake on `view` toward `direction`.
    pub fn shake(&mut self, tree: &mut ViewTree, view: ViewId, direction: FocusDirection, now: Duration) {
        if let Some(target) = tree.get_mut(view) {
            target.start_shake(ShakeAnimation::new(direction, now, self.rng.as_mut()));
        }
    }

    /// Drops focus if it was inside a subtree that just left the tree.
    pub fn on_views_removed(&mut self, removed: &[ViewId]) {
        if self.focused.is_some_and(|id| removed.contains(&id)) {
            debug!(view = ?self.focused, "focused view detached");
            self.focused = None;
            self.focus_changed.fire(&None);
        }
    }

    /// Advances time-based animations.
    pub fn tick(&self, tree: &mut ViewTree, now: Duration) {
        tree.tick_animations(now);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    use super::*;
    use crate::domain::geometry::Rect;

    fn manager() -> FocusManager {
        FocusManager::new(FocusSettings::default(), Box::new(ChaCha8Rng::seed_from_u64(1)))
    }

    /// Three focusable buttons in a row, 100 units apart.
    fn row() -> (ViewTree, [ViewId; 3]) {
        let mut tree = ViewTree::new();
        let root = tree.add_root("root", Rect::new(0.0, 0.0, 400.0, 100.0));
        let mut ids = [ViewId(0); 3];
        for (i, id) in ids.iter_mut().enumerate() {
            *id = tree
                .add_child(root, "button", Rect::new(i as f32 * 100.0, 0.0, 80.0, 40.0))
                .unwrap();
            tree.get_mut(*id).unwrap().set_focusable(true);
        }
        (tree, ids)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_focus_gain_and_loss_retarget_highlight() {
        // Arrange
        let (mut tree, [a, b, _]) = row();
        let mut focus = manager();

        // Act
        focus.give_focus(&mut tree, a, ms(0));
        focus.give_focus(&mut tree, b, ms(30));

        // Assert
        let a_view = tree.get(a).unwrap();
        let b_view = tree.get(b).unwrap();
        assert!(!a_view.is_focused());
        assert_eq!(a_view.highlight().target(), 0.0);
        assert!(b_view.is_focused());
        assert_eq!(b_view.highlight().target(), 1.0);
        assert_eq!(focus.focused(), Some(b));
    }

    #[test]
    fn test_listener_runs_on_gain_only() {
        let (mut tree, [a, b, _]) = row();
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&calls);
        tree.get_mut(a).unwrap().set_focus_listener(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        let mut focus = manager();

        focus.give_focus(&mut tree, a, ms(0));
        focus.give_focus(&mut tree, b, ms(10));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_focusable_view_is_refused() {
        let (mut tree, [a, ..]) = row();
        tree.get_mut(a).unwrap().set_focusable(false);
        let mut focus = manager();

        assert!(!focus.give_focus(&mut tree, a, ms(0)));
        assert_eq!(focus.focused(), None);
    }

    #[test]
    fn test_focus_change_event_reports_each_transition() {
        let (mut tree, [a, b, _]) = row();
        let mut focus = manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        focus.focus_change_event().subscribe(move |v| sink.lock().unwrap().push(*v));

        focus.give_focus(&mut tree, a, ms(0));
        focus.give_focus(&mut tree, a, ms(5));
        focus.give_focus(&mut tree, b, ms(10));
        focus.clear_focus(&mut tree, ms(20));

        assert_eq!(*seen.lock().unwrap(), vec![Some(a), Some(b), None]);
    }

    #[test]
    fn test_navigate_moves_to_nearest_in_direction() {
        let (mut tree, [a, b, c]) = row();
        let mut focus = manager();
        focus.give_focus(&mut tree, a, ms(0));

        assert_eq!(
            focus.navigate(&mut tree, FocusDirection::Right, ms(10)),
            Navigation::Moved { from: Some(a), to: b }
        );
        assert_eq!(
            focus.navigate(&mut tree, FocusDirection::Right, ms(20)),
            Navigation::Moved { from: Some(b), to: c }
        );
    }

    #[test]
    fn test_blocked_navigation_shakes_focused_view() {
        // Arrange
        let (mut tree, [a, ..]) = row();
        let mut focus = manager();
        focus.give_focus(&mut tree, a, ms(0));

        // Act
        let outcome = focus.navigate(&mut tree, FocusDirection::Left, ms(100));

        // Assert
        assert_eq!(outcome, Navigation::Blocked { shaken: Some(a) });
        let shake = tree.get(a).unwrap().shake().copied().expect("shake started");
        assert_eq!(shake.direction(), FocusDirection::Left);
        assert_eq!(shake.started_at(), ms(100));
        assert_eq!(focus.focused(), Some(a));
    }

    #[test]
    fn test_finished_shake_is_cleared_by_tick() {
        let (mut tree, [a, ..]) = row();
        let mut focus = manager();
        focus.give_focus(&mut tree, a, ms(0));
        focus.navigate(&mut tree, FocusDirection::Up, ms(0));

        focus.tick(&mut tree, ms(200));

        assert!(tree.get(a).unwrap().shake().is_none());
    }

    #[test]
    fn test_navigate_without_focus_picks_first_focusable() {
        let (mut tree, [a, ..]) = row();
        let mut focus = manager();

        let outcome = focus.navigate(&mut tree, FocusDirection::Down, ms(0));

        assert_eq!(outcome, Navigation::Moved { from: None, to: a });
    }

    #[test]
    fn test_removing_focused_subtree_clears_focus() {
        let (mut tree, [a, b, _]) = row();
        let mut focus = manager();
        focus.give_focus(&mut tree, b, ms(0));

        let removed = tree.remove(b).unwrap();
        focus.on_views_removed(&removed);

        assert_eq!(focus.focused(), None);
        assert!(focus.give_focus(&mut tree, a, ms(10)));
    }
}
