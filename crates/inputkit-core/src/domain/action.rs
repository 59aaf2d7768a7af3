//! Button actions and the hints derived from them.
//!
//! An [`Action`] binds an abstract button to a callback on one view.  When a
//! button is pressed the focused view is asked first, then its ancestors, so
//! a list cell can override what its list does with `A` while still
//! inheriting the list's `B`.

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use super::input::ControllerButton;
use super::view::{ViewId, ViewTree};

/// Identifies an action within its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(pub u32);

/// Runs the action.  Returning `true` consumes the press; `false` lets the
/// walk continue to the next ancestor.
pub type ActionCallback = Box<dyn FnMut(ViewId) -> bool + Send>;

/// A button binding registered on a view.
pub struct Action {
    pub id: ActionId,
    pub button: ControllerButton,
    pub hint: String,
    /// Unavailable actions are skipped during dispatch but still listed as hints.
    pub available: bool,
    /// Hidden actions are dispatched but never listed as hints.
    pub hidden: bool,
    pub(crate) callback: ActionCallback,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("button", &self.button)
            .field("hint", &self.hint)
            .field("available", &self.available)
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// One entry of the hint bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub button: ControllerButton,
    pub text: String,
    pub available: bool,
}

/// Text of the hint added when nothing in the focus chain binds `A`.
pub const DEFAULT_CONFIRM_HINT: &str = "OK";

/// Outcome of [`dispatch_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A callback returned `true`.
    Consumed { view: ViewId, action: ActionId },
    /// No available action consumed the press.
    Ignored,
}

/// Runs the action bound to `button`, starting at `from` and walking up.
///
/// Views without an available action for `button` are skipped.  The walk
/// stops at the first callback that returns `true`.
pub fn dispatch_action(tree: &mut ViewTree, from: ViewId, button: ControllerButton) -> Dispatch {
    let chain: Vec<ViewId> = tree.chain(from).collect();

    for view_id in chain {
        let Some(view) = tree.get_mut(view_id) else {
            continue;
        };
        let Some(action) = view
            .actions_mut()
            .iter_mut()
            .find(|a| a.button == button && a.available)
        else {
            continue;
        };

        trace!(view = %view_id, ?button, hint = %action.hint, "running action");
        if (action.callback)(view_id) {
            debug!(view = %view_id, ?button, "action consumed");
            return Dispatch::Consumed { view: view_id, action: action.id };
        }
    }
    Dispatch::Ignored
}

/// Collects the hints visible for the focus chain starting at `from`.
///
/// Hidden actions are skipped and only the closest action per button is
/// kept.  A default `A` hint is added if none exists.  The result is sorted
/// with `Start` first, then everything else, then `B`, then `A`; the sort is
/// stable so the chain order is kept inside each group.
pub fn collect_hints(tree: &ViewTree, from: Option<ViewId>) -> Vec<Hint> {
    let mut hints: Vec<Hint> = Vec::new();

    if let Some(from) = from {
        for view in tree.chain(from).filter_map(|id| tree.get(id)) {
            for action in view.actions().iter().filter(|a| !a.hidden) {
                if hints.iter().any(|h| h.button == action.button) {
                    continue;
                }
                hints.push(Hint {
                    button: action.button,
                    text: action.hint.clone(),
                    available: action.available,
                });
            }
        }
    }

    if !hints.iter().any(|h| h.button == ControllerButton::A) {
        hints.push(Hint {
            button: ControllerButton::A,
            text: DEFAULT_CONFIRM_HINT.to_string(),
            available: false,
        });
    }

    hints.sort_by(compare_hints);
    hints
}

fn hint_rank(button: ControllerButton) -> u8 {
    match button {
        ControllerButton::Start => 0,
        ControllerButton::B => 2,
        ControllerButton::A => 3,
        _ => 1,
    }
}

fn compare_hints(a: &Hint, b: &Hint) -> Ordering {
    hint_rank(a.button).cmp(&hint_rank(b.button))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    use super::*;
    use crate::domain::geometry::Rect;

    fn list_with_cell() -> (ViewTree, ViewId, ViewId) {
        let mut tree = ViewTree::new();
        let list = tree.add_root("list", Rect::new(0.0, 0.0, 100.0, 100.0));
        let cell = tree.add_child(list, "cell", Rect::new(0.0, 0.0, 100.0, 20.0)).unwrap();
        (tree, list, cell)
    }

    // ── dispatch_action ───────────────────────────────────────────────────────

    #[test]
    fn test_dispatch_runs_closest_action_first() {
        // Arrange
        let (mut tree, list, cell) = list_with_cell();
        let list_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&list_calls);
        tree.get_mut(list).unwrap().register_action("Back", ControllerButton::B, false, move |_| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
            true
        });
        let cell_action =
            tree.get_mut(cell).unwrap().register_action("Close", ControllerButton::B, false, |_| true);

        // Act
        let outcome = dispatch_action(&mut tree, cell, ControllerButton::B);

        // Assert
        assert_eq!(outcome, Dispatch::Consumed { view: cell, action: cell_action });
        assert_eq!(list_calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_continues_when_callback_declines() {
        let (mut tree, list, cell) = list_with_cell();
        tree.get_mut(cell).unwrap().register_action("Maybe", ControllerButton::X, false, |_| false);
        let list_action =
            tree.get_mut(list).unwrap().register_action("Sort", ControllerButton::X, false, |_| true);

        let outcome = dispatch_action(&mut tree, cell, ControllerButton::X);

        assert_eq!(outcome, Dispatch::Consumed { view: list, action: list_action });
    }

    #[test]
    fn test_dispatch_skips_unavailable_actions() {
        let (mut tree, list, cell) = list_with_cell();
        let cell_view = tree.get_mut(cell).unwrap();
        let disabled = cell_view.register_action("Delete", ControllerButton::Y, false, |_| true);
        cell_view.set_action_available(disabled, false).unwrap();

        assert_eq!(dispatch_action(&mut tree, cell, ControllerButton::Y), Dispatch::Ignored);

        tree.get_mut(list).unwrap().register_action("Search", ControllerButton::Y, false, |_| true);
        assert!(matches!(
            dispatch_action(&mut tree, cell, ControllerButton::Y),
            Dispatch::Consumed { view, .. } if view == list
        ));
    }

    #[test]
    fn test_callback_receives_owning_view() {
        let (mut tree, list, cell) = list_with_cell();
        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        let sink = Arc::clone(&seen);
        tree.get_mut(list).unwrap().register_action("Menu", ControllerButton::Start, false, move |v| {
            sink.store(v.0 as usize, AtomicOrdering::SeqCst);
            true
        });

        dispatch_action(&mut tree, cell, ControllerButton::Start);

        assert_eq!(seen.load(AtomicOrdering::SeqCst), list.0 as usize);
    }

    // ── collect_hints ─────────────────────────────────────────────────────────

    #[test]
    fn test_hints_are_sorted_start_others_back_confirm() {
        // Arrange
        let (mut tree, list, cell) = list_with_cell();
        let cell_view = tree.get_mut(cell).unwrap();
        cell_view.register_action("Open", ControllerButton::A, false, |_| true);
        cell_view.register_action("Details", ControllerButton::X, false, |_| true);
        let list_view = tree.get_mut(list).unwrap();
        list_view.register_action("Back", ControllerButton::B, false, |_| true);
        list_view.register_action("Menu", ControllerButton::Start, false, |_| true);
        list_view.register_action("Search", ControllerButton::Y, false, |_| true);

        // Act
        let buttons: Vec<ControllerButton> =
            collect_hints(&tree, Some(cell)).into_iter().map(|h| h.button).collect();

        // Assert
        assert_eq!(
            buttons,
            vec![
                ControllerButton::Start,
                ControllerButton::X,
                ControllerButton::Y,
                ControllerButton::B,
                ControllerButton::A,
            ]
        );
    }

    #[test]
    fn test_hints_skip_hidden_and_keep_closest_per_button() {
        let (mut tree, list, cell) = list_with_cell();
        tree.get_mut(cell).unwrap().register_action("Secret", ControllerButton::LB, true, |_| true);
        tree.get_mut(cell).unwrap().register_action("Close", ControllerButton::B, false, |_| true);
        tree.get_mut(list).unwrap().register_action("Back", ControllerButton::B, false, |_| true);

        let hints = collect_hints(&tree, Some(cell));

        assert!(hints.iter().all(|h| h.button != ControllerButton::LB));
        let back: Vec<&Hint> = hints.iter().filter(|h| h.button == ControllerButton::B).collect();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].text, "Close");
    }

    #[test]
    fn test_default_confirm_hint_is_added_when_missing() {
        let tree = ViewTree::new();

        let hints = collect_hints(&tree, None);

        assert_eq!(
            hints,
            vec![Hint {
                button: ControllerButton::A,
                text: DEFAULT_CONFIRM_HINT.to_string(),
                available: false,
            }]
        );
    }
}
