//! The view tree, reduced to what input and focus handling need.
//!
//! Layout, drawing and inflation belong to outer layers.  This module only
//! keeps what the core reads (boundary, parent, children, actions, opacity)
//! and what it writes (focus flag, highlight animation, shake, recognizer
//! states).
//!
//! # Arena instead of pointers (for beginners)
//!
//! Views are stored in a `HashMap<ViewId, View>` owned by [`ViewTree`].  A
//! child refers to its parent by [`ViewId`], never by reference, so there is no
//! reverse ownership edge: removing a view drops it (and its recognizers) in
//! one place, and a stale id simply fails to resolve.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

use super::action::{Action, ActionCallback, ActionId};
use super::geometry::{Point, Rect};
use super::input::ControllerButton;
use crate::focus::highlight::HighlightAnimation;
use crate::focus::shake::ShakeAnimation;
use crate::gesture::{GestureRecognizer, PointerEvent, RecognizerId, RecognizerSlot};

/// Identifies a view inside one [`ViewTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Called synchronously after a view gains focus.
pub type FocusListener = Box<dyn FnMut(ViewId) + Send>;

/// Receives every pointer event targeted at a view, claimed or not.
pub type PointerHandler = Box<dyn FnMut(&PointerEvent) + Send>;

/// Errors returned by structural tree operations.
#[derive(Debug, Error, PartialEq)]
pub enum ViewTreeError {
    #[error("unknown view: {0}")]
    UnknownView(ViewId),

    #[error("unknown gesture recognizer {recognizer:?} on {view}")]
    UnknownRecognizer { view: ViewId, recognizer: RecognizerId },

    #[error("unknown action {action:?} on {view}")]
    UnknownAction { view: ViewId, action: ActionId },

    #[error("cannot move {view} under {parent}: it would become its own ancestor")]
    Cycle { view: ViewId, parent: ViewId },
}

/// A node of the view tree.
pub struct View {
    id: ViewId,
    name: String,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
    boundary: Rect,
    dirty: bool,
    alpha: f32,
    focusable: bool,
    focused: bool,
    highlight: HighlightAnimation,
    shake: Option<ShakeAnimation>,
    actions: Vec<Action>,
    recognizers: Vec<RecognizerSlot>,
    focus_listener: Option<FocusListener>,
    pointer_handler: Option<PointerHandler>,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("boundary", &self.boundary)
            .field("focused", &self.focused)
            .field("actions", &self.actions.len())
            .field("recognizers", &self.recognizers.len())
            .finish()
    }
}

impl View {
    fn new(id: ViewId, name: &str, parent: Option<ViewId>, boundary: Rect) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent,
            children: Vec::new(),
            boundary,
            dirty: true,
            alpha: 1.0,
            focusable: false,
            focused: false,
            highlight: HighlightAnimation::default(),
            shake: None,
            actions: Vec::new(),
            recognizers: Vec::new(),
            focus_listener: None,
            pointer_handler: None,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// Sets the boundary computed by the layout pass and clears the dirty flag.
    pub fn set_boundary(&mut self, boundary: Rect) {
        self.boundary = boundary;
        self.dirty = false;
    }

    /// `true` until the layout pass assigns a boundary.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Requests a new layout pass for this view.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// The view's own alpha; see [`ViewTree::effective_alpha`] for the composed value.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Read-only access to the highlight animation for the drawing layer.
    pub fn highlight(&self) -> &HighlightAnimation {
        &self.highlight
    }

    /// Current highlight alpha.
    pub fn highlight_alpha(&self, now: Duration) -> f32 {
        self.highlight.value_at(now)
    }

    pub fn shake(&self) -> Option<&ShakeAnimation> {
        self.shake.as_ref()
    }

    /// Rectangle the highlight is drawn in: the boundary displaced by the
    /// running shake, if any.  The content rectangle never moves.
    pub fn highlight_rect(&self, now: Duration) -> Rect {
        match &self.shake {
            Some(shake) => {
                let (dx, dy) = shake.offset(now);
                self.boundary.translated(dx, dy)
            }
            None => self.boundary,
        }
    }

    pub fn set_focus_listener(&mut self, listener: impl FnMut(ViewId) + Send + 'static) {
        self.focus_listener = Some(Box::new(listener));
    }

    pub fn set_pointer_handler(&mut self, handler: impl FnMut(&PointerEvent) + Send + 'static) {
        self.pointer_handler = Some(Box::new(handler));
    }

    // ── Focus (driven by `FocusManager`) ──────────────────────────────────────

    pub(crate) fn gain_focus(&mut self, now: Duration, duration: Duration) {
        self.focused = true;
        self.highlight.retarget(1.0, now, duration);
        if let Some(listener) = self.focus_listener.as_mut() {
            listener(self.id);
        }
    }

    pub(crate) fn lose_focus(&mut self, now: Duration, duration: Duration) {
        self.highlight.retarget(0.0, now, duration);
        self.focused = false;
    }

    pub(crate) fn start_shake(&mut self, shake: ShakeAnimation) {
        self.shake = Some(shake);
    }

    /// Drops a shake whose time is up.
    pub(crate) fn clear_finished_shake(&mut self, now: Duration) {
        if self.shake.as_ref().is_some_and(|s| s.is_finished(now)) {
            self.shake = None;
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    /// Binds `button` to `callback`.  A previous action on the same button is
    /// replaced (and keeps its id).
    pub fn register_action(
        &mut self,
        hint: &str,
        button: ControllerButton,
        hidden: bool,
        callback: impl FnMut(ViewId) -> bool + Send + 'static,
    ) -> ActionId {
        let callback: ActionCallback = Box::new(callback);
        if let Some(existing) = self.actions.iter_mut().find(|a| a.button == button) {
            existing.hint = hint.to_string();
            existing.hidden = hidden;
            existing.available = true;
            existing.callback = callback;
            return existing.id;
        }
        let id = ActionId(self.actions.len() as u32);
        self.actions.push(Action {
            id,
            button,
            hint: hint.to_string(),
            available: true,
            hidden,
            callback,
        });
        id
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub(crate) fn actions_mut(&mut self) -> &mut [Action] {
        &mut self.actions
    }

    /// Changes the hint text of an action.
    pub fn update_action_hint(&mut self, action: ActionId, hint: &str) -> Result<(), ViewTreeError> {
        let view = self.id;
        let entry = self
            .actions
            .iter_mut()
            .find(|a| a.id == action)
            .ok_or(ViewTreeError::UnknownAction { view, action })?;
        entry.hint = hint.to_string();
        Ok(())
    }

    /// Marks an action (un)available for dispatch.  Unavailable actions keep
    /// their hint.
    pub fn set_action_available(
        &mut self,
        action: ActionId,
        available: bool,
    ) -> Result<(), ViewTreeError> {
        let view = self.id;
        let entry = self
            .actions
            .iter_mut()
            .find(|a| a.id == action)
            .ok_or(ViewTreeError::UnknownAction { view, action })?;
        entry.available = available;
        Ok(())
    }

    // ── Gesture recognizers ───────────────────────────────────────────────────

    /// Attaches a recognizer.  Registration order is the arbitration priority
    /// among this view's recognizers.
    pub fn add_gesture_recognizer(&mut self, recognizer: Box<dyn GestureRecognizer>) -> RecognizerId {
        let id = RecognizerId(
            self.recognizers.iter().map(|r| r.id().0 + 1).max().unwrap_or(0),
        );
        trace!(view = %self.id, recognizer = recognizer.name(), "gesture recognizer attached");
        self.recognizers.push(RecognizerSlot::new(id, recognizer));
        id
    }

    /// Detaches and drops a recognizer, interrupting it first.
    pub fn remove_gesture_recognizer(&mut self, id: RecognizerId) -> Result<(), ViewTreeError> {
        let index = self
            .recognizers
            .iter()
            .position(|r| r.id() == id)
            .ok_or(ViewTreeError::UnknownRecognizer { view: self.id, recognizer: id })?;
        let mut slot = self.recognizers.remove(index);
        slot.interrupt(false);
        Ok(())
    }

    pub fn gesture_recognizers(&self) -> &[RecognizerSlot] {
        &self.recognizers
    }

    pub(crate) fn gesture_recognizers_mut(&mut self) -> &mut [RecognizerSlot] {
        &mut self.recognizers
    }

    pub fn gesture_recognizer(&self, id: RecognizerId) -> Option<&RecognizerSlot> {
        self.recognizers.iter().find(|r| r.id() == id)
    }

    pub fn gesture_recognizer_mut(&mut self, id: RecognizerId) -> Option<&mut RecognizerSlot> {
        self.recognizers.iter_mut().find(|r| r.id() == id)
    }

    /// Interrupts every recognizer on this view.
    pub fn interrupt_gestures(&mut self, only_if_unsure: bool) {
        for slot in &mut self.recognizers {
            slot.interrupt(only_if_unsure);
        }
    }

    /// Hands a raw pointer event to the view's pointer handler, if any.
    pub fn deliver_pointer(&mut self, event: &PointerEvent) {
        if let Some(handler) = self.pointer_handler.as_mut() {
            handler(event);
        }
    }
}

/// Owns every view; parents and children refer to each other by id.
#[derive(Debug, Default)]
pub struct ViewTree {
    views: HashMap<ViewId, View>,
    roots: Vec<ViewId>,
    next_id: u32,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a top-level view.
    pub fn add_root(&mut self, name: &str, boundary: Rect) -> ViewId {
        let id = self.allocate_id();
        self.views.insert(id, View::new(id, name, None, boundary));
        self.roots.push(id);
        id
    }

    /// Adds `name` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewTreeError::UnknownView`] if `parent` is not in the tree.
    pub fn add_child(&mut self, parent: ViewId, name: &str, boundary: Rect) -> Result<ViewId, ViewTreeError> {
        if !self.views.contains_key(&parent) {
            return Err(ViewTreeError::UnknownView(parent));
        }
        let id = self.allocate_id();
        self.views.insert(id, View::new(id, name, Some(parent), boundary));
        if let Some(p) = self.views.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Removes `id` and its whole subtree.  Recognizers of removed views are
    /// interrupted before being dropped.
    ///
    /// Returns the removed ids, `id` first.
    ///
    /// # Errors
    ///
    /// Returns [`ViewTreeError::UnknownView`] if `id` is not in the tree.
    pub fn remove(&mut self, id: ViewId) -> Result<Vec<ViewId>, ViewTreeError> {
        let parent = self.views.get(&id).ok_or(ViewTreeError::UnknownView(id))?.parent;

        match parent {
            Some(p) => {
                if let Some(p) = self.views.get_mut(&p) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(mut view) = self.views.remove(&next) {
                view.interrupt_gestures(false);
                stack.extend(view.children.iter().rev().copied());
                removed.push(next);
            }
        }
        debug!(view = %id, count = removed.len(), "views detached");
        Ok(removed)
    }

    /// Moves `id` (with its subtree) to the end of `new_parent`'s children.
    ///
    /// # Errors
    ///
    /// [`ViewTreeError::UnknownView`] if either view is missing,
    /// [`ViewTreeError::Cycle`] if `new_parent` is `id` or one of its descendants.
    pub fn reparent(&mut self, id: ViewId, new_parent: ViewId) -> Result<(), ViewTreeError> {
        if !self.contains(id) {
            return Err(ViewTreeError::UnknownView(id));
        }
        if !self.contains(new_parent) {
            return Err(ViewTreeError::UnknownView(new_parent));
        }
        if self.chain(new_parent).any(|v| v == id) {
            return Err(ViewTreeError::Cycle { view: id, parent: new_parent });
        }

        match self.parent(id) {
            Some(old) => {
                if let Some(old) = self.views.get_mut(&old) {
                    old.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        if let Some(view) = self.views.get_mut(&id) {
            view.parent = Some(new_parent);
            view.dirty = true;
        }
        if let Some(parent) = self.views.get_mut(&new_parent) {
            parent.children.push(id);
        }
        Ok(())
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(&id)
    }

    pub fn roots(&self) -> &[ViewId] {
        &self.roots
    }

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(&id).and_then(|v| v.parent)
    }

    /// `id` followed by its ancestors up to the root.  Empty if `id` is unknown.
    pub fn chain(&self, id: ViewId) -> Chain<'_> {
        Chain {
            tree: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// Own alpha multiplied by every ancestor's alpha, computed from the
    /// current tree on each call.
    pub fn effective_alpha(&self, id: ViewId) -> f32 {
        if !self.contains(id) {
            return 0.0;
        }
        self.chain(id)
            .filter_map(|v| self.views.get(&v))
            .map(|v| v.alpha)
            .product()
    }

    /// Returns the deepest visible view containing `point`.
    ///
    /// Later siblings are considered on top of earlier ones.  Views whose own
    /// alpha is zero are skipped together with their subtree.
    pub fn hit_test(&self, point: Point) -> Option<ViewId> {
        self.roots
            .iter()
            .rev()
            .find_map(|root| self.hit_test_from(*root, point))
    }

    fn hit_test_from(&self, id: ViewId, point: Point) -> Option<ViewId> {
        let view = self.views.get(&id)?;
        if view.alpha <= 0.0 || !view.boundary.contains(point) {
            return None;
        }
        view.children
            .iter()
            .rev()
            .find_map(|child| self.hit_test_from(*child, point))
            .or(Some(id))
    }

    /// Every focusable view that is currently visible, sorted by id.
    pub fn focusable_views(&self) -> Vec<ViewId> {
        let mut ids: Vec<ViewId> = self
            .views
            .values()
            .filter(|v| v.focusable)
            .map(|v| v.id)
            .filter(|id| self.effective_alpha(*id) > 0.0)
            .collect();
        ids.sort();
        ids
    }

    /// Clears shakes that have run their course.
    pub fn tick_animations(&mut self, now: Duration) {
        for view in self.views.values_mut() {
            view.clear_finished_shake(now);
        }
    }

    /// Interrupts the recognizers of every view.
    pub fn interrupt_all_gestures(&mut self, only_if_unsure: bool) {
        for view in self.views.values_mut() {
            view.interrupt_gestures(only_if_unsure);
        }
    }
}

/// Iterator returned by [`ViewTree::chain`].
pub struct Chain<'a> {
    tree: &'a ViewTree,
    next: Option<ViewId>,
}

impl Iterator for Chain<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
