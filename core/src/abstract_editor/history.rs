//! Undo/redo action history.
//!
//! [`EditActionHistory`] manages a linear undo/redo stack of [`EditAction`] trait
//! objects. When a new action is pushed after undoing, the redo stack is
//! cleared (standard editor behavior). Consecutive actions sharing a non-zero
//! [group key](EditAction::group_key) are folded into one [`ActionGroup`].

use std::collections::VecDeque;
use std::fmt;

use super::action::{EditAction, EditActionError, EditActionResult, Editable};
use super::events::{HistoryEvent, Listeners, SubscriptionId};
use super::group::ActionGroup;

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Manages an undo/redo stack of editor actions.
///
/// The undo stack is a bounded [`VecDeque`]; when it exceeds `max_undo`,
/// the oldest entry is dropped from the front. The redo stack is an
/// unbounded [`Vec`] (it can never grow larger than the undo stack was).
/// With `max_undo == 0` actions still execute but nothing is retained.
///
/// # Example
///
/// ```ignore
/// let mut history = EditActionHistory::new(50);
/// let mut doc = Document::default();
///
/// // Execute and record an action
/// history.execute(Box::new(my_action), &mut doc)?;
///
/// // Undo the last action
/// history.undo(&mut doc)?;
///
/// // Redo it
/// history.redo(&mut doc)?;
/// ```
pub struct EditActionHistory<T: Editable> {
    undo_stack: VecDeque<Box<dyn EditAction<T>>>,
    redo_stack: Vec<Box<dyn EditAction<T>>>,
    max_undo: usize,
    /// Key of the [`ActionGroup`] at the back of the undo stack while it
    /// still accepts members.
    open_group: Option<u32>,
    /// Tracks distance from the saved state.
    ///
    /// - `Some(0)` — the current state matches the last save.
    /// - `Some(n)` where `n > 0` — `n` undos needed to reach the saved state.
    /// - `Some(n)` where `n < 0` — `|n|` redos needed to reach the saved state.
    /// - `None` — never saved, or the save point is permanently unreachable
    ///   (e.g. after capacity overflow dropped it, or the redo branch was discarded).
    save_distance: Option<i64>,
    listeners: Listeners,
}

impl<T: Editable> EditActionHistory<T> {
    /// Creates a new empty action history with the given maximum undo depth.
    ///
    /// When the undo stack exceeds `max_undo`, the oldest entry is dropped.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
            open_group: None,
            save_distance: Some(0),
            listeners: Listeners::default(),
        }
    }

    /// Creates a history from a signed capacity, as read from user settings.
    ///
    /// Negative capacities are rejected with
    /// [`EditActionError::InvalidCapacity`].
    pub fn try_new(max_undo: i64) -> EditActionResult<Self> {
        let max_undo =
            usize::try_from(max_undo).map_err(|_| EditActionError::InvalidCapacity(max_undo))?;
        Ok(Self::new(max_undo))
    }

    /// Registers a listener for [`HistoryEvent`]s.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(HistoryEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Applies an action to the target and, if it changed something and is
    /// [recorded](EditAction::is_recorded), pushes it onto the undo stack.
    ///
    /// Returns `Ok(true)` if the target changed. `Ok(false)` (no-op) and
    /// errors leave both stacks and the open group untouched.
    ///
    /// A recorded action clears the redo stack. If its group key is non-zero
    /// and equals the open group's key it joins that group; otherwise it
    /// becomes a new undo entry, which also closes the open group.
    pub fn execute(
        &mut self,
        action: Box<dyn EditAction<T>>,
        target: &mut T,
    ) -> EditActionResult<bool> {
        self.listeners.emit(HistoryEvent::BeforeChange);
        let result = self.execute_internal(action, target, true);
        self.listeners.emit(HistoryEvent::AfterChange);
        result
    }

    fn execute_internal(
        &mut self,
        mut action: Box<dyn EditAction<T>>,
        target: &mut T,
        fresh: bool,
    ) -> EditActionResult<bool> {
        match action.apply(target) {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("\"{}\" changed nothing, not recorded", action.description());
                return Ok(false);
            }
            Err(e) => {
                log::debug!("\"{}\" rejected: {e}", action.description());
                return Err(e);
            }
        }

        if !action.is_recorded() {
            return Ok(true);
        }

        if fresh {
            // Clearing the redo stack invalidates a save point that was in redo.
            self.redo_stack.clear();
            if let Some(d) = self.save_distance
                && d < 0
            {
                self.save_distance = None;
            }
        }

        // Redo replays whole entries; they never join a group.
        let key = if fresh { action.group_key() } else { 0 };
        if key == 0 {
            self.open_group = None;
            self.push_entry(action);
            return Ok(true);
        }

        if self.open_group == Some(key)
            && let Some(group) = self.open_group_mut()
        {
            group.push(action);
            return Ok(true);
        }

        let mut group = ActionGroup::new(key);
        group.push(action);
        self.open_group = (self.max_undo > 0).then_some(key);
        self.push_entry(Box::new(group));
        Ok(true)
    }

    fn open_group_mut(&mut self) -> Option<&mut ActionGroup<T>> {
        let last = self.undo_stack.back_mut()?;
        (**last).as_any_mut().downcast_mut::<ActionGroup<T>>()
    }

    fn push_entry(&mut self, action: Box<dyn EditAction<T>>) {
        if self.max_undo == 0 {
            // History disabled: the change can never be walked back.
            self.save_distance = None;
            return;
        }

        // New entry pushed, save point moves one step further away.
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }

        self.undo_stack.push_back(action);
        while self.undo_stack.len() > self.max_undo {
            if let Some(dropped) = self.undo_stack.pop_front() {
                log::debug!("Undo capacity reached, dropping \"{}\"", dropped.description());
            }
            // If the save point was beyond the oldest surviving entry, it's gone.
            if let Some(d) = self.save_distance
                && d > self.undo_stack.len() as i64
            {
                self.save_distance = None;
            }
        }
    }

    /// Closes the open group if its key equals `key`.
    ///
    /// The next action with the same key starts a fresh undo step. Used to
    /// split strokes, e.g. when a slider drag is released.
    pub fn end_group(&mut self, key: u32) {
        if self.open_group == Some(key) {
            self.open_group = None;
        }
    }

    /// Undoes the most recent entry.
    ///
    /// Always closes the open group. Returns `Ok(false)` when there is
    /// nothing to undo. If the entry fails to undo it is discarded and the
    /// error returned.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult<bool> {
        self.open_group = None;
        let Some(mut action) = self.undo_stack.pop_back() else {
            return Ok(false);
        };

        self.listeners.emit(HistoryEvent::BeforeChange);
        let result = match action.undo(target) {
            Ok(()) => {
                self.redo_stack.push(action);
                if let Some(d) = &mut self.save_distance {
                    *d -= 1;
                }
                self.listeners.emit(HistoryEvent::Undo);
                Ok(true)
            }
            Err(e) => {
                log::error!("Undo of \"{}\" failed: {e}", action.description());
                self.save_distance = None;
                Err(e)
            }
        };
        self.listeners.emit(HistoryEvent::AfterChange);
        result
    }

    /// Redoes the most recently undone entry.
    ///
    /// Always closes the open group. The entry is re-applied through the
    /// same path as [`execute`](Self::execute) but keeps the redo stack and
    /// stays a standalone undo entry. Returns `Ok(false)` when there is
    /// nothing to redo; an entry that no longer changes anything is dropped.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult<bool> {
        self.open_group = None;
        let Some(action) = self.redo_stack.pop() else {
            return Ok(false);
        };

        self.listeners.emit(HistoryEvent::BeforeChange);
        let result = self.execute_internal(action, target, false);
        match &result {
            Ok(true) => self.listeners.emit(HistoryEvent::Redo),
            Ok(false) | Err(_) => {
                log::warn!("Redo entry could not be replayed and was dropped");
                if let Some(d) = self.save_distance
                    && d < 0
                {
                    self.save_distance = None;
                }
            }
        }
        self.listeners.emit(HistoryEvent::AfterChange);
        result
    }

    /// Returns `true` if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns an iterator over undo entry descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Returns an iterator over redo entry descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    /// Returns the number of entries in the undo stack.
    ///
    /// A group counts as one entry.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of entries in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Returns the maximum undo depth.
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Returns the key of the group still accepting actions, if any.
    pub fn open_group(&self) -> Option<u32> {
        self.open_group
    }

    /// Records the current state as the saved state.
    ///
    /// After calling this, [`has_unsaved_changes`](Self::has_unsaved_changes)
    /// returns `false` until the history is modified by execute, undo, or redo.
    /// Also closes the open group so later edits cannot fold into the
    /// saved step.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
        self.open_group = None;
    }

    /// Returns `true` if the current state differs from the last saved state.
    ///
    /// Returns `true` if [`mark_saved`](Self::mark_saved) has never been called
    /// after a change, or if the history has been modified since the last save,
    /// or if the save point is permanently unreachable (e.g. dropped by
    /// capacity overflow or the redo branch was discarded).
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }

    /// Clears both stacks and forgets the open group.
    ///
    /// If the current state was the saved state (`has_unsaved_changes` was
    /// `false`), it remains so after clearing. Otherwise the save point is
    /// permanently lost.
    pub fn clear(&mut self) {
        self.listeners.emit(HistoryEvent::BeforeChange);
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_group = None;
        // If we were at the save point, clearing history doesn't change
        // the target, so we are still at the saved state. Otherwise the
        // save point is unreachable.
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
        self.listeners.emit(HistoryEvent::AfterChange);
    }
}

impl<T: Editable> fmt::Debug for EditActionHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("open_group", &self.open_group)
            .field("save_distance", &self.save_distance)
            .field("listeners", &self.listeners)
            .finish()
    }
}
