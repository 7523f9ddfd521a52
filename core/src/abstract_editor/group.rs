//! Grouped actions undone and redone as one step.

use std::fmt;

use super::action::{EditAction, EditActionResult, Editable};

/// An ordered run of actions that share a non-zero group key.
///
/// Created by [`EditActionHistory`](super::EditActionHistory) when an action
/// with a non-zero [`group_key`](EditAction::group_key) is executed and no
/// group with that key is open. Later actions with the same key are appended
/// until the group is closed by a different key, an undo/redo, or an explicit
/// [`end_group`](super::EditActionHistory::end_group).
///
/// The group is itself an [`EditAction`] with key `0`, so once it sits on the
/// redo stack it is replayed as a standalone entry.
pub struct ActionGroup<T: Editable> {
    key: u32,
    actions: Vec<Box<dyn EditAction<T>>>,
}

impl<T: Editable> ActionGroup<T> {
    /// Creates an empty group for `key`.
    pub fn new(key: u32) -> Self {
        debug_assert_ne!(key, 0, "group key 0 means \"never group\"");
        Self {
            key,
            actions: Vec::new(),
        }
    }

    /// The key this group collects.
    pub fn key(&self) -> u32 {
        self.key
    }

    /// Appends an already applied action.
    pub fn push(&mut self, action: Box<dyn EditAction<T>>) {
        self.actions.push(action);
    }

    /// Number of member actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates member actions in execution order.
    pub fn actions(&self) -> impl Iterator<Item = &dyn EditAction<T>> {
        self.actions.iter().map(|a| a.as_ref())
    }
}

impl<T: Editable> fmt::Debug for ActionGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("key", &self.key)
            .field("actions", &self.actions)
            .finish()
    }
}

impl<T: Editable> EditAction<T> for ActionGroup<T> {
    /// Replays every member in order. The group changed the target if any
    /// member did. A member that fails during replay is logged and counted
    /// as "no change" so the remaining members still run.
    fn apply(&mut self, target: &mut T) -> EditActionResult<bool> {
        let mut any_applied = false;
        for action in &mut self.actions {
            match action.apply(target) {
                Ok(applied) => any_applied |= applied,
                Err(e) => log::warn!(
                    "Grouped action \"{}\" failed to replay: {e}",
                    action.description()
                ),
            }
        }
        Ok(any_applied)
    }

    /// Undoes members in reverse order. Every member is attempted; the first
    /// error is returned.
    fn undo(&mut self, target: &mut T) -> EditActionResult {
        let mut first_error = None;
        for action in self.actions.iter_mut().rev() {
            if let Err(e) = action.undo(target) {
                log::error!("Grouped action \"{}\" failed to undo: {e}", action.description());
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn description(&self) -> &str {
        self.actions
            .last()
            .map_or("Grouped edit", |a| a.description())
    }
}
