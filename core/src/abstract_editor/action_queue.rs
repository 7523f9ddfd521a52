//! Thread-safe action queue for submitting editor actions from shared contexts.
//!
//! [`ActionQueue`] uses interior mutability ([`Mutex`]) so that code with
//! only shared `&self` access (asset reload callbacks, background watchers)
//! can still enqueue actions. The editing thread drains the queue and runs
//! the actions through [`EditActionHistory`], keeping every mutation on one
//! logical thread.

use std::fmt;

use parking_lot::Mutex;

use super::action::{EditAction, Editable};
use super::history::EditActionHistory;

/// A thread-safe queue for submitting [`EditAction`]s from shared contexts.
///
/// # Example
///
/// ```ignore
/// // From a file-watch callback:
/// queue.push(Box::new(SetParameter::new(id, "Texture", value)));
///
/// // Later, on the editing thread:
/// queue.execute_all(&mut history, &mut document);
/// ```
pub struct ActionQueue<T: Editable> {
    queue: Mutex<Vec<Box<dyn EditAction<T>>>>,
}

impl<T: Editable> ActionQueue<T> {
    /// Creates a new empty action queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Enqueues an action. Callable from `&self` thanks to interior mutability.
    pub fn push(&self, action: Box<dyn EditAction<T>>) {
        self.queue.lock().push(action);
    }

    /// Drains all queued actions, returning them in submission order.
    pub fn drain(&self) -> Vec<Box<dyn EditAction<T>>> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Drains the queue and executes each action through `history`.
    ///
    /// Rejected actions are logged and skipped. Returns how many actions
    /// changed the target.
    pub fn execute_all(&self, history: &mut EditActionHistory<T>, target: &mut T) -> usize {
        let mut changed = 0;
        for action in self.drain() {
            let description = action.description().to_owned();
            match history.execute(action, target) {
                Ok(true) => changed += 1,
                Ok(false) => {}
                Err(e) => log::warn!("Queued action \"{description}\" failed: {e}"),
            }
        }
        changed
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns `true` if there are no queued actions.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl<T: Editable> Default for ActionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for ActionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionQueue")
            .field("pending", &self.len())
            .finish()
    }
}
