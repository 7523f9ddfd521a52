//! Abstract editor framework for reversible editing operations.
//!
//! This module provides the foundational traits and types for building
//! an undo/redo-capable editor system. It is decoupled from specific
//! editable types (definition trees, curves, settings) so that higher-level
//! crates can implement concrete editors.
//!
//! - [`Editable`] — marker trait for types that can be edited
//! - [`EditAction`] — an edit operation (Command pattern)
//! - [`ActionGroup`] — a run of actions undone/redone as one step
//! - [`EditActionHistory`] — undo/redo stack managing action sequences
//! - [`HistoryEvent`] — before/after/undo/redo notifications for views
//! - [`ActionQueue`] — thread-safe queue for submitting actions from shared contexts
//!
//! # Recorded vs non-recorded actions
//!
//! By default, actions that report a change are **recorded** in the
//! undo/redo history. Override [`EditAction::is_recorded`] to return `false`
//! for operations that must run but should not be undoable, like creating
//! the initial content of a fresh document.
//!
//! # Grouping
//!
//! Actions returning the same non-zero [`EditAction::group_key`] from
//! consecutive executions are folded into one [`ActionGroup`]. Call
//! [`EditActionHistory::end_group`] when the gesture ends so the next
//! gesture becomes its own undo step.

mod action;
mod action_queue;
mod events;
mod group;
mod history;

pub use action::{AsAny, EditAction, EditActionError, EditActionResult, Editable};
pub use action_queue::ActionQueue;
pub use events::{HistoryEvent, SubscriptionId};
pub use group::ActionGroup;
pub use history::{DEFAULT_MAX_UNDO, EditActionHistory};
