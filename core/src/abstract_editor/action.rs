//! Editable targets and reversible editor actions.
//!
//! This module defines the core abstractions for an undo/redo editor system:
//!
//! - [`Editable`] — marker trait for types that can be edited
//! - [`EditAction`] — a reversible edit operation (Command pattern)
//! - [`EditActionError`] / [`EditActionResult`] — error handling for actions
//!
//! EditActions are self-contained: each implementation internally stores whatever
//! data it needs (target identifiers, old/new values, removed subtrees, etc.).

use std::any::Any;
use std::fmt;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. The history uses
/// [`as_any_mut`](Self::as_any_mut) to reach the open
/// [`ActionGroup`](super::ActionGroup) at the top of the undo stack.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// Implement this on any type that actions can operate on: a definition
/// document, a curve editor, a settings page, etc.
///
/// # Example
///
/// ```ignore
/// struct MyDocument { /* ... */ }
/// impl Editable for MyDocument {}
/// ```
pub trait Editable: 'static {}

/// Error type for action execution failures.
///
/// Every variant except [`InvalidCapacity`](Self::InvalidCapacity) is a
/// precondition failure: the action left the target untouched and was not
/// recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditActionError {
    /// The target object was not found.
    TargetNotFound(String),
    /// The target is in an invalid state for this action.
    InvalidState(String),
    /// The action was refused, e.g. renaming onto a name already in use.
    /// The message is suitable for showing to the user.
    Rejected(String),
    /// A history was configured with a negative undo capacity.
    InvalidCapacity(i64),
    /// A custom error with a description.
    Custom(String),
}

impl fmt::Display for EditActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(msg) => write!(f, "target not found: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Rejected(msg) => write!(f, "{msg}"),
            Self::InvalidCapacity(n) => {
                write!(f, "undo capacity must be 0 or more, got {n}")
            }
            Self::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EditActionError {}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A reversible editor action (Command pattern).
///
/// EditActions encapsulate a single logical edit and capture enough state to
/// undo the change and redo it. Each implementation stores its own data
/// internally; there is no prescribed property system.
///
/// # Outcome of `apply`
///
/// - `Ok(true)` — the target changed; the history records the action.
/// - `Ok(false)` — nothing changed (renaming to the current name, sorting an
///   already sorted list). Not recorded.
/// - `Err(_)` — a precondition failed. Not recorded, target untouched.
///
/// # Grouping
///
/// Actions that form one logical stroke (each mouse move during a slider
/// drag) return the same non-zero [`group_key`](Self::group_key). The
/// history folds consecutive actions with the same key into one
/// [`ActionGroup`](super::ActionGroup) that is undone and redone as a
/// single step.
///
/// # Object Safety
///
/// This trait is dyn-compatible so that different action types can be stored
/// in a single [`EditActionHistory`](super::EditActionHistory) undo/redo stack as
/// `Box<dyn EditAction<T>>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct SetOpacity {
///     id: DefinitionId,
///     old: f64,
///     new: f64,
/// }
///
/// impl EditAction<Document> for SetOpacity {
///     fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
///         self.old = doc.opacity(self.id);
///         doc.set_opacity(self.id, self.new);
///         Ok(self.old != self.new)
///     }
///
///     fn undo(&mut self, doc: &mut Document) -> EditActionResult {
///         doc.set_opacity(self.id, self.old);
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Set opacity"
///     }
///
///     fn group_key(&self) -> u32 {
///         OPACITY_SLIDER_GROUP
///     }
/// }
/// ```
pub trait EditAction<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the action to the target (forward / redo direction).
    ///
    /// Returns whether the target actually changed. Must not mutate the
    /// target when returning `Ok(false)` or an error.
    fn apply(&mut self, target: &mut T) -> EditActionResult<bool>;

    /// Reverses the action (undo direction).
    ///
    /// Only called after a successful [`apply`](Self::apply). Must restore the
    /// target to the exact state before it.
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// A short, human-readable description for display in the edit menu.
    ///
    /// Examples: `"Add definition"`, `"Rename definition"`, `"Sort by name"`.
    fn description(&self) -> &str;

    /// Group key for coalescing consecutive actions into one undo step.
    ///
    /// `0` means "never group". Default: `0`.
    fn group_key(&self) -> u32 {
        0
    }

    /// Whether this action is recorded in the undo/redo history.
    ///
    /// Return `false` for operations that must happen but should not be
    /// undoable, such as creating the initial content of a new document.
    ///
    /// Default: `true`.
    fn is_recorded(&self) -> bool {
        true
    }
}
