//! Undoable edits of a [`Document`](crate::Document).
//!
//! Every action validates through the [`DefinitionStore`](crate::DefinitionStore)
//! before changing anything, reports `Ok(false)` when the edit would be a
//! no-op, and raises the document's change flags when it does change
//! something. All of them accept a group key through `in_group`.

mod add;
mod parameter;
mod remove;
mod rename;
mod reorder;
mod reparent;

pub use add::AddDefinition;
pub use parameter::SetParameter;
pub use remove::RemoveDefinition;
pub use rename::RenameDefinition;
pub use reorder::{MoveDefinition, SortDefinitions};
pub use reparent::ReparentDefinition;
