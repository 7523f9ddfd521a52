//! Errors reported by the definition store.

use hax_core::abstract_editor::EditActionError;

use crate::definition::DefinitionId;

/// A rejected store operation. The store is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("a definition named \"{0}\" already exists")]
    DuplicateName(String),
    #[error("definition {0} does not exist")]
    UnknownId(DefinitionId),
    #[error("index {index} is out of range for a collection of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("definition is already named \"{0}\"")]
    SameName(String),
    #[error("definition names must not be empty")]
    EmptyName,
    #[error("definition {id} cannot be moved under its own descendant {parent}")]
    CyclicParent {
        id: DefinitionId,
        parent: DefinitionId,
    },
    #[error("definition id {0} is used more than once")]
    DuplicateId(DefinitionId),
    #[error("definition {id} has no parameter \"{name}\"")]
    UnknownParameter { id: DefinitionId, name: String },
    #[error("restored order does not match the children of {0}")]
    OrderMismatch(String),
    #[error("no definition ids left to allocate")]
    IdsExhausted,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for EditActionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownId(id) => EditActionError::TargetNotFound(format!("definition {id}")),
            other => EditActionError::Rejected(other.to_string()),
        }
    }
}
