//! # Hax Definitions
//!
//! Undoable editing of a tree of named definitions.
//!
//! A [`DefinitionStore`] owns the tree: stable ids that are never reused,
//! names unique across the whole tree, ordered children. A [`Document`]
//! wraps the store as the [`Editable`](hax_core::abstract_editor::Editable)
//! target of the actions in [`actions`], which run through
//! [`EditActionHistory`](hax_core::abstract_editor::EditActionHistory) so
//! every change can be undone. [`EditorSession`] wires it all together for
//! the editor UI.

pub mod actions;
pub mod config;
pub mod declaration;
pub mod definition;
pub mod document;
pub mod error;
pub mod naming;
pub mod serialize;
pub mod session;
pub mod store;

pub use config::{ConfigError, EditorConfig};
pub use declaration::{Declaration, DeclarationTable};
pub use definition::{Definition, DefinitionId, ParameterValue, Parameters};
pub use document::{ChangeFlags, Document};
pub use error::{StoreError, StoreResult};
pub use serialize::{DocumentError, DocumentFile};
pub use session::{EditorSession, SessionError, SessionResult};
pub use store::{DefinitionNode, DefinitionStore, RemovedDefinition};
