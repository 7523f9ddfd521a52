//! The edit target: a definition tree plus the flags views poll.

use hax_core::abstract_editor::Editable;

use crate::definition::DefinitionId;
use crate::store::DefinitionStore;

/// What views should refresh after the last batch of edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeFlags {
    /// The tree structure or a name changed.
    pub update_tree: bool,
    /// Definition the tree view should focus, if any.
    pub select: Option<DefinitionId>,
    /// The document content changed.
    pub modified: bool,
}

impl ChangeFlags {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A definition tree being edited.
///
/// Actions mutate the [`store`](Self::store_mut) and raise [`ChangeFlags`];
/// the UI drains them with [`take_flags`](Self::take_flags) once per frame.
#[derive(Debug, Clone, Default)]
pub struct Document {
    store: DefinitionStore,
    flags: ChangeFlags,
}

impl Editable for Document {}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: DefinitionStore) -> Self {
        Self {
            store,
            flags: ChangeFlags {
                update_tree: true,
                ..ChangeFlags::default()
            },
        }
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DefinitionStore {
        &mut self.store
    }

    pub fn flags(&self) -> ChangeFlags {
        self.flags
    }

    /// Returns the pending flags and resets them.
    pub fn take_flags(&mut self) -> ChangeFlags {
        std::mem::take(&mut self.flags)
    }

    /// Records a structural change, optionally moving the selection.
    pub fn tree_changed(&mut self, select: Option<DefinitionId>) {
        self.flags.update_tree = true;
        self.flags.modified = true;
        if select.is_some() {
            self.flags.select = select;
        }
    }

    /// Records a content change that leaves the tree as it is.
    pub fn content_changed(&mut self) {
        self.flags.modified = true;
    }
}
