use hax_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::declaration::Declaration;
use crate::definition::{Definition, DefinitionId};
use crate::document::Document;

/// Adds a definition (with any children) to the tree.
///
/// On first apply, empty or taken names are replaced by generated ones and
/// missing ids are allocated. Undo keeps the fully populated subtree, so a
/// redo restores the same ids and names at the same position.
#[derive(Debug)]
pub struct AddDefinition {
    definition: Definition,
    parent: Option<DefinitionId>,
    /// Position of the subtree while it is undone.
    index: Option<usize>,
    added: Option<DefinitionId>,
    names_resolved: bool,
    recorded: bool,
    group_key: u32,
    description: String,
}

impl AddDefinition {
    /// A fresh definition of `declaration` with default parameters.
    pub fn from_declaration(declaration: &Declaration, parent: Option<DefinitionId>) -> Self {
        let description = format!("Add {}", declaration.name);
        Self::new(declaration.instantiate(), parent, description)
    }

    /// An existing subtree, e.g. pasted from the clipboard. Stored ids are
    /// discarded so the copy never collides with its source.
    pub fn from_definition(mut definition: Definition, parent: Option<DefinitionId>) -> Self {
        definition.clear_ids();
        let description = format!("Add \"{}\"", definition.name);
        Self::new(definition, parent, description)
    }

    /// A definition exactly as given: the name must be free and a stored id
    /// is kept.
    pub fn exact(definition: Definition, parent: Option<DefinitionId>) -> Self {
        let description = format!("Add \"{}\"", definition.name);
        let mut action = Self::new(definition, parent, description);
        action.names_resolved = true;
        action
    }

    fn new(definition: Definition, parent: Option<DefinitionId>, description: String) -> Self {
        Self {
            definition,
            parent,
            index: None,
            added: None,
            names_resolved: false,
            recorded: true,
            group_key: 0,
            description,
        }
    }

    /// Builder: apply without recording, for the initial content of a new
    /// document.
    pub fn non_recorded(mut self) -> Self {
        self.recorded = false;
        self
    }

    /// Builder: join group `key`.
    pub fn in_group(mut self, key: u32) -> Self {
        self.group_key = key;
        self
    }

    /// Id of the added definition once applied.
    pub fn added(&self) -> Option<DefinitionId> {
        self.added
    }
}

impl EditAction<Document> for AddDefinition {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
        let mut definition = self.definition.clone();
        if !self.names_resolved {
            doc.store().assign_names(&mut definition);
        }

        let store = doc.store_mut();
        let id = match self.index {
            Some(index) => store.insert_at(definition, self.parent, index)?,
            None => store.insert(definition, self.parent)?,
        };

        if !self.names_resolved {
            self.names_resolved = true;
            if let Some(node) = store.get(id) {
                self.description = format!("Add \"{}\"", node.name());
            }
        }
        self.added = Some(id);
        doc.tree_changed(Some(id));
        Ok(true)
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let Some(id) = self.added.take() else {
            return Err(EditActionError::InvalidState(format!(
                "{} was never applied",
                self.description
            )));
        };
        let removed = doc.store_mut().remove(id)?;
        self.definition = removed.definition;
        self.index = Some(removed.index);
        doc.tree_changed(removed.parent);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn group_key(&self) -> u32 {
        self.group_key
    }

    fn is_recorded(&self) -> bool {
        self.recorded
    }
}
