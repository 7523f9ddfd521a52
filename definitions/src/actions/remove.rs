use hax_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::definition::DefinitionId;
use crate::document::Document;
use crate::store::RemovedDefinition;

/// Removes a definition and its subtree.
///
/// The removed subtree, former parent and sibling index are kept so undo
/// puts everything back with the same ids.
#[derive(Debug)]
pub struct RemoveDefinition {
    id: DefinitionId,
    removed: Option<RemovedDefinition>,
    group_key: u32,
    description: String,
}

impl RemoveDefinition {
    pub fn new(id: DefinitionId) -> Self {
        Self {
            id,
            removed: None,
            group_key: 0,
            description: "Remove definition".to_owned(),
        }
    }

    /// Builder: join group `key`.
    pub fn in_group(mut self, key: u32) -> Self {
        self.group_key = key;
        self
    }
}

impl EditAction<Document> for RemoveDefinition {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
        let removed = doc.store_mut().remove(self.id)?;
        self.description = format!("Remove \"{}\"", removed.definition.name);
        doc.tree_changed(removed.parent);
        self.removed = Some(removed);
        Ok(true)
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let Some(removed) = self.removed.take() else {
            return Err(EditActionError::InvalidState(format!(
                "definition {} was never removed",
                self.id
            )));
        };
        let id = doc
            .store_mut()
            .insert_at(removed.definition, removed.parent, removed.index)?;
        doc.tree_changed(Some(id));
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn group_key(&self) -> u32 {
        self.group_key
    }
}
