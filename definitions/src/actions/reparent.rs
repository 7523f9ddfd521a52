use hax_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::definition::DefinitionId;
use crate::document::Document;

/// Moves a definition under another parent, e.g. by dragging it in the
/// tree view.
#[derive(Debug)]
pub struct ReparentDefinition {
    id: DefinitionId,
    new_parent: Option<DefinitionId>,
    index: Option<usize>,
    previous: Option<(Option<DefinitionId>, usize)>,
    group_key: u32,
}

impl ReparentDefinition {
    /// Appends `id` to `new_parent`'s children (`None` = root level).
    pub fn new(id: DefinitionId, new_parent: Option<DefinitionId>) -> Self {
        Self {
            id,
            new_parent,
            index: None,
            previous: None,
            group_key: 0,
        }
    }

    /// Builder: insert at `index` instead of appending.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Builder: join group `key`.
    pub fn in_group(mut self, key: u32) -> Self {
        self.group_key = key;
        self
    }
}

impl EditAction<Document> for ReparentDefinition {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
        let store = doc.store();
        if store.parent_of(self.id)? == self.new_parent {
            let current = store.index_of(self.id)?;
            let last = store.siblings(self.id)?.len() - 1;
            if self.index.unwrap_or(last) == current {
                return Ok(false);
            }
        }

        let previous = doc
            .store_mut()
            .reparent(self.id, self.new_parent, self.index)?;
        self.previous = Some(previous);
        doc.tree_changed(Some(self.id));
        Ok(true)
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let Some((parent, index)) = self.previous else {
            return Err(EditActionError::InvalidState(format!(
                "definition {} was never reparented",
                self.id
            )));
        };
        doc.store_mut().reparent(self.id, parent, Some(index))?;
        doc.tree_changed(Some(self.id));
        Ok(())
    }

    fn description(&self) -> &str {
        "Reparent definition"
    }

    fn group_key(&self) -> u32 {
        self.group_key
    }
}
