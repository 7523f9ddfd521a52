//! Actions that change sibling order without changing parents.

use hax_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::definition::DefinitionId;
use crate::document::Document;
use crate::naming::compare_names;

/// Moves a definition to another position among its siblings.
///
/// `index` is the final position. Moving to the current position changes
/// nothing and is not recorded.
#[derive(Debug)]
pub struct MoveDefinition {
    id: DefinitionId,
    index: usize,
    old_index: Option<usize>,
    group_key: u32,
}

impl MoveDefinition {
    pub fn new(id: DefinitionId, index: usize) -> Self {
        Self {
            id,
            index,
            old_index: None,
            group_key: 0,
        }
    }

    /// Builder: join group `key`.
    pub fn in_group(mut self, key: u32) -> Self {
        self.group_key = key;
        self
    }
}

impl EditAction<Document> for MoveDefinition {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
        let old_index = doc.store_mut().move_to(self.id, self.index)?;
        if old_index == self.index {
            return Ok(false);
        }
        self.old_index = Some(old_index);
        doc.tree_changed(Some(self.id));
        Ok(true)
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let Some(old_index) = self.old_index else {
            return Err(EditActionError::InvalidState(format!(
                "definition {} was never moved",
                self.id
            )));
        };
        doc.store_mut().move_to(self.id, old_index)?;
        doc.tree_changed(Some(self.id));
        Ok(())
    }

    fn description(&self) -> &str {
        "Move definition"
    }

    fn group_key(&self) -> u32 {
        self.group_key
    }
}

/// Sorts the children of one parent (or the root list) by name.
///
/// The previous order is captured when applied, so undo restores it
/// exactly. Sorting an already sorted list is not recorded.
#[derive(Debug)]
pub struct SortDefinitions {
    parent: Option<DefinitionId>,
    previous: Vec<DefinitionId>,
    group_key: u32,
}

impl SortDefinitions {
    pub fn new(parent: Option<DefinitionId>) -> Self {
        Self {
            parent,
            previous: Vec::new(),
            group_key: 0,
        }
    }

    /// Builder: join group `key`.
    pub fn in_group(mut self, key: u32) -> Self {
        self.group_key = key;
        self
    }
}

impl EditAction<Document> for SortDefinitions {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
        let previous = doc.store().children(self.parent)?.to_vec();
        let changed = doc
            .store_mut()
            .sort_children(self.parent, |a, b| compare_names(a.name(), b.name()))?;
        if changed {
            self.previous = previous;
            doc.tree_changed(None);
        }
        Ok(changed)
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        doc.store_mut().restore_order(self.parent, &self.previous)?;
        doc.tree_changed(None);
        Ok(())
    }

    fn description(&self) -> &str {
        "Sort by name"
    }

    fn group_key(&self) -> u32 {
        self.group_key
    }
}
