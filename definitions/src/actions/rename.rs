use hax_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::definition::DefinitionId;
use crate::document::Document;
use crate::error::StoreError;

/// Renames a definition.
///
/// Renaming to the current name changes nothing and is not recorded.
/// A name used anywhere else in the tree is rejected.
#[derive(Debug)]
pub struct RenameDefinition {
    id: DefinitionId,
    new_name: String,
    old_name: Option<String>,
    group_key: u32,
}

impl RenameDefinition {
    pub fn new(id: DefinitionId, new_name: impl Into<String>) -> Self {
        Self {
            id,
            new_name: new_name.into(),
            old_name: None,
            group_key: 0,
        }
    }

    /// Builder: join group `key`.
    pub fn in_group(mut self, key: u32) -> Self {
        self.group_key = key;
        self
    }
}

impl EditAction<Document> for RenameDefinition {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
        match doc.store_mut().rename(self.id, &self.new_name) {
            Ok(old_name) => {
                self.old_name = Some(old_name);
                doc.tree_changed(Some(self.id));
                Ok(true)
            }
            Err(StoreError::SameName(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let Some(old_name) = &self.old_name else {
            return Err(EditActionError::InvalidState(format!(
                "definition {} was never renamed",
                self.id
            )));
        };
        doc.store_mut().rename(self.id, old_name)?;
        doc.tree_changed(Some(self.id));
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename definition"
    }

    fn group_key(&self) -> u32 {
        self.group_key
    }
}
