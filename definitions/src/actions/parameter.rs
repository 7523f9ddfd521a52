use hax_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::definition::{DefinitionId, ParameterValue};
use crate::document::Document;

/// Sets one parameter of a definition.
///
/// Property widgets emit one of these per value change while a slider or
/// curve handle is dragged, all with the same group key, and call
/// `end_group` on release. The whole drag then undoes as one step.
#[derive(Debug)]
pub struct SetParameter {
    id: DefinitionId,
    name: String,
    value: ParameterValue,
    /// `Some(None)` once applied to a parameter that did not exist.
    previous: Option<Option<ParameterValue>>,
    group_key: u32,
    description: String,
}

impl SetParameter {
    pub fn new(id: DefinitionId, name: impl Into<String>, value: ParameterValue) -> Self {
        let name = name.into();
        Self {
            description: format!("Set {name}"),
            id,
            name,
            value,
            previous: None,
            group_key: 0,
        }
    }

    /// Builder: join group `key`.
    pub fn in_group(mut self, key: u32) -> Self {
        self.group_key = key;
        self
    }
}

impl EditAction<Document> for SetParameter {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult<bool> {
        let node = doc
            .store()
            .get(self.id)
            .ok_or_else(|| EditActionError::TargetNotFound(format!("definition {}", self.id)))?;
        if node.parameter(&self.name) == Some(&self.value) {
            return Ok(false);
        }

        let previous = doc
            .store_mut()
            .set_parameter(self.id, &self.name, self.value.clone())?;
        self.previous = Some(previous);
        doc.content_changed();
        Ok(true)
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let store = doc.store_mut();
        match self.previous.take() {
            Some(Some(value)) => {
                store.set_parameter(self.id, &self.name, value)?;
            }
            Some(None) => {
                store.remove_parameter(self.id, &self.name)?;
            }
            None => {
                return Err(EditActionError::InvalidState(format!(
                    "parameter \"{}\" was never set",
                    self.name
                )));
            }
        }
        doc.content_changed();
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn group_key(&self) -> u32 {
        self.group_key
    }
}
