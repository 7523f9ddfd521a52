//! One open document with its undo history.
//!
//! [`EditorSession`] is what the editor UI talks to. It routes every edit
//! through the history so it can be undone, exposes the change flags the
//! tree view polls, and converts documents and clipboard contents to and
//! from RON text.

use std::sync::Arc;

use hax_core::abstract_editor::{
    ActionQueue, EditAction, EditActionError, EditActionHistory, HistoryEvent, SubscriptionId,
};

use crate::actions::{
    AddDefinition, MoveDefinition, RemoveDefinition, RenameDefinition, ReparentDefinition,
    SetParameter, SortDefinitions,
};
use crate::config::{ConfigError, EditorConfig};
use crate::declaration::DeclarationTable;
use crate::definition::{Definition, DefinitionId, ParameterValue};
use crate::document::{ChangeFlags, Document};
use crate::serialize::{self, DocumentError, DocumentFile};
use crate::store::DefinitionStore;

/// Errors surfaced by [`EditorSession`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Action(#[from] EditActionError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown declaration \"{0}\"")]
    UnknownDeclaration(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// An open document, its history and the declarations it can instantiate.
#[derive(Debug)]
pub struct EditorSession {
    document: Document,
    history: EditActionHistory<Document>,
    declarations: DeclarationTable,
    queue: Arc<ActionQueue<Document>>,
    default_base: String,
}

impl EditorSession {
    /// Creates a session with an empty document.
    pub fn new(config: &EditorConfig, declarations: DeclarationTable) -> SessionResult<Self> {
        config.validate()?;
        let history = EditActionHistory::try_new(config.history.max_undo)?;
        let default_base = config.naming.default_base.clone();
        let mut document = Document::new();
        document.store_mut().set_default_base(default_base.clone());

        log::info!(
            "Editor session ready: {} declarations, undo depth {}",
            declarations.len(),
            history.max_undo()
        );
        Ok(Self {
            document,
            history,
            declarations,
            queue: Arc::new(ActionQueue::new()),
            default_base,
        })
    }

    // ---- Accessors ----

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &DefinitionStore {
        self.document.store()
    }

    pub fn history(&self) -> &EditActionHistory<Document> {
        &self.history
    }

    pub fn declarations(&self) -> &DeclarationTable {
        &self.declarations
    }

    /// Returns the pending change flags and resets them.
    pub fn take_flags(&mut self) -> ChangeFlags {
        self.document.take_flags()
    }

    /// Registers a history listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(HistoryEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.history.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.history.unsubscribe(id)
    }

    /// Queue for actions submitted from other threads, e.g. asset reload
    /// callbacks. Drained by [`drain_queue`](Self::drain_queue).
    pub fn queue(&self) -> Arc<ActionQueue<Document>> {
        Arc::clone(&self.queue)
    }

    // ---- Documents ----

    /// Replaces the document with a fresh one holding a single definition
    /// of the first declaration. That definition is not undoable.
    pub fn new_document(&mut self) -> SessionResult<Option<DefinitionId>> {
        self.reset(DefinitionStore::new());

        let mut first = None;
        if let Some(declaration) = self.declarations.first() {
            let action = AddDefinition::from_declaration(declaration, None).non_recorded();
            if self.history.execute(Box::new(action), &mut self.document)? {
                first = self.document.flags().select;
            }
        }
        self.history.mark_saved();
        Ok(first)
    }

    /// Replaces the document with `file`. Missing ids and names are
    /// assigned and missing parameters get their declared defaults.
    pub fn load(&mut self, file: DocumentFile) -> SessionResult<()> {
        let mut definitions = file.definitions;
        let mut filled = 0;
        for definition in &mut definitions {
            filled += self.declarations.add_missing_parameters(definition);
        }
        if filled > 0 {
            log::debug!("Filled {filled} missing parameters with defaults");
        }

        let store = DefinitionStore::from_tree_with_base(definitions, &self.default_base)
            .map_err(DocumentError::from)?;
        log::info!("Loaded document with {} definitions", store.len());
        self.reset(store);
        self.history.mark_saved();
        Ok(())
    }

    /// Decodes RON text and [`load`](Self::load)s it.
    pub fn load_str(&mut self, text: &str) -> SessionResult<()> {
        let file = serialize::decode_document(text)?;
        self.load(file)
    }

    /// The document in persistable form. Marks the current state as saved.
    pub fn save(&mut self) -> DocumentFile {
        self.history.mark_saved();
        DocumentFile::new(self.document.store().to_tree())
    }

    /// [`save`](Self::save) encoded as RON text.
    pub fn save_to_string(&mut self) -> SessionResult<String> {
        let text = serialize::encode_document(&DocumentFile::new(self.document.store().to_tree()))?;
        self.history.mark_saved();
        Ok(text)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    fn reset(&mut self, mut store: DefinitionStore) {
        store.set_default_base(self.default_base.clone());
        self.history.clear();
        self.document = Document::from_store(store);
    }

    // ---- Editing ----

    /// Executes any action through the history.
    pub fn execute(&mut self, action: Box<dyn EditAction<Document>>) -> SessionResult<bool> {
        let description = action.description().to_owned();
        self.history
            .execute(action, &mut self.document)
            .inspect_err(|e| log::warn!("\"{description}\" rejected: {e}"))
            .map_err(SessionError::from)
    }

    /// Adds a new definition of `declaration` under `parent` and returns
    /// its id.
    pub fn add(
        &mut self,
        declaration: &str,
        parent: Option<DefinitionId>,
    ) -> SessionResult<DefinitionId> {
        let declaration = self
            .declarations
            .get(declaration)
            .ok_or_else(|| SessionError::UnknownDeclaration(declaration.to_owned()))?;
        let action = AddDefinition::from_declaration(declaration, parent);
        self.execute_add(action)
    }

    pub fn remove(&mut self, id: DefinitionId) -> SessionResult<bool> {
        self.execute(Box::new(RemoveDefinition::new(id)))
    }

    pub fn rename(&mut self, id: DefinitionId, new_name: &str) -> SessionResult<bool> {
        self.execute(Box::new(RenameDefinition::new(id, new_name)))
    }

    pub fn move_to(&mut self, id: DefinitionId, index: usize) -> SessionResult<bool> {
        self.execute(Box::new(MoveDefinition::new(id, index)))
    }

    pub fn reparent(
        &mut self,
        id: DefinitionId,
        new_parent: Option<DefinitionId>,
        index: Option<usize>,
    ) -> SessionResult<bool> {
        let mut action = ReparentDefinition::new(id, new_parent);
        if let Some(index) = index {
            action = action.at(index);
        }
        self.execute(Box::new(action))
    }

    pub fn sort(&mut self, parent: Option<DefinitionId>) -> SessionResult<bool> {
        self.execute(Box::new(SortDefinitions::new(parent)))
    }

    /// Sets a parameter. Pass the same non-zero `group_key` for every step
    /// of a drag and call [`end_group`](Self::end_group) when it ends.
    pub fn set_parameter(
        &mut self,
        id: DefinitionId,
        name: &str,
        value: ParameterValue,
        group_key: u32,
    ) -> SessionResult<bool> {
        self.execute(Box::new(SetParameter::new(id, name, value).in_group(group_key)))
    }

    pub fn end_group(&mut self, key: u32) {
        self.history.end_group(key);
    }

    pub fn undo(&mut self) -> SessionResult<bool> {
        Ok(self.history.undo(&mut self.document)?)
    }

    pub fn redo(&mut self) -> SessionResult<bool> {
        Ok(self.history.redo(&mut self.document)?)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Executes everything submitted through [`queue`](Self::queue).
    /// Returns how many queued actions changed the document.
    pub fn drain_queue(&mut self) -> usize {
        if self.queue.is_empty() {
            return 0;
        }
        self.queue.execute_all(&mut self.history, &mut self.document)
    }

    // ---- Clipboard ----

    /// `id` and its subtree as RON text.
    pub fn copy(&self, id: DefinitionId) -> SessionResult<String> {
        let definition = self
            .document
            .store()
            .snapshot(id)
            .map_err(EditActionError::from)?;
        Ok(serialize::encode(&definition)?)
    }

    /// Adds a copied subtree under `parent` with fresh ids and unique
    /// names. Returns the id of the pasted root.
    pub fn paste(&mut self, text: &str, parent: Option<DefinitionId>) -> SessionResult<DefinitionId> {
        let definition: Definition = serialize::decode(text)?;
        self.execute_add(AddDefinition::from_definition(definition, parent))
    }

    fn execute_add(&mut self, action: AddDefinition) -> SessionResult<DefinitionId> {
        self.execute(Box::new(action))?;
        self.document.flags().select.ok_or_else(|| {
            EditActionError::InvalidState("added definition was not selected".into()).into()
        })
    }
}
