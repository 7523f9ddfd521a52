//! The live definition tree.
//!
//! [`DefinitionStore`] owns every definition of a document in an arena keyed
//! by [`DefinitionId`]. Each node knows its parent and its ordered children;
//! root-level definitions live in a separate ordered list. A whole-tree name
//! index keeps names unique and makes lookups by name O(1).
//!
//! Every mutating operation validates all of its preconditions before
//! touching anything, so an `Err` always means "nothing changed".
//!
//! # Usage
//!
//! ```ignore
//! let mut store = DefinitionStore::new();
//! let fire = store.insert(Definition::new("Fire", "Emitter"), None)?;
//! let smoke = store.insert(Definition::new("Smoke", "Emitter"), Some(fire))?;
//!
//! let removed = store.remove(fire)?;          // removes Smoke as well
//! store.insert_at(removed.definition, removed.parent, removed.index)?;
//! assert_eq!(store.get_by_name("Smoke").map(|n| n.id()), Some(smoke));
//! ```

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::definition::{Definition, DefinitionId, ParameterValue, Parameters};
use crate::error::{StoreError, StoreResult};
use crate::naming::{self, DEFAULT_BASE_NAME};

/// A definition as stored in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionNode {
    id: DefinitionId,
    name: String,
    declaration: String,
    parameters: Parameters,
    parent: Option<DefinitionId>,
    children: Vec<DefinitionId>,
}

impl DefinitionNode {
    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    /// `None` for root-level definitions.
    pub fn parent(&self) -> Option<DefinitionId> {
        self.parent
    }

    /// Child ids in display order.
    pub fn children(&self) -> &[DefinitionId] {
        &self.children
    }
}

/// What [`DefinitionStore::remove`] took out of the tree.
///
/// Passing the three fields back to [`DefinitionStore::insert_at`] restores
/// the subtree with the same ids, names and position.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedDefinition {
    pub definition: Definition,
    pub parent: Option<DefinitionId>,
    pub index: usize,
}

/// Arena of definitions with a whole-tree name index.
#[derive(Debug, Clone)]
pub struct DefinitionStore {
    nodes: HashMap<DefinitionId, DefinitionNode>,
    roots: Vec<DefinitionId>,
    names: HashMap<String, DefinitionId>,
    next_id: DefinitionId,
    default_base: String,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    /// Creates an empty store whose first id is `1`.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            names: HashMap::new(),
            next_id: DefinitionId::FIRST,
            default_base: DEFAULT_BASE_NAME.to_owned(),
        }
    }

    /// Bulk-loads root-level trees, keeping their order.
    ///
    /// Stored ids are kept and validated; missing ids are assigned in
    /// pre-order after the highest stored id, and empty names are generated.
    /// Afterwards the id counter is one past the highest id in the tree.
    pub fn from_tree(definitions: Vec<Definition>) -> StoreResult<Self> {
        Self::from_tree_with_base(definitions, DEFAULT_BASE_NAME)
    }

    /// [`from_tree`](Self::from_tree) with a custom fallback name prefix.
    pub fn from_tree_with_base(
        definitions: Vec<Definition>,
        default_base: &str,
    ) -> StoreResult<Self> {
        let mut store = Self::new();
        store.default_base = default_base.to_owned();

        let mut highest: Option<DefinitionId> = None;
        for root in &definitions {
            root.visit(&mut |d| highest = highest.max(d.id));
        }
        if let Some(highest) = highest {
            store.next_id = highest.next().ok_or(StoreError::IdsExhausted)?;
        }

        // Generated names must not collide with names stored further on.
        let mut claimed: HashSet<String> = HashSet::new();
        for root in &definitions {
            root.visit(&mut |d| {
                if !d.name.is_empty() {
                    claimed.insert(d.name.clone());
                }
            });
        }
        for mut root in definitions {
            store.resolve_names(&mut root, false, &mut claimed);
            store.insert(root, None)?;
        }
        log::debug!(
            "Loaded {} definitions, next id {}",
            store.len(),
            store.next_id
        );
        Ok(store)
    }

    /// Sets the prefix used for generated names when no declaration name
    /// is available.
    pub fn set_default_base(&mut self, base: impl Into<String>) {
        self.default_base = base.into();
    }

    pub fn default_base(&self) -> &str {
        &self.default_base
    }

    /// Number of definitions in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The id the next [`allocate_id`](Self::allocate_id) will return.
    pub fn next_id(&self) -> DefinitionId {
        self.next_id
    }

    /// Hands out a fresh id. Ids are never reused.
    pub fn allocate_id(&mut self) -> StoreResult<DefinitionId> {
        let id = self.next_id;
        self.next_id = id.next().ok_or(StoreError::IdsExhausted)?;
        Ok(id)
    }

    // ---- Lookups ----

    pub fn get(&self, id: DefinitionId) -> Option<&DefinitionNode> {
        self.nodes.get(&id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&DefinitionNode> {
        self.names.get(name).and_then(|id| self.nodes.get(id))
    }

    pub fn contains(&self, id: DefinitionId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Whether any definition anywhere in the tree uses `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Root-level ids in order.
    pub fn roots(&self) -> &[DefinitionId] {
        &self.roots
    }

    /// The ordered child list of `parent`, or the root list for `None`.
    pub fn children(&self, parent: Option<DefinitionId>) -> StoreResult<&[DefinitionId]> {
        self.collection(parent).map(Vec::as_slice)
    }

    /// The ordered collection `id` currently lives in, including `id`.
    pub fn siblings(&self, id: DefinitionId) -> StoreResult<&[DefinitionId]> {
        self.children(self.parent_of(id)?)
    }

    pub fn parent_of(&self, id: DefinitionId) -> StoreResult<Option<DefinitionId>> {
        Ok(self.node(id)?.parent)
    }

    /// Position of `id` among its siblings.
    pub fn index_of(&self, id: DefinitionId) -> StoreResult<usize> {
        self.siblings(id)?
            .iter()
            .position(|&sibling| sibling == id)
            .ok_or(StoreError::UnknownId(id))
    }

    /// Returns `true` if `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: DefinitionId, id: DefinitionId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes.get(&c).and_then(|n| n.parent);
        }
        false
    }

    /// Iterates all definitions in pre-order, siblings in display order.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            store: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Owned copy of `id` and its descendants, ids included.
    pub fn snapshot(&self, id: DefinitionId) -> StoreResult<Definition> {
        self.build_tree(id).ok_or(StoreError::UnknownId(id))
    }

    /// Owned copy of the whole tree in display order.
    pub fn to_tree(&self) -> Vec<Definition> {
        self.roots
            .iter()
            .filter_map(|&id| self.build_tree(id))
            .collect()
    }

    // ---- Names ----

    /// Returns a name not used anywhere in the tree.
    ///
    /// See [`naming::generate_unique_name`] for the numbering rule.
    pub fn generate_unique_name(&self, base: &str, declaration: &str) -> String {
        naming::generate_unique_name(base, declaration, &self.default_base, |n| {
            self.names.contains_key(n)
        })
    }

    /// Gives every definition in `definition` a name that is free in this
    /// store and unique within the subtree.
    ///
    /// Empty names are generated from the declaration; names already taken
    /// are renumbered. Used before pasting a copied subtree.
    pub fn assign_names(&self, definition: &mut Definition) {
        self.resolve_names(definition, true, &mut HashSet::new());
    }

    fn resolve_names(
        &self,
        definition: &mut Definition,
        renumber_taken: bool,
        claimed: &mut HashSet<String>,
    ) {
        definition.visit_mut(&mut |d| {
            let taken = |n: &str| self.names.contains_key(n) || claimed.contains(n);
            if d.name.is_empty() || (renumber_taken && taken(&d.name)) {
                let name =
                    naming::generate_unique_name(&d.name, &d.declaration, &self.default_base, taken);
                log::debug!("Generated name \"{name}\" for \"{}\"", d.name);
                d.name = name;
            }
            claimed.insert(d.name.clone());
        });
    }

    // ---- Structural mutations ----

    /// Appends `definition` (with its subtree) to `parent`'s children, or to
    /// the root list for `None`. Returns the id of the inserted root.
    pub fn insert(
        &mut self,
        definition: Definition,
        parent: Option<DefinitionId>,
    ) -> StoreResult<DefinitionId> {
        let index = self.collection(parent)?.len();
        self.insert_at(definition, parent, index)
    }

    /// Inserts `definition` at `index` in `parent`'s children.
    ///
    /// Fails if the parent is unknown, `index` is past the end, any name in
    /// the subtree is empty or already used, or any stored id is already
    /// used. Ids missing from the subtree are allocated in pre-order.
    pub fn insert_at(
        &mut self,
        definition: Definition,
        parent: Option<DefinitionId>,
        index: usize,
    ) -> StoreResult<DefinitionId> {
        let len = self.collection(parent)?.len();
        if index > len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        self.validate_subtree(&definition)?;
        self.reserve_ids(&definition)?;

        let id = self.attach(definition, parent)?;
        self.collection_mut(parent)?.insert(index, id);
        log::debug!("Inserted definition {id} at {index} under {parent:?}");
        self.debug_check();
        Ok(id)
    }

    /// Removes `id` and its whole subtree.
    pub fn remove(&mut self, id: DefinitionId) -> StoreResult<RemovedDefinition> {
        let parent = self.parent_of(id)?;
        let index = self.index_of(id)?;
        let definition = self.snapshot(id)?;

        self.collection_mut(parent)?.remove(index);
        self.detach(id);
        log::debug!("Removed definition {id} ({} total)", definition.count());
        self.debug_check();
        Ok(RemovedDefinition {
            definition,
            parent,
            index,
        })
    }

    /// Renames `id`, returning the previous name.
    ///
    /// Fails with [`StoreError::SameName`] if the name would not change.
    pub fn rename(&mut self, id: DefinitionId, new_name: &str) -> StoreResult<String> {
        if new_name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let node = self.node(id)?;
        if node.name == new_name {
            return Err(StoreError::SameName(new_name.to_owned()));
        }
        if self.names.contains_key(new_name) {
            return Err(StoreError::DuplicateName(new_name.to_owned()));
        }

        let node = self.node_mut(id)?;
        let old_name = std::mem::replace(&mut node.name, new_name.to_owned());
        self.names.remove(&old_name);
        self.names.insert(new_name.to_owned(), id);
        log::debug!("Renamed \"{old_name}\" to \"{new_name}\"");
        self.debug_check();
        Ok(old_name)
    }

    /// Moves `id` to `index` within its own sibling list, returning the old
    /// index. `index` is the final position and must be less than the
    /// number of siblings (including `id`).
    pub fn move_to(&mut self, id: DefinitionId, index: usize) -> StoreResult<usize> {
        let parent = self.parent_of(id)?;
        let old_index = self.index_of(id)?;
        let siblings = self.collection_mut(parent)?;
        let len = siblings.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        if index != old_index {
            siblings.remove(old_index);
            siblings.insert(index, id);
        }
        self.debug_check();
        Ok(old_index)
    }

    /// Moves `id` under `new_parent` at `index` (appended for `None`),
    /// returning the previous parent and index.
    ///
    /// Fails if `new_parent` is `id` itself or one of its descendants.
    pub fn reparent(
        &mut self,
        id: DefinitionId,
        new_parent: Option<DefinitionId>,
        index: Option<usize>,
    ) -> StoreResult<(Option<DefinitionId>, usize)> {
        let old_parent = self.parent_of(id)?;
        let old_index = self.index_of(id)?;
        if let Some(parent) = new_parent {
            self.node(parent)?;
            if self.is_ancestor_or_self(id, parent) {
                return Err(StoreError::CyclicParent { id, parent });
            }
        }

        let mut len = self.collection(new_parent)?.len();
        if new_parent == old_parent {
            len -= 1;
        }
        let index = index.unwrap_or(len);
        if index > len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }

        self.collection_mut(old_parent)?.remove(old_index);
        self.collection_mut(new_parent)?.insert(index, id);
        self.node_mut(id)?.parent = new_parent;
        log::debug!("Reparented definition {id} under {new_parent:?} at {index}");
        self.debug_check();
        Ok((old_parent, old_index))
    }

    /// Stable-sorts `parent`'s children with `compare`. Returns whether the
    /// order changed.
    pub fn sort_children(
        &mut self,
        parent: Option<DefinitionId>,
        mut compare: impl FnMut(&DefinitionNode, &DefinitionNode) -> Ordering,
    ) -> StoreResult<bool> {
        let current = self.collection(parent)?;
        let mut nodes: Vec<&DefinitionNode> =
            current.iter().filter_map(|id| self.nodes.get(id)).collect();
        nodes.sort_by(|a, b| compare(*a, *b));
        let sorted: Vec<DefinitionId> = nodes.iter().map(|n| n.id).collect();
        if sorted == *current {
            return Ok(false);
        }

        *self.collection_mut(parent)? = sorted;
        self.debug_check();
        Ok(true)
    }

    /// Puts `parent`'s children back into `order`, which must be a
    /// permutation of the current children.
    pub fn restore_order(
        &mut self,
        parent: Option<DefinitionId>,
        order: &[DefinitionId],
    ) -> StoreResult<()> {
        let current = self.collection(parent)?;
        let mut expected = current.clone();
        let mut given = order.to_vec();
        expected.sort_unstable();
        given.sort_unstable();
        if expected != given {
            let owner = parent.map_or_else(|| "the root".to_owned(), |p| format!("definition {p}"));
            return Err(StoreError::OrderMismatch(owner));
        }

        *self.collection_mut(parent)? = order.to_vec();
        self.debug_check();
        Ok(())
    }

    // ---- Parameters ----

    /// Sets a parameter, returning its previous value (`None` if it was
    /// not present).
    pub fn set_parameter(
        &mut self,
        id: DefinitionId,
        name: &str,
        value: ParameterValue,
    ) -> StoreResult<Option<ParameterValue>> {
        let node = self.node_mut(id)?;
        Ok(node.parameters.insert(name.to_owned(), value))
    }

    /// Removes a parameter, returning its value.
    pub fn remove_parameter(&mut self, id: DefinitionId, name: &str) -> StoreResult<ParameterValue> {
        let node = self.node_mut(id)?;
        node.parameters
            .remove(name)
            .ok_or_else(|| StoreError::UnknownParameter {
                id,
                name: name.to_owned(),
            })
    }

    // ---- Consistency ----

    /// Verifies the structural invariants: every indexed node is reachable
    /// exactly once from the roots, parent links match child lists, the
    /// name index matches the nodes, and every id is below the counter.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut visited: HashSet<DefinitionId> = HashSet::with_capacity(self.nodes.len());
        let mut stack: Vec<(DefinitionId, Option<DefinitionId>)> =
            self.roots.iter().map(|&id| (id, None)).collect();

        while let Some((id, expected_parent)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                return Err(format!("{id} is listed as a child but not indexed"));
            };
            if !visited.insert(id) {
                return Err(format!("{id} is reachable more than once"));
            }
            if node.parent != expected_parent {
                return Err(format!(
                    "{id} records parent {:?} but is listed under {expected_parent:?}",
                    node.parent
                ));
            }
            if node.id >= self.next_id {
                return Err(format!("{id} is not below the id counter {}", self.next_id));
            }
            if self.names.get(&node.name) != Some(&id) {
                return Err(format!("name \"{}\" of {id} is not indexed", node.name));
            }
            stack.extend(node.children.iter().map(|&child| (child, Some(id))));
        }

        if visited.len() != self.nodes.len() {
            return Err(format!(
                "{} indexed definitions are unreachable",
                self.nodes.len() - visited.len()
            ));
        }
        if self.names.len() != self.nodes.len() {
            return Err(format!(
                "name index holds {} entries for {} definitions",
                self.names.len(),
                self.nodes.len()
            ));
        }
        Ok(())
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions)
            && let Err(problem) = self.check_invariants()
        {
            log::error!("Definition store is inconsistent: {problem}");
            debug_assert!(false, "definition store is inconsistent: {problem}");
        }
    }

    // ---- Internals ----

    fn node(&self, id: DefinitionId) -> StoreResult<&DefinitionNode> {
        self.nodes.get(&id).ok_or(StoreError::UnknownId(id))
    }

    fn node_mut(&mut self, id: DefinitionId) -> StoreResult<&mut DefinitionNode> {
        self.nodes.get_mut(&id).ok_or(StoreError::UnknownId(id))
    }

    fn collection(&self, parent: Option<DefinitionId>) -> StoreResult<&Vec<DefinitionId>> {
        match parent {
            None => Ok(&self.roots),
            Some(parent) => Ok(&self.node(parent)?.children),
        }
    }

    fn collection_mut(&mut self, parent: Option<DefinitionId>) -> StoreResult<&mut Vec<DefinitionId>> {
        match parent {
            None => Ok(&mut self.roots),
            Some(parent) => Ok(&mut self.node_mut(parent)?.children),
        }
    }

    /// Builds the owned subtree of `root` bottom-up, so depth costs heap
    /// rather than stack.
    fn build_tree(&self, root: DefinitionId) -> Option<Definition> {
        let mut order: Vec<(&DefinitionNode, usize)> = Vec::new();
        let mut stack = vec![self.nodes.get(&root)?];
        while let Some(node) = stack.pop() {
            let before = stack.len();
            stack.extend(node.children.iter().rev().filter_map(|id| self.nodes.get(id)));
            order.push((node, stack.len() - before));
        }

        // In reverse pre-order every child is finished before its parent,
        // with the first child on top.
        let mut finished: Vec<Definition> = Vec::new();
        for (node, child_count) in order.into_iter().rev() {
            let children = (0..child_count).filter_map(|_| finished.pop()).collect();
            finished.push(Definition {
                id: Some(node.id),
                name: node.name.clone(),
                declaration: node.declaration.clone(),
                parameters: node.parameters.clone(),
                children,
            });
        }
        finished.pop()
    }

    /// Checks names and stored ids of a subtree about to be inserted.
    fn validate_subtree(&self, definition: &Definition) -> StoreResult<()> {
        let mut names: HashSet<&str> = HashSet::new();
        let mut ids: HashSet<DefinitionId> = HashSet::new();
        let mut result = Ok(());
        definition.visit(&mut |d| {
            if result.is_err() {
                return;
            }
            if d.name.is_empty() {
                result = Err(StoreError::EmptyName);
            } else if self.names.contains_key(&d.name) || !names.insert(d.name.as_str()) {
                result = Err(StoreError::DuplicateName(d.name.clone()));
            } else if let Some(id) = d.id
                && (self.nodes.contains_key(&id) || !ids.insert(id))
            {
                result = Err(StoreError::DuplicateId(id));
            }
        });
        result
    }

    /// Moves the id counter past every stored id in `definition` and makes
    /// sure enough ids remain for the ones it lacks.
    fn reserve_ids(&mut self, definition: &Definition) -> StoreResult<()> {
        let mut highest: Option<DefinitionId> = None;
        let mut missing: u64 = 0;
        definition.visit(&mut |d| match d.id {
            Some(id) => highest = highest.max(Some(id)),
            None => missing += 1,
        });

        let mut start = self.next_id;
        if let Some(highest) = highest {
            start = start.max(highest.next().ok_or(StoreError::IdsExhausted)?);
        }
        if u64::from(start.get()) + missing > u64::from(u32::MAX) {
            return Err(StoreError::IdsExhausted);
        }
        self.next_id = start;
        Ok(())
    }

    /// Indexes `definition` and its descendants, allocating missing ids in
    /// pre-order. The caller links the returned id into `parent`'s list.
    fn attach(
        &mut self,
        definition: Definition,
        parent: Option<DefinitionId>,
    ) -> StoreResult<DefinitionId> {
        let mut pending = Vec::new();
        let root = self.attach_node(definition, parent, &mut pending)?;
        while let Some((child, parent)) = pending.pop() {
            let id = self.attach_node(child, Some(parent), &mut pending)?;
            self.node_mut(parent)?.children.push(id);
        }
        Ok(root)
    }

    fn attach_node(
        &mut self,
        mut definition: Definition,
        parent: Option<DefinitionId>,
        pending: &mut Vec<(Definition, DefinitionId)>,
    ) -> StoreResult<DefinitionId> {
        let id = match definition.id {
            Some(id) => id,
            None => self.allocate_id()?,
        };
        let children = std::mem::take(&mut definition.children);
        pending.extend(children.into_iter().rev().map(|child| (child, id)));

        let name = std::mem::take(&mut definition.name);
        self.names.insert(name.clone(), id);
        self.nodes.insert(
            id,
            DefinitionNode {
                id,
                name,
                declaration: std::mem::take(&mut definition.declaration),
                parameters: std::mem::take(&mut definition.parameters),
                parent,
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    fn detach(&mut self, id: DefinitionId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                self.names.remove(&node.name);
                pending.extend(node.children);
            }
        }
    }
}

/// Pre-order iterator returned by [`DefinitionStore::iter_depth_first`].
pub struct DepthFirst<'a> {
    store: &'a DefinitionStore,
    stack: Vec<DefinitionId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a DefinitionNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.store.nodes.get(&id)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn id(raw: u32) -> DefinitionId {
        DefinitionId::new(raw).unwrap()
    }

    fn names(store: &DefinitionStore, parent: Option<DefinitionId>) -> Vec<String> {
        store
            .children(parent)
            .unwrap()
            .iter()
            .map(|&c| store.get(c).unwrap().name().to_owned())
            .collect()
    }

    /// Fire(1) { Sparks(2) { Embers(3) }, Smoke(4) }, Water(5)
    fn sample() -> DefinitionStore {
        let mut store = DefinitionStore::new();
        let fire = store.insert(Definition::new("Fire", "Emitter"), None).unwrap();
        let sparks = store
            .insert(Definition::new("Sparks", "Emitter"), Some(fire))
            .unwrap();
        store
            .insert(Definition::new("Embers", "Emitter"), Some(sparks))
            .unwrap();
        store
            .insert(Definition::new("Smoke", "Emitter"), Some(fire))
            .unwrap();
        store.insert(Definition::new("Water", "Emitter"), None).unwrap();
        store
    }

    #[test]
    fn insert_assigns_sequential_ids_and_links_parent() {
        let store = sample();
        assert_eq!(store.len(), 5);
        assert_eq!(store.next_id(), id(6));
        assert_eq!(store.get_by_name("Smoke").unwrap().id(), id(4));
        assert_eq!(store.parent_of(id(4)).unwrap(), Some(id(1)));
        assert_eq!(store.get(id(1)).unwrap().children(), [id(2), id(4)]);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn insert_rejects_duplicate_name_anywhere_in_tree() {
        let mut store = sample();
        let err = store
            .insert(Definition::new("Embers", "Emitter"), Some(id(5)))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateName("Embers".into()));
        assert_eq!(store.len(), 5);
        assert_eq!(store.next_id(), id(6));
    }

    #[test]
    fn insert_rejects_duplicates_inside_subtree_before_mutating() {
        let mut store = sample();
        let subtree = Definition::new("Rain", "Emitter").with_child(Definition::new("Rain", "Emitter"));
        assert_eq!(
            store.insert(subtree, None),
            Err(StoreError::DuplicateName("Rain".into()))
        );
        assert_eq!(store.insert(Definition::new("", "Emitter"), None), Err(StoreError::EmptyName));
        assert!(!store.contains_name("Rain"));
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn insert_rejects_unknown_parent_and_bad_index() {
        let mut store = sample();
        assert_eq!(
            store.insert(Definition::new("Rain", "Emitter"), Some(id(42))),
            Err(StoreError::UnknownId(id(42)))
        );
        assert_eq!(
            store.insert_at(Definition::new("Rain", "Emitter"), None, 3),
            Err(StoreError::IndexOutOfRange { index: 3, len: 2 })
        );
    }

    #[test]
    fn stored_ids_are_kept_and_counter_moves_past_them() {
        let mut store = sample();
        let rain = store
            .insert(Definition::new("Rain", "Emitter").with_id(id(40)), None)
            .unwrap();
        assert_eq!(rain, id(40));
        assert_eq!(store.next_id(), id(41));
        assert_eq!(
            store.insert(Definition::new("Snow", "Emitter").with_id(id(3)), None),
            Err(StoreError::DuplicateId(id(3)))
        );
    }

    #[test]
    fn remove_and_reinsert_restores_subtree() {
        let mut store = sample();
        let before = store.to_tree();

        let removed = store.remove(id(2)).unwrap();
        assert_eq!(removed.parent, Some(id(1)));
        assert_eq!(removed.index, 0);
        assert_eq!(removed.definition.count(), 2);
        assert!(store.get_by_name("Embers").is_none());
        assert_eq!(store.len(), 3);

        store
            .insert_at(removed.definition, removed.parent, removed.index)
            .unwrap();
        assert_eq!(store.to_tree(), before);
        assert_eq!(store.next_id(), id(6));
    }

    #[test]
    fn removed_ids_are_never_reused() {
        let mut store = sample();
        store.remove(id(5)).unwrap();
        let rain = store.insert(Definition::new("Rain", "Emitter"), None).unwrap();
        assert_eq!(rain, id(6));
    }

    #[test]
    fn remove_unknown_is_an_error() {
        let mut store = sample();
        assert_eq!(store.remove(id(9)), Err(StoreError::UnknownId(id(9))));
    }

    #[test]
    fn rename_updates_name_index() {
        let mut store = sample();
        let old = store.rename(id(4), "Steam").unwrap();
        assert_eq!(old, "Smoke");
        assert!(!store.contains_name("Smoke"));
        assert_eq!(store.get_by_name("Steam").unwrap().id(), id(4));
    }

    #[rstest]
    #[case("Smoke", StoreError::SameName("Smoke".into()))]
    #[case("Water", StoreError::DuplicateName("Water".into()))]
    #[case("Embers", StoreError::DuplicateName("Embers".into()))]
    #[case("", StoreError::EmptyName)]
    fn rename_rejections(#[case] new_name: &str, #[case] expected: StoreError) {
        let mut store = sample();
        assert_eq!(store.rename(id(4), new_name), Err(expected));
        assert_eq!(store.get(id(4)).unwrap().name(), "Smoke");
    }

    #[test]
    fn rename_is_case_sensitive() {
        let mut store = sample();
        assert!(store.rename(id(4), "water").is_ok());
    }

    #[rstest]
    #[case(0, &["Smoke", "Sparks"])]
    #[case(1, &["Sparks", "Smoke"])]
    fn move_within_siblings(#[case] index: usize, #[case] expected: &[&str]) {
        let mut store = sample();
        assert_eq!(store.move_to(id(4), index).unwrap(), 1);
        assert_eq!(names(&store, Some(id(1))), expected);
    }

    #[rstest]
    #[case(2)]
    #[case(usize::MAX)]
    fn move_out_of_range_keeps_order(#[case] index: usize) {
        let mut store = sample();
        assert_eq!(
            store.move_to(id(4), index),
            Err(StoreError::IndexOutOfRange { index, len: 2 })
        );
        assert_eq!(names(&store, Some(id(1))), ["Sparks", "Smoke"]);
    }

    #[test]
    fn reparent_moves_subtree() {
        let mut store = sample();
        let (old_parent, old_index) = store.reparent(id(2), Some(id(5)), None).unwrap();
        assert_eq!((old_parent, old_index), (Some(id(1)), 0));
        assert_eq!(store.parent_of(id(2)).unwrap(), Some(id(5)));
        assert_eq!(store.parent_of(id(3)).unwrap(), Some(id(2)));
        assert_eq!(names(&store, Some(id(1))), ["Smoke"]);

        store.reparent(id(2), old_parent, Some(old_index)).unwrap();
        assert_eq!(names(&store, Some(id(1))), ["Sparks", "Smoke"]);
    }

    #[test]
    fn reparent_to_root_and_within_same_parent() {
        let mut store = sample();
        store.reparent(id(3), None, Some(0)).unwrap();
        assert_eq!(names(&store, None), ["Embers", "Fire", "Water"]);
        store.reparent(id(3), None, None).unwrap();
        assert_eq!(names(&store, None), ["Fire", "Water", "Embers"]);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(1, 3)]
    #[case(2, 3)]
    fn reparent_rejects_cycles(#[case] moved: u32, #[case] target: u32) {
        let mut store = sample();
        assert_eq!(
            store.reparent(id(moved), Some(id(target)), None),
            Err(StoreError::CyclicParent {
                id: id(moved),
                parent: id(target)
            })
        );
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn sort_reports_whether_order_changed() {
        let mut store = sample();
        store.insert(Definition::new("Ash", "Emitter"), None).unwrap();
        let by_name = |a: &DefinitionNode, b: &DefinitionNode| naming::compare_names(a.name(), b.name());

        assert!(store.sort_children(None, by_name).unwrap());
        assert_eq!(names(&store, None), ["Ash", "Fire", "Water"]);
        assert!(!store.sort_children(None, by_name).unwrap());
    }

    #[test]
    fn restore_order_requires_permutation() {
        let mut store = sample();
        store.restore_order(Some(id(1)), &[id(4), id(2)]).unwrap();
        assert_eq!(names(&store, Some(id(1))), ["Smoke", "Sparks"]);
        assert!(matches!(
            store.restore_order(Some(id(1)), &[id(4)]),
            Err(StoreError::OrderMismatch(_))
        ));
        assert!(matches!(
            store.restore_order(None, &[id(1), id(2)]),
            Err(StoreError::OrderMismatch(_))
        ));
    }

    #[test]
    fn siblings_is_the_parent_collection() {
        let store = sample();
        assert_eq!(store.siblings(id(4)).unwrap(), [id(2), id(4)]);
        assert_eq!(store.siblings(id(5)).unwrap(), [id(1), id(5)]);
        assert_eq!(store.index_of(id(5)).unwrap(), 1);
    }

    #[test]
    fn depth_first_visits_in_display_order() {
        let store = sample();
        let order: Vec<&str> = store.iter_depth_first().map(DefinitionNode::name).collect();
        assert_eq!(order, ["Fire", "Sparks", "Embers", "Smoke", "Water"]);
    }

    #[test]
    fn from_tree_keeps_order_and_reseeds_counter() {
        let tree = vec![
            Definition::new("B", "Emitter")
                .with_id(id(7))
                .with_child(Definition::new("C", "Emitter").with_id(id(3))),
            Definition::new("A", "Emitter").with_id(id(12)),
        ];
        let store = DefinitionStore::from_tree(tree.clone()).unwrap();
        assert_eq!(store.to_tree(), tree);
        assert_eq!(store.next_id(), id(13));
    }

    #[test]
    fn from_tree_fills_missing_ids_and_names() {
        let tree = vec![
            Definition::new("", "Fire").with_child(Definition::new("Child", "Smoke")),
            Definition::new("Other", "Fire").with_id(id(4)),
        ];
        let store = DefinitionStore::from_tree(tree).unwrap();
        assert_eq!(store.get_by_name("Fire1").unwrap().id(), id(5));
        assert_eq!(store.get_by_name("Child").unwrap().id(), id(6));
        assert_eq!(store.next_id(), id(7));
    }

    #[test]
    fn from_tree_generated_names_avoid_names_stored_later() {
        let tree = vec![
            Definition::new("", "Fire"),
            Definition::new("", "Fire").with_child(Definition::new("", "Fire")),
            Definition::new("Fire1", "Fire"),
            Definition::new("Fire3", "Fire"),
        ];
        let store = DefinitionStore::from_tree(tree).unwrap();
        let order: Vec<&str> = store.iter_depth_first().map(DefinitionNode::name).collect();
        assert_eq!(order, ["Fire2", "Fire4", "Fire5", "Fire1", "Fire3"]);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn from_tree_rejects_duplicate_names() {
        let tree = vec![
            Definition::new("Same", "Fire"),
            Definition::new("Same", "Fire"),
        ];
        assert_eq!(
            DefinitionStore::from_tree(tree).unwrap_err(),
            StoreError::DuplicateName("Same".into())
        );
    }

    #[test]
    fn generated_names_check_the_whole_tree() {
        let mut store = DefinitionStore::new();
        let a = store.insert(Definition::new("Fire1", "Fire"), None).unwrap();
        store.insert(Definition::new("Fire2", "Fire"), Some(a)).unwrap();
        let b = store.insert(Definition::new("Other", "Fire"), None).unwrap();
        store.insert(Definition::new("Fire3", "Fire"), Some(b)).unwrap();

        assert_eq!(store.generate_unique_name("Fire", "Fire"), "Fire4");
        assert_eq!(store.generate_unique_name("", ""), "Definition1");
        store.set_default_base("Node");
        assert_eq!(store.generate_unique_name("", ""), "Node1");
    }

    #[test]
    fn assign_names_renumbers_taken_and_duplicate_names() {
        let store = sample();
        let mut pasted = Definition::new("Smoke", "Emitter")
            .with_child(Definition::new("Smoke", "Emitter"))
            .with_child(Definition::new("", "Emitter"));
        store.assign_names(&mut pasted);
        let mut names = Vec::new();
        pasted.visit(&mut |d| names.push(d.name.clone()));
        assert_eq!(names, ["Smoke1", "Smoke2", "Emitter1"]);
    }

    #[test]
    fn parameters_round_trip() {
        let mut store = sample();
        assert_eq!(store.set_parameter(id(1), "Rate", ParameterValue::Float(2.0)), Ok(None));
        assert_eq!(
            store.set_parameter(id(1), "Rate", ParameterValue::Float(4.0)),
            Ok(Some(ParameterValue::Float(2.0)))
        );
        assert_eq!(
            store.get(id(1)).unwrap().parameter("Rate"),
            Some(&ParameterValue::Float(4.0))
        );
        assert_eq!(store.remove_parameter(id(1), "Rate"), Ok(ParameterValue::Float(4.0)));
        assert_eq!(
            store.remove_parameter(id(1), "Rate"),
            Err(StoreError::UnknownParameter {
                id: id(1),
                name: "Rate".into()
            })
        );
    }

    #[test]
    fn deep_chain_survives_remove_and_restore() {
        const DEPTH: u32 = 50_000;
        let mut chain = Definition::new(format!("Level{}", DEPTH - 1), "Emitter");
        for depth in (0..DEPTH - 1).rev() {
            chain = Definition::new(format!("Level{depth}"), "Emitter").with_child(chain);
        }
        let mut store = DefinitionStore::new();
        store.insert(chain, None).unwrap();
        assert_eq!(store.parent_of(id(DEPTH)).unwrap(), Some(id(DEPTH - 1)));

        let removed = store.remove(DefinitionId::FIRST).unwrap();
        assert!(store.is_empty());
        assert_eq!(removed.definition.count(), DEPTH as usize);

        store
            .insert_at(removed.definition, removed.parent, removed.index)
            .unwrap();
        assert_eq!(store.len(), DEPTH as usize);
        assert_eq!(store.parent_of(id(DEPTH)).unwrap(), Some(id(DEPTH - 1)));
        assert_eq!(
            store.iter_depth_first().last().unwrap().name(),
            format!("Level{}", DEPTH - 1)
        );
        assert_eq!(store.to_tree().len(), 1);
    }

    #[test]
    fn allocate_id_fails_at_the_end_of_the_range() {
        let mut store = DefinitionStore::from_tree(vec![
            Definition::new("Last", "Emitter").with_id(id(u32::MAX - 1)),
        ])
        .unwrap();
        assert_eq!(store.next_id(), id(u32::MAX));
        assert_eq!(store.allocate_id(), Err(StoreError::IdsExhausted));
        assert_eq!(
            store.insert(Definition::new("More", "Emitter"), None),
            Err(StoreError::IdsExhausted)
        );
    }
}
