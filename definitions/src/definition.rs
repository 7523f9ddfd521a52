//! Identity and owned tree form of definitions.
//!
//! [`Definition`] is the detached, serializable shape of a definition and
//! its descendants. It is what persistence reads and writes, what the
//! clipboard carries, and what undo keeps for a removed subtree. Live
//! definitions are owned by [`DefinitionStore`](crate::DefinitionStore).

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Stable identity of a definition.
///
/// Assigned once from the store's counter and never reused, not even after
/// the definition is removed. Undoing a removal restores the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(NonZeroU32);

impl DefinitionId {
    /// The id handed out by an empty store.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Wraps a raw id. Returns `None` for `0`, which means "root level".
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw integer value.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The id after this one, or `None` on overflow.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed parameter value. Opaque to the tree; only carried and compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// RGBA, each channel in `0.0..=1.0`.
    Color([f32; 4]),
    /// Control points of a curve, `[x, y]`.
    Curve(Vec<[f32; 2]>),
}

/// Parameter name → value, kept in name order.
pub type Parameters = BTreeMap<String, ParameterValue>;

/// A definition together with all of its descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// `None` until the store assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DefinitionId>,
    /// Unique across the whole tree. Left empty, it is generated from the
    /// declaration by [`DefinitionStore::assign_names`](crate::DefinitionStore::assign_names).
    pub name: String,
    /// Name of the declaration (template) this definition instantiates.
    pub declaration: String,
    #[serde(default)]
    pub parameters: Parameters,
    /// Children in display and persistence order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Definition>,
}

impl Definition {
    /// Creates a definition without id, parameters or children.
    pub fn new(name: impl Into<String>, declaration: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            declaration: declaration.into(),
            parameters: Parameters::new(),
            children: Vec::new(),
        }
    }

    /// Builder: sets the id.
    pub fn with_id(mut self, id: DefinitionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder: sets one parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Builder: appends a child.
    pub fn with_child(mut self, child: Definition) -> Self {
        self.children.push(child);
        self
    }

    /// Number of definitions in this subtree, including `self`.
    pub fn count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }

    /// Visits this definition and its descendants in pre-order.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Definition)) {
        let mut stack = vec![self];
        while let Some(definition) = stack.pop() {
            f(definition);
            stack.extend(definition.children.iter().rev());
        }
    }

    /// Mutable pre-order visit.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Definition)) {
        let mut stack = vec![self];
        while let Some(definition) = stack.pop() {
            f(&mut *definition);
            stack.extend(definition.children.iter_mut().rev());
        }
    }

    /// Forgets every id in the subtree so the store assigns fresh ones.
    pub fn clear_ids(&mut self) {
        self.visit_mut(&mut |d| d.id = None);
    }
}

// Nested children would otherwise be dropped recursively.
impl Drop for Definition {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}
