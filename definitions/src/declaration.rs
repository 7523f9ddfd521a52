//! Declarations: the templates definitions are instantiated from.
//!
//! A declaration names a kind of definition (an emitter, a force field,
//! a curve set) and lists the parameters every instance carries, with
//! their default values. The tree itself treats the declaration name as
//! an opaque string.

use serde::{Deserialize, Serialize};

use crate::definition::{Definition, ParameterValue, Parameters};

/// A template for new definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    /// Parameters of every instance, with default values.
    #[serde(default)]
    pub parameters: Parameters,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::new(),
        }
    }

    /// Builder: declares a parameter with its default value.
    pub fn with_parameter(mut self, name: impl Into<String>, default: ParameterValue) -> Self {
        self.parameters.insert(name.into(), default);
        self
    }

    /// A new, unnamed definition of this kind with default parameters.
    ///
    /// The name is left empty so the store generates one.
    pub fn instantiate(&self) -> Definition {
        Definition {
            id: None,
            name: String::new(),
            declaration: self.name.clone(),
            parameters: self.parameters.clone(),
            children: Vec::new(),
        }
    }
}

/// Ordered set of known declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationTable {
    declarations: Vec<Declaration>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration, replacing one with the same name in place.
    pub fn insert(&mut self, declaration: Declaration) {
        match self.declarations.iter_mut().find(|d| d.name == declaration.name) {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, declaration: Declaration) -> Self {
        self.insert(declaration);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// The declaration a fresh document starts with.
    pub fn first(&self) -> Option<&Declaration> {
        self.declarations.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Adds default values for parameters the declaration lists but
    /// `definition` (or any descendant) lacks. Returns how many were added.
    ///
    /// Definitions saved before a parameter was declared load with the
    /// default value. Unknown declarations are left alone.
    pub fn add_missing_parameters(&self, definition: &mut Definition) -> usize {
        let mut added = 0;
        definition.visit_mut(&mut |d| {
            let Some(declaration) = self.get(&d.declaration) else {
                log::debug!("\"{}\" uses unknown declaration \"{}\"", d.name, d.declaration);
                return;
            };
            for (name, default) in &declaration.parameters {
                if !d.parameters.contains_key(name) {
                    log::debug!("Adding missing parameter \"{name}\" to \"{}\"", d.name);
                    d.parameters.insert(name.clone(), default.clone());
                    added += 1;
                }
            }
        });
        added
    }
}
