use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// One renderable unit inside a composite.
///
/// The identity is stable for the lifetime of the render pass and is what
/// fragments are keyed by. The type tag selects a renderer; it carries no
/// meaning inside this crate beyond registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentModule {
    pub id: Uuid,
    pub type_tag: String,
    /// Opaque per-module settings forwarded to the renderer unchanged.
    #[serde(default)]
    pub properties: Value,
}

impl ContentModule {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_tag: type_tag.into(),
            properties: Value::Null,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }
}

/// A named container whose immediate children render as one aggregated unit.
///
/// Module order is the order fragments appear in the assembled output; the
/// coordinator never reorders. Identity uniqueness is owned here, on the
/// resolver side, not defended in the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composite {
    pub name: String,
    pub modules: Vec<ContentModule>,
}

impl Composite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: ContentModule) -> Self {
        self.modules.push(module);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Checks the composite invariants: a non-empty name and unique module
    /// identities among siblings.
    pub fn validate(&self) -> Result<(), CompositeError> {
        if self.name.trim().is_empty() {
            return Err(CompositeError::EmptyName);
        }

        let mut seen: HashSet<Uuid> = HashSet::with_capacity(self.modules.len());
        for module in &self.modules {
            if !seen.insert(module.id) {
                return Err(CompositeError::DuplicateModuleId {
                    name: self.name.clone(),
                    id: module.id,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("composite name must not be empty")]
    EmptyName,
    #[error("duplicate module id `{id}` in composite `{name}`")]
    DuplicateModuleId { name: String, id: Uuid },
}
