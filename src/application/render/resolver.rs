use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::composites::{Composite, CompositeError};

/// Locates a named composite and yields its ordered modules.
///
/// The contract is lookup-or-absent: an unknown name is `None`, never an
/// error. Hosts back this with whatever content tree they have; matching is
/// expected to be case-insensitive.
#[async_trait]
pub trait CompositeResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Option<Composite>;
}

/// In-memory resolver for hosts with a fixed composite set, and for tests.
///
/// Composites are validated on insert, so identity uniqueness holds for
/// everything this resolver hands out.
#[derive(Default, Clone)]
pub struct StaticComposites {
    inner: HashMap<String, Composite>,
}

impl StaticComposites {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn insert(&mut self, composite: Composite) -> Result<(), CompositeError> {
        composite.validate()?;
        self.inner
            .insert(composite.name.trim().to_lowercase(), composite);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl CompositeResolver for StaticComposites {
    async fn resolve(&self, name: &str) -> Option<Composite> {
        self.inner.get(&name.trim().to_lowercase()).cloned()
    }
}
