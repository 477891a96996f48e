use std::{collections::HashMap, sync::Arc};

use super::types::ModuleRenderer;

/// Maps a module type tag to a renderer implementation.
///
/// A `None` lookup is not fatal: the coordinator treats the module as failed
/// and renders the rest of the composite.
pub trait RendererRegistry: Send + Sync {
    fn renderer_for(&self, type_tag: &str) -> Option<Arc<dyn ModuleRenderer>>;
}

/// Canonical form of a type tag used for registry keys.
///
/// Editors capitalise content-type aliases inconsistently, so tags match
/// after trimming and ASCII lowercasing.
pub fn normalize_type_tag(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

/// In-memory registry backed by a `HashMap`, populated once at startup.
#[derive(Default, Clone)]
pub struct RendererMap {
    inner: HashMap<String, Arc<dyn ModuleRenderer>>,
}

impl RendererMap {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn register(&mut self, type_tag: impl AsRef<str>, renderer: Arc<dyn ModuleRenderer>) {
        self.inner
            .insert(normalize_type_tag(type_tag.as_ref()), renderer);
    }

    pub fn with(mut self, type_tag: impl AsRef<str>, renderer: Arc<dyn ModuleRenderer>) -> Self {
        self.register(type_tag, renderer);
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl RendererRegistry for RendererMap {
    fn renderer_for(&self, type_tag: &str) -> Option<Arc<dyn ModuleRenderer>> {
        self.inner.get(&normalize_type_tag(type_tag)).cloned()
    }
}
