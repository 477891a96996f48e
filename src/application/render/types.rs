use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::composites::ContentModule;

/// Output of one module render, keyed by the identity it was rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFragment {
    pub module_id: Uuid,
    pub html: String,
}

/// Structured errors surfaced by module renders.
///
/// These feed tracing and counters only; a failed module is omitted from the
/// assembled output and the error never propagates to the composite caller.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("no renderer registered for type tag `{type_tag}`")]
    UnknownType { type_tag: String },
    #[error("renderer failed: {message}")]
    Renderer { message: String },
    #[error("render timed out after {elapsed_ms}ms")]
    TimedOut { elapsed_ms: u64 },
    #[error("render task panicked: {message}")]
    Panicked { message: String },
}

impl RenderError {
    pub fn renderer(message: impl Into<String>) -> Self {
        Self::Renderer {
            message: message.into(),
        }
    }
}

/// Result of one dispatched module render.
#[derive(Debug, Clone)]
pub enum ModuleOutcome {
    Rendered(RenderedFragment),
    /// The renderer ran but produced no content. Omitted without being
    /// counted as a failure.
    Empty,
    Failed(RenderError),
}

/// Renders a single content module into an HTML fragment.
///
/// Implementations must be independent of their siblings: a renderer may
/// suspend arbitrarily (I/O, nested composites) but must not share mutable
/// state with other in-flight renders. `Ok(None)` means the renderer chose
/// to emit nothing for this module.
#[async_trait]
pub trait ModuleRenderer: Send + Sync {
    async fn render(&self, module: &ContentModule) -> Result<Option<String>, RenderError>;
}
