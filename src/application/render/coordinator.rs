use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::composites::ContentModule;
use crate::infra::telemetry::{
    METRIC_COMPOSITE_RENDER_MS, METRIC_MODULES_EMPTY, METRIC_MODULES_FAILED,
    METRIC_MODULES_RENDERED,
};

use super::assembler::assemble;
use super::config::RenderConfig;
use super::mailbox::FragmentMailbox;
use super::registry::RendererRegistry;
use super::resolver::CompositeResolver;
use super::types::{ModuleOutcome, RenderError, RenderedFragment};

/// Aggregated result of rendering one composite.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositeOutput {
    pub html: String,
    /// Fragments present in the output.
    pub rendered: usize,
    /// Modules omitted because their render failed, timed out, or produced
    /// nothing.
    pub omitted: usize,
}

/// Fans out one render task per content module and reassembles the surviving
/// fragments in declared order.
///
/// The coordinator is infallible at the output level: per-module failures
/// shrink the output silently and are surfaced only through tracing events
/// and counters. It holds no per-invocation state, so a renderer may call
/// back into it for nested composites.
pub struct RenderCoordinator {
    registry: Arc<dyn RendererRegistry>,
    mailbox: FragmentMailbox,
    config: RenderConfig,
}

impl RenderCoordinator {
    pub fn new(registry: Arc<dyn RendererRegistry>) -> Self {
        Self::with_config(registry, RenderConfig::default())
    }

    pub fn with_config(registry: Arc<dyn RendererRegistry>, config: RenderConfig) -> Self {
        Self {
            registry,
            mailbox: FragmentMailbox::new(),
            config,
        }
    }

    /// Resolve `name` and render its modules into one aggregated output.
    ///
    /// An unknown name or a composite without modules is a no-op: the result
    /// is a neutral empty output, not an error.
    pub async fn render_composite<R>(&self, resolver: &R, name: &str) -> CompositeOutput
    where
        R: CompositeResolver + ?Sized,
    {
        let started_at = Instant::now();

        let Some(composite) = resolver.resolve(name).await else {
            info!(
                target = "application::render::render_composite",
                name, "composite not found; rendering nothing"
            );
            return CompositeOutput::default();
        };
        if composite.is_empty() {
            return CompositeOutput::default();
        }

        let total = composite.modules.len();
        let fragments = self.render_modules(&composite.name, &composite.modules).await;
        let rendered = fragments.len();
        let elapsed_ms = started_at.elapsed().as_millis() as u64;

        histogram!(METRIC_COMPOSITE_RENDER_MS).record(elapsed_ms as f64);
        info!(
            target = "application::render::render_composite",
            name = %composite.name,
            rendered,
            omitted = total - rendered,
            elapsed_ms,
            "composite rendered"
        );

        CompositeOutput {
            html: assemble(&fragments),
            rendered,
            omitted: total - rendered,
        }
    }

    /// Core fan-out/fan-in: render every module concurrently and return the
    /// fragments in the order `modules` was given, dropping entries whose
    /// render failed or produced nothing.
    ///
    /// `composite_tag` only labels log events; it carries no semantics.
    pub async fn render_modules(
        &self,
        composite_tag: &str,
        modules: &[ContentModule],
    ) -> Vec<RenderedFragment> {
        if modules.is_empty() {
            return Vec::new();
        }

        // Tracking keys embed a fresh dispatch id so that concurrent or
        // nested renders of the same composite never collide in the mailbox.
        let dispatch_id = Uuid::new_v4();
        let timeout = self.config.module_timeout();

        let mut receivers = Vec::with_capacity(modules.len());
        let mut children: Vec<(String, JoinHandle<()>)> = Vec::with_capacity(modules.len());

        for (idx, module) in modules.iter().enumerate() {
            let tracking_key = format!("{dispatch_id}:{idx}");
            receivers.push(self.mailbox.register(tracking_key.clone()));

            let mailbox = self.mailbox.clone();
            let registry = Arc::clone(&self.registry);
            let module = module.clone();
            let key = tracking_key.clone();
            let handle = tokio::spawn(async move {
                let outcome = render_one(registry.as_ref(), &module, timeout).await;
                if mailbox.deliver(&key, outcome).is_err() {
                    warn!(
                        target = "application::render::render_modules",
                        module_id = %module.id,
                        "fragment receiver dropped before delivery"
                    );
                }
            });
            children.push((tracking_key, handle));
        }

        // Join barrier: every dispatched task finishes before any result is
        // read. A panicked task gets its pending channel resolved as failed
        // so the barrier can never hang on it.
        for (tracking_key, handle) in children {
            if let Err(err) = handle.await {
                warn!(
                    target = "application::render::render_modules",
                    composite = composite_tag,
                    error = %err,
                    "render child task panicked"
                );
                self.mailbox.cancel(
                    &tracking_key,
                    RenderError::Panicked {
                        message: err.to_string(),
                    },
                );
            }
        }
        let outcomes = futures::future::join_all(receivers).await;

        let mut fragments = Vec::with_capacity(modules.len());
        for (module, outcome) in modules.iter().zip(outcomes) {
            match outcome {
                Ok(ModuleOutcome::Rendered(fragment)) => {
                    counter!(METRIC_MODULES_RENDERED).increment(1);
                    fragments.push(fragment);
                }
                Ok(ModuleOutcome::Empty) => {
                    counter!(METRIC_MODULES_EMPTY).increment(1);
                    info!(
                        target = "application::render::render_modules",
                        composite = composite_tag,
                        module_id = %module.id,
                        type_tag = %module.type_tag,
                        "module produced no content; omitting"
                    );
                }
                Ok(ModuleOutcome::Failed(err)) => {
                    counter!(METRIC_MODULES_FAILED).increment(1);
                    warn!(
                        target = "application::render::render_modules",
                        composite = composite_tag,
                        module_id = %module.id,
                        type_tag = %module.type_tag,
                        error = %err,
                        "module render failed; omitting"
                    );
                }
                Err(_) => {
                    // The sender vanished without a delivery or a cancel;
                    // treat like any other failure and keep the siblings.
                    counter!(METRIC_MODULES_FAILED).increment(1);
                    warn!(
                        target = "application::render::render_modules",
                        composite = composite_tag,
                        module_id = %module.id,
                        "render result channel dropped; omitting"
                    );
                }
            }
        }

        fragments
    }
}

async fn render_one(
    registry: &dyn RendererRegistry,
    module: &ContentModule,
    timeout: Option<Duration>,
) -> ModuleOutcome {
    let Some(renderer) = registry.renderer_for(&module.type_tag) else {
        return ModuleOutcome::Failed(RenderError::UnknownType {
            type_tag: module.type_tag.clone(),
        });
    };

    let render = renderer.render(module);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, render).await {
            Ok(result) => result,
            Err(_) => {
                return ModuleOutcome::Failed(RenderError::TimedOut {
                    elapsed_ms: limit.as_millis() as u64,
                });
            }
        },
        None => render.await,
    };

    match result {
        Ok(Some(html)) if !html.is_empty() => ModuleOutcome::Rendered(RenderedFragment {
            module_id: module.id,
            html,
        }),
        Ok(_) => ModuleOutcome::Empty,
        Err(err) => ModuleOutcome::Failed(err),
    }
}
