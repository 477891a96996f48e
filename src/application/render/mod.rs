//! Concurrent composite rendering pipeline.
//!
//! One render task is spawned per content module; each delivers exactly one
//! [`ModuleOutcome`] through the [`FragmentMailbox`], the coordinator waits
//! for all of them at a single join barrier, and the surviving fragments are
//! reassembled in the order the resolver declared. Per-module failures are
//! swallowed into omission: one bad module never breaks the composite, and
//! no error detail reaches the caller beyond tracing events and counters.

mod assembler;
mod config;
mod coordinator;
mod mailbox;
mod registry;
mod resolver;
mod types;

pub use assembler::assemble;
pub use config::RenderConfig;
pub use coordinator::{CompositeOutput, RenderCoordinator};
pub use mailbox::{FragmentMailbox, MailboxError};
pub use registry::{RendererMap, RendererRegistry, normalize_type_tag};
pub use resolver::{CompositeResolver, StaticComposites};
pub use types::{ModuleOutcome, ModuleRenderer, RenderError, RenderedFragment};
