//! Concurrent composite renderer for content-driven pages.
//!
//! A composite is a named container whose immediate children (content
//! modules) are rendered as one aggregated unit. The coordinator dispatches
//! one render task per module, waits for all of them at a single join
//! barrier, and reassembles the fragments in the order the resolver declared
//! them, omitting modules whose render failed or produced nothing.
//!
//! The crate owns only the fan-out/fan-in core. Locating composites in a
//! content tree ([`application::render::CompositeResolver`]) and mapping a
//! module type tag to a renderer ([`application::render::RendererRegistry`])
//! are boundary traits implemented by the host.

pub mod application;
pub mod domain;
pub mod infra;
