//! Metric identifiers emitted by the render pipeline.
//!
//! The crate never installs a recorder or a tracing subscriber; both are
//! host concerns. Hosts that want described metrics call
//! [`describe_metrics`] once after installing their recorder.

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};

pub const METRIC_MODULES_RENDERED: &str = "mosaico_modules_rendered_total";
pub const METRIC_MODULES_EMPTY: &str = "mosaico_modules_empty_total";
pub const METRIC_MODULES_FAILED: &str = "mosaico_modules_failed_total";
pub const METRIC_COMPOSITE_RENDER_MS: &str = "mosaico_composite_render_ms";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Register metric descriptions with the installed recorder. Safe to call
/// repeatedly; only the first call does anything.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_MODULES_RENDERED,
            Unit::Count,
            "Total number of module renders that produced a fragment."
        );
        describe_counter!(
            METRIC_MODULES_EMPTY,
            Unit::Count,
            "Total number of module renders that produced no content."
        );
        describe_counter!(
            METRIC_MODULES_FAILED,
            Unit::Count,
            "Total number of module renders omitted due to failure or timeout."
        );
        describe_histogram!(
            METRIC_COMPOSITE_RENDER_MS,
            Unit::Milliseconds,
            "End-to-end composite render latency in milliseconds."
        );
    });
}
