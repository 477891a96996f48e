//! Render coordination configuration.

use std::time::Duration;

use serde::Deserialize;

/// Tuning knobs for the render coordinator.
///
/// The default waits unboundedly at the join barrier: a stalled renderer
/// stalls the whole composite. Hosts that cannot tolerate that set
/// `module_timeout_ms`; a render that exceeds the limit is omitted from the
/// output exactly like a failed one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Per-module render timeout in milliseconds. `None` waits indefinitely.
    pub module_timeout_ms: Option<u64>,
}

impl RenderConfig {
    pub fn module_timeout(&self) -> Option<Duration> {
        self.module_timeout_ms.map(Duration::from_millis)
    }
}
