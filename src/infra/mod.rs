//! Infrastructure concerns shared with the host process.

pub mod telemetry;
