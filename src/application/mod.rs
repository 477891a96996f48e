//! Application layer services.

pub mod render;
