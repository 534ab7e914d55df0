//! Worker thread that owns the tokio runtime and the order flow controller.

pub mod commands;
pub mod runtime;
