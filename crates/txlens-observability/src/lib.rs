//! # txlens-observability
//!
//! Structured logging for txlens binaries. Library crates only emit
//! `tracing` events; this crate decides where they go.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
