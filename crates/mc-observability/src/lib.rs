//! # mc-observability
//!
//! Logging setup shared by the metadata catalog tools.
//!
//! Library crates only emit `tracing` events and spans; binaries call
//! [`init_logging_with_config`] once at startup to decide where they go.

pub mod logging;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
