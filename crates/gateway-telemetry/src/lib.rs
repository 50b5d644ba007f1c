//! # Gateway Telemetry
//!
//! Structured logging for llm-relay.
//!
//! The CLI logs to stderr; the background service has no terminal and logs
//! to a file in the relay home directory. Both honour `RUST_LOG`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

// Re-export main types
pub use logging::{init_logging, LogFormat, LogGuard, LogOutput, LoggingConfig, LoggingError};
