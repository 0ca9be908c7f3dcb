//! Error handling.
//!
//! This module provides:
//! - Initialization errors (logger, log file, HTTP client)
//! - Provider attempt errors, rendered into the attempt trace
//! - Protocol errors for undecodable payloads
//!
//! None of these escape a request: provider and protocol errors are turned
//! into structured failure responses by the lookup pipeline.

mod types;

// Re-export public API
pub use types::{InitializationError, ProtocolError, ProviderError};
