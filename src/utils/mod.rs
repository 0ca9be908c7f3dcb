//! Utility functions.
//!
//! This module provides:
//! - Lenient JSON field decoding for client- and provider-supplied payloads
//! - Log value sanitization

pub mod lenient;
pub mod sanitize;

pub use sanitize::sanitize_log_value;
