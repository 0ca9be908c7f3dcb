//! Lookup target handling.
//!
//! This module decides what a lookup runs against:
//! - Address classification helpers (literal check, public routability)
//! - Target classification (`ip` vs `domain`) with host extraction
//! - Default target inference from connection metadata

mod address;
mod classify;
mod default;

// Re-export public API
pub use address::{contains_public_ip, is_ip_value, is_public_ip, parse_ip};
pub use classify::{classify_target, extract_lookup_host, TargetClassification, TargetKind};
pub use default::{choose_default_target, DefaultTargetPolicy};
