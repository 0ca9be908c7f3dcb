//! Lookup pipeline.
//!
//! Classifies a target, resolves it when it is a domain, runs the provider
//! chain against the selected address, and shapes the unified result.

mod result;
mod service;

// Re-export public API
pub use result::{LookupFailure, LookupOutcome, LookupResult};
pub use service::LookupService;
