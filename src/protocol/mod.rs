//! Request protocol.
//!
//! This module turns inbound bytes into responses, independent of transport:
//! - Request decoding (lenient field types, `lookup` by default)
//! - Dispatch to the lookup pipeline or the health probe
//! - Response shaping with timing and request context attached
//! - One request log line per request through a [`LogSink`]

mod handler;
mod log_sink;
mod request;
mod response;

// Re-export public API
pub use handler::RequestHandler;
pub use log_sink::{format_line, FileLogSink, LogSink, MemoryLogSink};
pub use request::{decode_request, Action, ClientContext, LookupRequest};
pub use response::{RequestContext, RequestSource, Response, ResponseBody};
