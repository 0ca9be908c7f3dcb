//! ip_lookup library: IP and domain lookup server
//!
//! This library answers "where is this address?" over UDP or HTTP. A request
//! names a target (an address, a host name, or something URL-shaped) or lets
//! the server infer one from the connection. Domains are resolved through the
//! system resolver, escalating to public DNS servers only when no public
//! address turns up. The selected address is geolocated by free providers
//! tried in order, and every response carries a client/server clock-gap
//! measurement and the request context.
//!
//! # Example
//!
//! ```no_run
//! use ip_lookup::{run_server, Config, Protocol};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     protocol: Protocol::Http,
//!     port: Some(8765),
//!     ..Default::default()
//! };
//! run_server(&config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod lookup;
pub mod protocol;
pub mod provider;
pub mod server;
pub mod target;
pub mod timing;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Protocol};
pub use lookup::{LookupOutcome, LookupService};
pub use protocol::{RequestHandler, Response};
pub use server::{run_server, Server};
