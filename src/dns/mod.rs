//! Domain resolution with escalation.
//!
//! Names are resolved by the operating system's stub resolver first. Only if
//! that yields no publicly routable address does resolution escalate to a
//! fixed list of public DNS servers, one at a time, stopping as soon as a
//! public address turns up.
//!
//! Each stage is an [`AddressSource`]; stage failures (timeouts, command
//! errors, NXDOMAIN) count as "no addresses" and never reach the caller.

mod nameserver;
mod nslookup;
mod resolution;
mod source;
mod system;

// Re-export public API
pub use nameserver::NameserverSource;
pub use nslookup::{parse_ip_tokens, NslookupSource};
pub use resolution::{DomainResolver, ResolutionResult};
pub use source::AddressSource;
pub use system::SystemSource;

#[cfg(test)]
mod tests;
