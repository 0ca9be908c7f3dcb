//! Resolution stage abstraction.

use std::net::IpAddr;

use anyhow::Result;
use async_trait::async_trait;

/// One way of turning a name into addresses.
///
/// Implementations report their own failures as errors; the
/// [`DomainResolver`](super::DomainResolver) decides what a failure means.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Short label for logs (e.g. `system`, `nameserver 8.8.8.8`).
    fn label(&self) -> String;

    /// Resolves `domain` to addresses, in the order the source returned them.
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>>;
}
