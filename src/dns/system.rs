//! Operating system resolver stage.

use std::net::IpAddr;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::source::AddressSource;

/// Resolves through the local stub resolver (`getaddrinfo`).
///
/// Honors `/etc/hosts`, search domains and whatever upstream the host is
/// configured for; no particular DNS server is contacted directly.
#[derive(Debug, Clone, Default)]
pub struct SystemSource;

#[async_trait]
impl AddressSource for SystemSource {
    fn label(&self) -> String {
        "system".to_string()
    }

    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((domain, 0))
            .await
            .with_context(|| format!("system resolver failed for {domain}"))?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}
