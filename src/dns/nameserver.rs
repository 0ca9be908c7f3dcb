//! Direct DNS query stage against one fixed server.

use std::net::IpAddr;

use anyhow::{Error, Result};
use async_trait::async_trait;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;

use super::source::AddressSource;

/// Queries a single DNS server for A/AAAA records.
pub struct NameserverSource {
    server: IpAddr,
    resolver: TokioAsyncResolver,
}

impl NameserverSource {
    /// Wraps a resolver that is configured to talk only to `server`.
    pub fn new(server: IpAddr, resolver: TokioAsyncResolver) -> Self {
        Self { server, resolver }
    }
}

#[async_trait]
impl AddressSource for NameserverSource {
    fn label(&self) -> String {
        format!("nameserver {}", self.server)
    }

    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>> {
        match self.resolver.lookup_ip(domain).await {
            Ok(response) => Ok(response.iter().collect()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
                _ => Err(Error::new(e)),
            },
        }
    }
}
