//! Escalating domain resolution.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::source::AddressSource;
use crate::target::is_public_ip;

/// Unique addresses found for one domain, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    addresses: Vec<IpAddr>,
    has_public: bool,
}

impl ResolutionResult {
    /// Builds a result from addresses, dropping duplicates.
    pub fn from_addresses(addresses: impl IntoIterator<Item = IpAddr>) -> Self {
        let mut result = Self::default();
        result.merge(addresses);
        result
    }

    /// Appends addresses not already present, keeping first-seen order.
    pub fn merge(&mut self, addresses: impl IntoIterator<Item = IpAddr>) {
        for ip in addresses {
            if !self.addresses.contains(&ip) {
                self.has_public |= is_public_ip(ip);
                self.addresses.push(ip);
            }
        }
    }

    /// All addresses, in discovery order.
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// Whether at least one address is publicly routable.
    pub fn has_public(&self) -> bool {
        self.has_public
    }

    /// `true` when resolution found nothing at all.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Address to geolocate: the first public one, else the first one.
    pub fn preferred(&self) -> Option<IpAddr> {
        self.addresses
            .iter()
            .copied()
            .find(|ip| is_public_ip(*ip))
            .or_else(|| self.addresses.first().copied())
    }

    /// Addresses rendered as strings for responses.
    pub fn to_strings(&self) -> Vec<String> {
        self.addresses.iter().map(ToString::to_string).collect()
    }
}

/// Resolves names with a primary source and an ordered fallback chain.
#[derive(Clone)]
pub struct DomainResolver {
    primary: Arc<dyn AddressSource>,
    fallbacks: Vec<Arc<dyn AddressSource>>,
    stage_timeout: Duration,
}

impl DomainResolver {
    /// Creates a resolver. Each stage gets `stage_timeout` before it is
    /// abandoned and treated as empty.
    pub fn new(
        primary: Arc<dyn AddressSource>,
        fallbacks: Vec<Arc<dyn AddressSource>>,
        stage_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallbacks,
            stage_timeout,
        }
    }

    /// Resolves `domain`, escalating only while no public address is known.
    ///
    /// An empty result means resolution failed; errors are never returned.
    pub async fn resolve(&self, domain: &str) -> ResolutionResult {
        let mut result = ResolutionResult::from_addresses(self.run_stage(&self.primary, domain).await);
        if result.has_public() {
            return result;
        }

        for source in &self.fallbacks {
            log::debug!(
                "Escalating resolution of {domain} to {} ({} address(es) so far)",
                source.label(),
                result.addresses().len()
            );
            result.merge(self.run_stage(source, domain).await);
            if result.has_public() {
                break;
            }
        }
        result
    }

    async fn run_stage(&self, source: &Arc<dyn AddressSource>, domain: &str) -> Vec<IpAddr> {
        match tokio::time::timeout(self.stage_timeout, source.resolve(domain)).await {
            Ok(Ok(addresses)) => addresses,
            Ok(Err(e)) => {
                log::debug!("Resolution stage {} failed for {domain}: {e:#}", source.label());
                Vec::new()
            }
            Err(_) => {
                log::debug!(
                    "Resolution stage {} timed out after {:?} for {domain}",
                    source.label(),
                    self.stage_timeout
                );
                Vec::new()
            }
        }
    }
}
