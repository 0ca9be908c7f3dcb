//! Domain resolver initialization.
//!
//! The system resolver is always the first stage. Each configured DNS server
//! becomes one fallback stage, queried either directly or through
//! `nslookup`.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

use crate::config::{Config, FallbackResolverKind};
use crate::dns::{AddressSource, DomainResolver, NameserverSource, NslookupSource, SystemSource};

/// Builds the escalating domain resolver described by `config`.
pub fn init_domain_resolver(config: &Config) -> DomainResolver {
    let timeout = Duration::from_secs(config.resolver_timeout_secs);
    let fallbacks = config
        .dns_servers
        .iter()
        .map(|&server| -> Arc<dyn AddressSource> {
            match config.fallback_resolver {
                FallbackResolverKind::Nameserver => Arc::new(NameserverSource::new(
                    server,
                    init_nameserver_resolver(server, timeout),
                )),
                FallbackResolverKind::Nslookup => Arc::new(NslookupSource::new(server)),
            }
        })
        .collect();

    DomainResolver::new(Arc::new(SystemSource), fallbacks, timeout)
}

/// Initializes a hickory resolver that talks to `server` only.
///
/// Caching is disabled so no resolution state outlives a request, and
/// `ndots` is 0 so search domains are never appended.
pub fn init_nameserver_resolver(server: IpAddr, timeout: Duration) -> TokioAsyncResolver {
    let servers = NameServerConfigGroup::from_ips_clear(&[server], 53, true);
    let config = ResolverConfig::from_parts(None, Vec::new(), servers);

    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.ndots = 0;
    opts.cache_size = 0;

    TokioAsyncResolver::tokio(config, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolver_has_no_fallbacks_without_servers() {
        let config = Config {
            dns_servers: Vec::new(),
            ..Default::default()
        };
        // Only the system stage runs; localhost never needs escalation.
        let result = init_domain_resolver(&config).resolve("localhost").await;
        assert!(result.addresses().iter().all(|ip| ip.is_loopback()));
    }

    #[tokio::test]
    async fn test_nslookup_fallback_kind_builds() {
        let config = Config {
            fallback_resolver: FallbackResolverKind::Nslookup,
            ..Default::default()
        };
        let _resolver = init_domain_resolver(&config);
    }
}
