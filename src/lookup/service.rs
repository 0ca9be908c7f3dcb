//! Resolve-then-geolocate pipeline for one target.

use std::net::IpAddr;

use super::result::{LookupFailure, LookupOutcome, LookupResult};
use crate::config::{ERROR_ALL_PROVIDERS_FAILED, ERROR_UNRESOLVED_DOMAIN};
use crate::dns::DomainResolver;
use crate::provider::{ChainOutcome, ProviderChain};
use crate::target::{classify_target, TargetKind};

/// Error for a blank target passed straight to [`LookupService::lookup_target`].
const ERROR_TARGET_REQUIRED: &str = "Lookup target is required";

/// What is known about a target before the providers run.
struct TargetMetadata {
    input: String,
    kind: TargetKind,
    resolved_host: String,
    resolved_ips: Vec<String>,
}

/// Runs the resolve-then-lookup pipeline for one target.
///
/// Holds no per-request state; one instance is shared by every request.
#[derive(Clone)]
pub struct LookupService {
    resolver: DomainResolver,
    chain: ProviderChain,
}

impl LookupService {
    pub fn new(resolver: DomainResolver, chain: ProviderChain) -> Self {
        Self { resolver, chain }
    }

    /// Looks up an explicit target (address, host name, or URL-shaped string).
    pub async fn lookup_target(&self, target: &str) -> LookupOutcome {
        let input = target.trim();
        if input.is_empty() {
            return LookupFailure::new(ERROR_TARGET_REQUIRED).into();
        }

        let classification = classify_target(input);
        let host = classification.host;

        if classification.kind == TargetKind::Ip {
            // Classification guarantees the host parses.
            let Ok(ip) = host.parse::<IpAddr>() else {
                return LookupFailure::new(ERROR_UNRESOLVED_DOMAIN).into();
            };
            let metadata = TargetMetadata {
                input: input.to_string(),
                kind: TargetKind::Ip,
                resolved_ips: vec![host.clone()],
                resolved_host: host,
            };
            return self.lookup_ip(ip, metadata).await;
        }

        let resolution = self.resolver.resolve(&host).await;
        let Some(selected) = resolution.preferred() else {
            log::info!("Domain {host} did not resolve to any address");
            return LookupFailure {
                input: Some(input.to_string()),
                target_type: Some(TargetKind::Domain),
                resolved_host: Some(host),
                ..LookupFailure::new(ERROR_UNRESOLVED_DOMAIN)
            }
            .into();
        };

        log::debug!(
            "Resolved {host} to {} address(es), querying providers for {selected}",
            resolution.addresses().len()
        );
        let metadata = TargetMetadata {
            input: input.to_string(),
            kind: TargetKind::Domain,
            resolved_host: host,
            resolved_ips: resolution.to_strings(),
        };
        self.lookup_ip(selected, metadata).await
    }

    async fn lookup_ip(&self, ip: IpAddr, metadata: TargetMetadata) -> LookupOutcome {
        match self.chain.lookup(ip).await {
            ChainOutcome::Answered { record, info } => {
                let ip = if record.ip.is_empty() {
                    ip.to_string()
                } else {
                    record.ip
                };
                LookupOutcome::Found(Box::new(LookupResult {
                    ok: true,
                    input: metadata.input,
                    target_type: metadata.kind,
                    resolved_host: metadata.resolved_host,
                    resolved_ips: metadata.resolved_ips,
                    ip,
                    ip_type: record.ip_type,
                    provider: info.used_provider.clone(),
                    provider_info: info,
                    location: record.location,
                    country_details: record.country_details,
                    network: record.network,
                    timezone: record.timezone,
                }))
            }
            ChainOutcome::Exhausted { errors, info } => LookupFailure {
                input: Some(metadata.input),
                target_type: Some(metadata.kind),
                resolved_host: Some(metadata.resolved_host),
                resolved_ips: Some(metadata.resolved_ips),
                provider_errors: Some(errors),
                provider_info: Some(info),
                ..LookupFailure::new(ERROR_ALL_PROVIDERS_FAILED)
            }
            .into(),
        }
    }
}
