//! Ordered provider fallback.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::types::{GeoProvider, GeoRecord, ProviderAttempt, ProviderInfo};
use crate::error_handling::ProviderError;

/// Result of running the chain for one address.
#[derive(Debug, Clone)]
pub enum ChainOutcome {
    /// A provider answered; `info.provider_attempts` ends with its success.
    Answered {
        record: GeoRecord,
        info: ProviderInfo,
    },
    /// Every provider failed; `errors` has one message per attempt.
    Exhausted {
        errors: Vec<String>,
        info: ProviderInfo,
    },
}

impl ChainOutcome {
    /// Provider metadata for either outcome.
    pub fn info(&self) -> &ProviderInfo {
        match self {
            ChainOutcome::Answered { info, .. } | ChainOutcome::Exhausted { info, .. } => info,
        }
    }
}

/// Providers tried in priority order, one at a time, until one succeeds.
///
/// Attempts never overlap and are never retried against the same provider.
/// The shared semaphore caps provider calls across all concurrent requests.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn GeoProvider>>,
    attempt_timeout: Duration,
    permits: Arc<Semaphore>,
}

impl ProviderChain {
    /// Creates a chain; `max_concurrent_calls` is clamped to at least 1.
    pub fn new(
        providers: Vec<Arc<dyn GeoProvider>>,
        attempt_timeout: Duration,
        max_concurrent_calls: usize,
    ) -> Self {
        Self {
            providers,
            attempt_timeout,
            permits: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
        }
    }

    /// Provider names joined with ` -> `.
    pub fn lookup_chain(&self) -> String {
        self.providers
            .iter()
            .map(|p| p.name().to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// `true` when the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Looks up `ip`, stopping at the first provider that succeeds.
    pub async fn lookup(&self, ip: IpAddr) -> ChainOutcome {
        let mut info = ProviderInfo {
            lookup_chain: self.lookup_chain(),
            free_sources_only: true,
            ..Default::default()
        };
        let mut errors = Vec::new();

        for (index, provider) in self.providers.iter().enumerate() {
            let name = provider.name();
            match self.attempt(provider.as_ref(), ip).await {
                Ok(record) => {
                    log::debug!("Provider {name} answered for {ip}");
                    info.provider_attempts.push(ProviderAttempt::succeeded(name));
                    info.used_provider = name.to_string();
                    info.fallback_provider = self
                        .providers
                        .get(index + 1)
                        .map(|next| next.name().to_string())
                        .unwrap_or_default();
                    return ChainOutcome::Answered { record, info };
                }
                Err(e) => {
                    let message = e.to_string();
                    log::warn!("Provider {name} failed for {ip}: {message}");
                    info.provider_attempts
                        .push(ProviderAttempt::failed(name, message.clone()));
                    errors.push(message);
                }
            }
        }

        ChainOutcome::Exhausted { errors, info }
    }

    async fn attempt(
        &self,
        provider: &dyn GeoProvider,
        ip: IpAddr,
    ) -> Result<GeoRecord, ProviderError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        match tokio::time::timeout(self.attempt_timeout, provider.lookup(ip)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.attempt_timeout)),
        }
    }
}
