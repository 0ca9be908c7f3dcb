//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - HTTP client for the geolocation providers
//! - Escalating domain resolver
//! - Provider chain and the request handler built on top of them
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::lookup::LookupService;
use crate::protocol::{LogSink, RequestHandler};
use crate::provider::{GeoProvider, IpApiProvider, IpWhoProvider, ProviderChain};
use crate::target::DefaultTargetPolicy;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::{init_domain_resolver, init_nameserver_resolver};

/// Initializes the provider chain: ipwho.is first, ip-api.com as fallback.
pub fn init_provider_chain(config: &Config, client: reqwest::Client) -> ProviderChain {
    let providers: Vec<Arc<dyn GeoProvider>> = vec![
        Arc::new(IpWhoProvider::with_base_url(
            client.clone(),
            config.ipwho_url.clone(),
        )),
        Arc::new(IpApiProvider::with_base_url(client, config.ipapi_url.clone())),
    ];
    ProviderChain::new(
        providers,
        Duration::from_secs(config.provider_timeout_secs),
        config.max_provider_calls,
    )
}

/// Initializes the lookup pipeline (resolver plus provider chain).
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the HTTP client cannot be built.
pub fn init_lookup_service(config: &Config) -> Result<LookupService, InitializationError> {
    let client = init_client(config)?;
    Ok(LookupService::new(
        init_domain_resolver(config),
        init_provider_chain(config, client),
    ))
}

/// Initializes the request handler for the configured transport.
///
/// # Errors
///
/// Returns an error if the lookup pipeline cannot be initialized.
pub fn init_request_handler(
    config: &Config,
    sink: Arc<dyn LogSink>,
) -> Result<RequestHandler, InitializationError> {
    Ok(RequestHandler::new(
        config.protocol,
        init_lookup_service(config)?,
        DefaultTargetPolicy {
            allow_private_source: config.infer_from_private_source,
        },
        sink,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IPAPI_PROVIDER_NAME, IPWHO_PROVIDER_NAME};
    use crate::protocol::MemoryLogSink;

    #[test]
    fn test_provider_chain_order() {
        let config = Config::default();
        let chain = init_provider_chain(&config, init_client(&config).unwrap());
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.lookup_chain(),
            format!("{IPWHO_PROVIDER_NAME} -> {IPAPI_PROVIDER_NAME}")
        );
    }

    #[tokio::test]
    async fn test_init_request_handler_uses_configured_protocol() {
        let config = Config {
            protocol: crate::config::Protocol::Http,
            ..Default::default()
        };
        let handler = init_request_handler(&config, Arc::new(MemoryLogSink::new())).unwrap();
        assert_eq!(handler.protocol(), crate::config::Protocol::Http);
    }
}
