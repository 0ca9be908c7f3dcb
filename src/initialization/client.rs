//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, USER_AGENT};
use crate::error_handling::InitializationError;

/// Initializes the HTTP client shared by every geolocation provider.
///
/// Creates a `reqwest::Client` configured with:
/// - the crate User-Agent
/// - the per-provider timeout from configuration
/// - no connection pool reuse across idle periods
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(0)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_with_defaults() {
        assert!(init_client(&Config::default()).is_ok());
    }
}
