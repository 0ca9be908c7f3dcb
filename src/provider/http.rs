//! Shared HTTP fetch for JSON providers.

use serde::de::DeserializeOwned;

use crate::error_handling::ProviderError;

/// GETs `url` with optional query pairs and decodes the JSON body.
///
/// Non-2xx statuses, transport failures and undecodable bodies all become
/// [`ProviderError`]s; the client's own timeout applies.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    let mut request = client.get(url);
    if !query.is_empty() {
        request = request.query(query);
    }
    let response = request.send().await?.error_for_status()?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))
}
