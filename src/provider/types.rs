//! Unified geolocation schema.
//!
//! Every provider's answer is mapped into these types. Fields a provider does
//! not supply are serialized as an empty string rather than omitted, so
//! callers always see the same shape whichever provider answered.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::error_handling::ProviderError;

/// An external geolocation source.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Display name used in attempt traces (e.g. `ipwho.is`).
    fn name(&self) -> &str;

    /// Looks up `ip` and returns the normalized record.
    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, ProviderError>;
}

/// Maps a provider's raw payload into the unified schema.
pub trait Normalize {
    /// Consumes the payload and produces a [`GeoRecord`].
    fn normalize(self) -> GeoRecord;
}

/// Provider-independent geolocation data for one address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoRecord {
    /// Address the provider reports having looked up
    pub ip: String,
    /// `IPv4` / `IPv6` when the provider says so
    pub ip_type: String,
    pub location: Location,
    pub country_details: CountryDetails,
    pub network: NetworkInfo,
    pub timezone: TimezoneInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub continent: String,
    pub continent_code: String,
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub region_code: String,
    pub city: String,
    #[serde(serialize_with = "empty_if_none")]
    pub latitude: Option<f64>,
    #[serde(serialize_with = "empty_if_none")]
    pub longitude: Option<f64>,
    pub postal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountryDetails {
    #[serde(serialize_with = "empty_if_none")]
    pub is_eu: Option<bool>,
    pub calling_code: String,
    pub capital: String,
    pub borders: String,
    pub flag_emoji: String,
    pub flag_image_url: String,
    pub district: String,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkInfo {
    #[serde(serialize_with = "empty_if_none")]
    pub asn: Option<u32>,
    pub isp: String,
    pub organization: String,
    pub domain: String,
    pub asn_name: String,
    pub reverse_dns: String,
    #[serde(serialize_with = "empty_if_none")]
    pub is_mobile: Option<bool>,
    #[serde(serialize_with = "empty_if_none")]
    pub is_proxy: Option<bool>,
    #[serde(serialize_with = "empty_if_none")]
    pub is_hosting: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimezoneInfo {
    pub id: String,
    pub abbr: String,
    /// `±HH:MM`
    pub utc_offset: String,
    #[serde(serialize_with = "empty_if_none")]
    pub offset_seconds: Option<i64>,
    pub current_time: String,
    #[serde(serialize_with = "empty_if_none")]
    pub is_dst: Option<bool>,
}

/// One provider attempt in a lookup's trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderAttempt {
    /// Successful attempt.
    pub fn succeeded(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            ok: true,
            error: None,
        }
    }

    /// Failed attempt with its error message.
    pub fn failed(provider: &str, error: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Provider metadata attached to every lookup that reached the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    /// Provider that answered (empty when all failed)
    pub used_provider: String,
    /// Provider after the one that answered (empty for the last one)
    pub fallback_provider: String,
    /// Provider names joined with ` -> `
    pub lookup_chain: String,
    pub free_sources_only: bool,
    pub provider_attempts: Vec<ProviderAttempt>,
}

/// Serializes `None` as `""` so absent fields keep their key.
fn empty_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

/// Formats an offset in seconds as `±HH:MM`.
pub fn format_utc_offset(offset_seconds: i64) -> String {
    let sign = if offset_seconds >= 0 { '+' } else { '-' };
    let absolute = offset_seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", absolute / 3600, (absolute % 3600) / 60)
}

/// Extracts the AS number from forms like `AS15169 Google LLC`, `as15169` or `15169`.
pub fn parse_asn(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let without_prefix = trimmed
        .get(..2)
        .filter(|prefix| prefix.eq_ignore_ascii_case("as"))
        .map_or(trimmed, |_| &trimmed[2..]);
    let digits: String = without_prefix
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
