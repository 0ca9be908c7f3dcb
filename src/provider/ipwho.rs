//! ipwho.is provider.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::Deserialize;

use super::http::fetch_json;
use super::types::{
    CountryDetails, GeoProvider, GeoRecord, Location, NetworkInfo, Normalize, TimezoneInfo,
};
use crate::config::{IPWHO_PROVIDER_NAME, IPWHO_URL};
use crate::error_handling::ProviderError;
use crate::utils::lenient;

/// Queries `GET {base}/{ip}` on ipwho.is.
#[derive(Debug, Clone)]
pub struct IpWhoProvider {
    client: reqwest::Client,
    base_url: String,
}

impl IpWhoProvider {
    /// Provider against the public ipwho.is endpoint.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, IPWHO_URL)
    }

    /// Provider against a custom base URL (mirrors, tests).
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeoProvider for IpWhoProvider {
    fn name(&self) -> &str {
        IPWHO_PROVIDER_NAME
    }

    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, ProviderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);
        let payload: IpWhoPayload = fetch_json(&self.client, &url, &[]).await?;
        if payload.success != Some(true) {
            let message = payload
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Lookup failed".to_string());
            return Err(ProviderError::Unsuccessful(message));
        }
        Ok(payload.normalize())
    }
}

/// Raw ipwho.is response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpWhoPayload {
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ip: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub ip_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub continent: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub continent_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub country_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub region: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub region_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_eu: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub postal: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub calling_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub capital: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub borders: String,
    #[serde(default)]
    pub flag: Option<IpWhoFlag>,
    #[serde(default)]
    pub connection: Option<IpWhoConnection>,
    #[serde(default)]
    pub timezone: Option<IpWhoTimezone>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpWhoFlag {
    #[serde(default, deserialize_with = "lenient::string")]
    pub img: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub emoji: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpWhoConnection {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub asn: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub org: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub isp: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub domain: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpWhoTimezone {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub abbr: String,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_dst: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub utc: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub current_time: String,
}

impl Normalize for IpWhoPayload {
    fn normalize(self) -> GeoRecord {
        let flag = self.flag.unwrap_or_default();
        let connection = self.connection.unwrap_or_default();
        let timezone = self.timezone.unwrap_or_default();
        GeoRecord {
            ip: self.ip,
            ip_type: self.ip_type,
            location: Location {
                continent: self.continent,
                continent_code: self.continent_code,
                country: self.country,
                country_code: self.country_code,
                region: self.region,
                region_code: self.region_code,
                city: self.city,
                latitude: self.latitude,
                longitude: self.longitude,
                postal: self.postal,
            },
            country_details: CountryDetails {
                is_eu: self.is_eu,
                calling_code: self.calling_code,
                capital: self.capital,
                borders: self.borders,
                flag_emoji: flag.emoji,
                flag_image_url: flag.img,
                district: String::new(),
                currency: String::new(),
            },
            network: NetworkInfo {
                asn: connection.asn.and_then(|asn| u32::try_from(asn).ok()),
                isp: connection.isp,
                // ipwho.is has no separate AS name; its org is the AS holder.
                asn_name: connection.org.clone(),
                organization: connection.org,
                domain: connection.domain,
                reverse_dns: String::new(),
                is_mobile: None,
                is_proxy: None,
                is_hosting: None,
            },
            timezone: TimezoneInfo {
                id: timezone.id,
                abbr: timezone.abbr,
                utc_offset: timezone.utc,
                offset_seconds: timezone.offset,
                current_time: timezone.current_time,
                is_dst: timezone.is_dst,
            },
        }
    }
}
