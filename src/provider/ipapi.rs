//! ip-api.com provider.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::Deserialize;

use super::http::fetch_json;
use super::types::{
    format_utc_offset, parse_asn, CountryDetails, GeoProvider, GeoRecord, Location, NetworkInfo,
    Normalize, TimezoneInfo,
};
use crate::config::{IPAPI_FIELDS, IPAPI_PROVIDER_NAME, IPAPI_URL};
use crate::error_handling::ProviderError;
use crate::utils::lenient;

/// Queries `GET {base}/{ip}?fields=...` on ip-api.com.
#[derive(Debug, Clone)]
pub struct IpApiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiProvider {
    /// Provider against the public ip-api.com endpoint.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, IPAPI_URL)
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
impl GeoProvider for IpApiProvider {
    fn name(&self) -> &str {
        IPAPI_PROVIDER_NAME
    }

    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord, ProviderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);
        let payload: IpApiPayload =
            fetch_json(&self.client, &url, &[("fields", IPAPI_FIELDS)]).await?;
        if payload.status != "success" {
            let message = payload
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Lookup failed".to_string());
            return Err(ProviderError::Unsuccessful(message));
        }
        Ok(payload.normalize())
    }
}

/// Raw ip-api.com response (only the requested fields are present).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpApiPayload {
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub query: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub continent: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub continent_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub country_code: String,
    /// Region code (e.g. `CA`)
    #[serde(default, deserialize_with = "lenient::string")]
    pub region: String,
    /// Region name (e.g. `California`)
    #[serde(default, deserialize_with = "lenient::string")]
    pub region_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub district: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub zip: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub timezone: String,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub isp: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub org: String,
    /// `AS15169 Google LLC`
    #[serde(rename = "as", default, deserialize_with = "lenient::string")]
    pub as_field: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub asname: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub reverse: String,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub mobile: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub proxy: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub hosting: Option<bool>,
}

impl Normalize for IpApiPayload {
    fn normalize(self) -> GeoRecord {
        GeoRecord {
            ip: self.query,
            ip_type: String::new(),
            location: Location {
                continent: self.continent,
                continent_code: self.continent_code,
                country: self.country,
                country_code: self.country_code,
                region: self.region_name,
                region_code: self.region,
                city: self.city,
                latitude: self.lat,
                longitude: self.lon,
                postal: self.zip,
            },
            country_details: CountryDetails {
                is_eu: None,
                calling_code: String::new(),
                capital: String::new(),
                borders: String::new(),
                flag_emoji: String::new(),
                flag_image_url: String::new(),
                district: self.district,
                currency: self.currency,
            },
            network: NetworkInfo {
                asn: parse_asn(&self.as_field),
                isp: self.isp,
                organization: self.org,
                domain: String::new(),
                asn_name: self.asname,
                reverse_dns: self.reverse,
                is_mobile: self.mobile,
                is_proxy: self.proxy,
                is_hosting: self.hosting,
            },
            timezone: TimezoneInfo {
                id: self.timezone,
                abbr: String::new(),
                utc_offset: self.offset.map(format_utc_offset).unwrap_or_default(),
                offset_seconds: self.offset,
                current_time: String::new(),
                is_dst: None,
            },
        }
    }
}
