//! Geolocation providers.
//!
//! This module queries free geolocation services for one address:
//! - [`GeoProvider`]: one external source, returning a normalized [`GeoRecord`]
//! - [`IpWhoProvider`] / [`IpApiProvider`]: HTTP clients for ipwho.is and ip-api.com,
//!   each with its own payload type and [`Normalize`] implementation
//! - [`ProviderChain`]: tries providers in order, stopping at the first success,
//!   and records every attempt
//!
//! Provider-specific field names never leave this module.

mod chain;
mod http;
mod ipapi;
mod ipwho;
mod types;

// Re-export public API
pub use chain::{ChainOutcome, ProviderChain};
pub use http::fetch_json;
pub use ipapi::{IpApiPayload, IpApiProvider};
pub use ipwho::{IpWhoPayload, IpWhoProvider};
pub use types::{
    format_utc_offset, parse_asn, CountryDetails, GeoProvider, GeoRecord, Location, NetworkInfo,
    Normalize, ProviderAttempt, ProviderInfo, TimezoneInfo,
};
