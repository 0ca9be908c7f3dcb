//! Configuration constants.
//!
//! This module defines the defaults used throughout the server: ports,
//! per-call timeouts, provider endpoints, and fallback DNS servers.

// Listening defaults
/// Default bind address for both transports.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default UDP port.
pub const DEFAULT_UDP_PORT: u16 = 8000;
/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 8765;
/// Largest datagram the UDP transport reads or writes.
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

// Network operation timeouts
/// Timeout for each geolocation provider HTTP call in seconds.
/// A lookup that falls through both providers waits at most twice this long.
pub const PROVIDER_TIMEOUT_SECS: u64 = 12;
/// Timeout for each resolution stage (system resolver, each fallback server) in seconds.
pub const RESOLVER_TIMEOUT_SECS: u64 = 6;

// Concurrency limits
/// Requests processed at the same time by one transport.
pub const MAX_IN_FLIGHT_REQUESTS: usize = 64;
/// Outbound provider calls in flight across all requests.
pub const MAX_PROVIDER_CALLS: usize = 16;

// Providers
/// ipwho.is base URL (queried first).
pub const IPWHO_URL: &str = "http://ipwho.is";
/// ip-api.com JSON base URL (fallback).
pub const IPAPI_URL: &str = "http://ip-api.com/json";
/// Fields requested from ip-api.com; anything not listed is returned empty.
pub const IPAPI_FIELDS: &str = "status,message,continent,continentCode,country,countryCode,region,regionName,city,district,zip,lat,lon,timezone,offset,currency,isp,org,as,asname,reverse,mobile,proxy,hosting,query";
/// Provider display name for ipwho.is.
pub const IPWHO_PROVIDER_NAME: &str = "ipwho.is";
/// Provider display name for ip-api.com.
pub const IPAPI_PROVIDER_NAME: &str = "ip-api.com";

// DNS fallback
/// Public DNS servers queried, in order, when the system resolver yields no public address.
pub const DEFAULT_DNS_SERVERS: [&str; 2] = ["8.8.8.8", "1.1.1.1"];

// Logging
/// Environment variable naming the request log file.
pub const LOG_FILE_ENV: &str = "IP_TEST_LOG_FILE";
/// Request log file used when nothing is configured.
pub const DEFAULT_LOG_FILE: &str = "log.txt";

// Response text
/// Explanation attached to every timing block.
pub const TIMING_NOTE: &str = "Gap is calculated in UTC milliseconds to avoid timezone drift";
/// Error returned when no target was given and none could be inferred.
pub const ERROR_NO_TARGET: &str = "Could not determine lookup target";
/// Error returned when a domain resolves to nothing after full escalation.
pub const ERROR_UNRESOLVED_DOMAIN: &str = "Could not resolve domain";
/// Error returned when every provider in the chain failed.
pub const ERROR_ALL_PROVIDERS_FAILED: &str = "All free lookup providers failed";
/// Error returned for payloads that are not a non-empty JSON object.
pub const ERROR_INVALID_PAYLOAD: &str = "Invalid request payload";
/// Error returned by the HTTP transport for unknown routes.
pub const ERROR_ROUTE_NOT_FOUND: &str = "Route not found";

/// User-Agent sent to geolocation providers.
pub const USER_AGENT: &str = concat!("ip_lookup/", env!("CARGO_PKG_VERSION"));
