//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::config::constants::{
    DEFAULT_DNS_SERVERS, DEFAULT_HOST, DEFAULT_HTTP_PORT, DEFAULT_LOG_FILE, DEFAULT_UDP_PORT,
    IPAPI_URL, IPWHO_URL, LOG_FILE_ENV, MAX_IN_FLIGHT_REQUESTS, MAX_PROVIDER_CALLS,
    PROVIDER_TIMEOUT_SECS, RESOLVER_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Transport the server listens on.
///
/// The tag is also echoed in every request log line and in
/// `request_context.protocol`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    /// One JSON datagram in, one JSON datagram out
    Udp,
    /// JSON over HTTP (`/health`, `/lookup`)
    Http,
}

impl Protocol {
    /// Port used when `--port` is not given.
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Udp => DEFAULT_UDP_PORT,
            Protocol::Http => DEFAULT_HTTP_PORT,
        }
    }
}

/// How the fallback resolution stages talk to the fixed DNS servers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FallbackResolverKind {
    /// Query each server directly over DNS
    Nameserver,
    /// Run the external `nslookup <domain> <server>` command
    Nslookup,
}

/// Server configuration.
///
/// Parsed from the command line (and environment) by the binary, or built
/// programmatically from [`Config::default`].
///
/// # Examples
///
/// ```no_run
/// use ip_lookup::{Config, Protocol};
///
/// let config = Config {
///     protocol: Protocol::Http,
///     port: Some(9000),
///     ..Default::default()
/// };
/// assert_eq!(config.listen_port(), 9000);
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "ip_lookup", version, about = "IP and domain lookup server")]
pub struct Config {
    /// Transport to serve
    #[arg(long, value_enum, default_value_t = Protocol::Udp)]
    pub protocol: Protocol,

    /// Address to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind (defaults to 8000 for UDP, 8765 for HTTP)
    #[arg(long)]
    pub port: Option<u16>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Request log file (one line per request)
    #[arg(long, env = LOG_FILE_ENV, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Per-provider HTTP timeout in seconds
    #[arg(long, default_value_t = PROVIDER_TIMEOUT_SECS)]
    pub provider_timeout_secs: u64,

    /// Per-stage DNS resolution timeout in seconds
    #[arg(long, default_value_t = RESOLVER_TIMEOUT_SECS)]
    pub resolver_timeout_secs: u64,

    /// DNS servers used, in order, when the system resolver finds no public address
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_DNS_SERVERS)]
    pub dns_servers: Vec<IpAddr>,

    /// How fallback DNS servers are queried
    #[arg(long, value_enum, default_value_t = FallbackResolverKind::Nameserver)]
    pub fallback_resolver: FallbackResolverKind,

    /// ipwho.is base URL
    #[arg(long, default_value = IPWHO_URL)]
    pub ipwho_url: String,

    /// ip-api.com JSON base URL
    #[arg(long, default_value = IPAPI_URL)]
    pub ipapi_url: String,

    /// Maximum requests handled concurrently
    #[arg(long, default_value_t = MAX_IN_FLIGHT_REQUESTS)]
    pub max_in_flight: usize,

    /// Maximum outbound provider calls in flight across all requests
    #[arg(long, default_value_t = MAX_PROVIDER_CALLS)]
    pub max_provider_calls: usize,

    /// Never fall back to a private transport source address when inferring the target
    #[arg(long = "no-private-source-fallback", action = ArgAction::SetFalse)]
    pub infer_from_private_source: bool,
}

impl Config {
    /// Port the selected transport binds to.
    pub fn listen_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol.default_port())
    }

    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.listen_port())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol: Protocol::Udp,
            host: DEFAULT_HOST.to_string(),
            port: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            provider_timeout_secs: PROVIDER_TIMEOUT_SECS,
            resolver_timeout_secs: RESOLVER_TIMEOUT_SECS,
            dns_servers: DEFAULT_DNS_SERVERS
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            fallback_resolver: FallbackResolverKind::Nameserver,
            ipwho_url: IPWHO_URL.to_string(),
            ipapi_url: IPAPI_URL.to_string(),
            max_in_flight: MAX_IN_FLIGHT_REQUESTS,
            max_provider_calls: MAX_PROVIDER_CALLS,
            infer_from_private_source: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_protocol_tags() {
        assert_eq!(Protocol::Udp.to_string(), "udp");
        assert_eq!(Protocol::Http.as_ref(), "http");
        assert_eq!(
            serde_json::to_string(&Protocol::Http).unwrap(),
            "\"http\""
        );
    }

    #[test]
    fn test_default_port_follows_protocol() {
        let udp = Config::default();
        assert_eq!(udp.listen_port(), 8000);

        let http = Config {
            protocol: Protocol::Http,
            ..Default::default()
        };
        assert_eq!(http.listen_port(), 8765);
        assert_eq!(http.bind_address(), "0.0.0.0:8765");

        let explicit = Config {
            port: Some(1234),
            ..Default::default()
        };
        assert_eq!(explicit.listen_port(), 1234);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.provider_timeout_secs, 12);
        assert_eq!(config.resolver_timeout_secs, 6);
        assert_eq!(config.dns_servers.len(), 2);
        assert_eq!(config.dns_servers[0].to_string(), "8.8.8.8");
        assert_eq!(config.dns_servers[1].to_string(), "1.1.1.1");
        assert!(config.infer_from_private_source);
        assert_eq!(config.fallback_resolver, FallbackResolverKind::Nameserver);
    }

    #[test]
    fn test_cli_parsing() {
        let config = Config::try_parse_from([
            "ip_lookup",
            "--protocol",
            "http",
            "--port",
            "9100",
            "--dns-servers",
            "9.9.9.9,1.0.0.1",
            "--fallback-resolver",
            "nslookup",
            "--no-private-source-fallback",
        ])
        .expect("arguments should parse");
        assert_eq!(config.protocol, Protocol::Http);
        assert_eq!(config.listen_port(), 9100);
        assert_eq!(config.dns_servers.len(), 2);
        assert_eq!(config.dns_servers[0].to_string(), "9.9.9.9");
        assert_eq!(config.fallback_resolver, FallbackResolverKind::Nslookup);
        assert!(!config.infer_from_private_source);
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["ip_lookup"]).expect("no arguments should parse");
        let default = Config::default();
        assert_eq!(parsed.protocol, default.protocol);
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.dns_servers, default.dns_servers);
        assert_eq!(parsed.ipwho_url, default.ipwho_url);
        assert_eq!(parsed.ipapi_url, default.ipapi_url);
        assert!(parsed.infer_from_private_source);
    }
}
