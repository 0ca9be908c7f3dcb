//! Target classification.
//!
//! Callers may send a bare address, a bare name, or something URL-shaped
//! (`example.com/path`, `example.com:443`, `https://example.com`). The host is
//! pulled out first, then classified as a literal address or a domain.

use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use url::{Host, Url};

use super::address::is_ip_value;

/// Whether a target is a literal address or a name that needs resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetKind {
    /// Literal IPv4 or IPv6 address
    Ip,
    /// Name to resolve
    Domain,
}

/// Classified target with its bare host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetClassification {
    /// `ip` or `domain`
    pub kind: TargetKind,
    /// Host with scheme, port, path and IPv6 brackets removed
    pub host: String,
}

/// Extracts the bare host from a caller-supplied target.
///
/// A scheme is prefixed when missing so the URL parser can split off ports
/// and paths. When parsing fails, the input is split naively on `/` and `:`.
/// Never fails: the worst case is the trimmed input itself.
pub fn extract_lookup_host(target: &str) -> String {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    // Unbracketed IPv6 would be cut at the first ':' by both paths below.
    if is_ip_value(trimmed) {
        return trimmed.to_string();
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    if let Ok(parsed) = Url::parse(&candidate) {
        match parsed.host() {
            Some(Host::Ipv6(addr)) => return addr.to_string(),
            Some(Host::Ipv4(addr)) => {
                let raw = raw_authority_host(&candidate);
                if is_ip_value(raw) {
                    return addr.to_string();
                }
                if !raw.is_empty() {
                    return raw.to_string();
                }
            }
            Some(Host::Domain(domain)) if !domain.is_empty() => return domain.to_string(),
            _ => {}
        }
    }

    let naive = trimmed
        .split('/')
        .next()
        .and_then(|s| s.split(':').next())
        .unwrap_or_default();
    if naive.is_empty() {
        trimmed.to_string()
    } else {
        naive.to_string()
    }
}

/// Host text as written, before the URL parser normalizes it.
///
/// The parser reads `1.2.3`, `12345`, `0x08.8.8.8` and `010.0.0.1` as IPv4;
/// only a literal dotted-quad may be classified as an address.
fn raw_authority_host(candidate: &str) -> &str {
    let rest = candidate
        .split_once("://")
        .map_or(candidate, |(_, rest)| rest);
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    host_port.split(':').next().unwrap_or_default()
}

/// Classifies a caller-supplied target.
///
/// # Examples
///
/// ```
/// use ip_lookup::target::{classify_target, TargetKind};
///
/// let c = classify_target("https://example.com:8443/path");
/// assert_eq!(c.kind, TargetKind::Domain);
/// assert_eq!(c.host, "example.com");
///
/// assert_eq!(classify_target("8.8.8.8").kind, TargetKind::Ip);
/// ```
pub fn classify_target(target: &str) -> TargetClassification {
    let host = extract_lookup_host(target);
    let kind = if is_ip_value(&host) {
        TargetKind::Ip
    } else {
        TargetKind::Domain
    };
    TargetClassification { kind, host }
}
