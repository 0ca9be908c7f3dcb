//! Inbound request decoding.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::error_handling::ProtocolError;
use crate::utils::lenient;

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    /// Resolve and geolocate a target (the default)
    #[default]
    Lookup,
    /// Liveness probe; still returns timing and request context
    Health,
}

impl Action {
    /// Parses an action name; anything unrecognized is a lookup.
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = lenient::string(deserializer)?;
        Ok(Action::from_name(&name))
    }
}

/// Client-reported fields, all kept as text and parsed where they are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientContext {
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_hostname: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_local_ip: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_public_ip_hint: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_platform: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_sent_epoch_ms: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_sent_at_utc_iso: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_sent_at_local_iso: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_timezone_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_utc_offset_minutes: String,
}

/// One decoded request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub action: Action,
    /// Explicit target; empty means "infer one"
    #[serde(default, deserialize_with = "lenient::string")]
    pub target: String,
    #[serde(default, deserialize_with = "context_or_default")]
    pub client_context: ClientContext,
}

impl LookupRequest {
    /// Lookup request for `target` with no client context.
    pub fn lookup(target: impl Into<String>) -> Self {
        Self {
            action: Action::Lookup,
            target: target.into(),
            client_context: ClientContext::default(),
        }
    }

    /// Health request with no client context.
    pub fn health() -> Self {
        Self {
            action: Action::Health,
            ..Default::default()
        }
    }
}

/// A non-object `client_context` is treated as absent.
fn context_or_default<'de, D>(deserializer: D) -> Result<ClientContext, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).unwrap_or_default()),
        _ => Ok(ClientContext::default()),
    }
}

/// Decodes a datagram or HTTP body into a request.
///
/// The payload must be a non-empty JSON object.
pub fn decode_request(payload: &[u8]) -> Result<LookupRequest, ProtocolError> {
    match serde_json::from_slice::<Value>(payload)? {
        Value::Object(map) if map.is_empty() => Err(ProtocolError::Empty),
        value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Err(ProtocolError::NotAnObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_request() {
        let request = decode_request(
            br#"{
                "action": "lookup",
                "target": "example.com",
                "client_context": {
                    "client_hostname": "laptop",
                    "client_local_ip": "192.168.1.20",
                    "client_public_ip_hint": "203.0.113.5",
                    "client_platform": "Linux-6.1-x86_64",
                    "client_sent_epoch_ms": 1700000000000,
                    "client_sent_at_utc_iso": "2023-11-14T22:13:20+00:00",
                    "client_sent_at_local_iso": "2023-11-15T06:13:20+08:00",
                    "client_timezone_name": "CST",
                    "client_utc_offset_minutes": 480
                }
            }"#,
        )
        .unwrap();

        assert_eq!(request.action, Action::Lookup);
        assert_eq!(request.target, "example.com");
        let ctx = &request.client_context;
        assert_eq!(ctx.client_hostname, "laptop");
        assert_eq!(ctx.client_public_ip_hint, "203.0.113.5");
        assert_eq!(ctx.client_sent_epoch_ms, "1700000000000");
        assert_eq!(ctx.client_utc_offset_minutes, "480");
    }

    #[test]
    fn test_action_defaults_to_lookup() {
        let request = decode_request(br#"{"target": "8.8.8.8"}"#).unwrap();
        assert_eq!(request.action, Action::Lookup);

        let request = decode_request(br#"{"action": "dance"}"#).unwrap();
        assert_eq!(request.action, Action::Lookup);
    }

    #[test]
    fn test_action_is_case_and_space_insensitive() {
        let request = decode_request(br#"{"action": "  HEALTH "}"#).unwrap();
        assert_eq!(request.action, Action::Health);
        assert_eq!(Action::Health.to_string(), "health");
    }

    #[test]
    fn test_non_object_context_is_ignored() {
        let request = decode_request(br#"{"target": "1.1.1.1", "client_context": "oops"}"#).unwrap();
        assert_eq!(request.client_context, ClientContext::default());
    }

    #[test]
    fn test_numeric_target_is_stringified() {
        let request = decode_request(br#"{"target": 12345}"#).unwrap();
        assert_eq!(request.target, "12345");
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            decode_request(b"{not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            decode_request(&[0xff, 0xfe]),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            decode_request(b"[1, 2, 3]"),
            Err(ProtocolError::NotAnObject)
        ));
        assert!(matches!(decode_request(b"{}"), Err(ProtocolError::Empty)));
    }
}
