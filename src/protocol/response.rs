//! Outbound response shape.

use serde::Serialize;

use super::request::ClientContext;
use crate::config::Protocol;
use crate::lookup::LookupOutcome;
use crate::timing::TimingPayload;

/// Connection metadata echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// Transport source, or the first `X-Forwarded-For` entry
    pub request_source_ip: String,
    /// Raw `X-Forwarded-For` header; HTTP only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_forwarded_for: Option<String>,
    pub client_hostname: String,
    pub client_local_ip: String,
    pub client_public_ip_hint: String,
    pub client_platform: String,
    pub protocol: Protocol,
}

impl RequestContext {
    pub fn new(source: &RequestSource, context: &ClientContext, protocol: Protocol) -> Self {
        Self {
            request_source_ip: source.ip.clone(),
            x_forwarded_for: source.forwarded_for.clone(),
            client_hostname: context.client_hostname.clone(),
            client_local_ip: context.client_local_ip.clone(),
            client_public_ip_hint: context.client_public_ip_hint.clone(),
            client_platform: context.client_platform.clone(),
            protocol,
        }
    }
}

/// Where a request came from, as seen by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSource {
    pub ip: String,
    pub forwarded_for: Option<String>,
}

impl RequestSource {
    /// Source for a transport without forwarding headers.
    pub fn direct(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            forwarded_for: None,
        }
    }

    /// Source behind an optional `X-Forwarded-For` header.
    ///
    /// The first non-empty entry of the header wins over the peer address.
    /// The raw header is always kept (empty when absent).
    pub fn forwarded(peer_ip: impl Into<String>, header: Option<&str>) -> Self {
        let header = header.unwrap_or_default();
        let ip = header
            .split(',')
            .next()
            .map(str::trim)
            .filter(|first| !first.is_empty())
            .map_or_else(|| peer_ip.into(), str::to_string);
        Self {
            ip,
            forwarded_for: Some(header.to_string()),
        }
    }
}

/// Action-specific part of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Lookup(LookupOutcome),
    Health { ok: bool, message: String },
}

/// Complete response: body fields plus timing and request context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(flatten)]
    pub body: ResponseBody,
    pub timing: TimingPayload,
    pub request_context: RequestContext,
}

impl Response {
    /// Mirrors the body's `ok` field.
    pub fn is_ok(&self) -> bool {
        match &self.body {
            ResponseBody::Lookup(outcome) => outcome.is_ok(),
            ResponseBody::Health { ok, .. } => *ok,
        }
    }

    /// 200 when `ok`, else 400.
    pub fn status_code(&self) -> u16 {
        if self.is_ok() {
            200
        } else {
            400
        }
    }

    /// Encodes the response as JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
