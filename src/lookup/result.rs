//! Unified lookup response types.

use serde::Serialize;

use crate::provider::{CountryDetails, Location, NetworkInfo, ProviderInfo, TimezoneInfo};
use crate::target::TargetKind;

/// Successful lookup in the unified schema, whichever provider answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub ok: bool,
    /// Target as given by the caller (trimmed)
    pub input: String,
    pub target_type: TargetKind,
    pub resolved_host: String,
    pub resolved_ips: Vec<String>,
    /// Address the providers were queried for
    pub ip: String,
    pub ip_type: String,
    /// Provider that answered
    pub provider: String,
    pub provider_info: ProviderInfo,
    pub location: Location,
    pub country_details: CountryDetails,
    pub network: NetworkInfo,
    pub timezone: TimezoneInfo,
}

/// Failed lookup.
///
/// Target metadata is present once the target was classified. Provider
/// fields are present only when the provider chain ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupFailure {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TargetKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_ips: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_info: Option<ProviderInfo>,
}

impl LookupFailure {
    /// Failure with only an error message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            input: None,
            target_type: None,
            resolved_host: None,
            resolved_ips: None,
            provider_errors: None,
            provider_info: None,
        }
    }
}

/// Outcome of one lookup; serializes to the bare success or failure object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LookupOutcome {
    Found(Box<LookupResult>),
    Failed(LookupFailure),
}

impl LookupOutcome {
    /// `true` for [`LookupOutcome::Found`].
    pub fn is_ok(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }

    /// Error message for failures.
    pub fn error(&self) -> Option<&str> {
        match self {
            LookupOutcome::Found(_) => None,
            LookupOutcome::Failed(failure) => Some(&failure.error),
        }
    }

    /// Provider metadata, when the chain ran.
    pub fn provider_info(&self) -> Option<&ProviderInfo> {
        match self {
            LookupOutcome::Found(result) => Some(&result.provider_info),
            LookupOutcome::Failed(failure) => failure.provider_info.as_ref(),
        }
    }
}

impl From<LookupFailure> for LookupOutcome {
    fn from(failure: LookupFailure) -> Self {
        LookupOutcome::Failed(failure)
    }
}
