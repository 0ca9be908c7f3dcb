//! Error type definitions.
//!
//! This module defines the error types used throughout the server. Lookup
//! failures that reach the caller are values, not errors; these types cover
//! startup, provider attempts, and payload decoding.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error opening or creating the request log file.
    #[error("Log file error for {path}: {source}")]
    LogFileError {
        /// Path that could not be opened
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Reasons a single geolocation provider attempt failed.
///
/// The `Display` text is what ends up in `provider_attempts[].error` and
/// `provider_errors[]`, so it stays short.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The attempt exceeded its time budget.
    #[error("Lookup failed: timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection, TLS, or body transfer failure.
    #[error("Lookup failed: {0}")]
    Transport(String),

    /// The provider answered with a non-2xx HTTP status.
    #[error("Lookup failed: HTTP {0}")]
    HttpStatus(u16),

    /// The provider's body was not the JSON shape it documents.
    #[error("Lookup failed: invalid response ({0})")]
    Decode(String),

    /// The provider answered but reported the lookup as unsuccessful.
    #[error("{0}")]
    Unsuccessful(String),
}

impl From<ReqwestError> for ProviderError {
    fn from(error: ReqwestError) -> Self {
        if error.is_timeout() {
            return ProviderError::Transport(format!("timed out ({error})"));
        }
        if let Some(status) = error.status() {
            return ProviderError::HttpStatus(status.as_u16());
        }
        if error.is_decode() {
            return ProviderError::Decode(error.to_string());
        }
        ProviderError::Transport(error.to_string())
    }
}

/// Errors decoding an inbound request payload.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The bytes are not valid UTF-8 JSON.
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The JSON value is not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// The JSON object has no fields.
    #[error("payload is an empty object")]
    Empty,
}
