//! SDK error types.
//!
//! [`PixError`] is the single error type returned by every fallible
//! operation in the SDK.  Configuration, certificate and token-decoding
//! failures have their own enums ([`ConfigError`], [`CertError`],
//! [`DecodeError`]) so callers can match on them precisely.

use std::path::PathBuf;

use pix_models::ApiError;
use reqwest::StatusCode;

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum PixError {
    /// No credentials have been configured on the session yet.
    #[error("client not configured")]
    NotConfigured,

    /// The credentials were rejected at configuration time.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The client certificate or key could not be loaded.
    #[error("certificate error: {0}")]
    Cert(#[from] CertError),

    /// Transport failure: connection refused, timeout, TLS handshake.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// A cached access token could not be decoded.
    #[error("invalid access token: {0}")]
    Decode(#[from] DecodeError),

    /// The provider answered with an unexpected status.
    #[error("provider returned {status}: {detail}")]
    Provider {
        /// HTTP status of the response.
        status: StatusCode,
        /// Decoded provider diagnostics (empty when the body carried none).
        detail: ApiError,
        /// Raw response body.
        body: String,
    },

    /// JSON (de)serialisation error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A request was rejected before reaching the network.
    #[error("{0}")]
    Validation(String),
}

impl PixError {
    /// Provider diagnostics, when the error came from a provider response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Provider { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// HTTP status, when the error came from a provider response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Invalid or missing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required credential field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The timeout is zero.
    #[error("timeout must be a positive number of seconds")]
    InvalidTimeout,

    /// A certificate or key path does not point at a readable file.
    #[error("file {} not found", .0.display())]
    FileNotFound(PathBuf),

    /// The base URL override is not an absolute URL.
    #[error("invalid base URL \"{0}\"")]
    InvalidBaseUrl(String),

    /// A required environment variable is unset.
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    /// An environment variable holds an unparseable value.
    #[error("invalid value \"{value}\" for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Failure to turn the certificate/key pair into a TLS client identity.
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The PEM material is malformed, or the key does not match the
    /// certificate.
    #[error("invalid certificate or key: {0}")]
    Invalid(#[source] reqwest::Error),
}

/// Failure to decode the claims of an access token.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The token does not have exactly three dot-separated segments.
    #[error("malformed token: expected 3 segments, found {segments}")]
    MalformedToken {
        /// Number of segments found.
        segments: usize,
    },

    /// The payload segment is not URL-safe base64 without padding.
    #[error("failed to decode token payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The payload is not a JSON object.
    #[error("failed to decode JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
}
