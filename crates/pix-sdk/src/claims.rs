//! Local decoding of access-token claims.
//!
//! # Security
//!
//! **No signature verification is performed here.**  The claims are read
//! only to decide whether a cached token is close enough to expiry to be
//! worth exchanging again; they are never used to make an authorization
//! decision.  Trust in the token rests on the mutually-authenticated TLS
//! channel it arrived over and on the provider that issued it.  Anything
//! that needs to *trust* a claim must verify the token properly instead.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Unverified claims of a JWT access token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    claims: Map<String, Value>,
}

impl TokenClaims {
    /// Decode the payload segment of `token`.
    ///
    /// The token must be `header.payload.signature`; the payload must be
    /// URL-safe base64 without padding and decode to a JSON object.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [_header, payload, _signature] = segments.as_slice() else {
            return Err(DecodeError::MalformedToken {
                segments: segments.len(),
            });
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload)?;
        let claims: Map<String, Value> = serde_json::from_slice(&bytes)?;
        Ok(Self { claims })
    }

    /// The `exp` claim, in seconds since the Unix epoch.
    ///
    /// Fractional values are truncated; a missing or non-numeric claim
    /// yields `None`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn expires_at(&self) -> Option<i64> {
        let exp = self.claims.get("exp")?;
        exp.as_i64().or_else(|| exp.as_f64().map(|secs| secs as i64))
    }

    /// Raw access to any other claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}
