//! OAuth access tokens and the freshness check.

use std::fmt;

use pix_models::{ApiError, ProviderDiagnostics};
use serde::{Deserialize, Serialize};

use crate::claims::TokenClaims;
use crate::error::DecodeError;

/// Seconds before the `exp` claim at which a token stops being reused.
///
/// Keeps a token from expiring between the freshness check and the moment
/// the provider receives the request.
pub const FRESHNESS_MARGIN_SECS: i64 = 30;

/// Response of `POST /oauth/token`.
///
/// Tokens are replaced, never edited.  Provider diagnostics from a
/// rejected exchange land in [`AccessToken::api_error`].
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AccessToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds, as reported by the provider.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
    #[serde(flatten)]
    pub api_error: ApiError,
    /// Unix seconds at which the exchange returned this token.  Set by the
    /// session, never sent or received.
    #[serde(skip)]
    pub acquired_at: Option<i64>,
}

impl AccessToken {
    /// Value for the `authorization` header: `"{token_type} {access_token}"`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Whether the token can still be reused at `now` (Unix seconds).
    ///
    /// An empty token is never fresh.  The deadline is the `exp` claim when
    /// the token is a JWT carrying one; otherwise it is `acquired_at +
    /// expires_in`.  The token is fresh only if that deadline is strictly
    /// after `now + FRESHNESS_MARGIN_SECS`.  With no deadline at all the
    /// token is not fresh.
    ///
    /// A token that cannot be decoded and has no acquisition time is
    /// reported as an error rather than as stale, since it points at a
    /// corrupted cache.
    pub fn is_fresh(&self, now: i64) -> Result<bool, DecodeError> {
        if self.access_token.is_empty() {
            return Ok(false);
        }
        let deadline = match TokenClaims::decode(&self.access_token) {
            Ok(claims) => claims.expires_at().or_else(|| self.lifetime_deadline()),
            Err(err) => Some(self.lifetime_deadline().ok_or(err)?),
        };
        Ok(deadline.is_some_and(|exp| exp > now.saturating_add(FRESHNESS_MARGIN_SECS)))
    }

    /// `acquired_at + expires_in`, when the acquisition time is known.
    fn lifetime_deadline(&self) -> Option<i64> {
        let lifetime = i64::try_from(self.expires_in).unwrap_or(i64::MAX);
        self.acquired_at.map(|at| at.saturating_add(lifetime))
    }
}

impl ProviderDiagnostics for AccessToken {
    fn api_error(&self) -> &ApiError {
        &self.api_error
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("api_error", &self.api_error)
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn token_expiring_at(exp: i64) -> AccessToken {
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        AccessToken {
            access_token: format!("eyJhbGciOiJIUzI1NiJ9.{payload}.c2ln"),
            token_type: "Bearer".into(),
            expires_in: 3600,
            ..AccessToken::default()
        }
    }

    #[test]
    fn fresh_beyond_margin() {
        assert!(token_expiring_at(NOW + 31).is_fresh(NOW).unwrap());
        assert!(token_expiring_at(NOW + 3600).is_fresh(NOW).unwrap());
    }

    #[test]
    fn stale_within_margin() {
        assert!(!token_expiring_at(NOW + 30).is_fresh(NOW).unwrap());
        assert!(!token_expiring_at(NOW + 29).is_fresh(NOW).unwrap());
        assert!(!token_expiring_at(NOW + 25).is_fresh(NOW).unwrap());
        assert!(!token_expiring_at(NOW).is_fresh(NOW).unwrap());
        assert!(!token_expiring_at(NOW - 100).is_fresh(NOW).unwrap());
    }

    #[test]
    fn empty_token_is_never_fresh() {
        assert!(!AccessToken::default().is_fresh(NOW).unwrap());
    }

    #[test]
    fn token_without_exp_is_stale() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"x"}"#);
        let token = AccessToken {
            access_token: format!("h.{payload}.s"),
            ..AccessToken::default()
        };
        assert!(!token.is_fresh(NOW).unwrap());
    }

    #[test]
    fn corrupted_token_surfaces_decode_error() {
        let token = AccessToken {
            access_token: "not-a-jwt".into(),
            ..AccessToken::default()
        };
        assert!(matches!(
            token.is_fresh(NOW),
            Err(DecodeError::MalformedToken { segments: 1 })
        ));
    }

    fn opaque_token(expires_in: u64, acquired_at: Option<i64>) -> AccessToken {
        AccessToken {
            access_token: "abc".into(),
            token_type: "Bearer".into(),
            expires_in,
            acquired_at,
            ..AccessToken::default()
        }
    }

    #[test]
    fn opaque_token_uses_reported_lifetime() {
        let token = opaque_token(3600, Some(NOW));
        assert!(token.is_fresh(NOW).unwrap());
        assert!(token.is_fresh(NOW + 3569).unwrap());
        assert!(!token.is_fresh(NOW + 3570).unwrap());
    }

    #[test]
    fn opaque_token_with_short_lifetime_is_stale() {
        assert!(!opaque_token(25, Some(NOW)).is_fresh(NOW).unwrap());
        assert!(!opaque_token(0, Some(NOW)).is_fresh(NOW).unwrap());
    }

    #[test]
    fn opaque_token_without_acquisition_time_is_corrupt() {
        assert!(matches!(
            opaque_token(3600, None).is_fresh(NOW),
            Err(DecodeError::MalformedToken { segments: 1 })
        ));
    }

    #[test]
    fn exp_claim_wins_over_reported_lifetime() {
        let token = AccessToken {
            acquired_at: Some(NOW),
            expires_in: 3600,
            ..token_expiring_at(NOW + 10)
        };
        assert!(!token.is_fresh(NOW).unwrap());
    }

    #[test]
    fn jwt_without_exp_falls_back_to_lifetime() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"x"}"#);
        let token = AccessToken {
            access_token: format!("h.{payload}.s"),
            expires_in: 3600,
            acquired_at: Some(NOW),
            ..AccessToken::default()
        };
        assert!(token.is_fresh(NOW).unwrap());
    }

    #[test]
    fn authorization_header_format() {
        let token = AccessToken {
            access_token: "abc".into(),
            token_type: "Bearer".into(),
            ..AccessToken::default()
        };
        assert_eq!(token.authorization(), "Bearer abc");
    }

    #[test]
    fn error_body_parses_into_diagnostics() {
        let token: AccessToken = serde_json::from_str(r#"{"error":"invalid_client"}"#).unwrap();
        assert!(token.access_token.is_empty());
        assert!(token.has_api_error());
        assert_eq!(token.api_error.error.as_deref(), Some("invalid_client"));
    }

    #[test]
    fn debug_redacts_token_value() {
        let rendered = format!("{:?}", token_expiring_at(NOW));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("eyJhbGciOiJIUzI1NiJ9"));
    }
}
