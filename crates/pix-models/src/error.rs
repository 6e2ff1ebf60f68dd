//! Provider-supplied error details.
//!
//! The PIX API reports failures as a JSON object carrying some combination
//! of a name, a human-readable message, an OAuth-style `error` /
//! `error_description` pair and a list of field-level violations.  Every
//! resource payload in this crate composes an [`ApiError`] (flattened into
//! its JSON representation) so that a failed call still surfaces whatever
//! diagnostics the provider sent back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured error payload returned by the provider.
///
/// All fields are optional on the wire; an [`ApiError`] with every field
/// empty means the provider did not report anything.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    /// Machine-readable error name (`nome` in some provider responses).
    #[serde(default, alias = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable message (`mensagem` in some provider responses).
    #[serde(default, alias = "mensagem", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// OAuth error code, e.g. `invalid_client`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// OAuth error description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    /// Field-level violations, in the order the provider reported them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// A single field-level violation inside an [`ApiError`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldError {
    /// Violated rule or field key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// JSON path of the offending field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// `true` when the provider reported nothing at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.message.is_none()
            && self.error.is_none()
            && self.error_description.is_none()
            && self.errors.is_empty()
    }

    /// Parse an error body leniently.
    ///
    /// Bodies that are not a JSON object (HTML error pages, empty bodies)
    /// yield an empty [`ApiError`] rather than failing.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// The most specific single-line description available.
    pub fn summary(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error.as_deref())
            .or(self.name.as_deref())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.error.as_deref().or(self.name.as_deref()), self.summary()) {
            (Some(code), Some(summary)) if code != summary => write!(f, "{code}: {summary}")?,
            (_, Some(summary)) => f.write_str(summary)?,
            (_, None) => f.write_str("no details provided")?,
        }
        for field in &self.errors {
            write!(
                f,
                "; {}: {}",
                field.path.as_deref().or(field.key.as_deref()).unwrap_or("?"),
                field.message.as_deref().unwrap_or("invalid"),
            )?;
        }
        Ok(())
    }
}

/// Uniform access to the provider diagnostics embedded in a payload.
pub trait ProviderDiagnostics {
    /// The embedded error details.
    fn api_error(&self) -> &ApiError;

    /// `true` when the provider attached any error details.
    fn has_api_error(&self) -> bool {
        !self.api_error().is_empty()
    }
}

impl ProviderDiagnostics for ApiError {
    fn api_error(&self) -> &ApiError {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_oauth_error() {
        let err = ApiError::from_body(br#"{"error":"invalid_client","error_description":"bad secret"}"#);
        assert_eq!(err.error.as_deref(), Some("invalid_client"));
        assert_eq!(err.summary(), Some("bad secret"));
        assert_eq!(err.to_string(), "invalid_client: bad secret");
    }

    #[test]
    fn parses_portuguese_aliases_and_field_errors() {
        let body = r#"{
            "nome": "valor_invalido",
            "mensagem": "Campo inválido",
            "errors": [{"key": "type", "path": "$.valor.original", "message": "deve ser string"}]
        }"#;
        let err = ApiError::from_body(body.as_bytes());
        assert_eq!(err.name.as_deref(), Some("valor_invalido"));
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].path.as_deref(), Some("$.valor.original"));
        assert_eq!(
            err.to_string(),
            "valor_invalido: Campo inválido; $.valor.original: deve ser string"
        );
    }

    #[test]
    fn non_json_body_is_empty() {
        let err = ApiError::from_body(b"<html>502 Bad Gateway</html>");
        assert!(err.is_empty());
        assert!(!err.has_api_error());
        assert_eq!(err.to_string(), "no details provided");
    }

    #[test]
    fn empty_error_serializes_to_empty_object() {
        let json = serde_json::to_string(&ApiError::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
