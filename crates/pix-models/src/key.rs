//! Random (EVP) PIX keys registered to the account (`/v2/gn/evp`).

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ProviderDiagnostics};

/// The account's random keys, as returned by `GET /v2/gn/evp`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyList {
    #[serde(default)]
    pub chaves: Vec<String>,
    #[serde(flatten)]
    pub api_error: ApiError,
}

impl KeyList {
    /// The first registered key, if any.
    pub fn first(&self) -> Option<&str> {
        self.chaves.iter().map(String::as_str).find(|k| !k.is_empty())
    }
}

impl ProviderDiagnostics for KeyList {
    fn api_error(&self) -> &ApiError {
        &self.api_error
    }
}

/// A freshly created random key, as returned by `POST /v2/gn/evp`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RandomKey {
    #[serde(default)]
    pub chave: String,
    #[serde(flatten)]
    pub api_error: ApiError,
}

impl ProviderDiagnostics for RandomKey {
    fn api_error(&self) -> &ApiError {
        &self.api_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_skips_empty_entries() {
        let list: KeyList =
            serde_json::from_str(r#"{"chaves": ["", "345e4568-e89b-12d3-a456-006655440001"]}"#)
                .unwrap();
        assert_eq!(list.first(), Some("345e4568-e89b-12d3-a456-006655440001"));
    }

    #[test]
    fn empty_list() {
        let list: KeyList = serde_json::from_str(r#"{"chaves": []}"#).unwrap();
        assert_eq!(list.first(), None);
    }
}
