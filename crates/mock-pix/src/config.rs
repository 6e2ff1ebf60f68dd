//! Mock provider configuration.

/// Scopes granted to every issued token.
pub const DEFAULT_SCOPE: &str =
    "cob.write cob.read pix.write pix.read webhook.write webhook.read gn.evp.write gn.evp.read";

/// Settings for a [`MockPix`](crate::MockPix) instance.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Client id accepted by `/oauth/token`.
    pub client_id: String,
    /// Client secret accepted by `/oauth/token`.
    pub client_secret: String,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_secs: i64,
    /// Random keys registered at startup.
    pub keys: Vec<String>,
    /// Port to listen on (binary only).
    pub listen_port: u16,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            client_id: "Client_Id_mock".to_string(),
            client_secret: "Client_Secret_mock".to_string(),
            token_ttl_secs: 3600,
            keys: vec![uuid::Uuid::new_v4().to_string()],
            listen_port: 4010,
        }
    }
}

impl MockConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                  | Default              |
    /// |---------------------------|----------------------|
    /// | `MOCK_PIX_PORT`           | `4010`               |
    /// | `MOCK_PIX_CLIENT_ID`      | `Client_Id_mock`     |
    /// | `MOCK_PIX_CLIENT_SECRET`  | `Client_Secret_mock` |
    /// | `MOCK_PIX_TOKEN_TTL`      | `3600`               |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let listen_port = std::env::var("MOCK_PIX_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.listen_port);
        let token_ttl_secs = std::env::var("MOCK_PIX_TOKEN_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.token_ttl_secs);

        Self {
            client_id: std::env::var("MOCK_PIX_CLIENT_ID").unwrap_or(defaults.client_id),
            client_secret: std::env::var("MOCK_PIX_CLIENT_SECRET")
                .unwrap_or(defaults.client_secret),
            token_ttl_secs,
            keys: defaults.keys,
            listen_port,
        }
    }

    /// Accept `client_id` / `client_secret` at the token endpoint.
    #[must_use]
    pub fn with_client(mut self, client_id: &str, client_secret: &str) -> Self {
        self.client_id = client_id.to_string();
        self.client_secret = client_secret.to_string();
        self
    }

    /// Issue tokens that expire `secs` seconds after issuance.
    #[must_use]
    pub fn with_token_ttl(mut self, secs: i64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Replace the keys registered at startup.
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_one_key() {
        let cfg = MockConfig::default();
        assert_eq!(cfg.keys.len(), 1);
        assert_eq!(cfg.token_ttl_secs, 3600);
    }

    #[test]
    fn default_listen_port() {
        let cfg = MockConfig::from_env();
        assert_eq!(cfg.listen_port, 4010);
    }

    #[test]
    fn builders_override_defaults() {
        let cfg = MockConfig::default()
            .with_client("a", "b")
            .with_token_ttl(25)
            .with_keys(Vec::new());
        assert_eq!(cfg.client_id, "a");
        assert_eq!(cfg.token_ttl_secs, 25);
        assert!(cfg.keys.is_empty());
    }
}
