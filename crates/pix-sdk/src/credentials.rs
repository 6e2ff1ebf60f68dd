//! Long-lived client identity.
//!
//! [`Credentials`] holds the OAuth client id/secret, the mutual-TLS
//! certificate/key paths, the target [`Environment`] and the per-request
//! timeout.  [`Credentials::validate`] is run by
//! [`PixSession::configure`](crate::PixSession::configure) before a set is
//! accepted.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

/// Production API host.
pub const PRODUCTION_URL: &str = "https://pix.api.efipay.com.br";
/// Sandbox (homologation) API host.
pub const SANDBOX_URL: &str = "https://pix-h.api.efipay.com.br";

/// Default per-request timeout used by [`Credentials::from_env`].
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Live environment.
    Production,
    /// Homologation environment.
    Sandbox,
}

impl Environment {
    /// Base URL of the environment's API host.
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_URL,
            Self::Sandbox => SANDBOX_URL,
        }
    }
}

/// Client identity presented to the provider.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Per-request timeout in seconds; must be positive.
    pub timeout_secs: u64,
    /// Target the sandbox host instead of production.
    pub sandbox: bool,
    /// PEM client certificate presented for mutual TLS.
    pub cert_path: PathBuf,
    /// PEM private key matching `cert_path`.
    pub key_path: PathBuf,
    /// Overrides the environment host, e.g. to point at a local mock.
    pub base_url: Option<String>,
}

impl Credentials {
    /// Credentials for the production environment with the default timeout.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sandbox: false,
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            base_url: None,
        }
    }

    /// Target the sandbox host.
    #[must_use]
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the API host.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build the credentials from environment variables.
    ///
    /// | Variable            | Default  | Description                           |
    /// |---------------------|----------|---------------------------------------|
    /// | `PIX_CLIENT_ID`     | required | OAuth client identifier               |
    /// | `PIX_CLIENT_SECRET` | required | OAuth client secret                   |
    /// | `PIX_CERT_PATH`     | required | PEM client certificate                |
    /// | `PIX_KEY_PATH`      | required | PEM private key                       |
    /// | `PIX_TIMEOUT_SECS`  | `30`     | Per-request timeout                   |
    /// | `PIX_SANDBOX`       | `false`  | `true`/`false`/`1`/`0`                |
    /// | `PIX_BASE_URL`      | unset    | Overrides the environment host        |
    ///
    /// Only parsing happens here; file checks run in [`Self::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            get(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(var))
        };

        let timeout_secs = match get("PIX_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                var: "PIX_TIMEOUT_SECS",
                value,
            })?,
        };

        let sandbox = match get("PIX_SANDBOX") {
            None => false,
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidEnv {
                var: "PIX_SANDBOX",
                value,
            })?,
        };

        Ok(Self {
            client_id: required("PIX_CLIENT_ID")?,
            client_secret: required("PIX_CLIENT_SECRET")?,
            timeout_secs,
            sandbox,
            cert_path: required("PIX_CERT_PATH")?.into(),
            key_path: required("PIX_KEY_PATH")?.into(),
            base_url: get("PIX_BASE_URL").filter(|v| !v.trim().is_empty()),
        })
    }

    /// The environment selected by the sandbox flag.
    pub fn environment(&self) -> Environment {
        if self.sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check every field and resolve the API base URL.
    ///
    /// Fails on the first empty field, a zero timeout, a certificate or key
    /// path that is not a readable file, or an unusable base URL override.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::MissingField("client_id"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingField("client_secret"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.cert_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("cert_path"));
        }
        if self.key_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("key_path"));
        }

        ensure_readable(&self.cert_path)?;
        ensure_readable(&self.key_path)?;

        let raw = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment().base_url());
        let url = Url::parse(raw).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_string()))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
        }
        Ok(url)
    }
}

// The secret never reaches logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("sandbox", &self.sandbox)
            .field("cert_path", &self.cert_path)
            .field("key_path", &self.key_path)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn ensure_readable(path: &Path) -> Result<(), ConfigError> {
    let is_file = std::fs::metadata(path).is_ok_and(|m| m.is_file());
    if !is_file || std::fs::File::open(path).is_err() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
