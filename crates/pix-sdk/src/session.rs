//! The authenticated session.
//!
//! [`PixSession`] owns the single active credential set and the single
//! cached access token.  Resource operations ask it for an authorized
//! request builder; it hands back the cached token while fresh and runs
//! the OAuth client-credentials exchange otherwise.
//!
//! ```text
//! Unconfigured ──configure──▶ ColdCache ──exchange──▶ Fresh(token)
//!                                 ▲                      │
//!                                 └──── Stale ◀──────────┘ (exp ≤ now + 30s)
//! ```
//!
//! A failed exchange leaves the cache as it was, so the next call tries
//! again.  Nothing here retries on its own.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use pix_models::ApiError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::charges::Charges;
use crate::credentials::Credentials;
use crate::error::{ConfigError, PixError};
use crate::identity;
use crate::keys::Keys;
use crate::token::AccessToken;
use crate::webhooks::Webhooks;

/// Body of the client-credentials token request.
const GRANT_BODY: &str = r#"{"grant_type": "client_credentials"}"#;

/// A configured credential set together with everything derived from it.
///
/// Replaced wholesale by [`PixSession::configure`], which drops the cached
/// client and token along with it.
struct ActiveConfig {
    credentials: Credentials,
    base_url: Url,
    http: OnceCell<Client>,
    token: Mutex<Option<AccessToken>>,
}

impl ActiveConfig {
    /// The mutual-TLS client, built on first use.
    async fn http(&self) -> Result<Client, PixError> {
        let client = self
            .http
            .get_or_try_init(|| async {
                let identity =
                    identity::load_identity(&self.credentials.cert_path, &self.credentials.key_path)?;
                identity::build_client(identity, self.credentials.timeout())
            })
            .await?;
        Ok(client.clone())
    }

    /// `{base_url}/{segments...}`, skipping empty segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PixError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments.iter().filter(|s| !s.is_empty()));
        Ok(url)
    }
}

/// A PIX API session bound to one credential set at a time.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```rust,no_run
/// use pix_sdk::{Credentials, PixSession};
///
/// # async fn run() -> Result<(), pix_sdk::PixError> {
/// let session = PixSession::connect(
///     Credentials::new("Client_Id", "Client_Secret", "certs/client.crt", "certs/client.key")
///         .sandbox(true),
/// )?;
///
/// let keys = session.keys().list().await?;
/// println!("{} keys registered", keys.chaves.len());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PixSession {
    active: RwLock<Option<Arc<ActiveConfig>>>,
}

impl PixSession {
    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// An unconfigured session.  Every call fails with
    /// [`PixError::NotConfigured`] until [`configure`](Self::configure)
    /// succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and configure it in one step.
    pub fn connect(credentials: Credentials) -> Result<Self, PixError> {
        let session = Self::new();
        session.configure(credentials)?;
        Ok(session)
    }

    /// Validate `credentials` and make them the active set.
    ///
    /// On success the previous set, its HTTP client and its cached token
    /// are discarded.  On failure the previous set stays active.
    pub fn configure(&self, credentials: Credentials) -> Result<(), PixError> {
        let base_url = credentials.validate()?;
        info!(
            base_url = %base_url,
            environment = ?credentials.environment(),
            client_id = %credentials.client_id,
            "PIX credentials configured"
        );

        let active = Arc::new(ActiveConfig {
            credentials,
            base_url,
            http: OnceCell::new(),
            token: Mutex::new(None),
        });
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(active);
        Ok(())
    }

    /// Whether a credential set is active.
    pub fn is_configured(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Base URL of the active credential set.
    pub fn base_url(&self) -> Result<Url, PixError> {
        Ok(self.current()?.base_url.clone())
    }

    fn current(&self) -> Result<Arc<ActiveConfig>, PixError> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PixError::NotConfigured)
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// A valid access token, exchanging a new one if the cache is cold or
    /// stale.
    ///
    /// The cache lock is held across the freshness check and the exchange,
    /// so concurrent callers that find the cache stale wait for a single
    /// exchange instead of each running their own.
    pub async fn token(&self) -> Result<AccessToken, PixError> {
        let active = self.current()?;
        cached_or_exchange(&active).await
    }

    /// The `authorization` header value: `"{token_type} {access_token}"`.
    pub async fn authorization(&self) -> Result<String, PixError> {
        Ok(self.token().await?.authorization())
    }

    /// Drop the cached token; the next call exchanges a new one.
    pub async fn invalidate(&self) -> Result<(), PixError> {
        let active = self.current()?;
        *active.token.lock().await = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Authorized requests
    // ------------------------------------------------------------------

    /// Start an authorized request to `{base_url}/{segments...}`.
    ///
    /// The builder carries the `authorization` and `Content-Type` headers
    /// and uses the mutual-TLS client; send it with
    /// [`execute`](crate::execute) or [`execute_empty`](crate::execute_empty).
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, PixError> {
        let active = self.current()?;
        let authorization = cached_or_exchange(&active).await?.authorization();
        let url = active.endpoint(segments)?;
        debug!(%method, path = url.path(), "authorized request");

        Ok(active
            .http()
            .await?
            .request(method, url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json"))
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Charge operations (`/v2/cob`).
    pub fn charges(&self) -> Charges<'_> {
        Charges::new(self)
    }

    /// Random-key operations (`/v2/gn/evp`).
    pub fn keys(&self) -> Keys<'_> {
        Keys::new(self)
    }

    /// Webhook operations (`/v2/webhook`).
    pub fn webhooks(&self) -> Webhooks<'_> {
        Webhooks::new(self)
    }
}

/// Return the cached token of `active` while fresh, exchanging otherwise.
///
/// The cache lock is held across the freshness check and the exchange.
async fn cached_or_exchange(active: &ActiveConfig) -> Result<AccessToken, PixError> {
    let mut cached = active.token.lock().await;

    if let Some(token) = cached.as_ref() {
        match token.is_fresh(Utc::now().timestamp()) {
            Ok(true) => {
                debug!("reusing cached access token");
                return Ok(token.clone());
            }
            Ok(false) => debug!("cached access token is stale"),
            Err(err) => {
                warn!(error = %err, "discarding undecodable cached access token");
                *cached = None;
            }
        }
    }

    let token = exchange(active).await?;
    *cached = Some(token.clone());
    Ok(token)
}

/// Run the client-credentials exchange against `{base_url}/oauth/token`.
///
/// The body is parsed before the status is looked at so that a rejection
/// still carries the provider's diagnostics.
async fn exchange(active: &ActiveConfig) -> Result<AccessToken, PixError> {
    let http = active.http().await?;
    let url = active.endpoint(&["oauth", "token"])?;
    let credentials = &active.credentials;

    let res = http
        .post(url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .header(CONTENT_TYPE, "application/json")
        .body(GRANT_BODY)
        .send()
        .await?;

    let status = res.status();
    let body = res.bytes().await?;
    let parsed = serde_json::from_slice::<AccessToken>(&body);

    if status != StatusCode::OK {
        let detail = match parsed {
            Ok(token) => token.api_error,
            Err(_) => ApiError::from_body(&body),
        };
        warn!(%status, error = %detail, "token exchange rejected");
        return Err(PixError::Provider {
            status,
            detail,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    let mut token = parsed?;
    if token.access_token.is_empty() {
        warn!("token response carried no access_token");
        return Err(PixError::Provider {
            status,
            detail: token.api_error,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    token.acquired_at = Some(Utc::now().timestamp());
    info!(
        base_url = %active.base_url,
        token_type = %token.token_type,
        expires_in = token.expires_in,
        "access token acquired"
    );
    Ok(token)
}
