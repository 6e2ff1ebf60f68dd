//! # PIX SDK
//!
//! Client for the Efí PIX REST API.
//!
//! The provider authenticates callers with the OAuth2 client-credentials
//! grant over a mutually-authenticated TLS channel.  The SDK provides:
//!
//! * [`PixSession`]: the active credential set, the cached access token
//!   and the mutual-TLS HTTP client; hands out authorized requests.
//! * [`Credentials`]: client id/secret, certificate/key paths, sandbox
//!   flag and timeout; validated once by [`PixSession::configure`].
//! * [`TokenClaims`]: local, **unverified** decoding of the token's
//!   `exp` claim, used only to skip needless exchanges.
//! * [`execute`] / [`execute_empty`]: send an authorized request and
//!   map the status into success or [`PixError::Provider`].
//! * Resource handles: [`Charges`], [`Keys`], [`Webhooks`].
//!
//! Wire types from [`pix_models`] are re-exported for convenience.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use pix_sdk::{Charge, Credentials, PixSession};
//!
//! # async fn run() -> Result<(), pix_sdk::PixError> {
//! let session = PixSession::connect(Credentials::from_env()?)?;
//!
//! let charge = session
//!     .charges()
//!     .create(Charge::immediate("10.00", 3600).with_payer_request("Order #42"))
//!     .await?;
//! println!("created {:?}", charge.txid());
//! # Ok(())
//! # }
//! ```

pub mod charges;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod identity;
pub mod keys;
pub mod session;
pub mod token;
pub mod webhooks;

pub use charges::Charges;
pub use claims::TokenClaims;
pub use credentials::{Credentials, Environment, PRODUCTION_URL, SANDBOX_URL};
pub use error::{CertError, ConfigError, DecodeError, PixError};
pub use executor::{execute, execute_empty};
pub use keys::Keys;
pub use session::PixSession;
pub use token::{AccessToken, FRESHNESS_MARGIN_SECS};
pub use webhooks::Webhooks;

// Re-export wire types from pix-models for ergonomic usage.
pub use pix_models::{
    ApiError, Charge, Devedor, FieldError, KeyList, ProviderDiagnostics, RandomKey, Valor,
    Webhook, WebhookList, WebhookQuery,
};
