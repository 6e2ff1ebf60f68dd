//! Random (EVP) key operations.

use pix_models::{KeyList, RandomKey};
use reqwest::{Method, StatusCode};

use crate::error::PixError;
use crate::executor::{execute, execute_empty};
use crate::session::PixSession;

/// Random-key operations, borrowed from a [`PixSession`].
#[derive(Clone, Copy)]
pub struct Keys<'a> {
    session: &'a PixSession,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(session: &'a PixSession) -> Self {
        Self { session }
    }

    /// `GET /v2/gn/evp`: list the account's random keys.
    pub async fn list(&self) -> Result<KeyList, PixError> {
        let request = self.session.request(Method::GET, &["v2", "gn", "evp"]).await?;
        execute(request, StatusCode::OK).await
    }

    /// `POST /v2/gn/evp`: register a new random key.
    pub async fn create_random(&self) -> Result<RandomKey, PixError> {
        let request = self.session.request(Method::POST, &["v2", "gn", "evp"]).await?;
        execute(request, StatusCode::CREATED).await
    }

    /// `DELETE /v2/gn/evp/{chave}`: remove a random key.
    pub async fn delete(&self, chave: &str) -> Result<(), PixError> {
        if chave.is_empty() {
            return Err(PixError::Validation("chave is required".into()));
        }
        let request = self
            .session
            .request(Method::DELETE, &["v2", "gn", "evp", chave])
            .await?;
        execute_empty(request, StatusCode::NO_CONTENT).await
    }
}
