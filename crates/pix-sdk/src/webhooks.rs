//! Webhook operations.

use pix_models::{Webhook, WebhookList, WebhookQuery, WebhookRegistration, SKIP_MTLS_HEADER};
use reqwest::{Method, StatusCode};

use crate::error::PixError;
use crate::executor::{execute, execute_empty};
use crate::session::PixSession;

/// Webhook operations, borrowed from a [`PixSession`].
#[derive(Clone, Copy)]
pub struct Webhooks<'a> {
    session: &'a PixSession,
}

impl<'a> Webhooks<'a> {
    pub(crate) fn new(session: &'a PixSession) -> Self {
        Self { session }
    }

    /// `PUT /v2/webhook/{chave}`: point the key's notifications at
    /// `webhook_url`.
    ///
    /// `skip_mtls` asks the provider not to require mutual TLS when it
    /// calls the webhook.  Expects `201 Created`.
    pub async fn register(
        &self,
        chave: &str,
        webhook_url: &str,
        skip_mtls: bool,
    ) -> Result<Webhook, PixError> {
        require_key(chave)?;
        let body = WebhookRegistration {
            webhook_url: webhook_url.to_string(),
        };
        let request = self
            .session
            .request(Method::PUT, &["v2", "webhook", chave])
            .await?
            .header(SKIP_MTLS_HEADER, skip_mtls.to_string())
            .json(&body);
        execute(request, StatusCode::CREATED).await
    }

    /// `GET /v2/webhook/{chave}`: the webhook bound to a key.
    pub async fn fetch(&self, chave: &str) -> Result<Webhook, PixError> {
        require_key(chave)?;
        let request = self
            .session
            .request(Method::GET, &["v2", "webhook", chave])
            .await?;
        execute(request, StatusCode::OK).await
    }

    /// `GET /v2/webhook`: webhooks created within the query window.
    pub async fn list(&self, query: &WebhookQuery) -> Result<WebhookList, PixError> {
        let request = self
            .session
            .request(Method::GET, &["v2", "webhook"])
            .await?
            .query(&query.to_pairs());
        execute(request, StatusCode::OK).await
    }

    /// `DELETE /v2/webhook/{chave}`: unbind the key's webhook.
    ///
    /// The provider answers `204 No Content`; the empty body is not parsed.
    pub async fn delete(&self, chave: &str) -> Result<(), PixError> {
        require_key(chave)?;
        let request = self
            .session
            .request(Method::DELETE, &["v2", "webhook", chave])
            .await?;
        execute_empty(request, StatusCode::NO_CONTENT).await
    }
}

fn require_key(chave: &str) -> Result<(), PixError> {
    if chave.is_empty() {
        return Err(PixError::Validation("chave is required".into()));
    }
    Ok(())
}
