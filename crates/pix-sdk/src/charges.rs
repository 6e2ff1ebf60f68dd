//! Charge operations.

use pix_models::Charge;
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::PixError;
use crate::executor::execute;
use crate::session::PixSession;

/// Charge operations, borrowed from a [`PixSession`].
#[derive(Clone, Copy)]
pub struct Charges<'a> {
    session: &'a PixSession,
}

impl<'a> Charges<'a> {
    pub(crate) fn new(session: &'a PixSession) -> Self {
        Self { session }
    }

    /// Create a charge.
    ///
    /// Without a `txid` the charge is POSTed to `/v2/cob` and the provider
    /// assigns one; with a `txid` it is PUT to `/v2/cob/{txid}` (the txid
    /// travels in the path only).  A charge without a receiving key gets
    /// the account's first random key.  Expects `201 Created`.
    pub async fn create(&self, mut charge: Charge) -> Result<Charge, PixError> {
        if charge.key().is_none() {
            let keys = self.session.keys().list().await?;
            let first = keys
                .first()
                .ok_or_else(|| PixError::Validation("no pix keys found".into()))?;
            debug!(chave = first, "defaulting charge key to first registered key");
            charge.chave = Some(first.to_string());
        }

        let request = match charge.txid.take().filter(|t| !t.is_empty()) {
            Some(txid) => {
                self.session
                    .request(Method::PUT, &["v2", "cob", txid.as_str()])
                    .await?
            }
            None => self.session.request(Method::POST, &["v2", "cob"]).await?,
        };
        execute(request.json(&charge), StatusCode::CREATED).await
    }

    /// `GET /v2/cob/{txid}`: fetch a charge.
    pub async fn fetch(&self, txid: &str) -> Result<Charge, PixError> {
        if txid.is_empty() {
            return Err(PixError::Validation("txid is required".into()));
        }
        let request = self.session.request(Method::GET, &["v2", "cob", txid]).await?;
        execute(request, StatusCode::OK).await
    }
}
