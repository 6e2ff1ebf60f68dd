//! Sending authorized requests and mapping their responses.
//!
//! Every resource call expects exactly one success status (200 for reads,
//! 201 for creates, 204 for deletes).  Anything else becomes a
//! [`PixError::Provider`] carrying the provider's diagnostics and the raw
//! body.

use pix_models::ApiError;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::PixError;

/// Send `request` and parse the body as `T` when the status is `expected`.
pub async fn execute<T: DeserializeOwned>(
    request: RequestBuilder,
    expected: StatusCode,
) -> Result<T, PixError> {
    let res = request.send().await?;
    let status = res.status();
    let body = res.bytes().await?;

    if status != expected {
        return Err(provider_error(status, &body));
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Send `request` and succeed on `expected` without looking at the body.
///
/// Used for `204 No Content` responses, where there is nothing to parse.
pub async fn execute_empty(request: RequestBuilder, expected: StatusCode) -> Result<(), PixError> {
    let res = request.send().await?;
    let status = res.status();
    if status == expected {
        return Ok(());
    }

    let body = res.bytes().await?;
    Err(provider_error(status, &body))
}

pub(crate) fn provider_error(status: StatusCode, body: &[u8]) -> PixError {
    let detail = ApiError::from_body(body);
    warn!(%status, error = %detail, "provider rejected request");
    PixError::Provider {
        status,
        detail,
        body: String::from_utf8_lossy(body).into_owned(),
    }
}
