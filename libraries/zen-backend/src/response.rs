//! Shared response handling for auth and table requests.

use crate::error::{classify, BackendError, Result};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Pass successful responses through; turn anything else into a classified error.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = classify(status.as_u16(), &body);
    warn!(status = %status, kind = %err.kind(), error = %err, "Backend request failed");
    Err(err)
}

/// Check the status, then decode the JSON body.
pub(crate) async fn json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let response = ensure_success(response).await?;
    response
        .json()
        .await
        .map_err(|e| BackendError::ParseError(format!("Failed to parse {}: {}", what, e)))
}
