//! Outbound HTTP plumbing shared by the token exchange and the contact listing

use crate::error::AppError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Client with a fixed per-request timeout; redirects are never followed
pub fn build_http_client(timeout: Duration) -> Result<Client, AppError> {
    reqwest::ClientBuilder::new()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| AppError::Internal(format!("reqwest build error: {e}")))
}

/// Pass 2xx responses through; anything else becomes [`AppError::Upstream`]
pub async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "HubSpot request failed");
    Err(AppError::Upstream {
        status: status.as_u16(),
        body,
    })
}
