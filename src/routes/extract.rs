//! Extractors whose rejections render as [`AppError`] JSON

use crate::error::AppError;
use axum::{
    Form,
    body::Body,
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request},
    http::{Method, header::CONTENT_TYPE, request::Parts},
};
use serde::de::DeserializeOwned;

/// Form fields from either `application/x-www-form-urlencoded` or
/// `multipart/form-data` bodies
///
/// Browsers posting a `FormData` object send multipart; scripted callers
/// usually send urlencoded. Both decode into the same `T`.
pub struct FormFields<T>(pub T);

impl<S, T> FromRequest<S> for FormFields<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            return Ok(Self(value));
        }

        // Re-encode the text parts so both content types share one decoder
        let mut multipart = Multipart::from_request(req, state).await?;
        let mut pairs = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let value = field.text().await?;
            pairs.push((name, value));
        }
        // Serializer is not Send, so build it only after the last await
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&pairs)
            .finish();

        let urlencoded = Request::builder()
            .method(Method::POST)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encoded))
            .map_err(|e| AppError::Internal(format!("Failed to rebuild form request: {e}")))?;

        let Form(value) = Form::<T>::from_request(urlencoded, state).await?;
        Ok(Self(value))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// `Query` with JSON error responses
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
