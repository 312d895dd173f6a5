use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self(Uuid::nil())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tag each request with an id, reusing a valid incoming `X-Request-ID`
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::from_str(s).ok())
        .map(RequestId)
        .unwrap_or_else(RequestId::new);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), header_value);
    }

    response
}

pub trait RequestIdExt {
    fn request_id(&self) -> RequestId;
}

impl RequestIdExt for axum::http::Extensions {
    fn request_id(&self) -> RequestId {
        self.get::<RequestId>().copied().unwrap_or_default()
    }
}

/// Request/response logging, enabled by `logging.log_request`
///
/// Query strings are left out since the OAuth callback carries the code.
pub async fn request_response_logger(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = req.extensions().request_id();

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        "Request"
    );

    let start = std::time::Instant::now();
    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Response"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    async fn echo_id(Extension(request_id): Extension<RequestId>) -> String {
        request_id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/test", get(echo_id))
            .layer(axum::middleware::from_fn(request_response_logger))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn test_request_id_generated() {
        let request = HttpRequest::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let header = response.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert!(Uuid::from_str(header).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_preserved() {
        let existing = Uuid::new_v4();
        let request = HttpRequest::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, existing.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let header = response.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert_eq!(header, existing.to_string());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, existing.to_string().as_bytes());
    }

    #[tokio::test]
    async fn test_invalid_request_id_replaced() {
        let request = HttpRequest::builder()
            .uri("/test")
            .header(REQUEST_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let header = response.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert_ne!(header, "not-a-uuid");
        assert!(Uuid::from_str(header).is_ok());
    }

    #[test]
    fn test_missing_extension_defaults_to_nil() {
        let extensions = axum::http::Extensions::new();
        assert_eq!(extensions.request_id(), RequestId(Uuid::nil()));
    }
}
