use crate::cache::CacheError;
use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Configuration could not be loaded
    Config(config::ConfigError),
    /// A required setting is missing or invalid at request time
    NotConfigured(String),
    /// Protocol or validation failure; the OAuth flow must be restarted
    BadRequest(String),
    /// Nothing pending under the requested key
    NotFound(String),
    Unauthorized(String),
    /// Provider answered with a non-2xx status
    Upstream { status: u16, body: String },
    /// Provider could not be reached or its response could not be decoded
    Http(reqwest::Error),
    Cache(CacheError),
    Internal(String),
}

impl AppError {
    /// Human-readable reason without the category prefix
    pub fn reason(&self) -> String {
        match self {
            AppError::Config(err) => err.to_string(),
            AppError::NotConfigured(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Upstream { status, body } => {
                format!("HubSpot responded with status {status}: {body}")
            }
            AppError::Http(err) => err.to_string(),
            AppError::Cache(err) => err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream { .. } | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Cache(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) | AppError::NotConfigured(_) => "Configuration error",
            AppError::BadRequest(_) => "Bad request",
            AppError::NotFound(_) => "Not found",
            AppError::Unauthorized(_) => "Authentication failed",
            AppError::Upstream { .. } | AppError::Http(_) => "Upstream service error",
            AppError::Cache(_) | AppError::Internal(_) => "Internal server error",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "Configuration error: {}", err),
            AppError::NotConfigured(msg) => write!(f, "Configuration error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Upstream { status, body } => {
                write!(f, "Upstream error: HubSpot responded with status {}: {}", status, body)
            }
            AppError::Http(err) => write!(f, "HTTP error: {}", err),
            AppError::Cache(err) => write!(f, "Cache error: {}", err),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err)
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err)
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        // `detail` mirrors the field the integrations frontend already reads
        let body = Json(json!({
            "error": self.category(),
            "message": self.to_string(),
            "detail": self.reason(),
        }));

        (status, body).into_response()
    }
}
