use crate::{health::HealthReport, routes::extract::QueryParams, server::Server};
use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HealthCheckQuery {
    #[serde(default)]
    check: Option<String>,
}

/// Create health check routes
///
/// Without `check` only liveness is reported; `?check=all` or `?check=<name>`
/// runs the registered component checks.
pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/", get(health_check))
}

async fn health_check(
    State(server): State<Server>,
    QueryParams(params): QueryParams<HealthCheckQuery>,
) -> Json<HealthReport> {
    Json(server.health_service.report(params.check.as_deref()).await)
}
