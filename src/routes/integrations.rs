use crate::{
    auth::oauth::{AuthorizeResponse, CLOSE_WINDOW_HTML, CallbackParams, CredentialRecord},
    error::AppError,
    items::{DEFAULT_MAX_ITEMS, IntegrationItem},
    routes::extract::{FormFields, QueryParams},
    server::Server,
    service::parse_credentials,
};
use axum::{
    Router,
    extract::State,
    response::{Html, Json},
    routing::{get, post},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AuthorizeForm {
    pub user_id: String,
    pub org_id: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub user_id: String,
    pub org_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadForm {
    /// JSON-encoded credential record
    pub credentials: String,
    #[serde(default)]
    pub max_items: Option<usize>,
}

/// Routes nested under `/integrations/hubspot`
pub fn create_hubspot_routes() -> Router<Server> {
    Router::new()
        .route("/authorize", post(authorize_handler))
        .route("/oauth2callback", get(callback_handler))
        .route("/credentials", post(credentials_handler))
        .route("/load", post(load_handler))
}

pub async fn authorize_handler(
    State(server): State<Server>,
    FormFields(form): FormFields<AuthorizeForm>,
) -> Result<Json<AuthorizeResponse>, AppError> {
    let response = server
        .hubspot
        .authorize(&form.user_id, &form.org_id, form.state.as_deref())
        .await?;
    Ok(Json(response))
}

pub async fn callback_handler(
    State(server): State<Server>,
    QueryParams(params): QueryParams<CallbackParams>,
) -> Result<Html<&'static str>, AppError> {
    server.hubspot.handle_callback(params).await?;
    Ok(Html(CLOSE_WINDOW_HTML))
}

pub async fn credentials_handler(
    State(server): State<Server>,
    FormFields(form): FormFields<CredentialsForm>,
) -> Result<Json<CredentialRecord>, AppError> {
    let record = server
        .hubspot
        .retrieve_credentials(&form.user_id, &form.org_id)
        .await?;
    Ok(Json(record))
}

pub async fn load_handler(
    State(server): State<Server>,
    FormFields(form): FormFields<LoadForm>,
) -> Result<Json<Vec<IntegrationItem>>, AppError> {
    let credentials = parse_credentials(&form.credentials)?;
    let max_items = form.max_items.unwrap_or(DEFAULT_MAX_ITEMS);
    let items = server.hubspot.fetch_items(&credentials, max_items).await?;
    Ok(Json(items))
}
