use super::{
    credentials::CredentialRecord,
    providers::{Oauth2Client, create_oauth_client},
    state::{StateData, store_key},
};
use crate::{
    cache::{CacheManager, TypedCache},
    config::HubspotConfig,
    error::AppError,
    http_client::{build_http_client, ensure_success},
};
use chrono::Utc;
use oauth2::{CsrfToken, Scope};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{sync::Arc, time::Duration};

/// Page returned to the consent popup once the callback succeeds
pub const CLOSE_WINDOW_HTML: &str = "<html>\n    <script>\n        window.close();\n    </script>\n</html>\n";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizeResponse {
    pub url: String,
}

/// Query parameters HubSpot appends to the redirect URI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Authorization-code flow against HubSpot
pub struct OAuthFlows {
    config: HubspotConfig,
    http_client: Client,
    oauth_client: Arc<Oauth2Client>,
    states: TypedCache<StateData>,
    credentials: TypedCache<CredentialRecord>,
}

impl OAuthFlows {
    pub fn new(config: HubspotConfig, cache: &CacheManager) -> Result<Self, AppError> {
        let oauth_client = Arc::new(create_oauth_client(&config)?);
        let http_client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;

        Ok(Self {
            config,
            http_client,
            oauth_client,
            states: cache.cache(),
            credentials: cache.cache(),
        })
    }

    /// Build the consent URL and persist a fresh state for the (org, user) pair
    ///
    /// A caller-provided state is ignored; every call mints a new nonce and
    /// replaces any pending one.
    pub async fn authorize(
        &self,
        user_id: &str,
        org_id: &str,
        caller_state: Option<&str>,
    ) -> Result<AuthorizeResponse, AppError> {
        if !self.config.is_configured() {
            return Err(AppError::NotConfigured(
                "HubSpot client id is not configured".to_string(),
            ));
        }
        if caller_state.is_some() {
            tracing::debug!("Ignoring caller-supplied state, generating a fresh nonce");
        }

        let state = StateData::new(user_id, org_id);
        let encoded = state.encode()?;
        self.states.set(&state.store_key(), &state).await?;

        let (url, _csrf_token) = self
            .oauth_client
            .authorize_url(|| CsrfToken::new(encoded))
            .add_scopes(self.config.scopes.iter().map(|s| Scope::new(s.clone())))
            .url();

        tracing::info!(org_id, user_id, "Issued HubSpot authorization URL");

        Ok(AuthorizeResponse {
            url: url.to_string(),
        })
    }

    /// Validate the returned state, exchange the code and park the credentials
    pub async fn handle_callback(&self, params: CallbackParams) -> Result<CredentialRecord, AppError> {
        if params.error.as_deref().is_some_and(|e| !e.is_empty()) {
            let description = params
                .error_description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "OAuth error".to_string());
            return Err(AppError::BadRequest(description));
        }

        let (code, raw_state) = match (params.code, params.state) {
            (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => (code, state),
            _ => {
                return Err(AppError::BadRequest(
                    "Missing code or state in callback".to_string(),
                ));
            }
        };

        let echoed = StateData::decode(&raw_state)?;
        let key = echoed.store_key();

        let saved = self.states.get(&key).await?.ok_or_else(|| {
            AppError::BadRequest("No saved state found for this oauth flow".to_string())
        })?;

        if !saved.matches(&echoed) {
            tracing::warn!(
                org_id = %echoed.org_id,
                user_id = %echoed.user_id,
                "OAuth state mismatch"
            );
            return Err(AppError::BadRequest("State does not match".to_string()));
        }

        let token_response = self.exchange_code(&code).await?;
        let record = CredentialRecord::from_token_response(token_response, Utc::now().timestamp());

        self.credentials.set(&key, &record).await?;

        if let Err(e) = self.states.delete(&key).await {
            tracing::warn!("Failed to delete consumed OAuth state: {}", e);
        }

        tracing::info!(
            org_id = %echoed.org_id,
            user_id = %echoed.user_id,
            "HubSpot authorization completed"
        );

        Ok(record)
    }

    /// Hand the pending credentials to the caller exactly once
    pub async fn retrieve_credentials(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<CredentialRecord, AppError> {
        self.credentials
            .take(&store_key(org_id, user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("No credentials found.".to_string()))
    }

    pub fn config(&self) -> &HubspotConfig {
        &self.config
    }

    async fn exchange_code(&self, code: &str) -> Result<Value, AppError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.json::<Value>().await?)
    }
}
