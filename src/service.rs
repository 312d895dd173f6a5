use crate::{
    auth::oauth::{AuthorizeResponse, CallbackParams, CredentialRecord, OAuthFlows},
    cache::CacheManager,
    config::HubspotConfig,
    error::AppError,
    items::{IntegrationItem, ItemFetcher},
};
use serde_json::Value;

/// Entry point the routes and the CLI talk to
pub struct HubspotService {
    flows: OAuthFlows,
    fetcher: ItemFetcher,
}

impl HubspotService {
    pub fn new(config: HubspotConfig, cache: &CacheManager) -> Result<Self, AppError> {
        let fetcher = ItemFetcher::new(&config)?;
        let flows = OAuthFlows::new(config, cache)?;
        Ok(Self { flows, fetcher })
    }

    pub async fn authorize(
        &self,
        user_id: &str,
        org_id: &str,
        caller_state: Option<&str>,
    ) -> Result<AuthorizeResponse, AppError> {
        self.flows.authorize(user_id, org_id, caller_state).await
    }

    pub async fn handle_callback(&self, params: CallbackParams) -> Result<CredentialRecord, AppError> {
        self.flows.handle_callback(params).await
    }

    pub async fn retrieve_credentials(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<CredentialRecord, AppError> {
        self.flows.retrieve_credentials(user_id, org_id).await
    }

    pub async fn fetch_items(
        &self,
        credentials: &CredentialRecord,
        max_items: usize,
    ) -> Result<Vec<IntegrationItem>, AppError> {
        self.fetcher.fetch_items(credentials, max_items).await
    }

    pub fn config(&self) -> &HubspotConfig {
        self.flows.config()
    }
}

/// Parse the `credentials` form field, accepting a JSON object or a JSON string
/// that itself holds the object
pub fn parse_credentials(payload: &str) -> Result<CredentialRecord, AppError> {
    let invalid = |e: serde_json::Error| AppError::BadRequest(format!("Invalid credentials: {e}"));

    let value: Value = serde_json::from_str(payload).map_err(invalid)?;
    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner).map_err(invalid)?,
        other => other,
    };
    serde_json::from_value(value).map_err(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials_object() {
        let record = parse_credentials(r#"{"access_token": "at", "hub_id": "12"}"#).unwrap();
        assert_eq!(record.access_token(), Some("at"));
        assert_eq!(record.provider_account_id.as_deref(), Some("12"));
    }

    #[test]
    fn test_parse_credentials_string_wrapped() {
        let inner = r#"{"access_token": "at"}"#;
        let wrapped = serde_json::to_string(inner).unwrap();
        let record = parse_credentials(&wrapped).unwrap();
        assert_eq!(record.access_token(), Some("at"));
    }

    #[test]
    fn test_parse_credentials_rejects_garbage() {
        assert!(matches!(
            parse_credentials("{not json"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(parse_credentials("[1, 2]"), Err(AppError::BadRequest(_))));
    }
}
