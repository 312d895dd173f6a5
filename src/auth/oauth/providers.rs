use crate::{config::HubspotConfig, error::AppError};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RedirectUrl, TokenUrl,
    basic::BasicClient,
};

// Avoid oauth2 type madness
pub type Oauth2Client =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Create the HubSpot OAuth client from configuration
pub fn create_oauth_client(config: &HubspotConfig) -> Result<Oauth2Client, AppError> {
    let auth_url = AuthUrl::new(config.authorization_url.clone()).map_err(|e| {
        AppError::NotConfigured(format!(
            "Invalid HubSpot authorization URL '{}': {}",
            config.authorization_url, e
        ))
    })?;

    let token_url = TokenUrl::new(config.token_url.clone()).map_err(|e| {
        AppError::NotConfigured(format!(
            "Invalid HubSpot token URL '{}': {}",
            config.token_url, e
        ))
    })?;

    let redirect_url = RedirectUrl::new(config.redirect_uri.clone()).map_err(|e| {
        AppError::NotConfigured(format!(
            "Invalid HubSpot redirect URI '{}': {}",
            config.redirect_uri, e
        ))
    })?;

    let client = BasicClient::new(ClientId::new(config.client_id.clone()))
        .set_client_secret(ClientSecret::new(config.client_secret.clone()))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url);

    Ok(client)
}
