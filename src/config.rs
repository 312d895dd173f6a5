use crate::cache::config::CacheConfig;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix for nested overrides, e.g. `INTEGRATIONS_HUBSPOT__CLIENT_ID`
const ENV_PREFIX: &str = "INTEGRATIONS";

/// Flat variables honored last so existing deployments keep working
const LEGACY_ENV_OVERRIDES: [(&str, &str); 3] = [
    ("HUBSPOT_CLIENT_ID", "hubspot.client_id"),
    ("HUBSPOT_CLIENT_SECRET", "hubspot.client_secret"),
    ("HUBSPOT_REDIRECT_URI", "hubspot.redirect_uri"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub hubspot: HubspotConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubspotConfig {
    /// Empty means "not configured"; authorization is refused until it is set
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_authorization_url")]
    pub authorization_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/integrations/hubspot/oauth2callback".to_string()
}

fn default_authorization_url() -> String {
    "https://app.hubspot.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://api.hubapi.com/oauth/v1/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["crm.objects.contacts.read".to_string()]
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl HubspotConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
    }
}

impl Default for HubspotConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            authorization_url: default_authorization_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            scopes: default_scopes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub log_request: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            hubspot: HubspotConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                log_request: false,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("config.yaml")
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        for (var, key) in LEGACY_ENV_OVERRIDES {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        builder.build()?.try_deserialize()
    }
}
