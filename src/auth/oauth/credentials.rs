use crate::cache::CachedObject;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Credential handoff TTL (10 minutes)
pub const CREDENTIALS_TTL_SECONDS: u64 = 600;

/// Token bundle obtained from the code exchange
///
/// Parked in the store for a single pickup by the frontend; callers that need it
/// longer must persist it themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Epoch seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// HubSpot portal id (`hub_id`)
    #[serde(default, alias = "hub_id", deserialize_with = "string_or_number")]
    pub provider_account_id: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, alias = "raw")]
    pub raw_provider_response: Value,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl CredentialRecord {
    /// Build from the token endpoint's JSON body
    pub fn from_token_response(raw: Value, now: i64) -> Self {
        let text = |field: &str| raw.get(field).and_then(Value::as_str).map(str::to_string);

        let expires_in = raw.get("expires_in").and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        });

        Self {
            access_token: text("access_token"),
            refresh_token: text("refresh_token"),
            expires_at: expires_in.filter(|secs| *secs != 0).map(|secs| now + secs),
            provider_account_id: raw.get("hub_id").and_then(scalar_text),
            token_type: text("token_type").unwrap_or_else(default_token_type),
            raw_provider_response: raw,
        }
    }

    /// Access token, treating an empty string as absent
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl CachedObject for CredentialRecord {
    fn cache_prefix() -> &'static str {
        "credentials"
    }

    fn default_ttl() -> Option<Duration> {
        Some(Duration::from_secs(CREDENTIALS_TTL_SECONDS))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}
