use crate::{cache::CachedObject, error::AppError};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OAuth state token TTL (10 minutes)
pub const OAUTH_STATE_TTL_SECONDS: u64 = 600;

/// Random bytes behind each nonce
const NONCE_BYTES: usize = 32;

/// CSRF state round-tripped through HubSpot as the `state` query parameter
///
/// The serialized form is echoed back verbatim, so the embedded `user_id` and
/// `org_id` are untrusted until matched against the stored copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateData {
    /// The nonce
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl StateData {
    /// Fresh state with a newly generated nonce
    pub fn new(user_id: &str, org_id: &str) -> Self {
        Self {
            state: generate_nonce(),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        }
    }

    pub fn encode(&self) -> Result<String, AppError> {
        serde_json::to_string(self)
            .map_err(|e| AppError::Internal(format!("Failed to encode state: {e}")))
    }

    /// Parse the `state` query parameter
    pub fn decode(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|_| AppError::BadRequest("Invalid state value".to_string()))
    }

    pub fn nonce(&self) -> &str {
        &self.state
    }

    /// Store key for this (org, user) pair
    pub fn store_key(&self) -> String {
        store_key(&self.org_id, &self.user_id)
    }

    /// True when `other` carries the same nonce for the same (org, user)
    pub fn matches(&self, other: &StateData) -> bool {
        self.state == other.state && self.user_id == other.user_id && self.org_id == other.org_id
    }
}

impl CachedObject for StateData {
    fn cache_prefix() -> &'static str {
        "state"
    }

    fn default_ttl() -> Option<Duration> {
        Some(Duration::from_secs(OAUTH_STATE_TTL_SECONDS))
    }
}

/// Per-(org, user) key shared by the state and credential namespaces
pub fn store_key(org_id: &str, user_id: &str) -> String {
    format!("{org_id}:{user_id}")
}

/// URL-safe nonce from the OS CSPRNG
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
