use super::{CONTACT_PROPERTIES, IntegrationItem, map_contact};
use crate::{
    auth::oauth::CredentialRecord,
    config::HubspotConfig,
    error::AppError,
    http_client::{build_http_client, ensure_success},
};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Items returned when the caller does not say otherwise
pub const DEFAULT_MAX_ITEMS: usize = 100;

/// Largest `limit` the contacts listing accepts
pub const MAX_PAGE_SIZE: usize = 100;

const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

#[derive(Debug, Deserialize)]
struct ContactPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    #[serde(default)]
    link: Option<String>,
}

impl ContactPage {
    fn next_link(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .and_then(|n| n.link.as_deref())
            .filter(|link| !link.is_empty())
    }
}

/// Pages through the contacts listing and maps each record
#[derive(Clone)]
pub struct ItemFetcher {
    http_client: Client,
    api_base_url: String,
}

impl ItemFetcher {
    pub fn new(config: &HubspotConfig) -> Result<Self, AppError> {
        Ok(Self {
            http_client: build_http_client(Duration::from_secs(config.request_timeout_secs))?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch up to `max_items` contacts, following `paging.next.link`
    pub async fn fetch_items(
        &self,
        credentials: &CredentialRecord,
        max_items: usize,
    ) -> Result<Vec<IntegrationItem>, AppError> {
        let access_token = credentials.access_token().ok_or_else(|| {
            AppError::Unauthorized("No access token in provided credentials".to_string())
        })?;

        let mut items = Vec::new();
        if max_items == 0 {
            return Ok(items);
        }

        let limit = max_items.min(MAX_PAGE_SIZE).to_string();
        let properties = CONTACT_PROPERTIES.join(",");
        let first = self
            .http_client
            .get(format!("{}{}", self.api_base_url, CONTACTS_PATH))
            .query(&[
                ("limit", limit.as_str()),
                ("properties", properties.as_str()),
                ("archived", "false"),
            ]);

        let mut page = self.fetch_page(first, access_token).await?;
        let mut page_count = 1;

        loop {
            for record in &page.results {
                items.push(map_contact(record));
                if items.len() >= max_items {
                    tracing::debug!(items = items.len(), pages = page_count, "Reached max_items");
                    return Ok(items);
                }
            }

            let Some(link) = page.next_link() else {
                break;
            };
            let next = self.http_client.get(link);
            page = self.fetch_page(next, access_token).await?;
            page_count += 1;
        }

        tracing::debug!(items = items.len(), pages = page_count, "Fetched HubSpot contacts");
        Ok(items)
    }

    async fn fetch_page(
        &self,
        request: RequestBuilder,
        access_token: &str,
    ) -> Result<ContactPage, AppError> {
        let response = request.bearer_auth(access_token).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<ContactPage>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetcher() -> ItemFetcher {
        ItemFetcher::new(&HubspotConfig {
            api_base_url: "http://127.0.0.1:1/".to_string(),
            ..HubspotConfig::default()
        })
        .unwrap()
    }

    fn credentials(token: Option<&str>) -> CredentialRecord {
        let raw = match token {
            Some(t) => json!({"access_token": t}),
            None => json!({}),
        };
        CredentialRecord::from_token_response(raw, 0)
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(fetcher().api_base_url, "http://127.0.0.1:1");
    }

    #[test]
    fn test_next_link_extraction() {
        let page: ContactPage = serde_json::from_value(json!({
            "results": [],
            "paging": {"next": {"after": "3", "link": "http://x/next"}}
        }))
        .unwrap();
        assert_eq!(page.next_link(), Some("http://x/next"));

        let page: ContactPage = serde_json::from_value(json!({"results": []})).unwrap();
        assert_eq!(page.next_link(), None);
    }

    #[tokio::test]
    async fn test_missing_access_token_is_unauthorized() {
        let err = fetcher()
            .fetch_items(&credentials(None), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = fetcher()
            .fetch_items(&credentials(Some("")), 10)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "No access token in provided credentials");
    }

    #[tokio::test]
    async fn test_zero_max_items_makes_no_request() {
        // The base URL is unroutable, so any request would fail
        let items = fetcher()
            .fetch_items(&credentials(Some("at")), 0)
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
