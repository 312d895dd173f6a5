#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use hubspot_integration::{
    Config, Server,
    auth::oauth::{CredentialRecord, StateData},
    cache::CacheManager,
};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

/// App wired against a wiremock stand-in for HubSpot
pub struct TestHarness {
    pub config: Config,
    pub server: Server,
    pub app: Router,
    pub hubspot: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        let hubspot = MockServer::start().await;

        let mut config = Config::default();
        config.hubspot.client_id = "test-client-id".to_string();
        config.hubspot.client_secret = "test-client-secret".to_string();
        config.hubspot.authorization_url = format!("{}/oauth/authorize", hubspot.uri());
        config.hubspot.token_url = format!("{}/oauth/v1/token", hubspot.uri());
        config.hubspot.api_base_url = hubspot.uri();
        config.hubspot.request_timeout_secs = 5;

        let server = Server::with_cache(config.clone(), CacheManager::new_memory())
            .await
            .unwrap();
        let app = server.create_app();

        Self {
            config,
            server,
            app,
            hubspot,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.server.cache
    }

    pub async fn saved_state(&self, org_id: &str, user_id: &str) -> Option<StateData> {
        self.cache()
            .cache::<StateData>()
            .get(&format!("{org_id}:{user_id}"))
            .await
            .unwrap()
    }

    pub async fn pending_credentials(
        &self,
        org_id: &str,
        user_id: &str,
    ) -> Option<CredentialRecord> {
        self.cache()
            .cache::<CredentialRecord>()
            .get(&format!("{org_id}:{user_id}"))
            .await
            .unwrap()
    }

    pub async fn post_form(&self, uri: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter())
            .finish();
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// POST the fields as `multipart/form-data`, the way a browser sends `FormData`
    pub async fn post_multipart(&self, uri: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
        let boundary = "----hubspot-test-boundary";
        let mut body = String::new();
        for (name, value) in form {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8(bytes).unwrap())
    }

    /// POST /authorize and return the `state` query parameter from the URL
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> String {
        let (status, body) = self
            .post_form(
                "/integrations/hubspot/authorize",
                &[("user_id", user_id), ("org_id", org_id)],
            )
            .await;
        assert_eq!(status, StatusCode::OK, "authorize failed: {body}");
        query_param(body["url"].as_str().unwrap(), "state").unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }
}

pub fn query_param(url: &str, name: &str) -> Option<String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

pub fn callback_uri(code: &str, state: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("code", code)
        .append_pair("state", state)
        .finish();
    format!("/integrations/hubspot/oauth2callback?{query}")
}
