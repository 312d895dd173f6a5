use crate::{
    config::HubspotConfig,
    health::{ComponentHealth, HealthChecker},
};

/// Reports whether the HubSpot app credentials are present
pub struct HubspotConfigChecker {
    config: HubspotConfig,
}

impl HubspotConfigChecker {
    pub fn new(config: HubspotConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl HealthChecker for HubspotConfigChecker {
    fn name(&self) -> &str {
        "hubspot"
    }

    async fn check(&self) -> ComponentHealth {
        let mut missing = vec![];
        if self.config.client_id.is_empty() {
            missing.push("client_id");
        }
        if self.config.client_secret.is_empty() {
            missing.push("client_secret");
        }

        if missing.is_empty() {
            ComponentHealth::healthy(serde_json::json!({
                "redirect_uri": self.config.redirect_uri,
                "scopes": self.config.scopes,
            }))
        } else {
            ComponentHealth::degraded(
                format!("HubSpot app is not fully configured: missing {:?}", missing),
                serde_json::json!({
                    "missing": missing,
                    "redirect_uri": self.config.redirect_uri,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;

    #[tokio::test]
    async fn test_configured_app_is_healthy() {
        let checker = HubspotConfigChecker::new(HubspotConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            ..HubspotConfig::default()
        });

        let result = checker.check().await;
        assert_eq!(result.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_missing_secret_is_degraded() {
        let checker = HubspotConfigChecker::new(HubspotConfig {
            client_id: "id".to_string(),
            ..HubspotConfig::default()
        });

        let result = checker.check().await;
        assert_eq!(result.status, HealthStatus::Degraded);
        assert_eq!(result.details["missing"], serde_json::json!(["client_secret"]));
    }
}
