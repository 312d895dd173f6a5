//! Component health aggregation behind `GET /health`

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Ordered from best to worst, so the overall status is the maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub details: Value,
    pub duration_ms: u64,
}

impl ComponentHealth {
    pub fn healthy(details: Value) -> Self {
        Self::new(HealthStatus::Healthy, None, details)
    }

    pub fn degraded(message: impl Into<String>, details: Value) -> Self {
        Self::new(HealthStatus::Degraded, Some(message.into()), details)
    }

    pub fn unhealthy(message: impl Into<String>, details: Value) -> Self {
        Self::new(HealthStatus::Unhealthy, Some(message.into()), details)
    }

    fn new(status: HealthStatus, message: Option<String>, details: Value) -> Self {
        Self {
            status,
            message,
            details,
            duration_ms: 0,
        }
    }
}

#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// Component name, also the value `?check=` selects
    fn name(&self) -> &str;

    async fn check(&self) -> ComponentHealth;
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub checks: BTreeMap<String, ComponentHealth>,
}

#[derive(Default)]
pub struct HealthService {
    checkers: RwLock<BTreeMap<String, Arc<dyn HealthChecker>>>,
}

impl HealthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a checker; a later registration under the same name replaces it
    pub async fn register(&self, checker: Arc<dyn HealthChecker>) {
        let name = checker.name().to_string();
        self.checkers.write().await.insert(name, checker);
    }

    pub async fn checker_names(&self) -> Vec<String> {
        self.checkers.read().await.keys().cloned().collect()
    }

    /// Build a report for `filter`
    ///
    /// `None` is a liveness check and runs nothing, `"all"` runs every checker,
    /// any other value runs the checker of that name if one exists.
    pub async fn report(&self, filter: Option<&str>) -> HealthReport {
        let checkers = self.checkers.read().await;
        let mut checks = BTreeMap::new();

        let selected = checkers
            .iter()
            .filter(|(name, _)| match filter {
                None => false,
                Some("all") => true,
                Some(wanted) => name.as_str() == wanted,
            });

        for (name, checker) in selected {
            let started = Instant::now();
            let mut health = checker.check().await;
            health.duration_ms = started.elapsed().as_millis() as u64;
            checks.insert(name.clone(), health);
        }

        let status = checks
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        HealthReport {
            status,
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(&'static str, HealthStatus);

    #[async_trait]
    impl HealthChecker for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn check(&self) -> ComponentHealth {
            match self.1 {
                HealthStatus::Healthy => ComponentHealth::healthy(json!({})),
                HealthStatus::Degraded => ComponentHealth::degraded("slow", json!({})),
                HealthStatus::Unhealthy => ComponentHealth::unhealthy("down", json!({})),
            }
        }
    }

    async fn service(components: &[(&'static str, HealthStatus)]) -> HealthService {
        let service = HealthService::new();
        for (name, status) in components {
            service.register(Arc::new(Fixed(name, *status))).await;
        }
        service
    }

    #[tokio::test]
    async fn test_worst_component_decides() {
        let service = service(&[
            ("a", HealthStatus::Healthy),
            ("b", HealthStatus::Degraded),
            ("c", HealthStatus::Unhealthy),
        ])
        .await;

        let report = service.report(Some("all")).await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.checks["b"].message.as_deref(), Some("slow"));
    }

    #[tokio::test]
    async fn test_single_component_filter() {
        let service = service(&[("a", HealthStatus::Healthy), ("b", HealthStatus::Degraded)]).await;

        let report = service.report(Some("a")).await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.checks.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_liveness_runs_nothing() {
        let service = service(&[("a", HealthStatus::Unhealthy)]).await;

        let report = service.report(None).await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.checks.is_empty());
        assert_eq!(service.checker_names().await, vec!["a".to_string()]);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let value = serde_json::to_value(ComponentHealth::degraded("x", json!(null))).unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["message"], "x");
    }
}
