pub mod middleware;

use crate::{
    auth::oauth::HubspotConfigChecker,
    cache::CacheManager,
    config::Config,
    error::AppError,
    health::HealthService,
    routes::{create_health_routes, create_hubspot_routes},
    server::middleware::{request_id_middleware, request_response_logger},
    service::HubspotService,
    shutdown::ShutdownCoordinator,
};
use axum::{Router, extract::DefaultBodyLimit, middleware as axum_middleware};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Form bodies here are a user id, an org id or a credential blob
const MAX_BODY_SIZE: usize = 64 * 1024;

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub cache: Arc<CacheManager>,
    pub hubspot: Arc<HubspotService>,
    pub health_service: Arc<HealthService>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let cache = CacheManager::new_from_config(&config.cache).await?;
        Self::with_cache(config, cache).await
    }

    /// Build the server around an already selected store
    pub async fn with_cache(config: Config, cache: CacheManager) -> Result<Self, AppError> {
        if !config.hubspot.is_configured() {
            tracing::warn!("HubSpot client id is not configured; authorization requests will fail");
        }

        let hubspot = Arc::new(HubspotService::new(config.hubspot.clone(), &cache)?);
        let cache = Arc::new(cache);

        let health_service = Arc::new(HealthService::new());
        health_service.register(cache.clone()).await;
        health_service
            .register(Arc::new(HubspotConfigChecker::new(config.hubspot.clone())))
            .await;

        Ok(Self {
            config: Arc::new(config),
            cache,
            hubspot,
            health_service,
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
        })
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let app = self.create_app();

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to address {addr}: {e}")))?;

        info!("Server listening on http://{}", addr);

        let shutdown_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            shutdown_coordinator.listen_for_signals().await;
        });

        let shutdown = self.shutdown_coordinator.clone();
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.requested().await;
            info!("Graceful shutdown initiated");
        })
        .await;

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(AppError::Internal(format!("Server error: {e}")));
        }

        info!("Server shutdown complete");
        Ok(())
    }

    // Creates an application router
    pub fn create_app(&self) -> Router {
        let mut app = Router::new()
            .nest("/integrations/hubspot", create_hubspot_routes())
            .nest("/health", create_health_routes())
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .with_state(self.clone());

        if self.config.logging.log_request {
            app = app.layer(axum_middleware::from_fn(request_response_logger));
        }
        app.layer(axum_middleware::from_fn(request_id_middleware))
    }
}
