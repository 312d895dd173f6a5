use tokio::{signal, sync::watch};
use tracing::{error, info};

/// Shared shutdown flag for the HTTP server and background tasks
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(false),
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Flip the flag; only the first call logs and wakes waiters
    pub fn initiate_shutdown(&self) {
        let flipped = self.tx.send_if_modified(|requested| !std::mem::replace(requested, true));
        if flipped {
            info!("Initiating graceful shutdown...");
        }
    }

    /// Resolves once shutdown has been requested, immediately if it already was
    pub async fn requested(&self) {
        let mut rx = self.tx.subscribe();
        // the sender is owned by self, so the channel cannot close here
        let _ = rx.wait_for(|requested| *requested).await;
    }

    /// Translate Ctrl+C or SIGTERM into a shutdown request
    pub async fn listen_for_signals(&self) {
        let ctrl_c = async {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => {
                    error!("Failed to install Ctrl+C handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    info!("Received terminate signal");
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
            _ = self.requested() => return,
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
