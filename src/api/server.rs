//! API server lifecycle: bind, serve, shut down.
//!
//! `serve` is the process entry point and stops on Ctrl-C.
//! `start_api_server` runs the router in a background task and returns a
//! handle with a shutdown channel, for embedding and tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::config::Settings;
use crate::core_state::{CoreError, CoreState};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
}

// ═══════════════════════════════════════════════════════════
// Background server handle
// ═══════════════════════════════════════════════════════════

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!(addr = %self.addr, "API server shutdown signal sent");
        }
    }
}

/// Bind `addr` and spawn the server in a background tokio task.
pub async fn start_api_server(
    core: Arc<CoreState>,
    addr: SocketAddr,
) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener.local_addr()?;
    let app = api_router(core);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

// ═══════════════════════════════════════════════════════════
// Foreground entry point
// ═══════════════════════════════════════════════════════════

/// Open the store described by `settings` and serve until Ctrl-C.
pub async fn serve(settings: Settings) -> Result<(), ServerError> {
    let addr = settings.bind_addr;
    let core = Arc::new(CoreState::from_settings(settings)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(addr = %listener.local_addr()?, "API server listening");

    axum::serve(listener, api_router(core))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {e}");
            }
            tracing::info!("Shutdown requested");
        })
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    fn test_core() -> Arc<CoreState> {
        Arc::new(CoreState::in_memory().unwrap())
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let mut server = start_api_server(test_core(), localhost())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let url = format!("http://{}/api/connected-users", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let mut server = start_api_server(test_core(), localhost()).await.unwrap();
        let url = format!("http://{}/nonexistent", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_api_server(test_core(), localhost()).await.unwrap();
        server.shutdown();
        server.shutdown();
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_api_server(test_core(), localhost()).await.unwrap();
        let result = start_api_server(test_core(), first.addr).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
        first.shutdown();
    }
}
