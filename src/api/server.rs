//! HTTP server lifecycle.
//!
//! Binds the configured address, mounts `app_router()`, and runs until a
//! shutdown signal. Pattern: bind → spawn background task → return handle
//! with shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::app_router;
use crate::core_state::CoreState;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Start the API server on the given address.
///
/// Builds the full router, spawns the axum server in a background tokio
/// task, and returns a handle with the bound address (useful when the
/// requested port was 0) and a shutdown channel.
pub async fn start_server(
    core: Arc<CoreState>,
    addr: SocketAddr,
) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    tracing::info!(%addr, "API server binding");

    let app = app_router(core);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_database;

    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("clinic.db");
        open_database(&db_path).unwrap();
        (Arc::new(CoreState::new(db_path)), dir)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (core, _dir) = test_core();
        let mut server = start_server(core, "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");

        assert!(server.addr.port() > 0);

        // Protected route without a token is rejected, not unreachable
        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn server_serves_public_share_routes() {
        let (core, _dir) = test_core();
        let mut server = start_server(core, "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");

        // Unknown bill id: reaches the handler (404), no auth challenge
        let url = format!(
            "http://{}/share/bill/{}",
            server.addr,
            uuid::Uuid::new_v4()
        );
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (core, _dir) = test_core();
        let mut server = start_server(core, "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}
