//! Web server for depot.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{ServerConfig, StorageConfig, WebConfig};
use crate::store::FileStore;

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Maximum upload request size in bytes.
    max_upload_size: usize,
}

impl WebServer {
    /// Create a new web server around an initialized file store.
    pub fn new(
        server_config: &ServerConfig,
        web_config: &WebConfig,
        storage_config: &StorageConfig,
        store: FileStore,
    ) -> Self {
        let addr = format!("{}:{}", server_config.host, server_config.port)
            .parse()
            .expect("Invalid web server address");

        Self {
            addr,
            app_state: Arc::new(AppState::new(store)),
            cors_origins: web_config.cors_origins.clone(),
            max_upload_size: storage_config.max_upload_size_bytes(),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            &self.cors_origins,
            self.max_upload_size,
        )
        .merge(create_health_router())
    }

    /// Run the web server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_web_server_new() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path()).unwrap();

        let server_config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let server = WebServer::new(
            &server_config,
            &WebConfig::default(),
            &StorageConfig::default(),
            store,
        );
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_run_with_addr() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path()).unwrap();

        let server_config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let server = WebServer::new(
            &server_config,
            &WebConfig::default(),
            &StorageConfig::default(),
            store,
        );
        let addr = server.run_with_addr().await.unwrap();
        assert_ne!(addr.port(), 0);
    }
}
