//! REST API server lifecycle management.
//!
//! Provides a lifecycle manager for the REST API server that can be
//! started, stopped, and queried for status.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::rest::{build_router, ApiState};

/// Status of the REST API server
#[derive(Debug, Clone, PartialEq)]
pub enum RestApiStatus {
    Stopped,
    Starting,
    Stopping,
    Running { port: u16 },
    Error(String),
}

impl RestApiStatus {
    /// Returns true if the server is running
    pub fn is_running(&self) -> bool {
        matches!(self, RestApiStatus::Running { .. })
    }
}

/// REST API server handle for lifecycle management
pub struct RestApiServer {
    state: ApiState,
    port: u16,
    status: Arc<Mutex<RestApiStatus>>,
    shutdown_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    #[allow(dead_code)]
    task_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RestApiServer {
    /// Create a new server handle
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state,
            port,
            status: Arc::new(Mutex::new(RestApiStatus::Stopped)),
            shutdown_tx: Arc::new(Mutex::new(None)),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Get current server status
    pub fn status(&self) -> RestApiStatus {
        self.status.lock().unwrap().clone()
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// Get the port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Start the REST API server
    pub fn start(&self) -> Result<(), String> {
        if self.is_running() {
            return Err(format!("REST API already running on port {}", self.port));
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        *self.shutdown_tx.lock().unwrap() = Some(shutdown_tx);

        let router = build_router(self.state.clone());
        let port = self.port;
        let status = self.status.clone();

        *status.lock().unwrap() = RestApiStatus::Starting;

        let handle = tokio::spawn(async move {
            use std::net::SocketAddr;
            let addr = SocketAddr::from(([0, 0, 0, 0], port));

            match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => {
                    *status.lock().unwrap() = RestApiStatus::Running { port };
                    tracing::info!("REST API listening on http://{}", addr);

                    let _ = axum::serve(listener, router)
                        .with_graceful_shutdown(async {
                            let _ = shutdown_rx.await;
                        })
                        .await;
                }
                Err(e) => {
                    *status.lock().unwrap() = RestApiStatus::Error(e.to_string());
                    tracing::error!("Failed to start REST API: {}", e);
                }
            }

            *status.lock().unwrap() = RestApiStatus::Stopped;
        });

        *self.task_handle.lock().unwrap() = Some(handle);

        Ok(())
    }

    /// Stop the REST API server
    pub fn stop(&self) {
        *self.status.lock().unwrap() = RestApiStatus::Stopping;

        if let Some(tx) = self.shutdown_tx.lock().unwrap().take() {
            let _ = tx.send(());
        }

        *self.status.lock().unwrap() = RestApiStatus::Stopped;
        tracing::info!("REST API server stopped");
    }
}

impl Drop for RestApiServer {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}
