//! Listener setup and serve loop.

use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::{routes::create_router, state::AppState};

/// Listener address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port; 0 picks a free one
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: gateway_config::DEFAULT_HOST.to_string(),
            port: gateway_config::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port` string
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bound HTTP server
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    /// Bind the listener
    ///
    /// # Errors
    /// Returns error if the address cannot be bound
    pub async fn bind(config: &ServerConfig, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.bind_address()).await?;
        Ok(Self { listener, state })
    }

    /// Address actually bound
    ///
    /// # Errors
    /// Returns error if the socket has no local address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` resolves, then let in-flight requests finish
    ///
    /// # Errors
    /// Returns error if the serve loop fails
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!(address = %addr, "Relay listening");

        axum::serve(self.listener, create_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Relay stopped");
        Ok(())
    }
}
