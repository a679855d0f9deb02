//! Local HTTP server hosting the discovery endpoint.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use apiscribe_engine::DiscoveryService;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::server::routes::router;

/// Host configuration for a discovery HTTP server instance.
pub struct McpHttpServer {
    bind_address: SocketAddr,
    service: Arc<DiscoveryService>,
}

impl McpHttpServer {
    /// Create a new server bound to the provided address.
    pub fn new(bind_address: SocketAddr, service: Arc<DiscoveryService>) -> Self {
        Self { bind_address, service }
    }

    /// Start the server and return a handle for runtime inspection and shutdown.
    pub async fn start(self) -> Result<RunningMcpHttpServer> {
        let cancellation_token = CancellationToken::new();
        let router = router(Arc::clone(&self.service));
        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;
        let bound_address = listener.local_addr()?;

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let served = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
                if let Err(error) = served {
                    warn!(%error, "discovery HTTP server stopped with an error");
                }
            }
        });

        info!(address = %bound_address, "discovery HTTP server listening");
        Ok(RunningMcpHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running discovery HTTP server.
#[derive(Debug)]
pub struct RunningMcpHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningMcpHttpServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for in-flight requests to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("discovery HTTP server task failed: {error}"))?;
        Ok(())
    }
}

/// Resolve the bind address, falling back to the configured default.
///
/// Non-loopback addresses are allowed but logged, since the document exposes
/// the full handler surface of the host.
pub fn resolve_bind_address(bind_address: Option<&str>, default: &str) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or(default);
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid HTTP bind address '{address}': {error}"))?;
    if !is_loopback(parsed.ip()) {
        warn!(address = %parsed, "discovery HTTP server bound to a non-loopback address");
    }
    Ok(parsed)
}

fn is_loopback(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}
