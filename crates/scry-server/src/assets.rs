//! Static asset server.
//!
//! Serves the viewer bundle from a directory on its own port,
//! independent of the realtime gateway. Shares the listener plumbing
//! (including optional TLS) with the bridge server.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::server::ListenConfig;
use crate::tls;

/// File server for the viewer assets.
pub struct StaticServer {
    config: ListenConfig,
    dir: PathBuf,
    cancel: CancellationToken,
}

impl StaticServer {
    /// Create a server rooted at `dir`.
    pub fn new(config: ListenConfig, dir: PathBuf, cancel: CancellationToken) -> Self {
        Self { config, dir, cancel }
    }

    /// Build the router: every path resolves inside the asset directory.
    pub fn router(&self) -> Router {
        Router::new().fallback_service(ServeDir::new(&self.dir))
    }

    /// Bind and start serving.
    ///
    /// Returns the bound address and the server task handle. The task
    /// exits when the cancellation token fires.
    pub async fn listen(self) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();

        let handle = match &self.config.tls {
            Some(settings) => {
                let acceptor = tls::build_acceptor(settings)?;
                info!(%addr, dir = %self.dir.display(), "static server listening (tls)");
                tokio::spawn(tls::serve(listener, acceptor, router, self.cancel))
            }
            None => {
                info!(%addr, dir = %self.dir.display(), "static server listening");
                let cancel = self.cancel;
                tokio::spawn(async move {
                    let shutdown = async move { cancel.cancelled().await };
                    if let Err(e) = axum::serve(listener, router)
                        .with_graceful_shutdown(shutdown)
                        .await
                    {
                        warn!(error = %e, "static server exited with error");
                    }
                })
            }
        };

        Ok((addr, handle))
    }
}
