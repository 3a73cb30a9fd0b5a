//! The realtime bridge server: WebSocket gateway plus health endpoint.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{Json, Response};
use axum::routing::get;
use scry_pipeline::CapturePipeline;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::registry::ClientRegistry;
use crate::session::{HeartbeatConfig, run_ws_session};
use crate::shutdown::ShutdownCoordinator;
use crate::tls::{self, TlsSettings};

/// Where a server should listen, and whether it terminates TLS.
#[derive(Clone, Debug)]
pub struct ListenConfig {
    /// Bind host.
    pub host: String,
    /// Bind port. Zero asks the OS for a free port.
    pub port: u16,
    /// TLS settings; `None` serves plaintext.
    pub tls: Option<TlsSettings>,
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct BridgeState {
    /// Connected client registry for result fan-out.
    pub registry: Arc<ClientRegistry>,
    /// The capture-and-analyze pipeline.
    pub pipeline: Arc<CapturePipeline>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Ping cadence and idle deadline for sessions.
    pub heartbeat: HeartbeatConfig,
}

impl BridgeState {
    /// Create state over the given pipeline, with a fresh registry.
    pub fn new(
        pipeline: Arc<CapturePipeline>,
        shutdown: Arc<ShutdownCoordinator>,
        max_message_size: usize,
    ) -> Self {
        Self {
            registry: Arc::new(ClientRegistry::new()),
            pipeline,
            shutdown,
            start_time: Instant::now(),
            max_message_size,
            heartbeat: HeartbeatConfig::default(),
        }
    }

    /// Replace the heartbeat cadence (tests shrink it to milliseconds).
    pub fn with_heartbeat(mut self, heartbeat: HeartbeatConfig) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}

/// The realtime bridge server.
pub struct RealtimeServer {
    config: ListenConfig,
    state: BridgeState,
}

impl RealtimeServer {
    /// Create a new server.
    pub fn new(config: ListenConfig, state: BridgeState) -> Self {
        Self { config, state }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ws", get(ws_handler))
            .with_state(self.state.clone())
    }

    /// The shared state.
    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    /// Bind and start serving.
    ///
    /// Returns the bound address and the server task handle. The task
    /// exits when the shutdown token fires.
    pub async fn listen(self) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.state.shutdown.token();

        let handle = match &self.config.tls {
            Some(settings) => {
                let acceptor = tls::build_acceptor(settings)?;
                info!(%addr, "realtime server listening (tls)");
                tokio::spawn(tls::serve(listener, acceptor, router, token))
            }
            None => {
                info!(%addr, "realtime server listening");
                tokio::spawn(async move {
                    let shutdown = async move { token.cancelled().await };
                    if let Err(e) = axum::serve(listener, router)
                        .with_graceful_shutdown(shutdown)
                        .await
                    {
                        warn!(error = %e, "realtime server exited with error");
                    }
                })
            }
        };

        Ok((addr, handle))
    }
}

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Current WebSocket connection count.
    pub connections: usize,
}

/// GET /health
async fn health_handler(State(state): State<BridgeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        connections: state.registry.len().await,
    })
}

/// GET /ws — upgrade and hand the socket to a session task.
async fn ws_handler(State(state): State<BridgeState>, ws: WebSocketUpgrade) -> Response {
    let client_id = uuid::Uuid::now_v7().to_string();
    ws.max_message_size(state.max_message_size)
        .on_upgrade(move |socket| run_ws_session(socket, client_id, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use image::{DynamicImage, RgbaImage};
    use scry_capture::provider::{CaptureError, CaptureProvider};
    use scry_core::LatestResult;
    use scry_pipeline::PipelineConfig;
    use scry_vision::{AnalysisClient, AnalysisError};
    use tower::ServiceExt;

    struct StubProvider;

    impl CaptureProvider for StubProvider {
        fn capture_frame(&self) -> Result<DynamicImage, CaptureError> {
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(16, 16)))
        }
    }

    struct StubAnalysis;

    #[async_trait::async_trait]
    impl AnalysisClient for StubAnalysis {
        async fn describe(&self, _jpeg: &[u8], _prompt: &str) -> Result<String, AnalysisError> {
            Ok("desk".to_string())
        }
    }

    fn make_server(tmp: &tempfile::TempDir) -> RealtimeServer {
        let pipeline = Arc::new(CapturePipeline::new(
            Arc::new(StubProvider),
            Arc::new(StubAnalysis),
            PipelineConfig {
                bounding_box: None,
                output_dir: tmp.path().to_path_buf(),
                jpeg_quality: 85,
                prompt: "describe".into(),
            },
            Arc::new(LatestResult::new()),
        ));
        let state = BridgeState::new(pipeline, Arc::new(ShutdownCoordinator::new()), 64 * 1024);
        RealtimeServer::new(
            ListenConfig {
                host: "127.0.0.1".into(),
                port: 0,
                tls: None,
            },
            state,
        )
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let app = make_server(&tmp).router();

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["connections"], 0);
        assert!(parsed["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn ws_route_rejects_plain_get() {
        let tmp = tempfile::tempdir().unwrap();
        let app = make_server(&tmp).router();

        // No upgrade headers: the handshake extractor refuses
        let req = Request::builder().uri("/ws").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_ne!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let tmp = tempfile::tempdir().unwrap();
        let app = make_server(&tmp).router();

        let req = Request::builder().uri("/nonexistent").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_binds_ephemeral_port() {
        let tmp = tempfile::tempdir().unwrap();
        let server = make_server(&tmp);
        let shutdown = server.state().shutdown.clone();
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);

        shutdown.shutdown();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn listen_with_bad_tls_settings_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Arc::new(CapturePipeline::new(
            Arc::new(StubProvider),
            Arc::new(StubAnalysis),
            PipelineConfig {
                bounding_box: None,
                output_dir: tmp.path().to_path_buf(),
                jpeg_quality: 85,
                prompt: "describe".into(),
            },
            Arc::new(LatestResult::new()),
        ));
        let state = BridgeState::new(pipeline, Arc::new(ShutdownCoordinator::new()), 64 * 1024);
        let server = RealtimeServer::new(
            ListenConfig {
                host: "127.0.0.1".into(),
                port: 0,
                tls: Some(TlsSettings {
                    cert_path: tmp.path().join("absent.pem"),
                    key_path: tmp.path().join("absent-key.pem"),
                }),
            },
            state,
        );
        assert!(server.listen().await.is_err());
    }
}
