//! # scry-server
//!
//! Axum HTTP + `WebSocket` bridge server.
//!
//! - `WebSocket` gateway: connection registry, greeting, trigger dispatch,
//!   heartbeat, result fan-out to every connected client
//! - HTTP endpoints: health check
//! - Static asset server on its own port (viewer bundle, overlays)
//! - Optional TLS on both listeners from a PEM cert/key pair
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod assets;
pub mod connection;
pub mod handler;
pub mod registry;
pub mod server;
pub mod session;
pub mod shutdown;
pub mod tls;

pub use assets::StaticServer;
pub use registry::ClientRegistry;
pub use server::{BridgeState, HealthResponse, ListenConfig, RealtimeServer};
pub use session::HeartbeatConfig;
pub use shutdown::{DEFAULT_DRAIN_TIMEOUT, ShutdownCoordinator};
pub use tls::TlsSettings;
