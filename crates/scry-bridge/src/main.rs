//! # scry-bridge
//!
//! Bridge daemon binary — wires the capture pipeline, the analysis
//! client, and both servers together and runs until interrupted.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use scry_capture::provider::MonitorCapture;
use scry_core::LatestResult;
use scry_pipeline::{CapturePipeline, PipelineConfig};
use scry_server::{
    BridgeState, ListenConfig, RealtimeServer, ShutdownCoordinator, StaticServer, TlsSettings,
};
use scry_settings::types::ScrySettings;
use scry_vision::{HttpAnalysisClient, VisionConfig};
use tracing_subscriber::EnvFilter;

/// Scry bridge daemon.
#[derive(Parser, Debug)]
#[command(name = "scry-bridge", about = "Realtime screen-to-description bridge")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Realtime (WebSocket) server port (overrides settings).
    #[arg(long)]
    ws_port: Option<u16>,

    /// Static asset server port (overrides settings).
    #[arg(long)]
    static_port: Option<u16>,

    /// Directory served by the static asset server (overrides settings).
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Directory for snapshot copies (overrides settings).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path to the settings file (default `~/.scry/settings.json`).
    #[arg(long)]
    settings_path: Option<PathBuf>,
}

impl Cli {
    /// Fold command line overrides into loaded settings.
    fn apply_to(&self, settings: &mut ScrySettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.ws_port {
            settings.server.ws_port = port;
        }
        if let Some(port) = self.static_port {
            settings.server.static_port = port;
        }
        if let Some(dir) = &self.static_dir {
            settings.server.static_dir = dir.to_string_lossy().into_owned();
        }
        if let Some(dir) = &self.output_dir {
            settings.capture.output_dir = dir.to_string_lossy().into_owned();
        }
    }
}

/// TLS is enabled only when both paths are configured.
fn tls_settings(settings: &ScrySettings) -> Option<TlsSettings> {
    match (&settings.server.cert_path, &settings.server.key_path) {
        (Some(cert), Some(key)) => Some(TlsSettings {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        _ => {
            tracing::warn!("only one of certPath/keyPath is set, serving plaintext");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();

    let settings_path = args
        .settings_path
        .clone()
        .unwrap_or_else(scry_settings::loader::settings_path);
    let mut settings = scry_settings::loader::load_settings_from_path(&settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
    args.apply_to(&mut settings);

    if settings.analysis.api_key.is_none() {
        tracing::warn!("no API key configured, the analysis endpoint may reject requests");
    }

    let analysis = Arc::new(HttpAnalysisClient::new(VisionConfig {
        base_url: settings.analysis.base_url.clone(),
        api_key: settings.analysis.api_key.clone(),
        model: settings.analysis.model.clone(),
        timeout: Duration::from_millis(settings.analysis.timeout_ms),
    }));

    let latest = Arc::new(LatestResult::new());
    let pipeline = Arc::new(CapturePipeline::new(
        Arc::new(MonitorCapture),
        analysis,
        PipelineConfig {
            bounding_box: settings.capture.bounding_box,
            output_dir: PathBuf::from(&settings.capture.output_dir),
            jpeg_quality: settings.capture.jpeg_quality,
            prompt: settings.analysis.prompt.clone(),
        },
        latest,
    ));

    let shutdown = Arc::new(ShutdownCoordinator::new());
    let tls = tls_settings(&settings);

    let realtime = RealtimeServer::new(
        ListenConfig {
            host: settings.server.host.clone(),
            port: settings.server.ws_port,
            tls: tls.clone(),
        },
        BridgeState::new(pipeline, shutdown.clone(), settings.server.max_message_size),
    );
    let (ws_addr, ws_handle) = realtime
        .listen()
        .await
        .context("failed to start realtime server")?;
    shutdown.track(ws_handle);

    let assets = StaticServer::new(
        ListenConfig {
            host: settings.server.host.clone(),
            port: settings.server.static_port,
            tls,
        },
        PathBuf::from(&settings.server.static_dir),
        shutdown.token(),
    );
    let (static_addr, static_handle) = assets
        .listen()
        .await
        .context("failed to start static server")?;
    shutdown.track(static_handle);

    tracing::info!(
        model = %settings.analysis.model,
        "bridge up: ws on {ws_addr}, assets on {static_addr}"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    tracing::info!("shutting down...");
    shutdown.drain(scry_server::DEFAULT_DRAIN_TIMEOUT).await;
    tracing::info!("shutdown complete");
    Ok(())
}
