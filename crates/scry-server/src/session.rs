//! WebSocket session lifecycle, from upgrade through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::connection::ClientConnection;
use crate::handler::{HandleOutcome, handle_control};
use crate::server::BridgeState;

/// Heartbeat cadence for a session.
#[derive(Clone, Copy, Debug)]
pub struct HeartbeatConfig {
    /// Interval between server-initiated Ping frames.
    pub ping_interval: Duration,
    /// A peer silent for longer than this is disconnected.
    pub idle_timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Outbound channel depth per client.
const SEND_BUFFER: usize = 64;

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the client for broadcasts
/// 2. Sends the latest result text as a greeting, ahead of any broadcast
/// 3. Dispatches incoming text frames as capture triggers
/// 4. Forwards broadcast text via the send channel
/// 5. Pings on an interval and tears the session down when the peer goes
///    silent past the idle deadline
/// 6. Cleans up on disconnect
#[instrument(skip_all, fields(client_id = %client_id))]
pub async fn run_ws_session(ws: WebSocket, client_id: String, state: BridgeState) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<str>>(SEND_BUFFER);
    let connection = Arc::new(ClientConnection::new(client_id.clone(), send_tx));
    info!("client connected");

    // Register first so a capture cycle finishing right now still counts
    // this client. The greeting stays the first frame regardless: any
    // broadcast queues behind it until the forwarder below starts.
    state.registry.add(connection.clone()).await;

    let greeting = state.pipeline.latest().get();
    if ws_tx
        .send(Message::Text(greeting.to_string().into()))
        .await
        .is_err()
    {
        info!("client disconnected before greeting");
        state.registry.remove(&client_id).await;
        return;
    }

    // The forwarder owns the sink. When it stops — write failure or idle
    // deadline — it closes the socket and fires this token, so the
    // inbound loop never sits on a half-open connection forever.
    let session_over = CancellationToken::new();
    let forwarder_token = session_over.clone();
    let forwarder_conn = connection.clone();
    let heartbeat = state.heartbeat;
    let forwarder = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(heartbeat.ping_interval);
        // Skip the immediate first tick
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                msg = send_rx.recv() => {
                    match msg {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.as_ref().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if forwarder_conn.idle_for() > heartbeat.idle_timeout {
                        warn!(idle = ?forwarder_conn.idle_for(), "peer silent past deadline, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
        forwarder_token.cancel();
    });

    // Inbound loop. Headsets may send triggers as binary frames.
    loop {
        let msg = tokio::select! {
            () = session_over.cancelled() => break,
            next = ws_rx.next() => match next {
                Some(Ok(msg)) => msg,
                _ => break,
            },
        };

        let text = match msg {
            Message::Text(ref t) => Some(t.to_string()),
            Message::Binary(ref data) => match std::str::from_utf8(data) {
                Ok(s) => Some(s.to_string()),
                Err(_) => {
                    info!(len = data.len(), "received non-UTF8 binary frame");
                    None
                }
            },
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                connection.touch();
                None
            }
        };
        let Some(text) = text else { continue };
        connection.touch();

        match handle_control(&text, &state.pipeline).await {
            HandleOutcome::Broadcast(result) => {
                let delivered = state.registry.broadcast(&result).await;
                info!(delivered, "result broadcast");
            }
            HandleOutcome::Ignored => {}
        }
    }

    info!(age = ?connection.age(), dropped = connection.drop_count(), "client disconnected");
    forwarder.abort();
    state.registry.remove(&client_id).await;
}
