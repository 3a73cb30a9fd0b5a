//! Per-client connection state.
//!
//! A connection is the registry's handle on one viewer: the queue into
//! its socket write task plus a liveness clock. Delivery is best-effort;
//! a viewer that stops draining its queue loses messages rather than
//! stalling a broadcast sweep.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// A connected viewer.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: String,
    tx: mpsc::Sender<Arc<str>>,
    connected_at: Instant,
    /// Last time the peer showed any sign of life (frame or pong).
    last_seen: Mutex<Instant>,
    dropped: AtomicU64,
}

impl ClientConnection {
    /// Wrap a send channel as a live connection.
    pub fn new(id: String, tx: mpsc::Sender<Arc<str>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            connected_at: now,
            last_seen: Mutex::new(now),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue a text message for this viewer without blocking.
    ///
    /// Returns `false` when the queue is full or the session is gone;
    /// the message is counted as dropped either way.
    pub fn send(&self, message: Arc<str>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Record peer activity, resetting the idle clock.
    pub fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    /// How long the peer has been silent.
    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    /// How long this connection has existed.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Messages lost to a full or closed queue.
    pub fn drop_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
