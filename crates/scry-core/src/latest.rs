//! The shared "latest result" slot.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::WAITING_SENTINEL;

/// The single most recent capture-and-analyze outcome, shared by all
/// connections.
///
/// Written by the pipeline after every completed (or failed) cycle; read by
/// the dispatcher when greeting a new connection. Each write overwrites the
/// prior value — no history is retained.
pub struct LatestResult {
    value: RwLock<Arc<str>>,
}

impl LatestResult {
    /// Create a slot holding the initial placeholder.
    pub fn new() -> Self {
        Self {
            value: RwLock::new(Arc::from(WAITING_SENTINEL)),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> Arc<str> {
        self.value.read().clone()
    }

    /// Overwrite the current value.
    pub fn set(&self, text: &str) {
        *self.value.write() = Arc::from(text);
    }
}

impl Default for LatestResult {
    fn default() -> Self {
        Self::new()
    }
}
