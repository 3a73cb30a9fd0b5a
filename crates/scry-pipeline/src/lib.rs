//! # scry-pipeline
//!
//! The capture-and-analyze cycle: grab a frame, optionally crop it, encode
//! it, persist a snapshot copy, submit it for analysis, and publish the
//! resulting text into the shared [`LatestResult`] slot.
//!
//! The pipeline never returns an error to its caller. Every failure —
//! capture, encode, network, bad response — is absorbed here, logged, and
//! surfaced to viewers as the literal [`ERROR_SENTINEL`] text.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use scry_capture::provider::{CaptureError, CaptureProvider};
use scry_capture::{center_crop, crop_to_rect, encode_jpeg, persist_snapshot};
use scry_core::{CaptureMode, LatestResult, Rect, ERROR_SENTINEL};
use scry_vision::{AnalysisClient, AnalysisError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Pipeline configuration, resolved once at startup.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Optional rectangle restricting every capture.
    pub bounding_box: Option<Rect>,
    /// Directory for timestamped snapshot copies.
    pub output_dir: PathBuf,
    /// JPEG quality (1–100).
    pub jpeg_quality: u8,
    /// Instructional prompt sent with every frame.
    pub prompt: String,
}

/// One end-to-end capture cycle's internal failure modes.
#[derive(Debug, thiserror::Error)]
enum CycleError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("capture task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The capture-and-analyze pipeline.
///
/// Cycles are serialized through an internal lock: at most one capture is
/// in flight at any time, while the callers' dispatch loops stay free to
/// service other traffic.
pub struct CapturePipeline {
    provider: Arc<dyn CaptureProvider>,
    analysis: Arc<dyn AnalysisClient>,
    config: PipelineConfig,
    latest: Arc<LatestResult>,
    run_lock: Mutex<()>,
}

impl CapturePipeline {
    /// Create a pipeline over the given capabilities.
    pub fn new(
        provider: Arc<dyn CaptureProvider>,
        analysis: Arc<dyn AnalysisClient>,
        config: PipelineConfig,
        latest: Arc<LatestResult>,
    ) -> Self {
        Self {
            provider,
            analysis,
            config,
            latest,
            run_lock: Mutex::new(()),
        }
    }

    /// The shared latest-result slot this pipeline writes.
    pub fn latest(&self) -> &Arc<LatestResult> {
        &self.latest
    }

    /// Run one capture-and-analyze cycle and return the text to broadcast.
    ///
    /// Always returns a value: the description on success, the error
    /// sentinel on any failure. The latest-result slot is overwritten with
    /// the returned text either way.
    pub async fn run(&self, mode: CaptureMode) -> String {
        let _guard = self.run_lock.lock().await;

        let text = match self.run_cycle(mode).await {
            Ok(text) => {
                info!(?mode, result = %text, "capture cycle complete");
                text
            }
            Err(e) => {
                warn!(?mode, error = %e, "capture cycle failed");
                ERROR_SENTINEL.to_string()
            }
        };

        self.latest.set(&text);
        text
    }

    async fn run_cycle(&self, mode: CaptureMode) -> Result<String, CycleError> {
        // The capture call blocks on the OS compositor.
        let provider = self.provider.clone();
        let frame = tokio::task::spawn_blocking(move || provider.capture_frame()).await??;

        let frame = match self.config.bounding_box {
            Some(rect) => crop_to_rect(&frame, rect)?,
            None => frame,
        };
        let frame = match mode {
            CaptureMode::FullFrame => frame,
            CaptureMode::CenterCrop => center_crop(&frame),
        };

        let jpeg = encode_jpeg(&frame, self.config.jpeg_quality)?;
        debug!(bytes = jpeg.len(), width = frame.width(), height = frame.height(), "frame encoded");

        // Snapshot persistence is a side effect; failure never aborts the cycle.
        match persist_snapshot(&self.config.output_dir, mode, &jpeg) {
            Ok(path) => debug!(path = %path.display(), "snapshot written"),
            Err(e) => warn!(error = %e, "failed to persist snapshot"),
        }

        let text = self.analysis.describe(&jpeg, &self.config.prompt).await?;
        Ok(text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
