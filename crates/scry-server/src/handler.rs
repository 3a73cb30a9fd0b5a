//! Inbound message dispatch.

use scry_core::ControlMessage;
use scry_pipeline::CapturePipeline;
use tracing::{debug, info};

/// What a handled inbound frame produced.
#[derive(Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Text to fan out to every connected client.
    Broadcast(String),
    /// The frame was not a recognized trigger; nothing to send.
    Ignored,
}

/// Dispatch one inbound text frame.
///
/// Recognized trigger tokens run a full capture cycle and yield the
/// resulting text; anything else is logged and ignored.
pub async fn handle_control(raw: &str, pipeline: &CapturePipeline) -> HandleOutcome {
    match ControlMessage::parse(raw) {
        Some(msg) => {
            info!(trigger = ?msg, "capture trigger received");
            HandleOutcome::Broadcast(pipeline.run(msg.mode()).await)
        }
        None => {
            debug!(len = raw.len(), "ignoring unrecognized message");
            HandleOutcome::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use image::{DynamicImage, RgbaImage};
    use scry_capture::provider::{CaptureError, CaptureProvider};
    use scry_core::{LatestResult, ERROR_SENTINEL};
    use scry_pipeline::PipelineConfig;
    use scry_vision::{AnalysisClient, AnalysisError};

    struct StubProvider;

    impl CaptureProvider for StubProvider {
        fn capture_frame(&self) -> Result<DynamicImage, CaptureError> {
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(32, 32)))
        }
    }

    struct StubAnalysis {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl AnalysisClient for StubAnalysis {
        async fn describe(&self, _jpeg: &[u8], _prompt: &str) -> Result<String, AnalysisError> {
            let _ = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AnalysisError::Timeout)
            } else {
                Ok("arm".to_string())
            }
        }
    }

    fn make_pipeline(fail: bool) -> (CapturePipeline, Arc<StubAnalysis>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let analysis = Arc::new(StubAnalysis { calls: AtomicUsize::new(0), fail });
        let pipeline = CapturePipeline::new(
            Arc::new(StubProvider),
            analysis.clone(),
            PipelineConfig {
                bounding_box: None,
                output_dir: tmp.path().to_path_buf(),
                jpeg_quality: 85,
                prompt: "describe".into(),
            },
            Arc::new(LatestResult::new()),
        );
        (pipeline, analysis, tmp)
    }

    #[tokio::test]
    async fn capture_token_runs_pipeline() {
        let (pipeline, analysis, _tmp) = make_pipeline(false);
        let outcome = handle_control("capture", &pipeline).await;
        assert_eq!(outcome, HandleOutcome::Broadcast("arm".into()));
        assert_eq!(analysis.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_matching_is_case_insensitive_and_trimmed() {
        let (pipeline, analysis, _tmp) = make_pipeline(false);
        let outcome = handle_control("  CAPTURE_Region \n", &pipeline).await;
        assert_eq!(outcome, HandleOutcome::Broadcast("arm".into()));
        assert_eq!(analysis.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_message_is_ignored() {
        let (pipeline, analysis, _tmp) = make_pipeline(false);
        let outcome = handle_control("hello there", &pipeline).await;
        assert_eq!(outcome, HandleOutcome::Ignored);
        assert_eq!(analysis.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_message_is_ignored() {
        let (pipeline, _analysis, _tmp) = make_pipeline(false);
        assert_eq!(handle_control("", &pipeline).await, HandleOutcome::Ignored);
    }

    #[tokio::test]
    async fn pipeline_failure_still_broadcasts_sentinel() {
        let (pipeline, _analysis, _tmp) = make_pipeline(true);
        let outcome = handle_control("capture", &pipeline).await;
        assert_eq!(outcome, HandleOutcome::Broadcast(ERROR_SENTINEL.into()));
    }
}
