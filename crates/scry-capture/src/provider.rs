//! Display capture capability.

use image::DynamicImage;
use xcap::Monitor;

/// Errors from the capture side of a cycle.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Monitor enumeration failed.
    #[error("failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    /// No monitor is available to capture.
    #[error("no monitor found")]
    NoMonitor,

    /// The capture call itself failed.
    #[error("screen capture failed: {0}")]
    CaptureFailed(String),

    /// A crop rectangle exceeds the frame bounds.
    #[error(
        "crop rectangle ({},{},{},{}) exceeds frame bounds ({}x{})",
        requested.0, requested.1, requested.2, requested.3,
        frame_size.0, frame_size.1
    )]
    OutOfBounds {
        /// Requested rectangle as (x, y, width, height).
        requested: (u32, u32, u32, u32),
        /// Frame size as (width, height).
        frame_size: (u32, u32),
    },

    /// JPEG encoding failed.
    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// Capability that produces a still image of the current display output.
///
/// The call is blocking (it talks to the OS compositor); callers on an async
/// runtime should offload it to a blocking thread.
pub trait CaptureProvider: Send + Sync {
    /// Capture the current display output.
    fn capture_frame(&self) -> Result<DynamicImage, CaptureError>;
}

/// [`CaptureProvider`] backed by the primary monitor via `xcap`.
pub struct MonitorCapture;

impl CaptureProvider for MonitorCapture {
    fn capture_frame(&self) -> Result<DynamicImage, CaptureError> {
        let monitors =
            Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

        let primary = monitors
            .into_iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| {
                // Fallback: if no monitor reports as primary, use the first one
                let all = Monitor::all().ok()?;
                all.into_iter().next()
            })
            .ok_or(CaptureError::NoMonitor)?;

        let frame = primary
            .capture_image()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        Ok(DynamicImage::ImageRgba8(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_display() {
        let err = CaptureError::OutOfBounds {
            requested: (80, 80, 30, 30),
            frame_size: (100, 100),
        };
        assert_eq!(
            err.to_string(),
            "crop rectangle (80,80,30,30) exceeds frame bounds (100x100)"
        );
    }

    #[test]
    fn capture_failed_display() {
        let err = CaptureError::CaptureFailed("denied".into());
        assert!(err.to_string().contains("denied"));
    }
}
