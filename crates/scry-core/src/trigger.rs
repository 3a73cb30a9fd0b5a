//! Inbound control message vocabulary.

/// How much of the display a capture cycle should cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    /// The whole display output (or the configured bounding box).
    FullFrame,
    /// A centered square whose side is 40% of the shorter frame dimension.
    CenterCrop,
}

impl CaptureMode {
    /// Filename prefix used when persisting a snapshot of this mode.
    pub fn snapshot_prefix(self) -> &'static str {
        match self {
            Self::FullFrame => "capture",
            Self::CenterCrop => "region",
        }
    }
}

/// A recognized control token from a client.
///
/// The wire format is plain text: case-insensitive, whitespace-trimmed.
/// Anything outside this vocabulary is ignored by the dispatcher — it is a
/// no-op, not a protocol error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    /// Trigger a full-frame capture-and-analyze cycle.
    Capture,
    /// Trigger a center-cropped capture-and-analyze cycle.
    CaptureRegion,
}

impl ControlMessage {
    /// Parse a raw inbound text frame into a control message.
    ///
    /// Returns `None` for anything outside the recognized vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.eq_ignore_ascii_case("capture") {
            Some(Self::Capture)
        } else if token.eq_ignore_ascii_case("capture_region") {
            Some(Self::CaptureRegion)
        } else {
            None
        }
    }

    /// The capture mode this message requests.
    pub fn mode(self) -> CaptureMode {
        match self {
            Self::Capture => CaptureMode::FullFrame,
            Self::CaptureRegion => CaptureMode::CenterCrop,
        }
    }
}
