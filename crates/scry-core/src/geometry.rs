//! Rectangle geometry for capture regions.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Whether this rectangle fits entirely within a frame of the given size.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.saturating_add(self.width) <= frame_width
            && self.y.saturating_add(self.height) <= frame_height
    }
}

/// The centered square used for region-mode captures.
///
/// The side length is 40% of the shorter frame dimension, so the square is
/// always in bounds and centered on the frame midpoint.
pub fn centered_square(frame_width: u32, frame_height: u32) -> Rect {
    let side = frame_width.min(frame_height) * 2 / 5;
    Rect {
        x: (frame_width - side) / 2,
        y: (frame_height - side) / 2,
        width: side,
        height: side,
    }
}
