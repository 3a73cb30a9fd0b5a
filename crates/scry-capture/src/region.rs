//! Pure crop geometry — pixel data in, pixel data out.

use image::DynamicImage;
use scry_core::geometry::{self, Rect};

use crate::provider::CaptureError;

/// Crop a frame to the given rectangle.
///
/// Fails if the rectangle does not fit entirely within the frame.
pub fn crop_to_rect(frame: &DynamicImage, rect: Rect) -> Result<DynamicImage, CaptureError> {
    let (w, h) = (frame.width(), frame.height());
    if !rect.fits_within(w, h) {
        return Err(CaptureError::OutOfBounds {
            requested: (rect.x, rect.y, rect.width, rect.height),
            frame_size: (w, h),
        });
    }
    Ok(frame.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

/// Crop a frame to the centered square used for region-mode captures.
///
/// The square's side is 40% of the shorter frame dimension, so it always
/// fits; the crop cannot fail.
pub fn center_crop(frame: &DynamicImage) -> DynamicImage {
    let rect = geometry::centered_square(frame.width(), frame.height());
    frame.crop_imm(rect.x, rect.y, rect.width, rect.height)
}
