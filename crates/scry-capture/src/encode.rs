//! RGB normalization and JPEG encoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::provider::CaptureError;

/// Normalize a frame to 3-channel RGB and encode it as JPEG.
pub fn encode_jpeg(frame: &DynamicImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    // Captures arrive as RGBA; JPEG has no alpha channel.
    let rgb = frame.to_rgb8();

    let mut bytes: Vec<u8> = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    Ok(bytes)
}
