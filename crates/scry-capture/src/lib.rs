//! # scry-capture
//!
//! The capture side of the bridge: a [`CaptureProvider`] capability that
//! yields a still image of the current display output, plus the pure
//! processing steps applied to it — bounding-box restriction, center
//! cropping, RGB normalization, JPEG encoding, and timestamped snapshot
//! persistence.

#![deny(unsafe_code)]

pub mod encode;
pub mod provider;
pub mod region;
pub mod snapshot;

pub use encode::encode_jpeg;
pub use provider::{CaptureError, CaptureProvider, MonitorCapture};
pub use region::{center_crop, crop_to_rect};
pub use snapshot::persist_snapshot;
