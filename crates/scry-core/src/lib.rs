//! # scry-core
//!
//! Shared domain types for the Scry capture bridge:
//!
//! - [`ControlMessage`] — the inbound trigger vocabulary
//! - [`CaptureMode`] — full-frame vs. center-cropped capture
//! - [`LatestResult`] — the single shared "most recent description" slot
//! - [`Rect`] — rectangle geometry for capture regions

#![deny(unsafe_code)]

pub mod geometry;
pub mod latest;
pub mod trigger;

pub use geometry::Rect;
pub use latest::LatestResult;
pub use trigger::{CaptureMode, ControlMessage};

/// Placeholder shown to viewers before the first capture cycle completes.
pub const WAITING_SENTINEL: &str = "(waiting...)";

/// Text broadcast to all viewers when a capture cycle fails for any reason.
pub const ERROR_SENTINEL: &str = "(error)";
