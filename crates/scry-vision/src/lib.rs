//! # scry-vision
//!
//! The analysis side of the bridge: an [`AnalysisClient`] capability that
//! submits a JPEG frame plus an instructional prompt to a remote
//! OpenAI-compatible vision endpoint and returns the description text.
//!
//! Every request carries an explicit deadline — an unresponsive endpoint
//! yields a timeout error instead of stalling the caller.

#![deny(unsafe_code)]

pub mod client;
pub mod types;

pub use client::{AnalysisClient, AnalysisError, HttpAnalysisClient, VisionConfig};
