//! Video Frame Library for Engagement Analysis
//!
//! Frames arrive from an external source (capture device or decoded
//! recording). This crate provides:
//! - 8-bit BGR raster frames with arrival timestamps
//! - Frame validation and grayscale conversion
//! - Frame-skip sampling (process every Nth frame)
//! - Still-image decoding for recorded frame sequences

pub mod frame;
pub mod sampler;
pub mod source;

pub use frame::{VideoFrame, CHANNELS};
pub use sampler::FrameSampler;
pub use source::{decode_still, ImageSequence};

use thiserror::Error;

/// Frame error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Frame is empty")]
    Empty,

    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("No frames found in {0}")]
    NoFrames(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
