//! Fixed-Capacity Ring Buffer
//!
//! Bounded FIFO history for per-frame signals. Pushing into a full buffer
//! evicts the oldest entry in O(1); iteration is always oldest to newest.

mod buffer;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};
