//! Video frame types and processing

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::FrameError;

/// Bytes per pixel (BGR)
pub const CHANNELS: usize = 3;

/// Raw 8-bit BGR video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Pixel data (width * height * channels)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Arrival timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new BGR frame from raw data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Build a BGR frame from a decoded RGB image
    pub fn from_rgb_image(img: &RgbImage, timestamp_ns: u64, sequence: u32) -> Self {
        let mut data = Vec::with_capacity(img.width() as usize * img.height() as usize * CHANNELS);
        for pixel in img.pixels() {
            data.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
        }
        Self::new(data, img.width(), img.height(), timestamp_ns, sequence)
    }

    /// Solid-color BGR frame
    pub fn filled(width: u32, height: u32, bgr: [u8; 3], timestamp_ns: u64, sequence: u32) -> Self {
        let data = bgr
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();
        Self::new(data, width, height, timestamp_ns, sequence)
    }

    /// Number of bytes the buffer must hold for its dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }

    /// Check that the frame is a usable non-empty raster
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 || self.data.is_empty() {
            return Err(FrameError::Empty);
        }
        let expected = self.expected_len();
        if self.data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Get pixel at (x, y) as RGB
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = self.data.get(idx..idx + CHANNELS)?;
        Some([px[2], px[1], px[0]])
    }

    /// Convert to grayscale
    pub fn to_grayscale(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.get_pixel(x, y).unwrap_or([0, 0, 0]);
            // Luminance formula: 0.299*R + 0.587*G + 0.114*B
            let luma = r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114;
            Luma([luma.round() as u8])
        })
    }

    /// Convert to an RGB image (for display and annotation)
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb(self.get_pixel(x, y).unwrap_or([0, 0, 0]))
        })
    }

}
