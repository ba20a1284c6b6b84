//! Still-image frame sources
//!
//! A recorded session can be supplied as a directory of still frames (for
//! example the output of `ffmpeg -i exam.mp4 frames/%06d.png`). Files are read
//! in lexical order.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{FrameError, VideoFrame};

/// File extensions recognised as still frames
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Decode one still image into a BGR frame
pub fn decode_still(
    path: &Path,
    timestamp_ns: u64,
    sequence: u32,
) -> Result<VideoFrame, FrameError> {
    let img = image::open(path)
        .map_err(|e| FrameError::Decode(format!("{}: {}", path.display(), e)))?;
    debug!("Decoded frame {} from {}", sequence, path.display());
    Ok(VideoFrame::from_rgb_image(&img.to_rgb8(), timestamp_ns, sequence))
}

/// Ordered list of still frames making up a recording
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    fps: f64,
}

impl ImageSequence {
    /// Collect the frame files in `dir`. Non-positive `fps` falls back to 25.
    pub fn open(dir: &Path, fps: f64) -> Result<Self, FrameError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_frame {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(FrameError::NoFrames(dir.display().to_string()));
        }
        paths.sort();

        let fps = if fps > 0.0 { fps } else { 25.0 };
        info!("Opened image sequence: {} frames @ {:.1} fps", paths.len(), fps);
        Ok(Self { paths, fps })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Duration of the recording in seconds
    pub fn duration_s(&self) -> f64 {
        self.paths.len() as f64 / self.fps
    }

    /// Arrival timestamp of the frame at 1-based `index`
    pub fn timestamp_ns(&self, index: u64) -> u64 {
        (index as f64 / self.fps * 1e9) as u64
    }

    /// Decode the frame at 0-based `position`
    pub fn decode(&self, position: usize) -> Result<VideoFrame, FrameError> {
        let path = self
            .paths
            .get(position)
            .ok_or_else(|| FrameError::NoFrames(format!("position {}", position)))?;
        let index = position as u64 + 1;
        decode_still(path, self.timestamp_ns(index), index as u32)
    }
}
