//! Axis-aligned bounding boxes

use serde::{Deserialize, Serialize};

/// Bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the box is at least `min_size` pixels in both dimensions
    pub fn meets_min_size(&self, min_size: u32) -> bool {
        self.width >= min_size && self.height >= min_size
    }

    /// Translate by (dx, dy)
    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Clip to an image of the given size
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self::new(x, y, self.width.min(width - x), self.height.min(height - y))
    }

    /// Cascade-style similarity: all edges within `eps` of the mean smaller side
    pub fn is_similar(&self, other: &BoundingBox, eps: f64) -> bool {
        let delta = eps
            * (self.width.min(other.width) as f64 + self.height.min(other.height) as f64)
            * 0.5;
        let near = |a: u32, b: u32| (a as f64 - b as f64).abs() <= delta;
        near(self.x, other.x)
            && near(self.y, other.y)
            && near(self.right(), other.right())
            && near(self.bottom(), other.bottom())
    }
}
