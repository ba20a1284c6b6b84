//! Classifier seam and candidate grouping

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::{BoundingBox, DetectorError};

/// Similarity tolerance used when grouping candidate rectangles
pub const GROUP_EPS: f64 = 0.2;

/// Multi-scale scan parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// Pyramid step between scan scales
    pub scale_factor: f64,
    /// Overlapping candidates required to accept a detection (0 disables grouping)
    pub min_neighbors: u32,
    /// Minimum box side in pixels
    pub min_size: u32,
}

impl ScanParams {
    /// Face scan over the full frame
    pub const FACE: ScanParams = ScanParams {
        scale_factor: 1.1,
        min_neighbors: 5,
        min_size: 40,
    };

    /// Eye scan inside a face region
    pub const EYE: ScanParams = ScanParams {
        scale_factor: 1.1,
        min_neighbors: 5,
        min_size: 15,
    };
}

/// Object classifier over a grayscale image.
///
/// Implementations return boxes in the coordinate space of `gray`, already
/// filtered by `params.min_size` and grouped according to
/// `params.min_neighbors`.
pub trait Classifier: Send + Sync {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &ScanParams,
    ) -> Result<Vec<BoundingBox>, DetectorError>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Group overlapping candidate rectangles the way cascade detectors do.
///
/// Candidates are clustered by [`BoundingBox::is_similar`]; clusters with
/// `min_neighbors` or fewer members are rejected and each surviving cluster
/// is replaced by its average rectangle. Small clusters nested inside a
/// stronger cluster are dropped. `min_neighbors == 0` returns the input as is.
pub fn group_rectangles(
    candidates: &[BoundingBox],
    min_neighbors: u32,
    eps: f64,
) -> Vec<BoundingBox> {
    if min_neighbors == 0 || candidates.is_empty() {
        return candidates.to_vec();
    }

    // Union-find over the similarity relation
    let mut parent: Vec<usize> = (0..candidates.len()).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            if candidates[i].is_similar(&candidates[j], eps) {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[b] = a;
                }
            }
        }
    }

    // Accumulate per-cluster sums, keeping first-seen cluster order
    let mut roots: Vec<usize> = Vec::new();
    let mut sums: Vec<[f64; 4]> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    for (i, rect) in candidates.iter().enumerate() {
        let root = find(&mut parent, i);
        let slot = match roots.iter().position(|&r| r == root) {
            Some(slot) => slot,
            None => {
                roots.push(root);
                sums.push([0.0; 4]);
                counts.push(0);
                roots.len() - 1
            }
        };
        sums[slot][0] += rect.x as f64;
        sums[slot][1] += rect.y as f64;
        sums[slot][2] += rect.width as f64;
        sums[slot][3] += rect.height as f64;
        counts[slot] += 1;
    }

    let clusters: Vec<(BoundingBox, u32)> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| {
            let n_f = n as f64;
            let rect = BoundingBox::new(
                (s[0] / n_f).round() as u32,
                (s[1] / n_f).round() as u32,
                (s[2] / n_f).round() as u32,
                (s[3] / n_f).round() as u32,
            );
            (rect, n)
        })
        .collect();

    clusters
        .iter()
        .enumerate()
        .filter(|(_, (_, n))| *n > min_neighbors)
        .filter(|(i, (r1, n1))| {
            !clusters.iter().enumerate().any(|(j, (r2, n2))| {
                if j == *i || *n2 <= min_neighbors || r1 == r2 {
                    return false;
                }
                let dx = (r2.width as f64 * eps).round();
                let dy = (r2.height as f64 * eps).round();
                let inside = r1.x as f64 >= r2.x as f64 - dx
                    && r1.y as f64 >= r2.y as f64 - dy
                    && r1.right() as f64 <= r2.right() as f64 + dx
                    && r1.bottom() as f64 <= r2.bottom() as f64 + dy;
                inside && (*n2 > (*n1).max(3) || *n1 < 3)
            })
        })
        .map(|(_, (rect, _))| *rect)
        .collect()
}
