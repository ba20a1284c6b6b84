//! Per-frame detection results

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// Heuristic per-face label derived from visible eyes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceLabel {
    /// No eyes visible
    HeadDown,
    /// Exactly one eye visible
    Distracted,
    /// Two or more eyes visible
    Engaged,
}

impl FaceLabel {
    pub fn from_eye_count(eyes: usize) -> Self {
        match eyes {
            0 => FaceLabel::HeadDown,
            1 => FaceLabel::Distracted,
            _ => FaceLabel::Engaged,
        }
    }

    /// Overlay text
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceLabel::HeadDown => "HEAD DOWN",
            FaceLabel::Distracted => "DISTRACTED",
            FaceLabel::Engaged => "ENGAGED",
        }
    }
}

/// A detected face and the eyes found inside it (frame coordinates)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceCue {
    pub bbox: BoundingBox,
    pub eyes: Vec<BoundingBox>,
}

impl FaceCue {
    pub fn label(&self) -> FaceLabel {
        FaceLabel::from_eye_count(self.eyes.len())
    }
}

/// All cues found in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub faces: Vec<FaceCue>,
}

impl Detection {
    pub fn faces_detected(&self) -> usize {
        self.faces.len()
    }

    pub fn eyes_detected(&self) -> usize {
        self.faces.iter().map(|f| f.eyes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Tally of face labels
    pub fn counts(&self) -> CueCounts {
        CueCounts::from_eye_counts(self.faces.iter().map(|f| f.eyes.len()))
    }
}

/// Aggregate counts that drive scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CueCounts {
    pub faces: usize,
    pub eyes: usize,
    /// Faces with zero eyes
    pub head_down: usize,
    /// Faces with exactly one eye
    pub distracted: usize,
}

impl CueCounts {
    /// Tally counts from the number of eyes found in each face
    pub fn from_eye_counts<I: IntoIterator<Item = usize>>(per_face: I) -> Self {
        per_face.into_iter().fold(Self::default(), |mut acc, eyes| {
            acc.faces += 1;
            acc.eyes += eyes;
            match FaceLabel::from_eye_count(eyes) {
                FaceLabel::HeadDown => acc.head_down += 1,
                FaceLabel::Distracted => acc.distracted += 1,
                FaceLabel::Engaged => {}
            }
            acc
        })
    }

    /// Faces with two or more eyes
    pub fn engaged(&self) -> usize {
        self.faces - self.head_down - self.distracted
    }
}
