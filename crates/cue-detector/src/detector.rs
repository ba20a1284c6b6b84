//! Face and eye cue detection

use image::GrayImage;
use tracing::{debug, info};
use video_frame::VideoFrame;

use crate::classifier::{Classifier, ScanParams};
use crate::config::DetectorConfig;
use crate::detection::{Detection, FaceCue};
use crate::onnx::OnnxClassifier;
use crate::{BoundingBox, DetectorError};

/// Face detector with a nested eye scan per face region
pub struct CueDetector {
    face_classifier: Box<dyn Classifier>,
    eye_classifier: Box<dyn Classifier>,
    face_scan: ScanParams,
    eye_scan: ScanParams,
}

impl CueDetector {
    /// Load both classifiers from configuration.
    ///
    /// Fails with [`DetectorError::Unavailable`] when a model path is missing
    /// and [`DetectorError::ModelLoad`] when a model cannot be loaded.
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectorError> {
        let face = OnnxClassifier::load("face", &config.face_model)?;
        let eye = OnnxClassifier::load("eye", &config.eye_model)?;
        let detector = Self::with_classifiers(Box::new(face), Box::new(eye), config);
        let (face_name, eye_name) = detector.classifier_names();
        info!(face = face_name, eye = eye_name, "Cue detector ready");
        Ok(detector)
    }

    /// Build a detector around caller-supplied classifiers
    pub fn with_classifiers(
        face_classifier: Box<dyn Classifier>,
        eye_classifier: Box<dyn Classifier>,
        config: &DetectorConfig,
    ) -> Self {
        Self {
            face_classifier,
            eye_classifier,
            face_scan: config.face_scan,
            eye_scan: config.eye_scan,
        }
    }

    /// Names of the face and eye classifiers
    pub fn classifier_names(&self) -> (&str, &str) {
        (self.face_classifier.name(), self.eye_classifier.name())
    }

    /// Detect faces, then eyes inside each face
    pub fn detect(&self, frame: &VideoFrame) -> Result<Detection, DetectorError> {
        frame.validate()?;
        let gray = frame.to_grayscale();
        let (width, height) = gray.dimensions();

        let face_boxes = self.face_classifier.detect(&gray, &self.face_scan)?;

        let mut faces = Vec::with_capacity(face_boxes.len());
        for face in face_boxes {
            // Faces cut off at the frame edge must still meet the scan minimum
            let face = face.clamp_to(width, height);
            if face.is_empty() || !face.meets_min_size(self.face_scan.min_size) {
                continue;
            }
            let eyes = self.detect_eyes(&gray, &face)?;
            faces.push(FaceCue { bbox: face, eyes });
        }

        let detection = Detection { faces };
        debug!(
            "Frame {}: {} faces, {} eyes",
            frame.sequence,
            detection.faces_detected(),
            detection.eyes_detected()
        );
        Ok(detection)
    }

    /// Eye scan restricted to the face region; returns frame coordinates
    fn detect_eyes(
        &self,
        gray: &GrayImage,
        face: &BoundingBox,
    ) -> Result<Vec<BoundingBox>, DetectorError> {
        let roi =
            image::imageops::crop_imm(gray, face.x, face.y, face.width, face.height).to_image();
        let region = BoundingBox::new(0, 0, face.width, face.height);

        let eyes = self
            .eye_classifier
            .detect(&roi, &self.eye_scan)?
            .into_iter()
            .filter(|eye| region.contains(eye) && eye.meets_min_size(self.eye_scan.min_size))
            .map(|eye| eye.offset(face.x, face.y))
            .collect();
        Ok(eyes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Returns fixed face boxes regardless of input
    struct FixedFaces(Vec<BoundingBox>);

    impl Classifier for FixedFaces {
        fn detect(
            &self,
            _gray: &GrayImage,
            _params: &ScanParams,
        ) -> Result<Vec<BoundingBox>, DetectorError> {
            Ok(self.0.clone())
        }
    }

    /// Returns eye boxes keyed by the size of the region it is shown
    struct EyesByRegion(HashMap<(u32, u32), Vec<BoundingBox>>);

    impl Classifier for EyesByRegion {
        fn detect(
            &self,
            gray: &GrayImage,
            _params: &ScanParams,
        ) -> Result<Vec<BoundingBox>, DetectorError> {
            Ok(self.0.get(&gray.dimensions()).cloned().unwrap_or_default())
        }
    }

    fn frame() -> VideoFrame {
        VideoFrame::filled(320, 240, [90, 90, 90], 0, 1)
    }

    fn detector(faces: Vec<BoundingBox>, eyes: Vec<((u32, u32), Vec<BoundingBox>)>) -> CueDetector {
        CueDetector::with_classifiers(
            Box::new(FixedFaces(faces)),
            Box::new(EyesByRegion(eyes.into_iter().collect())),
            &DetectorConfig::default(),
        )
    }

    struct Named(&'static str);

    impl Classifier for Named {
        fn detect(
            &self,
            _gray: &GrayImage,
            _params: &ScanParams,
        ) -> Result<Vec<BoundingBox>, DetectorError> {
            Ok(vec![])
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_classifier_names() {
        let config = DetectorConfig::default();
        let named =
            CueDetector::with_classifiers(Box::new(Named("face")), Box::new(Named("eye")), &config);
        assert_eq!(named.classifier_names(), ("face", "eye"));

        let unnamed = detector(vec![], vec![]);
        assert_eq!(unnamed.classifier_names(), ("classifier", "classifier"));
    }

    #[test]
    fn test_missing_models_unavailable() {
        let result = CueDetector::new(&DetectorConfig::default());
        assert!(matches!(result, Err(DetectorError::Unavailable(_))));
    }

    #[test]
    fn test_no_faces_is_valid() {
        let detection = detector(vec![], vec![]).detect(&frame()).unwrap();
        assert!(detection.is_empty());
        assert_eq!(detection.counts().faces, 0);
    }

    #[test]
    fn test_eyes_reported_in_frame_coordinates() {
        let det = detector(
            vec![BoundingBox::new(100, 50, 60, 60)],
            vec![(
                (60, 60),
                vec![BoundingBox::new(10, 15, 15, 15), BoundingBox::new(35, 15, 15, 15)],
            )],
        );
        let detection = det.detect(&frame()).unwrap();
        assert_eq!(detection.faces.len(), 1);
        assert_eq!(detection.faces[0].eyes[0], BoundingBox::new(110, 65, 15, 15));
        assert_eq!(detection.counts().head_down, 0);
        assert_eq!(detection.counts().distracted, 0);
    }

    #[test]
    fn test_per_face_labels_tally() {
        let det = detector(
            vec![
                BoundingBox::new(0, 0, 50, 50),
                BoundingBox::new(100, 0, 60, 60),
                BoundingBox::new(200, 0, 70, 70),
            ],
            vec![
                ((60, 60), vec![BoundingBox::new(5, 5, 15, 15)]),
                (
                    (70, 70),
                    vec![BoundingBox::new(5, 5, 15, 15), BoundingBox::new(40, 5, 15, 15)],
                ),
            ],
        );
        let counts = det.detect(&frame()).unwrap().counts();
        assert_eq!(counts.faces, 3);
        assert_eq!(counts.eyes, 3);
        assert_eq!(counts.head_down, 1);
        assert_eq!(counts.distracted, 1);
        assert_eq!(counts.engaged(), 1);
    }

    #[test]
    fn test_eyes_outside_face_or_too_small_dropped() {
        let det = detector(
            vec![BoundingBox::new(10, 10, 50, 50)],
            vec![(
                (50, 50),
                vec![
                    BoundingBox::new(40, 40, 15, 15), // spills past the face
                    BoundingBox::new(5, 5, 10, 10),   // below 15px
                ],
            )],
        );
        let detection = det.detect(&frame()).unwrap();
        assert!(detection.faces[0].eyes.is_empty());
    }

    #[test]
    fn test_face_clipped_to_frame() {
        let det = detector(vec![BoundingBox::new(260, 180, 80, 80)], vec![]);
        let detection = det.detect(&frame()).unwrap();
        assert_eq!(detection.faces[0].bbox, BoundingBox::new(260, 180, 60, 60));
    }

    #[test]
    fn test_face_clipped_below_min_size_dropped() {
        // An 80x80 face at the right edge leaves a 10px-wide sliver
        let det = detector(
            vec![BoundingBox::new(310, 100, 80, 80), BoundingBox::new(300, 200, 80, 80)],
            vec![],
        );
        let detection = det.detect(&frame()).unwrap();
        assert!(detection.is_empty());
        assert_eq!(detection.counts().head_down, 0);
    }

    #[test]
    fn test_invalid_frame_rejected() {
        let bad = VideoFrame::new(vec![0; 5], 10, 10, 0, 0);
        let result = detector(vec![], vec![]).detect(&bad);
        assert!(matches!(result, Err(DetectorError::InvalidFrame(_))));
    }
}
