//! Annotation overlays (display only, never feeds scoring)

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::detection::{Detection, FaceLabel};
use crate::BoundingBox;

pub const ENGAGED_COLOR: Rgb<u8> = Rgb([0, 255, 136]);
pub const DISTRACTED_COLOR: Rgb<u8> = Rgb([255, 204, 0]);
pub const HEAD_DOWN_COLOR: Rgb<u8> = Rgb([255, 51, 85]);
pub const EYE_COLOR: Rgb<u8> = Rgb([0, 204, 255]);

/// Height of the label strip drawn above each face
const TAG_HEIGHT: u32 = 6;

pub fn label_color(label: FaceLabel) -> Rgb<u8> {
    match label {
        FaceLabel::Engaged => ENGAGED_COLOR,
        FaceLabel::Distracted => DISTRACTED_COLOR,
        FaceLabel::HeadDown => HEAD_DOWN_COLOR,
    }
}

fn rect(bbox: &BoundingBox) -> Option<Rect> {
    (!bbox.is_empty())
        .then(|| Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height))
}

/// Draw face boxes (2px, colored by label), label strips and eye boxes
pub fn draw_detections(canvas: &mut RgbImage, detection: &Detection) {
    for face in &detection.faces {
        let color = label_color(face.label());

        if let Some(r) = rect(&face.bbox) {
            draw_hollow_rect_mut(canvas, r, color);
        }
        if face.bbox.width > 2 && face.bbox.height > 2 {
            let inner = BoundingBox::new(
                face.bbox.x + 1,
                face.bbox.y + 1,
                face.bbox.width - 2,
                face.bbox.height - 2,
            );
            if let Some(r) = rect(&inner) {
                draw_hollow_rect_mut(canvas, r, color);
            }
        }

        // Label strip above the face, or along its top edge near the frame border
        let tag_y = face.bbox.y.checked_sub(TAG_HEIGHT + 2).unwrap_or(face.bbox.y);
        if let Some(r) = rect(&BoundingBox::new(face.bbox.x, tag_y, face.bbox.width, TAG_HEIGHT)) {
            draw_filled_rect_mut(canvas, r, color);
        }

        for eye in &face.eyes {
            if let Some(r) = rect(eye) {
                draw_hollow_rect_mut(canvas, r, EYE_COLOR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::FaceCue;

    #[test]
    fn test_face_box_colored_by_label() {
        let mut canvas = RgbImage::new(200, 200);
        let detection = Detection {
            faces: vec![
                FaceCue {
                    bbox: BoundingBox::new(20, 40, 50, 50),
                    eyes: vec![],
                },
                FaceCue {
                    bbox: BoundingBox::new(100, 40, 50, 50),
                    eyes: vec![
                        BoundingBox::new(110, 55, 15, 15),
                        BoundingBox::new(130, 55, 15, 15),
                    ],
                },
            ],
        };
        draw_detections(&mut canvas, &detection);

        assert_eq!(canvas.get_pixel(20, 40), &HEAD_DOWN_COLOR);
        assert_eq!(canvas.get_pixel(100, 60), &ENGAGED_COLOR);
        assert_eq!(canvas.get_pixel(110, 55), &EYE_COLOR);
        // Label strip above the head-down face
        assert_eq!(canvas.get_pixel(30, 33), &HEAD_DOWN_COLOR);
        // Interior untouched
        assert_eq!(canvas.get_pixel(45, 65), &Rgb([0, 0, 0]));
    }
}
