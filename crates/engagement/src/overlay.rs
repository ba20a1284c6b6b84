//! Heads-up display on annotated frames

use cue_detector::overlay::{draw_detections, DISTRACTED_COLOR, ENGAGED_COLOR, HEAD_DOWN_COLOR};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use video_frame::VideoFrame;

use crate::result::{EngagementLevel, FrameResult};

/// Height of the HUD bar at the bottom of the frame
pub const HUD_HEIGHT: u32 = 50;

/// Fraction of the underlying pixel kept under the HUD bar
const HUD_SHADE: f32 = 0.3;
const HUD_MARGIN: u32 = 10;
const SCORE_BAR_HEIGHT: u32 = 12;
const TRACK_COLOR: Rgb<u8> = Rgb([60, 64, 72]);
const NO_FACE_COLOR: Rgb<u8> = Rgb([107, 114, 128]);

pub fn level_color(level: EngagementLevel) -> Rgb<u8> {
    match level {
        EngagementLevel::High => ENGAGED_COLOR,
        EngagementLevel::Medium => DISTRACTED_COLOR,
        EngagementLevel::Low => HEAD_DOWN_COLOR,
        EngagementLevel::NoFace => NO_FACE_COLOR,
    }
}

/// Marker color for the most severe alert of a frame
pub fn alert_color(result: &FrameResult) -> Option<Rgb<u8>> {
    result.highest_severity_alert().map(|alert| {
        if alert.is_critical() {
            HEAD_DOWN_COLOR
        } else {
            DISTRACTED_COLOR
        }
    })
}

/// Darken the bottom band, draw a score bar colored by level and an alert
/// marker at the right edge
pub fn draw_hud(canvas: &mut RgbImage, result: &FrameResult) {
    let (width, height) = canvas.dimensions();
    let hud_height = HUD_HEIGHT.min(height);
    let top = height - hud_height;

    for y in top..height {
        for x in 0..width {
            let px = canvas.get_pixel_mut(x, y);
            for c in px.0.iter_mut() {
                *c = (*c as f32 * HUD_SHADE) as u8;
            }
        }
    }

    if width <= HUD_MARGIN * 3 + SCORE_BAR_HEIGHT || hud_height < SCORE_BAR_HEIGHT {
        return;
    }

    let track_width = width - HUD_MARGIN * 3 - SCORE_BAR_HEIGHT;
    let bar_y = top + (hud_height - SCORE_BAR_HEIGHT) / 2;
    let track = Rect::at(HUD_MARGIN as i32, bar_y as i32).of_size(track_width, SCORE_BAR_HEIGHT);
    draw_hollow_rect_mut(canvas, track, TRACK_COLOR);

    let score = result.engagement_score.clamp(0.0, 100.0);
    let filled = (track_width as f64 * score / 100.0) as u32;
    if filled > 0 {
        let bar = Rect::at(HUD_MARGIN as i32, bar_y as i32).of_size(filled, SCORE_BAR_HEIGHT);
        draw_filled_rect_mut(canvas, bar, level_color(result.level()));
    }

    if let Some(color) = alert_color(result) {
        let marker_x = width - HUD_MARGIN - SCORE_BAR_HEIGHT;
        let marker = Rect::at(marker_x as i32, bar_y as i32)
            .of_size(SCORE_BAR_HEIGHT, SCORE_BAR_HEIGHT);
        draw_filled_rect_mut(canvas, marker, color);
    }
}

/// Display copy of `frame` with detection boxes and the HUD
pub fn annotate(frame: &VideoFrame, result: &FrameResult) -> RgbImage {
    let mut canvas = frame.to_rgb_image();
    draw_detections(&mut canvas, &result.detection);
    draw_hud(&mut canvas, result);
    canvas
}
