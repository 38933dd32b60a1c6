//! Debug overlay rendering
//!
//! Draws the detected content rectangle (red) and the final frame (green)
//! on top of the source image.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::types::{Frame, FrameDetection};

const CONTENT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const FRAME_COLOR: Rgba<u8> = Rgba([0, 200, 0, 255]);

/// Render the detection on top of a copy of `image`
pub fn render_overlay(image: &DynamicImage, detection: &FrameDetection) -> RgbaImage {
    let mut canvas = image.to_rgba8();

    if let Some(rect) = to_rect(&detection.frame) {
        draw_hollow_rect_mut(&mut canvas, rect, FRAME_COLOR);
    }
    if let Some(rect) = to_rect(&detection.content) {
        draw_hollow_rect_mut(&mut canvas, rect, CONTENT_COLOR);
    }

    canvas
}

/// `None` for empty frames, which imageproc cannot represent
fn to_rect(frame: &Frame) -> Option<Rect> {
    if frame.is_empty() {
        return None;
    }
    let x = i32::try_from(frame.min_x).ok()?;
    let y = i32::try_from(frame.min_y).ok()?;
    Some(Rect::at(x, y).of_size(frame.width(), frame.height()))
}
