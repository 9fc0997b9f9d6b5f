//! Annotation overlays

use drawing_common::BBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Segment colour in annotated line images
pub const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
/// Box colour in annotated text images
pub const TEXT_BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Draw segments with the given stroke thickness
pub fn draw_segments<'a, I>(canvas: &mut RgbImage, segments: I, color: Rgb<u8>, thickness: u32)
where
    I: IntoIterator<Item = (&'a (i32, i32), &'a (i32, i32))>,
{
    let half = (thickness.max(1) as i32 - 1) / 2;
    let extra = (thickness.max(1) as i32 - 1) - half;
    for (start, end) in segments {
        let (dx, dy) = ((end.0 - start.0) as f32, (end.1 - start.1) as f32);
        let len = dx.hypot(dy);
        let (nx, ny) = if len > 0.0 { (-dy / len, dx / len) } else { (0.0, 0.0) };
        for k in -half..=extra {
            let off = k as f32;
            draw_line_segment_mut(
                canvas,
                (start.0 as f32 + off * nx, start.1 as f32 + off * ny),
                (end.0 as f32 + off * nx, end.1 as f32 + off * ny),
                color,
            );
        }
    }
}

/// Draw hollow boxes, growing outward for thicker strokes
pub fn draw_boxes<I>(canvas: &mut RgbImage, boxes: I, color: Rgb<u8>, thickness: u32)
where
    I: IntoIterator<Item = BBox>,
{
    for b in boxes {
        for k in 0..thickness.max(1) as i32 {
            let (w, h) = (b.w + 1 + 2 * k, b.h + 1 + 2 * k);
            if w <= 0 || h <= 0 {
                continue;
            }
            let rect = Rect::at(b.x - k, b.y - k).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thick_horizontal_segment() {
        let mut img = RgbImage::new(50, 50);
        let (a, b) = ((5, 25), (45, 25));
        draw_segments(&mut img, [(&a, &b)], LINE_COLOR, 3);
        for y in 24..=26 {
            assert_eq!(*img.get_pixel(20, y), LINE_COLOR, "row {y}");
        }
        assert_eq!(*img.get_pixel(20, 22), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_outline() {
        let mut img = RgbImage::new(40, 40);
        draw_boxes(&mut img, [BBox::new(10, 10, 10, 5)], TEXT_BOX_COLOR, 2);
        assert_eq!(*img.get_pixel(10, 10), TEXT_BOX_COLOR);
        assert_eq!(*img.get_pixel(9, 9), TEXT_BOX_COLOR);
        assert_eq!(*img.get_pixel(15, 12), Rgb([0, 0, 0]));
    }
}
