//! Binary masks built from rectangles

use drawing_common::BBox;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::morphology::dilate;
use imageproc::rect::Rect;

const MASK_ON: Luma<u8> = Luma([255]);

/// Rasterize filled rectangles into a `width` x `height` mask
///
/// Extents are inclusive: a box `(x, y, w, h)` covers `x..=x+w` and
/// `y..=y+h`. Boxes with negative size are ignored; boxes partly outside the
/// image are clipped.
#[must_use]
pub fn rect_mask<I>(width: u32, height: u32, rects: I) -> GrayImage
where
    I: IntoIterator<Item = BBox>,
{
    let mut mask = GrayImage::new(width, height);
    for b in rects {
        if b.w < 0 || b.h < 0 {
            continue;
        }
        let rect = Rect::at(b.x, b.y).of_size(b.w as u32 + 1, b.h as u32 + 1);
        draw_filled_rect_mut(&mut mask, rect, MASK_ON);
    }
    mask
}

/// Dilate with a square structuring element of side `2 * radius + 1`, repeated
#[must_use]
pub fn dilate_square(mask: &GrayImage, radius: u8, iterations: u32) -> GrayImage {
    let mut out = mask.clone();
    if radius == 0 {
        return out;
    }
    for _ in 0..iterations {
        out = dilate(&out, Norm::LInf, radius);
    }
    out
}

/// True when no pixel is set
#[must_use]
pub fn is_blank(mask: &GrayImage) -> bool {
    mask.pixels().all(|p| p[0] == 0)
}

#[must_use]
pub fn count_set(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}
