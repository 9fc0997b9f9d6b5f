//! Global (Otsu) binarization

use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;
use imageproc::map::map_colors;

/// Sigma equivalent to a 5x5 Gaussian kernel with automatic sigma
pub const BLUR_5X5_SIGMA: f32 = 1.1;

#[must_use]
pub fn to_gray(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Threshold at the Otsu level; returns the binary image and the level used
///
/// Pixels strictly above the level become 255 (0 when `inverted`).
#[must_use]
pub fn binarize_otsu(gray: &GrayImage, inverted: bool) -> (GrayImage, u8) {
    let level = otsu_level(gray);
    let (on, off) = if inverted { (0u8, 255u8) } else { (255u8, 0u8) };
    let binary = map_colors(gray, |p: Luma<u8>| Luma([if p[0] > level { on } else { off }]));
    (binary, level)
}

/// Dark ink on a light background as a white-on-black mask
///
/// Grayscale, optional Gaussian blur, then inverted Otsu threshold.
#[must_use]
pub fn foreground_mask(image: &RgbImage, blur_sigma: Option<f32>) -> GrayImage {
    let gray = to_gray(image);
    let gray = match blur_sigma {
        Some(sigma) if sigma > 0.0 => gaussian_blur_f32(&gray, sigma),
        _ => gray,
    };
    binarize_otsu(&gray, true).0
}
