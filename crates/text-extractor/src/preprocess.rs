//! Optional OCR input preprocessing
//!
//! Contrast stretch, median denoise, Gaussian adaptive threshold and an
//! optional opening. Output keeps the input dimensions so OCR boxes stay in
//! page coordinates.

use drawing_common::{ProcessingError, Result};
use drawing_imaging::to_gray;
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::morphology::open;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPreprocessing {
    /// Median filter radius (1 = 3x3)
    pub median_radius: u32,
    /// Adaptive threshold neighbourhood side, odd
    pub block_size: u32,
    /// Subtracted from the weighted local mean
    pub offset: f32,
    /// Opening radius; 0 disables the opening
    pub opening_radius: u8,
}

impl Default for TextPreprocessing {
    fn default() -> Self {
        Self {
            median_radius: 1,
            block_size: 31,
            offset: 10.0,
            opening_radius: 0,
        }
    }
}

impl TextPreprocessing {
    pub fn validate(&self) -> Result<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "block_size must be odd and at least 3, got {}",
                self.block_size
            )));
        }
        Ok(())
    }

    /// Gaussian sigma for the threshold neighbourhood, as derived from the block size
    #[must_use]
    pub fn block_sigma(&self) -> f32 {
        0.3 * ((self.block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Binarized copy of `image`, back in RGB for the OCR engine
    #[must_use]
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let gray = stretch_contrast(&to_gray(image));
        let denoised = if self.median_radius > 0 {
            median_filter(&gray, self.median_radius, self.median_radius)
        } else {
            gray
        };
        let mut binary = adaptive_gaussian(&denoised, self.block_sigma(), self.offset);
        if self.opening_radius > 0 {
            binary = open(&binary, Norm::LInf, self.opening_radius);
        }
        DynamicImage::ImageLuma8(binary).to_rgb8()
    }
}

/// Linear min-max stretch to 0..=255
#[must_use]
pub fn stretch_contrast(gray: &GrayImage) -> GrayImage {
    let (lo, hi) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if hi <= lo {
        return gray.clone();
    }
    let span = f32::from(hi - lo);
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        p[0] = ((f32::from(p[0] - lo) * 255.0 / span).round()) as u8;
    }
    out
}

/// White where a pixel is brighter than its Gaussian-weighted neighbourhood minus `offset`
fn adaptive_gaussian(gray: &GrayImage, sigma: f32, offset: f32) -> GrayImage {
    let local = gaussian_blur_f32(gray, sigma);
    let mut out = GrayImage::new(gray.width(), gray.height());
    for (x, y, p) in gray.enumerate_pixels() {
        let threshold = f32::from(local.get_pixel(x, y)[0]) - offset;
        let v = if f32::from(p[0]) > threshold { 255 } else { 0 };
        out.put_pixel(x, y, Luma([v]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_stretch_maps_range_to_full_scale() {
        let gray = GrayImage::from_fn(10, 1, |x, _| Luma([100 + x as u8 * 10]));
        let out = stretch_contrast(&gray);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(9, 0)[0], 255);
    }

    #[test]
    fn test_stretch_flat_image_is_unchanged() {
        let gray = GrayImage::from_pixel(4, 4, Luma([77]));
        assert_eq!(stretch_contrast(&gray), gray);
    }

    #[test]
    fn test_default_sigma_matches_block_31() {
        assert!((TextPreprocessing::default().block_sigma() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_even_block_is_rejected() {
        let params = TextPreprocessing {
            block_size: 30,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_apply_binarizes_and_keeps_size() {
        // faint dark stroke on a light gray background
        let mut img = RgbImage::from_pixel(80, 40, Rgb([180, 180, 180]));
        for x in 20..60 {
            for y in 18..22 {
                img.put_pixel(x, y, Rgb([120, 120, 120]));
            }
        }
        let out = TextPreprocessing::default().apply(&img);
        assert_eq!(out.dimensions(), (80, 40));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(out.get_pixel(40, 20)[0], 0);
        assert_eq!(out.get_pixel(5, 5)[0], 255);
    }
}
