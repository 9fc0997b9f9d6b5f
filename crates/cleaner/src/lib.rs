//! Drawing cleaner
//!
//! Isolates the line-work of a technical drawing:
//! 1. crop to the bounding box of the largest outer contour
//! 2. erase OCR word boxes (dilated mask, inpainted)
//! 3. erase compact symbol-like blobs (area and aspect-ratio filter, inpainted)
//!
//! Every intermediate image is returned in [`CleanedPage`]; nothing is written
//! to disk here.
//!
//! # Example
//! ```no_run
//! use drawing_cleaner::{Cleaner, CleanerConfig};
//! use drawing_ocr::FixedOcrEngine;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cleaner = Cleaner::new(CleanerConfig::default())?;
//! let mut ocr = FixedOcrEngine::default();
//! let page = cleaner.clean_path(Path::new("sheet.png"), &mut ocr)?;
//! println!("cropped to {:?}, {} symbol candidates", page.crop, page.symbol_candidates.len());
//! # Ok(())
//! # }
//! ```

pub mod candidates;

use drawing_common::{BBox, PageImage, ProcessingError, Result};
use drawing_imaging::{
    binarize_otsu, dilate_square, external_regions, foreground_mask, inpaint, is_blank,
    largest_region, rect_mask, to_gray, BLUR_5X5_SIGMA,
};
use drawing_ocr::{OcrEngine, WordBox};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub use candidates::{candidate_regions, CandidateRegionFilter, CandidateSymbolDetector};

/// Configuration for the cleaner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Gaussian sigma applied before the crop threshold
    pub blur_sigma: f32,
    /// L-inf radius of the text-mask dilation (2 = 5x5 element)
    pub text_dilation_radius: u8,
    pub text_dilation_iterations: u32,
    /// Neighbourhood radius used when inpainting
    pub inpaint_radius: u32,
    pub candidates: CandidateRegionFilter,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            blur_sigma: BLUR_5X5_SIGMA,
            text_dilation_radius: 2,
            text_dilation_iterations: 2,
            inpaint_radius: 3,
            candidates: CandidateRegionFilter::default(),
        }
    }
}

impl CleanerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.blur_sigma.is_nan() || self.blur_sigma < 0.0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "blur_sigma must be non-negative, got {}",
                self.blur_sigma
            )));
        }
        if self.inpaint_radius == 0 {
            return Err(ProcessingError::InvalidConfig(
                "inpaint_radius must be at least 1".to_string(),
            ));
        }
        self.candidates.validate()
    }
}

/// Output of [`Cleaner::clean`]
#[derive(Debug, Clone)]
pub struct CleanedPage {
    pub name: String,
    /// Crop rectangle in source page coordinates
    pub crop: BBox,
    pub cropped: RgbImage,
    /// Cropped image with word boxes inpainted
    pub no_text: RgbImage,
    /// Final image: text and symbol candidates removed
    pub cleaned: RgbImage,
    /// Erased symbol candidates, in crop coordinates
    pub symbol_candidates: Vec<BBox>,
    /// Erased OCR words, in crop coordinates
    pub words: Vec<WordBox>,
}

/// Text and symbol remover
#[derive(Debug, Clone)]
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Load `path` and clean it
    pub fn clean_path(&self, path: &Path, ocr: &mut dyn OcrEngine) -> Result<CleanedPage> {
        let page = PageImage::open(path)?;
        self.clean(&page, ocr)
    }

    pub fn clean(&self, page: &PageImage, ocr: &mut dyn OcrEngine) -> Result<CleanedPage> {
        let (crop, cropped) = self.crop_to_content(&page.image);
        info!(
            "Cleaning {}: cropped {}x{} to {}x{} at ({}, {})",
            page.name,
            page.image.width(),
            page.image.height(),
            crop.w,
            crop.h,
            crop.x,
            crop.y
        );

        let words: Vec<WordBox> = ocr
            .word_boxes(&cropped)?
            .into_iter()
            .filter(|w| !w.is_blank())
            .collect();
        debug!("{} word boxes from {}", words.len(), ocr.name());
        let no_text = self.erase_text(&cropped, words.iter().map(|w| w.bbox))?;

        let (binary, _) = binarize_otsu(&to_gray(&no_text), true);
        let symbol_candidates = candidate_regions(&binary, &self.config.candidates);
        debug!("{} symbol candidates", symbol_candidates.len());
        let cleaned = self.erase_boxes(&no_text, symbol_candidates.iter().copied())?;

        Ok(CleanedPage {
            name: page.name.clone(),
            crop,
            cropped,
            no_text,
            cleaned,
            symbol_candidates,
            words,
        })
    }

    /// Crop to the bounding box of the largest outer contour
    ///
    /// Falls back to the whole image when there is no contour.
    #[must_use]
    pub fn crop_to_content(&self, image: &RgbImage) -> (BBox, RgbImage) {
        let (width, height) = image.dimensions();
        let full = BBox::new(0, 0, width as i32, height as i32);
        let mask = foreground_mask(image, Some(self.config.blur_sigma));
        let regions = external_regions(&mask);
        let Some(largest) = largest_region(&regions) else {
            debug!("No outer contour; keeping the full {}x{} frame", width, height);
            return (full, image.clone());
        };

        let b = largest.bbox;
        if b.is_empty() {
            return (full, image.clone());
        }
        let (x, y, w, h) = (b.x as u32, b.y as u32, b.w as u32, b.h as u32);
        let cropped = image::imageops::crop_imm(image, x, y, w, h).to_image();
        (b, cropped)
    }

    /// Inpaint the given word boxes after dilating their mask
    pub fn erase_text<I>(&self, image: &RgbImage, boxes: I) -> Result<RgbImage>
    where
        I: IntoIterator<Item = BBox>,
    {
        let (width, height) = image.dimensions();
        let mask = rect_mask(width, height, boxes);
        if is_blank(&mask) {
            return Ok(image.clone());
        }
        let mask = dilate_square(
            &mask,
            self.config.text_dilation_radius,
            self.config.text_dilation_iterations,
        );
        inpaint(image, &mask, self.config.inpaint_radius)
    }

    /// Inpaint the given boxes as-is
    pub fn erase_boxes<I>(&self, image: &RgbImage, boxes: I) -> Result<RgbImage>
    where
        I: IntoIterator<Item = BBox>,
    {
        let (width, height) = image.dimensions();
        let mask = rect_mask(width, height, boxes);
        if is_blank(&mask) {
            return Ok(image.clone());
        }
        inpaint(image, &mask, self.config.inpaint_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CleanerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.inpaint_radius, 3);
        assert_eq!(config.text_dilation_radius, 2);
    }

    #[test]
    fn test_zero_inpaint_radius_is_rejected() {
        let config = CleanerConfig {
            inpaint_radius: 0,
            ..Default::default()
        };
        assert!(matches!(
            Cleaner::new(config),
            Err(ProcessingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: CleanerConfig = serde_json::from_str(r#"{"inpaint_radius": 5}"#).unwrap();
        assert_eq!(config.inpaint_radius, 5);
        assert_eq!(config.candidates, CandidateRegionFilter::default());
    }

    #[test]
    fn test_blank_image_keeps_full_frame() {
        let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
        let img = RgbImage::from_pixel(40, 30, image::Rgb([255, 255, 255]));
        let (crop, cropped) = cleaner.crop_to_content(&img);
        assert_eq!(crop, BBox::new(0, 0, 40, 30));
        assert_eq!(cropped, img);
    }

    #[test]
    fn test_erase_with_no_boxes_is_identity() {
        let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
        let img = RgbImage::from_fn(16, 16, |x, y| image::Rgb([x as u8 * 10, y as u8 * 10, 0]));
        assert_eq!(cleaner.erase_text(&img, []).unwrap(), img);
        assert_eq!(cleaner.erase_boxes(&img, []).unwrap(), img);
    }
}
