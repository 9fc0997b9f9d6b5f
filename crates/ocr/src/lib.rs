//! OCR and rasterization collaborators
//!
//! The drawing pipeline consumes two external engines through the seams in
//! this crate:
//! - [`OcrEngine`]: word-level boxes with text, and page orientation
//! - [`Rasterizer`]: document -> per-page RGB images
//!
//! # Engines
//! - `TesseractEngine` (feature `tesseract`): Tesseract 5.x through `leptess`
//! - [`FixedOcrEngine`]: replays a fixed set of words and a fixed orientation,
//!   for cached OCR output and for tests
//! - [`PdfiumRasterizer`]: PDF pages through `pdfium-render`
//! - [`ImageFileRasterizer`]: a single image file as a one-page document
//!
//! # Example
//! ```no_run
//! use drawing_ocr::{DocumentRasterizer, Rasterizer};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rasterizer = DocumentRasterizer::new(300.0);
//! let doc = Path::new("drawing.pdf");
//! for page in 0..rasterizer.page_count(doc)? {
//!     let image = rasterizer.render_page(doc, page)?;
//!     println!("page {} is {}x{}", page + 1, image.width(), image.height());
//! }
//! # Ok(())
//! # }
//! ```

pub mod policy;
pub mod rasterize;
#[cfg(feature = "tesseract")]
pub mod tesseract;

use drawing_common::{BBox, ProcessingError};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use policy::{EnginePolicy, FailureAction};
pub use rasterize::{DocumentRasterizer, ImageFileRasterizer, PdfiumRasterizer, Rasterizer};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

/// Configuration for OCR processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language codes (e.g., "eng", "eng+deu")
    pub language: String,
    /// Tessdata directory; `None` uses the system default
    pub data_path: Option<String>,
    /// Page segmentation mode (see Tesseract PSM)
    pub page_segmentation_mode: u32,
    /// Minimum word confidence (0-100); 0 keeps every word
    pub min_confidence: i32,
    /// Longest image side used while scoring candidate orientations
    pub orientation_max_side: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            data_path: None,
            page_segmentation_mode: 3, // PSM_AUTO (fully automatic)
            min_confidence: 0,
            orientation_max_side: 1600,
        }
    }
}

impl OcrConfig {
    pub fn validate(&self) -> drawing_common::Result<()> {
        if self.language.trim().is_empty() {
            return Err(ProcessingError::InvalidConfig(
                "OCR language must not be empty".to_string(),
            ));
        }
        if !(0..=100).contains(&self.min_confidence) {
            return Err(ProcessingError::InvalidConfig(format!(
                "min_confidence must be within 0-100, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// A recognized word and its box in image pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub text: String,
    pub bbox: BBox,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
}

impl WordBox {
    #[must_use]
    pub fn new(text: impl Into<String>, bbox: BBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
        }
    }

    /// Empty or whitespace-only text
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Clockwise rotation that brings a page upright
///
/// Same convention as Tesseract's OSD `Rotate:` field: a page reported as
/// `Clockwise90` must be turned 90 degrees clockwise to read normally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageRotation {
    #[default]
    None,
    Clockwise90,
    Half,
    Clockwise270,
}

impl PageRotation {
    pub const ALL: [PageRotation; 4] = [
        PageRotation::None,
        PageRotation::Clockwise90,
        PageRotation::Half,
        PageRotation::Clockwise270,
    ];

    /// Multiples of 90 only, any sign (`-90` is `Clockwise270`)
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::None),
            90 => Some(Self::Clockwise90),
            180 => Some(Self::Half),
            270 => Some(Self::Clockwise270),
            _ => None,
        }
    }

    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Half => 180,
            Self::Clockwise270 => 270,
        }
    }

    /// Rotate `image` clockwise by this amount
    #[must_use]
    pub fn upright(self, image: &RgbImage) -> RgbImage {
        match self {
            Self::None => image.clone(),
            Self::Clockwise90 => image::imageops::rotate90(image),
            Self::Half => image::imageops::rotate180(image),
            Self::Clockwise270 => image::imageops::rotate270(image),
        }
    }
}

/// Highest score wins; ties keep the smaller rotation
#[must_use]
pub fn best_rotation(scores: &[(PageRotation, f32)]) -> PageRotation {
    scores
        .iter()
        .fold(None, |best: Option<(PageRotation, f32)>, &(rot, score)| match best {
            Some((_, s)) if s >= score => best,
            _ => Some((rot, score)),
        })
        .map_or(PageRotation::None, |(rot, _)| rot)
}

/// Errors that can occur during OCR processing
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitError(String),

    #[error("Failed to run OCR: {0}")]
    RecognitionError(String),

    #[error("Orientation detection failed: {0}")]
    OrientationError(String),

    #[error("Invalid image dimensions: {0}")]
    InvalidImageDimensions(String),
}

impl From<OcrError> for ProcessingError {
    fn from(err: OcrError) -> Self {
        ProcessingError::Engine {
            engine: "OCR engine".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Word-box detection and page-orientation detection
pub trait OcrEngine {
    /// Engine name for diagnostics
    fn name(&self) -> &str;

    /// Word-level boxes in reading order; blank words may be included
    fn word_boxes(&mut self, image: &RgbImage) -> Result<Vec<WordBox>, OcrError>;

    /// Rotation that makes the page upright
    fn detect_orientation(&mut self, image: &RgbImage) -> Result<PageRotation, OcrError>;
}

/// Replays fixed OCR output
///
/// Returns the same words and orientation for every image. `fail_next`
/// makes the following calls fail with a recognition error, which is how
/// engine-failure handling is exercised without a real engine.
#[derive(Debug, Clone, Default)]
pub struct FixedOcrEngine {
    words: Vec<WordBox>,
    rotation: PageRotation,
    failures_remaining: usize,
    calls: usize,
}

impl FixedOcrEngine {
    #[must_use]
    pub fn new(words: Vec<WordBox>) -> Self {
        Self {
            words,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: PageRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Fail the next `n` engine calls
    #[must_use]
    pub fn fail_next(mut self, n: usize) -> Self {
        self.failures_remaining = n;
        self
    }

    /// Engine calls made so far, failed ones included
    #[must_use]
    pub const fn calls(&self) -> usize {
        self.calls
    }

    fn tick(&mut self) -> Result<(), OcrError> {
        self.calls += 1;
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(OcrError::RecognitionError("scripted failure".to_string()));
        }
        Ok(())
    }
}

impl OcrEngine for FixedOcrEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    fn word_boxes(&mut self, _image: &RgbImage) -> Result<Vec<WordBox>, OcrError> {
        self.tick()?;
        Ok(self.words.clone())
    }

    fn detect_orientation(&mut self, _image: &RgbImage) -> Result<PageRotation, OcrError> {
        self.tick()?;
        Ok(self.rotation)
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn word_boxes(&mut self, image: &RgbImage) -> Result<Vec<WordBox>, OcrError> {
        (**self).word_boxes(image)
    }

    fn detect_orientation(&mut self, image: &RgbImage) -> Result<PageRotation, OcrError> {
        (**self).detect_orientation(image)
    }
}
