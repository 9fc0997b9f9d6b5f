//! Oriented text extraction
//!
//! Per page of a document:
//! 1. rasterize (300 DPI by default)
//! 2. detect the page rotation and turn the page upright
//! 3. word-level OCR; blank words are dropped
//! 4. orientation of each word from the longest edge of its box
//!
//! Pages are produced lazily by [`TextExtractor::pages`]; each call starts a
//! fresh pass over the document.
//!
//! # Example
//! ```no_run
//! use drawing_ocr::FixedOcrEngine;
//! use drawing_text::{TextExtractor, TextExtractorConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut extractor =
//!     TextExtractor::with_engine(TextExtractorConfig::default(), FixedOcrEngine::default())?;
//! for page in extractor.pages(Path::new("drawing.pdf")) {
//!     let page = page?;
//!     for tb in &page.text_boxes {
//!         println!("{} {:?} {:.1} deg", tb.text(), tb.bbox(), tb.orientation());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod orientation;
pub mod preprocess;

use drawing_common::{page_stem, IdSequence, ProcessingError, Result, TextBox};
use drawing_imaging::draw::{draw_boxes, TEXT_BOX_COLOR};
use drawing_ocr::rasterize::{is_pdf, DEFAULT_DPI};
use drawing_ocr::{DocumentRasterizer, OcrEngine, PageRotation, Rasterizer};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use orientation::orientation_degrees;
pub use preprocess::TextPreprocessing;

/// Configuration for text extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextExtractorConfig {
    /// Rasterization resolution for PDF pages
    pub dpi: f32,
    /// Ask the OCR engine for the page rotation before reading words
    pub detect_orientation: bool,
    /// Box stroke thickness in the annotated image
    pub box_thickness: u32,
    /// Binarize the OCR input first; off by default
    pub preprocessing: Option<TextPreprocessing>,
}

impl Default for TextExtractorConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            detect_orientation: true,
            box_thickness: 2,
            preprocessing: None,
        }
    }
}

impl TextExtractorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dpi.is_nan() || self.dpi <= 0.0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "dpi must be positive, got {}",
                self.dpi
            )));
        }
        if let Some(pre) = &self.preprocessing {
            pre.validate()?;
        }
        Ok(())
    }
}

/// Text found on one page
#[derive(Debug, Clone)]
pub struct PageText {
    /// 0-based page index within the document
    pub index: usize,
    pub name: String,
    /// Rotation applied to bring the page upright
    pub rotation: PageRotation,
    /// Upright page; text box coordinates refer to this image
    pub image: RgbImage,
    pub text_boxes: Vec<TextBox>,
    /// Upright page with the text boxes drawn on
    pub annotated: RgbImage,
}

/// OCR-based text extractor
pub struct TextExtractor<E, R = DocumentRasterizer> {
    config: TextExtractorConfig,
    ocr: E,
    rasterizer: R,
}

impl<E: OcrEngine> TextExtractor<E, DocumentRasterizer> {
    /// Extractor reading PDFs through pdfium and images from disk
    pub fn with_engine(config: TextExtractorConfig, ocr: E) -> Result<Self> {
        let rasterizer = DocumentRasterizer::new(config.dpi);
        Self::new(config, ocr, rasterizer)
    }
}

impl<E: OcrEngine, R: Rasterizer> TextExtractor<E, R> {
    pub fn new(config: TextExtractorConfig, ocr: E, rasterizer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ocr,
            rasterizer,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &TextExtractorConfig {
        &self.config
    }

    /// The OCR engine, for stages that share it
    pub fn ocr_mut(&mut self) -> &mut E {
        &mut self.ocr
    }

    /// Lazy sequence of pages of `path`
    ///
    /// A missing or unreadable document is logged and yields no pages. A page
    /// that cannot be decoded is logged and ends the sequence.
    pub fn pages(&mut self, path: &Path) -> TextPages<'_, E, R> {
        let (count, pending) = match self.rasterizer.page_count(path) {
            Ok(count) => (count, None),
            Err(e) if e.is_unreadable_source() => {
                warn!("Skipping text extraction for {}: {}", path.display(), e);
                (0, None)
            }
            Err(e) => (0, Some(e)),
        };
        debug!("{} has {} pages", path.display(), count);
        TextPages {
            extractor: self,
            path: path.to_path_buf(),
            next: 0,
            count,
            pending,
        }
    }

    /// All pages of `path`, stopping at the first error
    pub fn extract(&mut self, path: &Path) -> Result<Vec<PageText>> {
        self.pages(path).collect()
    }

    /// Number of pages `path` would yield; 0 for a missing or unreadable source
    pub fn page_count(&mut self, path: &Path) -> Result<usize> {
        match self.rasterizer.page_count(path) {
            Ok(count) => Ok(count),
            Err(e) if e.is_unreadable_source() => {
                warn!("Skipping text extraction for {}: {}", path.display(), e);
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Rasterize and read page `index` of `path`
    pub fn extract_page(
        &mut self,
        path: &Path,
        index: usize,
        page_count: usize,
    ) -> Result<PageText> {
        let image = self.rasterizer.render_page(path, index)?;
        let name = page_name(path, index, page_count);
        let mut page = self.extract_image(&name, &image)?;
        page.index = index;
        Ok(page)
    }

    /// Read an in-memory page
    pub fn extract_image(&mut self, name: &str, image: &RgbImage) -> Result<PageText> {
        let rotation = if self.config.detect_orientation {
            self.ocr.detect_orientation(image)?
        } else {
            PageRotation::None
        };
        if rotation != PageRotation::None {
            info!("Page {} rotated by {} deg", name, rotation.degrees());
        }
        let upright = rotation.upright(image);

        let words = match &self.config.preprocessing {
            Some(pre) => self.ocr.word_boxes(&pre.apply(&upright))?,
            None => self.ocr.word_boxes(&upright)?,
        };

        let mut ids = IdSequence::new();
        let text_boxes: Vec<TextBox> = words
            .into_iter()
            .filter(|w| !w.is_blank())
            .map(|w| {
                let angle = orientation_degrees(&w.bbox.corners());
                TextBox::new(ids.next_id(), w.text.trim(), w.bbox, angle)
            })
            .collect();
        info!("Page {}: {} text boxes", name, text_boxes.len());

        let mut annotated = upright.clone();
        draw_boxes(
            &mut annotated,
            text_boxes.iter().map(TextBox::bbox),
            TEXT_BOX_COLOR,
            self.config.box_thickness,
        );

        Ok(PageText {
            index: 0,
            name: name.to_string(),
            rotation,
            image: upright,
            text_boxes,
            annotated,
        })
    }
}

/// `<stem>_page_<n>` for PDFs and multi-page sources, `<stem>` otherwise
#[must_use]
pub fn page_name(path: &Path, index: usize, page_count: usize) -> String {
    let stem = page_stem(path);
    if is_pdf(path) || page_count > 1 {
        format!("{}_page_{}", stem, index + 1)
    } else {
        stem
    }
}

/// Iterator over the pages of one document
pub struct TextPages<'a, E, R> {
    extractor: &'a mut TextExtractor<E, R>,
    path: PathBuf,
    next: usize,
    count: usize,
    pending: Option<ProcessingError>,
}

impl<E: OcrEngine, R: Rasterizer> Iterator for TextPages<'_, E, R> {
    type Item = Result<PageText>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        match self.extractor.extract_page(&self.path, index, self.count) {
            Err(e) if e.is_unreadable_source() => {
                warn!("Stopping text extraction for {}: {}", self.path.display(), e);
                self.next = self.count;
                None
            }
            result => Some(result),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next.min(self.count) + usize::from(self.pending.is_some());
        (left, Some(left))
    }
}
