/// Common types and utilities for technical drawing digitization
pub mod geometry;
pub mod records;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use geometry::{BBox, Point};
pub use records::TextRecord;

/// Processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Unreadable image {}: {reason}", path.display())]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("{engine} failed: {reason}")]
    Engine { engine: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Image processing error: {0}")]
    ImageError(String),
}

impl From<image::ImageError> for ProcessingError {
    fn from(err: image::ImageError) -> Self {
        ProcessingError::ImageError(err.to_string())
    }
}

impl ProcessingError {
    /// OCR engine or rasterizer failures, the only errors subject to retry/skip
    #[must_use]
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, ProcessingError::Engine { .. })
    }

    /// Source absent or undecodable
    #[must_use]
    pub fn is_unreadable_source(&self) -> bool {
        matches!(
            self,
            ProcessingError::MissingFile(_) | ProcessingError::UnreadableImage { .. }
        )
    }
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Per-page id counter, starting at 1
///
/// Ids come from this sequence only, never from the iteration order of an
/// external call. Create a fresh one per page and entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSequence {
    next: u32,
}

impl IdSequence {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next id
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    #[must_use]
    pub const fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// A page raster and where it came from
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Page name used for output artifacts (see [`page_stem`])
    pub name: String,
    pub image: RgbImage,
    pub source: Option<PathBuf>,
}

impl PageImage {
    #[must_use]
    pub fn new(name: impl Into<String>, image: RgbImage) -> Self {
        Self {
            name: name.into(),
            image,
            source: None,
        }
    }

    /// Load a page image from disk
    ///
    /// A missing path and a decode failure are reported as distinct errors.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ProcessingError::MissingFile(path.to_path_buf()));
        }
        let image = image::open(path)
            .map_err(|e| ProcessingError::UnreadableImage {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgb8();
        Ok(Self {
            name: page_stem(path),
            image,
            source: Some(path.to_path_buf()),
        })
    }
}

/// File name up to its first `.`: `sheet.v2.png` -> `sheet`
#[must_use]
pub fn page_stem(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// Word-level text label with its derived center and orientation
///
/// Immutable once built; only the text extractor creates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    id: u32,
    text: String,
    bbox: BBox,
    center: Point,
    orientation: f64,
}

impl TextBox {
    /// `orientation` is in degrees, expected in (-180, 180]
    #[must_use]
    pub fn new(id: u32, text: impl Into<String>, bbox: BBox, orientation: f64) -> Self {
        Self {
            id,
            text: text.into(),
            bbox,
            center: bbox.center(),
            orientation,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn bbox(&self) -> BBox {
        self.bbox
    }

    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub const fn orientation(&self) -> f64 {
        self.orientation
    }
}

/// Candidate symbol region produced by a symbol detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolBox {
    pub id: String,
    pub bbox: BBox,
    pub center: Point,
}

impl SymbolBox {
    #[must_use]
    pub fn new(id: impl Into<String>, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            bbox,
            center: bbox.center(),
        }
    }
}

/// Producer of symbol candidates for one page
///
/// `page` is the same upright raster the text boxes were read from, so
/// symbol and text coordinates share one frame. Ids must be unique within
/// the returned vector.
pub trait SymbolDetector {
    fn detect_symbols(&mut self, page: &RgbImage, text: &[TextBox]) -> Result<Vec<SymbolBox>>;
}

/// Straight line segment in pixel space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    #[serde(rename = "line_id")]
    pub id: String,
    #[serde(rename = "start_point")]
    pub start: (i32, i32),
    #[serde(rename = "end_point")]
    pub end: (i32, i32),
}

impl LineSegment {
    /// Build a segment whose id is `L<ordinal>`
    #[must_use]
    pub fn new(ordinal: u32, start: (i32, i32), end: (i32, i32)) -> Self {
        Self {
            id: format!("L{ordinal}"),
            start,
            end,
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        f64::from(self.end.0 - self.start.0).hypot(f64::from(self.end.1 - self.start.1))
    }
}

/// Text label joined to its nearest symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub text_id: u32,
    pub text_center: Point,
    pub symbol_id: String,
    pub symbol_bbox: BBox,
    pub symbol_center: Point,
    /// Euclidean center distance, rounded to 2 decimals
    pub distance: f64,
}

/// Round to 2 decimal places
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
