//! Compact, roughly square blobs: the symbol candidates of a drawing

use crate::{Cleaner, CleanerConfig};
use drawing_common::{BBox, IdSequence, ProcessingError, Result, SymbolBox, SymbolDetector, TextBox};
use drawing_imaging::{binarize_otsu, external_regions, to_gray, Region};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Area and aspect-ratio bounds of a symbol candidate
///
/// Area bounds are inclusive; aspect-ratio (`w / h`) bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRegionFilter {
    pub min_area: f64,
    pub max_area: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for CandidateRegionFilter {
    fn default() -> Self {
        Self {
            min_area: 300.0,
            max_area: 5000.0,
            min_aspect: 0.5,
            max_aspect: 2.0,
        }
    }
}

impl CandidateRegionFilter {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_area >= 0.0 && self.min_area <= self.max_area) {
            return Err(ProcessingError::InvalidConfig(format!(
                "candidate area bounds [{}, {}] are not ordered",
                self.min_area, self.max_area
            )));
        }
        if !(self.min_aspect >= 0.0 && self.min_aspect < self.max_aspect) {
            return Err(ProcessingError::InvalidConfig(format!(
                "candidate aspect bounds ({}, {}) are not ordered",
                self.min_aspect, self.max_aspect
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn accepts(&self, region: &Region) -> bool {
        if region.area < self.min_area || region.area > self.max_area {
            return false;
        }
        region
            .bbox
            .aspect_ratio()
            .is_some_and(|r| r > self.min_aspect && r < self.max_aspect)
    }
}

/// Bounding boxes of the outer contours of `binary` that pass `filter`
///
/// `binary` is foreground-white (an inverted threshold of the drawing).
#[must_use]
pub fn candidate_regions(binary: &GrayImage, filter: &CandidateRegionFilter) -> Vec<BBox> {
    external_regions(binary)
        .iter()
        .filter(|r| filter.accepts(r))
        .map(|r| r.bbox)
        .collect()
}

/// [`SymbolDetector`] built on the cleaner's candidate filter
///
/// Text boxes are erased first so glyphs are not reported as symbols. Ids
/// are `S1`, `S2`, ... in contour scan order.
#[derive(Debug, Clone)]
pub struct CandidateSymbolDetector {
    cleaner: Cleaner,
}

impl CandidateSymbolDetector {
    pub fn new(config: CleanerConfig) -> Result<Self> {
        Ok(Self {
            cleaner: Cleaner::new(config)?,
        })
    }
}

impl SymbolDetector for CandidateSymbolDetector {
    fn detect_symbols(&mut self, page: &RgbImage, text: &[TextBox]) -> Result<Vec<SymbolBox>> {
        let no_text = self.cleaner.erase_text(page, text.iter().map(TextBox::bbox))?;
        let (binary, _) = binarize_otsu(&to_gray(&no_text), true);
        let mut ids = IdSequence::new();
        let symbols: Vec<SymbolBox> = candidate_regions(&binary, &self.cleaner.config().candidates)
            .into_iter()
            .map(|bbox| SymbolBox::new(format!("S{}", ids.next_id()), bbox))
            .collect();
        debug!("Candidate detector found {} symbols", symbols.len());
        Ok(symbols)
    }
}
