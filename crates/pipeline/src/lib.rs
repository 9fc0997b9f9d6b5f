//! Drawing digitization pipeline
//!
//! Runs every stage on each page of a document, one page at a time:
//!
//! ```text
//! document -> TextExtractor -> upright page + text boxes
//!                                 |-> Cleaner -> LineDetector -> line segments
//!                                 |-> SymbolDetector -> symbol boxes
//!             {text boxes, symbol boxes} -> Associator -> associations
//! ```
//!
//! Line segments are in the coordinates of the cropped page
//! ([`CleanedPage::crop`] gives the offset); text, symbols and associations
//! are in upright page coordinates.
//!
//! OCR and rasterizer failures are retried and then either skip the page or
//! abort the run, per [`EnginePolicy`]. Nothing is written unless the caller
//! passes records to an [`OutputWriter`].
//!
//! # Example
//! ```no_run
//! use drawing_ocr::FixedOcrEngine;
//! use drawing_pipeline::{DrawingPipeline, OutputWriter, PageOutcome, PipelineConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let mut pipeline = DrawingPipeline::with_engine(config, FixedOcrEngine::default())?;
//! let writer = OutputWriter::new("out");
//! for outcome in pipeline.pages(Path::new("plant.pdf")) {
//!     if let PageOutcome::Completed(records) = outcome? {
//!         writer.write_page(&records)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod output;

use drawing_association::{Associator, Query};
use drawing_cleaner::{CandidateSymbolDetector, CleanedPage, Cleaner};
use drawing_common::{Association, IdSequence, PageImage, ProcessingError, Result, SymbolBox};
use drawing_lines::{DetectedLines, LineDetector};
use drawing_ocr::{DocumentRasterizer, EnginePolicy, OcrEngine, Rasterizer};
use drawing_text::{page_name, PageText, TextExtractor};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use config::PipelineConfig;
pub use drawing_common::SymbolDetector;
pub use output::{OutputWriter, PageArtifacts};

/// Everything extracted from one page
#[derive(Debug, Clone)]
pub struct PageRecords {
    pub index: usize,
    pub name: String,
    pub text: PageText,
    pub cleaned: CleanedPage,
    pub lines: DetectedLines,
    pub symbols: Vec<SymbolBox>,
    pub associations: Vec<Association>,
}

impl PageRecords {
    /// Symbol associated with the queried text, if any
    pub fn resolve<'q>(&self, query: impl Into<Query<'q>>) -> Option<&SymbolBox> {
        drawing_association::resolve(&self.associations, &self.symbols, query)
    }
}

/// Result of processing one page
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Completed(Box<PageRecords>),
    /// Engine failure after retries, with the skip policy in force
    Skipped {
        index: usize,
        name: String,
        reason: String,
    },
}

impl PageOutcome {
    #[must_use]
    pub fn records(&self) -> Option<&PageRecords> {
        match self {
            PageOutcome::Completed(records) => Some(&**records),
            PageOutcome::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, PageOutcome::Skipped { .. })
    }
}

/// Counts from [`DrawingPipeline::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: Vec<PageArtifacts>,
    pub skipped: Vec<String>,
}

/// Per-page orchestration of all stages
pub struct DrawingPipeline<E, R = DocumentRasterizer, S = CandidateSymbolDetector> {
    policy: EnginePolicy,
    text: TextExtractor<E, R>,
    cleaner: Cleaner,
    lines: LineDetector,
    symbols: S,
    associator: Associator,
}

impl<E: OcrEngine> DrawingPipeline<E, DocumentRasterizer, CandidateSymbolDetector> {
    /// Pipeline with the pdfium/image rasterizer and the candidate symbol detector
    pub fn with_engine(config: PipelineConfig, ocr: E) -> Result<Self> {
        let rasterizer = DocumentRasterizer::new(config.text.dpi);
        let symbols = CandidateSymbolDetector::new(config.cleaner.clone())?;
        Self::new(config, ocr, rasterizer, symbols)
    }
}

#[cfg(feature = "tesseract")]
impl DrawingPipeline<drawing_ocr::TesseractEngine, DocumentRasterizer, CandidateSymbolDetector> {
    /// Pipeline around a Tesseract engine built from `config.ocr`
    ///
    /// # Errors
    ///
    /// Returns `Engine` when Tesseract cannot load the configured language.
    pub fn with_tesseract(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let ocr = drawing_ocr::TesseractEngine::new(config.ocr.clone())?;
        Self::with_engine(config, ocr)
    }
}

impl<E, R, S> DrawingPipeline<E, R, S>
where
    E: OcrEngine,
    R: Rasterizer,
    S: SymbolDetector,
{
    pub fn new(config: PipelineConfig, ocr: E, rasterizer: R, symbols: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: config.engine_policy,
            text: TextExtractor::new(config.text, ocr, rasterizer)?,
            cleaner: Cleaner::new(config.cleaner)?,
            lines: LineDetector::new(config.lines)?,
            symbols,
            associator: Associator::new(config.association)?,
        })
    }

    /// The OCR engine shared by text extraction and cleaning
    pub fn ocr_mut(&mut self) -> &mut E {
        self.text.ocr_mut()
    }

    /// Lazy sequence of page outcomes for `path`
    ///
    /// A missing or unreadable document yields no pages, and an undecodable
    /// page ends the sequence. Each call starts over from the first page.
    pub fn pages(&mut self, path: &Path) -> PipelinePages<'_, E, R, S> {
        let (count, pending) = match self.text.page_count(path) {
            Ok(count) => (count, None),
            Err(e) => (0, Some(e)),
        };
        PipelinePages {
            pipeline: self,
            path: path.to_path_buf(),
            next: 0,
            count,
            pending,
        }
    }

    /// Process every page of `path` and write the completed ones
    pub fn run(&mut self, path: &Path, writer: &OutputWriter) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for outcome in self.pages(path) {
            match outcome? {
                PageOutcome::Completed(records) => {
                    summary.completed.push(writer.write_page(&records)?);
                }
                PageOutcome::Skipped { name, .. } => summary.skipped.push(name),
            }
        }
        info!(
            "Finished {}: {} pages written, {} skipped",
            path.display(),
            summary.completed.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Process page `index` of a `page_count`-page document
    pub fn process_page(
        &mut self,
        path: &Path,
        index: usize,
        page_count: usize,
    ) -> Result<PageOutcome> {
        let name = page_name(path, index, page_count);
        info!("Processing page {}/{} ({})", index + 1, page_count, name);

        let policy = self.policy;
        let text = &mut self.text;
        let extracted =
            policy.run("text extraction", || text.extract_page(path, index, page_count));
        let page = match extracted {
            Ok(page) => page,
            Err(e) => return self.skip_or_fail(index, name, e),
        };
        self.process_text(page)
    }

    /// Process an in-memory page
    pub fn process_image(&mut self, page: &PageImage) -> Result<PageOutcome> {
        let policy = self.policy;
        let text = &mut self.text;
        match policy.run("text extraction", || text.extract_image(&page.name, &page.image)) {
            Ok(page) => self.process_text(page),
            Err(e) => self.skip_or_fail(0, page.name.clone(), e),
        }
    }

    fn process_text(&mut self, text: PageText) -> Result<PageOutcome> {
        let upright = PageImage::new(text.name.clone(), text.image.clone());
        let policy = self.policy;
        let cleaner = &self.cleaner;
        let extractor = &mut self.text;
        let cleaned = policy.run("cleaning", || cleaner.clean(&upright, extractor.ocr_mut()));
        let cleaned = match cleaned {
            Ok(cleaned) => cleaned,
            Err(e) => return self.skip_or_fail(text.index, text.name, e),
        };

        let lines = self.lines.detect(&cleaned.cleaned, &mut IdSequence::new());
        let symbols = self.symbols.detect_symbols(&text.image, &text.text_boxes)?;
        let associations = self.associator.associate(&text.text_boxes, &symbols);
        info!(
            "Page {}: {} lines, {} text boxes, {} symbols, {} associations",
            text.name,
            lines.segments.len(),
            text.text_boxes.len(),
            symbols.len(),
            associations.len()
        );

        Ok(PageOutcome::Completed(Box::new(PageRecords {
            index: text.index,
            name: text.name.clone(),
            text,
            cleaned,
            lines,
            symbols,
            associations,
        })))
    }

    fn skip_or_fail(
        &self,
        index: usize,
        name: String,
        err: ProcessingError,
    ) -> Result<PageOutcome> {
        if self.policy.skips(&err) {
            warn!("Skipping page {} ({}): {}", index + 1, name, err);
            Ok(PageOutcome::Skipped {
                index,
                name,
                reason: err.to_string(),
            })
        } else {
            Err(err)
        }
    }
}

/// Iterator over the page outcomes of one document
pub struct PipelinePages<'a, E, R, S> {
    pipeline: &'a mut DrawingPipeline<E, R, S>,
    path: PathBuf,
    next: usize,
    count: usize,
    pending: Option<ProcessingError>,
}

impl<E, R, S> Iterator for PipelinePages<'_, E, R, S>
where
    E: OcrEngine,
    R: Rasterizer,
    S: SymbolDetector,
{
    type Item = Result<PageOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        match self.pipeline.process_page(&self.path, index, self.count) {
            Err(e) if e.is_unreadable_source() => {
                warn!("Stopping at page {} of {}: {}", index + 1, self.path.display(), e);
                self.next = self.count;
                None
            }
            result => Some(result),
        }
    }
}
