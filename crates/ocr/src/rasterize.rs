//! Document rasterization
//!
//! PDF pages are rendered with `pdfium-render`; plain image files are
//! treated as single-page documents.

use drawing_common::{PageImage, ProcessingError, Result};
use image::{ImageReader, RgbImage};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Default DPI for rendering PDF pages
pub const DEFAULT_DPI: f32 = 300.0;

/// Document -> per-page RGB images
pub trait Rasterizer {
    /// Number of pages in the document
    fn page_count(&mut self, path: &Path) -> Result<usize>;

    /// Render page `index` (0-based)
    fn render_page(&mut self, path: &Path, index: usize) -> Result<RgbImage>;
}

fn pdfium_error(reason: impl std::fmt::Display) -> ProcessingError {
    ProcessingError::Engine {
        engine: "pdfium".to_string(),
        reason: reason.to_string(),
    }
}

/// PDF rasterizer backed by pdfium
///
/// The document is reopened per call, so the rasterizer holds no borrow of
/// any document between pages.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
    dpi: f32,
}

impl PdfiumRasterizer {
    /// Bind pdfium from the working directory, falling back to the system library
    pub fn new(dpi: f32) -> Result<Self> {
        if dpi.is_nan() || dpi <= 0.0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "DPI must be positive, got {}",
                dpi
            )));
        }
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| pdfium_error(format!("Failed to bind pdfium library: {}", e)))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            dpi,
        })
    }

    fn open<'a>(&'a self, path: &Path) -> Result<PdfDocument<'a>> {
        if !path.is_file() {
            return Err(ProcessingError::MissingFile(path.to_path_buf()));
        }
        self.pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| ProcessingError::UnreadableImage {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn page_count(&mut self, path: &Path) -> Result<usize> {
        let document = self.open(path)?;
        Ok(usize::from(document.pages().len()))
    }

    fn render_page(&mut self, path: &Path, index: usize) -> Result<RgbImage> {
        let document = self.open(path)?;
        let page_index = u16::try_from(index).map_err(|_| {
            ProcessingError::InvalidInput(format!("page index {} out of range", index))
        })?;
        let page = document
            .pages()
            .get(page_index)
            .map_err(|e| ProcessingError::InvalidInput(format!("page {}: {}", index + 1, e)))?;

        // PDF points are 72 per inch
        let scale = self.dpi / 72.0;
        let pixel_width = (page.width().value * scale) as i32;
        let pixel_height = (page.height().value * scale) as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(pixel_width)
                    .set_target_height(pixel_height)
                    .render_form_data(true)
                    .render_annotations(true),
            )
            .map_err(|e| pdfium_error(format!("Failed to render page {}: {}", index + 1, e)))?;

        debug!(
            "Rendered page {} of {} at {} DPI ({}x{})",
            index + 1,
            path.display(),
            self.dpi,
            pixel_width,
            pixel_height
        );
        Ok(bitmap.as_image().to_rgb8())
    }
}

/// A single image file as a one-page document
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileRasterizer;

impl Rasterizer for ImageFileRasterizer {
    /// One page once the header decodes; a missing or undecodable file is an error
    fn page_count(&mut self, path: &Path) -> Result<usize> {
        if !path.is_file() {
            return Err(ProcessingError::MissingFile(path.to_path_buf()));
        }
        let unreadable = |reason: String| ProcessingError::UnreadableImage {
            path: path.to_path_buf(),
            reason,
        };
        let (width, height) = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| unreadable(e.to_string()))?
            .into_dimensions()
            .map_err(|e| unreadable(e.to_string()))?;
        debug!("{} is a {}x{} image", path.display(), width, height);
        Ok(1)
    }

    fn render_page(&mut self, path: &Path, index: usize) -> Result<RgbImage> {
        if index != 0 {
            return Err(ProcessingError::InvalidInput(format!(
                "{} has a single page, requested page {}",
                path.display(),
                index + 1
            )));
        }
        Ok(PageImage::open(path)?.image)
    }
}

/// Dispatches on file extension: `.pdf` through pdfium, anything else as an image
///
/// pdfium is bound on first PDF use, so image-only runs never load it.
pub struct DocumentRasterizer {
    dpi: f32,
    pdf: Option<PdfiumRasterizer>,
    image: ImageFileRasterizer,
}

impl DocumentRasterizer {
    #[must_use]
    pub fn new(dpi: f32) -> Self {
        Self {
            dpi,
            pdf: None,
            image: ImageFileRasterizer,
        }
    }

    fn backend(&mut self, path: &Path) -> Result<&mut dyn Rasterizer> {
        if !is_pdf(path) {
            return Ok(&mut self.image);
        }
        if self.pdf.is_none() {
            self.pdf = Some(PdfiumRasterizer::new(self.dpi)?);
        }
        match self.pdf.as_mut() {
            Some(pdf) => Ok(pdf),
            None => Err(pdfium_error("pdfium backend unavailable")),
        }
    }
}

impl Default for DocumentRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl Rasterizer for DocumentRasterizer {
    fn page_count(&mut self, path: &Path) -> Result<usize> {
        self.backend(path)?.page_count(path)
    }

    fn render_page(&mut self, path: &Path, index: usize) -> Result<RgbImage> {
        self.backend(path)?.render_page(path, index)
    }
}

/// Case-insensitive `.pdf` extension check
#[must_use]
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
