// Integration tests for lazy per-page text extraction

use drawing_common::records::{read_json, write_json};
use drawing_common::{BBox, ProcessingError, Result, TextBox, TextRecord};
use drawing_ocr::{FixedOcrEngine, ImageFileRasterizer, Rasterizer, WordBox};
use drawing_text::{TextExtractor, TextExtractorConfig};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Multi-page document held in memory
struct MemoryDocument {
    pages: Vec<RgbImage>,
    broken: bool,
    /// Pages from this index on fail to decode
    undecodable_from: Option<usize>,
}

impl MemoryDocument {
    fn new(count: usize) -> Self {
        Self {
            pages: (0..count)
                .map(|i| RgbImage::from_pixel(120 + i as u32, 80, Rgb([255, 255, 255])))
                .collect(),
            broken: false,
            undecodable_from: None,
        }
    }
}

impl Rasterizer for MemoryDocument {
    fn page_count(&mut self, _path: &Path) -> Result<usize> {
        if self.broken {
            return Err(ProcessingError::Engine {
                engine: "memory".to_string(),
                reason: "library not loaded".to_string(),
            });
        }
        Ok(self.pages.len())
    }

    fn render_page(&mut self, _path: &Path, index: usize) -> Result<RgbImage> {
        if self.undecodable_from.is_some_and(|from| index >= from) {
            return Err(ProcessingError::UnreadableImage {
                path: PathBuf::from("unit.pdf"),
                reason: format!("page {index} is truncated"),
            });
        }
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| ProcessingError::InvalidInput(format!("no page {index}")))
    }
}

fn words() -> Vec<WordBox> {
    vec![
        WordBox::new("P-101", BBox::new(10, 10, 50, 14), 0.91),
        WordBox::new("TK", BBox::new(70, 40, 20, 14), 0.88),
    ]
}

#[test]
fn test_pages_are_lazy_and_restartable() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").with_test_writer().try_init();
    let mut ex = TextExtractor::new(
        TextExtractorConfig::default(),
        FixedOcrEngine::new(words()),
        MemoryDocument::new(3),
    )
    .unwrap();
    let doc = Path::new("unit.pdf");

    let mut pages = ex.pages(doc);
    assert_eq!(pages.size_hint(), (3, Some(3)));
    let first = pages.next().unwrap().unwrap();
    assert_eq!(first.name, "unit_page_1");
    assert_eq!(first.index, 0);
    drop(pages);

    let all = ex.extract(doc).unwrap();
    assert_eq!(all.len(), 3);
    for (i, page) in all.iter().enumerate() {
        assert_eq!(page.index, i);
        assert_eq!(page.name, format!("unit_page_{}", i + 1));
        assert_eq!(page.image.width(), 120 + i as u32);
        // ids restart on every page
        let ids: Vec<u32> = page.text_boxes.iter().map(TextBox::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}

#[test]
fn test_engine_failure_surfaces_per_page() {
    let mut ex = TextExtractor::new(
        TextExtractorConfig::default(),
        FixedOcrEngine::new(words()).fail_next(1),
        MemoryDocument::new(2),
    )
    .unwrap();
    let results: Vec<_> = ex.pages(Path::new("unit.pdf")).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].as_ref().is_err_and(ProcessingError::is_engine_failure));
    assert!(results[1].is_ok());
}

#[test]
fn test_rasterizer_failure_is_reported_once() {
    let mut doc = MemoryDocument::new(2);
    doc.broken = true;
    let mut ex =
        TextExtractor::new(TextExtractorConfig::default(), FixedOcrEngine::default(), doc).unwrap();
    let results: Vec<_> = ex.pages(Path::new("unit.pdf")).collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn test_single_image_document_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loop_sheet.png");
    RgbImage::from_pixel(100, 60, Rgb([255, 255, 255])).save(&path).unwrap();

    let mut ex = TextExtractor::new(
        TextExtractorConfig::default(),
        FixedOcrEngine::new(words()),
        ImageFileRasterizer,
    )
    .unwrap();
    let pages = ex.extract(&path).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].name, "loop_sheet");

    let records: Vec<TextRecord> = pages[0].text_boxes.iter().map(TextRecord::from).collect();
    let json_path = dir.path().join("extracted_text_orientation.json");
    write_json(&json_path, &records).unwrap();
    let back: Vec<TextRecord> = read_json(&json_path).unwrap();
    assert_eq!(back, records);
    assert_eq!(back[0].coordinates, BBox::new(10, 10, 50, 14));
}

#[test]
fn test_corrupt_image_yields_no_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.png");
    std::fs::write(&path, b"not a png at all").unwrap();

    let mut ex = TextExtractor::new(
        TextExtractorConfig::default(),
        FixedOcrEngine::new(words()),
        ImageFileRasterizer,
    )
    .unwrap();
    assert_eq!(ex.pages(&path).count(), 0);
    assert!(ex.extract(&path).unwrap().is_empty());
    assert_eq!(ex.page_count(&path).unwrap(), 0);
    assert_eq!(ex.ocr_mut().calls(), 0);
}

#[test]
fn test_undecodable_page_ends_the_document() {
    let mut doc = MemoryDocument::new(3);
    doc.undecodable_from = Some(1);
    let mut ex = TextExtractor::new(
        TextExtractorConfig::default(),
        FixedOcrEngine::new(words()),
        doc,
    )
    .unwrap();

    let pages = ex.extract(Path::new("unit.pdf")).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].name, "unit_page_1");
}
