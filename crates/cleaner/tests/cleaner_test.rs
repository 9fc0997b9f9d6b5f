// Integration tests for the drawing cleaner
// Run with: cargo test -p drawing-cleaner --test cleaner_test

use drawing_cleaner::{Cleaner, CleanerConfig};
use drawing_common::{BBox, PageImage, ProcessingError};
use drawing_ocr::{FixedOcrEngine, WordBox};
use image::{Rgb, RgbImage};
use std::path::Path;

const INK: Rgb<u8> = Rgb([0, 0, 0]);
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

fn fill(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) {
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, INK);
        }
    }
}

/// 400x300 sheet with an open U-shaped outline spanning (10,10)-(390,290)
fn u_sheet() -> RgbImage {
    let mut img = RgbImage::from_pixel(400, 300, PAPER);
    fill(&mut img, 10, 10, 20, 290);
    fill(&mut img, 380, 10, 390, 290);
    fill(&mut img, 10, 280, 390, 290);
    img
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

#[test]
fn test_crops_to_largest_outline() {
    init_tracing();
    let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
    let page = PageImage::new("sheet", u_sheet());
    let mut ocr = FixedOcrEngine::default();

    let cleaned = cleaner.clean(&page, &mut ocr).unwrap();
    let crop = cleaned.crop;
    assert!((crop.x - 10).abs() <= 1, "crop {crop:?}");
    assert!((crop.y - 10).abs() <= 1, "crop {crop:?}");
    assert!((crop.w - 380).abs() <= 2, "crop {crop:?}");
    assert!((crop.h - 280).abs() <= 2, "crop {crop:?}");
    assert_eq!(cleaned.cropped.width() as i32, crop.w);
    assert_eq!(cleaned.name, "sheet");
    // the outline itself survives cleaning
    assert!(cleaned.cleaned.get_pixel(5, 100)[0] < 100);
}

#[test]
fn test_erases_word_boxes() {
    let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
    let mut img = u_sheet();
    fill(&mut img, 200, 150, 220, 160);
    let page = PageImage::new("sheet", img);

    let (crop, _) = cleaner.crop_to_content(&page.image);
    let word = BBox::new(200 - crop.x, 150 - crop.y, 20, 10);
    let mut ocr = FixedOcrEngine::new(vec![
        WordBox::new("P-101", word, 0.93),
        WordBox::new("   ", BBox::new(50, 50, 5, 5), 0.10),
    ]);

    let cleaned = cleaner.clean(&page, &mut ocr).unwrap();
    assert_eq!(cleaned.words.len(), 1);
    assert_eq!(cleaned.words[0].text, "P-101");

    let (cx, cy) = ((word.x + 10) as u32, (word.y + 5) as u32);
    assert!(cleaned.cropped.get_pixel(cx, cy)[0] < 50);
    assert!(cleaned.no_text.get_pixel(cx, cy)[0] > 200);
}

#[test]
fn test_erases_symbol_candidates() {
    let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
    let mut img = u_sheet();
    fill(&mut img, 150, 100, 180, 130);
    let page = PageImage::new("sheet", img);
    let mut ocr = FixedOcrEngine::default();

    let cleaned = cleaner.clean(&page, &mut ocr).unwrap();
    assert_eq!(cleaned.symbol_candidates.len(), 1);

    let (cx, cy) = ((165 - cleaned.crop.x) as u32, (115 - cleaned.crop.y) as u32);
    assert!(cleaned.no_text.get_pixel(cx, cy)[0] < 50);
    assert!(cleaned.cleaned.get_pixel(cx, cy)[0] > 200);
}

#[test]
fn test_engine_failure_propagates() {
    let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
    let page = PageImage::new("sheet", u_sheet());
    let mut ocr = FixedOcrEngine::default().fail_next(1);
    let err = cleaner.clean(&page, &mut ocr).unwrap_err();
    assert!(err.is_engine_failure());
}

#[test]
fn test_clean_path() {
    let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
    let mut ocr = FixedOcrEngine::default();

    let missing = cleaner.clean_path(Path::new("/nonexistent/sheet.png"), &mut ocr);
    assert!(matches!(missing, Err(ProcessingError::MissingFile(_))));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p_and_id.page1.png");
    u_sheet().save(&path).unwrap();
    let cleaned = cleaner.clean_path(&path, &mut ocr).unwrap();
    assert_eq!(cleaned.name, "p_and_id");
}
