//! Tesseract engine through `leptess`

use crate::{best_rotation, OcrConfig, OcrEngine, OcrError, PageRotation, WordBox};
use drawing_common::BBox;
use image::imageops::FilterType;
use image::RgbImage;
use leptess::{LepTess, Variable};
use tracing::debug;

/// Tesseract 5.x word detector
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    /// Create a new Tesseract engine
    ///
    /// Fails early when the language data cannot be loaded.
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let _test_init =
            LepTess::new(config.data_path.as_deref(), &config.language).map_err(|e| {
                OcrError::InitError(format!(
                    "Failed to initialize Tesseract with language '{}': {}. \
                     Make sure language data is installed",
                    config.language, e
                ))
            })?;
        Ok(Self { config })
    }

    fn session(&self, image: &RgbImage) -> Result<LepTess, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImageDimensions(format!(
                "Image dimensions must be non-zero (got {}x{})",
                width, height
            )));
        }

        let mut lt = LepTess::new(self.config.data_path.as_deref(), &self.config.language)
            .map_err(|e| OcrError::InitError(format!("Failed to initialize Tesseract: {}", e)))?;
        lt.set_variable(
            Variable::TesseditPagesegMode,
            &self.config.page_segmentation_mode.to_string(),
        )
        .map_err(|e| OcrError::InitError(format!("Failed to set PSM: {}", e)))?;

        // leptess expects encoded image data
        let mut png_buf = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut png_buf, image::ImageFormat::Png)
            .map_err(|e| {
                OcrError::RecognitionError(format!("Failed to encode image to PNG: {}", e))
            })?;
        lt.set_image_from_mem(png_buf.get_ref())
            .map_err(|e| {
                OcrError::RecognitionError(format!("Failed to set image from memory: {}", e))
            })?;
        Ok(lt)
    }

    /// Legibility of a page: mean confidence weighted by alphanumeric count
    fn legibility(&self, image: &RgbImage) -> Result<f32, OcrError> {
        let mut lt = self.session(image)?;
        let text = lt.get_utf8_text().unwrap_or_default();
        let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
        Ok(lt.mean_text_conf().max(0) as f32 * alnum as f32)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn word_boxes(&mut self, image: &RgbImage) -> Result<Vec<WordBox>, OcrError> {
        let mut lt = self.session(image)?;

        // None means no text on the page, not a failure
        let level = leptess::capi::TessPageIteratorLevel_RIL_WORD;
        let Some(boxes) = lt.get_component_boxes(level, true) else {
            return Ok(Vec::new());
        };

        let mut words = Vec::new();
        for bbox in &boxes {
            let geom = bbox.get_geometry();
            lt.set_rectangle(geom.x, geom.y, geom.w, geom.h);

            let text = lt.get_utf8_text().unwrap_or_default().trim().to_string();
            let confidence = lt.mean_text_conf() as f32 / 100.0;
            if (confidence * 100.0) as i32 < self.config.min_confidence {
                continue;
            }

            debug!(
                "OCR found '{}' with confidence {:.2}% at ({}, {}, {}, {})",
                text,
                confidence * 100.0,
                geom.x,
                geom.y,
                geom.w,
                geom.h
            );
            words.push(WordBox::new(text, BBox::new(geom.x, geom.y, geom.w, geom.h), confidence));
        }
        Ok(words)
    }

    /// Scores the four right-angle rotations on a downscaled copy
    fn detect_orientation(&mut self, image: &RgbImage) -> Result<PageRotation, OcrError> {
        let (width, height) = image.dimensions();
        let longest = width.max(height);
        let max_side = self.config.orientation_max_side.max(1);
        let sample = if longest > max_side {
            let scale = f64::from(max_side) / f64::from(longest);
            let w = ((f64::from(width) * scale).round() as u32).max(1);
            let h = ((f64::from(height) * scale).round() as u32).max(1);
            image::imageops::resize(image, w, h, FilterType::Triangle)
        } else {
            image.clone()
        };

        let mut scores = Vec::with_capacity(PageRotation::ALL.len());
        for rotation in PageRotation::ALL {
            let score = self
                .legibility(&rotation.upright(&sample))
                .map_err(|e| OcrError::OrientationError(e.to_string()))?;
            debug!("Orientation {} deg scored {:.1}", rotation.degrees(), score);
            scores.push((rotation, score));
        }
        Ok(best_rotation(&scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires Tesseract with English language data
    fn test_blank_page_has_no_words() {
        let mut engine =
            TesseractEngine::new(OcrConfig::default()).expect("tesseract not available");
        let img = RgbImage::from_pixel(200, 100, image::Rgb([255, 255, 255]));
        let words = engine.word_boxes(&img).unwrap();
        assert!(words.iter().all(WordBox::is_blank));
    }

    #[test]
    #[ignore] // Requires Tesseract with English language data
    fn test_zero_sized_image_is_rejected() {
        let mut engine =
            TesseractEngine::new(OcrConfig::default()).expect("tesseract not available");
        assert!(matches!(
            engine.word_boxes(&RgbImage::new(0, 0)),
            Err(OcrError::InvalidImageDimensions(_))
        ));
    }
}
