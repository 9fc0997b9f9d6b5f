//! Aggregated pipeline configuration

use drawing_association::AssociationConfig;
use drawing_cleaner::CleanerConfig;
use drawing_common::records::read_json;
use drawing_common::Result;
use drawing_lines::LineDetectorConfig;
use drawing_ocr::{EnginePolicy, OcrConfig};
use drawing_text::TextExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of every stage
///
/// Missing sections and fields fall back to their defaults, so
/// `{"association": {"distance_threshold": 30.0}}` is a complete
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Language and data path for the Tesseract engine built by
    /// `DrawingPipeline::with_tesseract`; unused with a caller-supplied engine
    pub ocr: OcrConfig,
    pub cleaner: CleanerConfig,
    pub lines: LineDetectorConfig,
    pub text: TextExtractorConfig,
    pub association: AssociationConfig,
    pub engine_policy: EnginePolicy,
}

impl PipelineConfig {
    /// Read a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.ocr.validate()?;
        self.cleaner.validate()?;
        self.lines.validate()?;
        self.text.validate()?;
        self.association.validate()
    }
}
