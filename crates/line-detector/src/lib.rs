//! Line-segment detection
//!
//! Canny edges followed by probabilistic segment extraction over the Hough
//! transform. Segments are put in reading order (top to bottom, then left to
//! right) before they get their `L<n>` ids, so ids do not depend on
//! accumulator order.
//!
//! # Example
//! ```no_run
//! use drawing_common::IdSequence;
//! use drawing_lines::{LineDetector, LineDetectorConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = LineDetector::new(LineDetectorConfig::default())?;
//! let lines = detector.detect_path(Path::new("sheetcleaned.png"), &mut IdSequence::new())?;
//! for seg in &lines.segments {
//!     println!("{}: {:?} -> {:?}", seg.id, seg.start, seg.end);
//! }
//! # Ok(())
//! # }
//! ```

use drawing_common::{IdSequence, LineSegment, PageImage, ProcessingError, Result};
use drawing_imaging::draw::{draw_segments, LINE_COLOR};
use drawing_imaging::{detect_segments, to_gray, SegmentParams};
use image::RgbImage;
use imageproc::edges::canny;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Configuration for line detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDetectorConfig {
    /// Canny hysteresis thresholds
    pub canny_low: f32,
    pub canny_high: f32,
    /// Minimum Hough accumulator votes
    pub vote_threshold: u32,
    /// Accumulator non-maximum suppression radius
    pub suppression_radius: u32,
    /// Shortest segment kept, in pixels
    pub min_line_length: f64,
    /// Largest gap bridged inside one segment, in pixels
    pub max_line_gap: f64,
    /// Stroke thickness in the annotated image
    pub thickness: u32,
}

impl Default for LineDetectorConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 200.0,
            vote_threshold: 120,
            suppression_radius: 8,
            min_line_length: 100.0,
            max_line_gap: 100.0,
            thickness: 3,
        }
    }
}

impl LineDetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(ProcessingError::InvalidConfig(format!(
                "Canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.canny_low, self.canny_high
            )));
        }
        if self.min_line_length.is_nan() || self.min_line_length < 0.0 {
            return Err(ProcessingError::InvalidConfig(
                "min_line_length must be non-negative".to_string(),
            ));
        }
        if self.max_line_gap.is_nan() || self.max_line_gap < 0.0 {
            return Err(ProcessingError::InvalidConfig(
                "max_line_gap must be non-negative".to_string(),
            ));
        }
        if self.vote_threshold == 0 {
            return Err(ProcessingError::InvalidConfig(
                "vote_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn segment_params(&self) -> SegmentParams {
        SegmentParams {
            vote_threshold: self.vote_threshold,
            suppression_radius: self.suppression_radius,
            min_length: self.min_line_length,
            max_gap: self.max_line_gap,
        }
    }
}

/// Segments found on a page and the page with them drawn on
#[derive(Debug, Clone)]
pub struct DetectedLines {
    pub segments: Vec<LineSegment>,
    pub annotated: RgbImage,
}

/// Straight line detector
#[derive(Debug, Clone)]
pub struct LineDetector {
    config: LineDetectorConfig,
}

impl LineDetector {
    pub fn new(config: LineDetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &LineDetectorConfig {
        &self.config
    }

    /// Load a cleaned page from disk and detect its segments
    pub fn detect_path(&self, path: &Path, ids: &mut IdSequence) -> Result<DetectedLines> {
        let page = PageImage::open(path)?;
        Ok(self.detect(&page.image, ids))
    }

    /// Detect segments; ids are drawn from `ids` in reading order
    ///
    /// An image without lines yields an empty segment list.
    #[must_use]
    pub fn detect(&self, image: &RgbImage, ids: &mut IdSequence) -> DetectedLines {
        let edges = canny(&to_gray(image), self.config.canny_low, self.config.canny_high);
        let mut raw = detect_segments(&edges, &self.config.segment_params());
        if raw.is_empty() {
            debug!("No line segments detected");
        }

        for seg in &mut raw {
            *seg = normalized(*seg);
        }
        raw.sort_by_key(|&(start, end)| (start.1, start.0, end.1, end.0));

        let segments: Vec<LineSegment> = raw
            .into_iter()
            .map(|(start, end)| LineSegment::new(ids.next_id(), start, end))
            .collect();
        info!("Detected {} line segments", segments.len());

        let mut annotated = image.clone();
        draw_segments(
            &mut annotated,
            segments.iter().map(|s| (&s.start, &s.end)),
            LINE_COLOR,
            self.config.thickness,
        );
        DetectedLines {
            segments,
            annotated,
        }
    }
}

/// Endpoint order: leftmost first, topmost on vertical segments
fn normalized((a, b): ((i32, i32), (i32, i32))) -> ((i32, i32), (i32, i32)) {
    if (b.0, b.1) < (a.0, a.1) {
        (b, a)
    } else {
        (a, b)
    }
}
