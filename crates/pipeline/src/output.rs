//! Persistence of per-page records
//!
//! Each page writes into `<root>/<page>/`:
//!
//! | file | content |
//! |---|---|
//! | `<page>_associations.json` | text/symbol associations |
//! | `<page>_line_metadata.json` | line segments |
//! | `extracted_text_orientation.json` | text, box and orientation per word |
//! | `<page>_cropped.png` | page cropped to its outline |
//! | `<page>_no_text.png` | crop with text erased |
//! | `<page>cleaned.png` | crop with text and symbols erased |
//! | `<page>_line_detected1.2.png` | cleaned page with segments drawn |
//! | `annotated_output_test.png` | upright page with text boxes drawn |

use crate::PageRecords;
use drawing_common::records::write_json;
use drawing_common::{Result, TextRecord};
use drawing_imaging::io::save_rgb;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TEXT_ORIENTATION_FILE: &str = "extracted_text_orientation.json";
pub const ANNOTATED_TEXT_FILE: &str = "annotated_output_test.png";

#[must_use]
pub fn associations_file(page: &str) -> String {
    format!("{page}_associations.json")
}

#[must_use]
pub fn line_metadata_file(page: &str) -> String {
    format!("{page}_line_metadata.json")
}

#[must_use]
pub fn cropped_file(page: &str) -> String {
    format!("{page}_cropped.png")
}

#[must_use]
pub fn no_text_file(page: &str) -> String {
    format!("{page}_no_text.png")
}

#[must_use]
pub fn cleaned_file(page: &str) -> String {
    format!("{page}cleaned.png")
}

#[must_use]
pub fn line_image_file(page: &str) -> String {
    format!("{page}_line_detected1.2.png")
}

/// Paths written for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArtifacts {
    pub dir: PathBuf,
    pub associations: PathBuf,
    pub line_metadata: PathBuf,
    pub text_orientation: PathBuf,
    pub cropped: PathBuf,
    pub no_text: PathBuf,
    pub cleaned: PathBuf,
    pub line_image: PathBuf,
    pub annotated_text: PathBuf,
}

impl PageArtifacts {
    fn under(dir: PathBuf, page: &str) -> Self {
        Self {
            associations: dir.join(associations_file(page)),
            line_metadata: dir.join(line_metadata_file(page)),
            text_orientation: dir.join(TEXT_ORIENTATION_FILE),
            cropped: dir.join(cropped_file(page)),
            no_text: dir.join(no_text_file(page)),
            cleaned: dir.join(cleaned_file(page)),
            line_image: dir.join(line_image_file(page)),
            annotated_text: dir.join(ANNOTATED_TEXT_FILE),
            dir,
        }
    }

    /// Every file path, JSON first
    #[must_use]
    pub fn files(&self) -> [&Path; 8] {
        [
            &self.associations,
            &self.line_metadata,
            &self.text_orientation,
            &self.cropped,
            &self.no_text,
            &self.cleaned,
            &self.line_image,
            &self.annotated_text,
        ]
    }
}

/// Writes page records under a root directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the files of `page` go, without touching the filesystem
    #[must_use]
    pub fn artifacts(&self, page: &str) -> PageArtifacts {
        PageArtifacts::under(self.root.join(page), page)
    }

    /// Write every artifact of a page, replacing existing files
    pub fn write_page(&self, records: &PageRecords) -> Result<PageArtifacts> {
        let paths = self.artifacts(&records.name);
        fs::create_dir_all(&paths.dir)?;

        write_json(&paths.associations, &records.associations)?;
        write_json(&paths.line_metadata, &records.lines.segments)?;
        let text: Vec<TextRecord> = records.text.text_boxes.iter().map(TextRecord::from).collect();
        write_json(&paths.text_orientation, &text)?;

        save_rgb(&records.cleaned.cropped, &paths.cropped)?;
        save_rgb(&records.cleaned.no_text, &paths.no_text)?;
        save_rgb(&records.cleaned.cleaned, &paths.cleaned)?;
        save_rgb(&records.lines.annotated, &paths.line_image)?;
        save_rgb(&records.text.annotated, &paths.annotated_text)?;

        info!("Wrote page {} to {}", records.name, paths.dir.display());
        Ok(paths)
    }
}
