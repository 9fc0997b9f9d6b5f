//! Persisted record formats and JSON helpers
//!
//! Output files are pretty-printed with 4-space indentation. Line and
//! association records serialize straight from [`LineSegment`] and
//! [`Association`]; text boxes use the narrower [`TextRecord`].
//!
//! [`LineSegment`]: crate::LineSegment
//! [`Association`]: crate::Association

use crate::{BBox, Result, TextBox};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Entry of `extracted_text_orientation.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
    pub coordinates: BBox,
    pub orientation: f64,
}

impl From<&TextBox> for TextRecord {
    fn from(tb: &TextBox) -> Self {
        Self {
            text: tb.text().to_string(),
            coordinates: tb.bbox(),
            orientation: tb.orientation(),
        }
    }
}

/// Serialize with 4-space indentation
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a pretty JSON file, replacing any existing one
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, to_json_pretty(value)?)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
