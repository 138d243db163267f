//! Conversion options.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::A4;

/// Page size and text settings applied to every sheet.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "pageWidth": 842, "pageHeight": 595, "maxContentLength": 200 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub page_width: f64,
    pub page_height: f64,
    /// Inset between a cell's rectangle and its text.
    pub padding: f64,
    /// Spacing added after every glyph.
    pub word_space: f64,
    /// Added to the font's pixel size to get the line height.
    pub line_gap: f64,
    /// Point size for cells whose style has none.
    pub default_font_size: f64,
    /// Characters kept per cell before wrapping; `None` or 0 keeps all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_content_length: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_width: A4.0,
            page_height: A4.1,
            padding: 5.0,
            word_space: 1.0,
            line_gap: 5.0,
            default_font_size: 11.0,
            max_content_length: None,
        }
    }
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
