//! Drawing elements: the page-level instructions the converter produces
//! and the dispatcher consumes.
//!
//! Elements have a JSON form, tagged by `"type"`:
//!
//! ```json
//! {"type": "line", "rect": [0, 0, 76, 0], "width": 1}
//! {"type": "text", "rect": [0, 0, 76, 18], "content": "A",
//!  "font": {"family": "Calibri", "size": 13}, "lineHeight": 18,
//!  "horizontalAlign": "left", "verticalAlign": "top", "padding": 5, "wordSpace": 1}
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, XlpdfError};
use crate::layout::Rect;

use super::colors::Rgb;

/// A straight stroke between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineRepr", into = "LineRepr")]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Stroke width.
    pub width: f64,
    pub color: Option<Rgb>,
}

impl LineSegment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, width: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            width,
            color: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LineRepr {
    rect: [f64; 4],
    #[serde(default = "default_line_width")]
    width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Rgb>,
}

fn default_line_width() -> f64 {
    1.0
}

impl From<LineRepr> for LineSegment {
    fn from(r: LineRepr) -> Self {
        let [x1, y1, x2, y2] = r.rect;
        Self {
            x1,
            y1,
            x2,
            y2,
            width: r.width,
            color: r.color,
        }
    }
}

impl From<LineSegment> for LineRepr {
    fn from(l: LineSegment) -> Self {
        Self {
            rect: [l.x1, l.y1, l.x2, l.y2],
            width: l.width,
            color: l.color,
        }
    }
}

/// Font selection for a text block. `size` is in page pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    /// Style variant such as `"B"` or `"Bold"`; looked up as `"{family} {style}"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            style: None,
            size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    #[serde(alias = "center")]
    Middle,
    Bottom,
}

/// A cell's text, to be wrapped and aligned inside `rect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub content: String,
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
    #[serde(default)]
    pub horizontal_align: HorizontalAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default)]
    pub padding: f64,
    /// Height of every wrapped line.
    #[serde(default)]
    pub line_height: f64,
    /// Extra advance after each glyph.
    #[serde(default)]
    pub word_space: f64,
    /// Keep at most this many code points of `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_content_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawElement {
    Line(LineSegment),
    Text(TextBlock),
    /// An element whose tag no renderer handles. Skipped when dispatched.
    Unsupported { tag: String },
}

impl DrawElement {
    /// Decode one element from its JSON form.
    ///
    /// An unknown `type` decodes to [`DrawElement::Unsupported`]; malformed
    /// fields of a known type are an error.
    pub fn from_json(value: Value) -> Result<Self> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match tag.as_str() {
            "line" => Ok(Self::Line(serde_json::from_value(value)?)),
            "text" => Ok(Self::Text(serde_json::from_value(value)?)),
            _ => Ok(Self::Unsupported { tag }),
        }
    }

    /// The error reported for an unsupported element, if this is one.
    pub fn unsupported_error(&self) -> Option<XlpdfError> {
        match self {
            Self::Unsupported { tag } => Some(XlpdfError::UnsupportedElement(tag.clone())),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for DrawElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}

/// Decode a document of pages: `[[element, ...], ...]`.
pub fn pages_from_json(json: &str) -> Result<Vec<Vec<DrawElement>>> {
    Ok(serde_json::from_str(json)?)
}
