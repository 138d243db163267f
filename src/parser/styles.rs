//! Style and value resolution - resolves cell values, fonts, borders and alignment.

use crate::numfmt::NumberFormat;
use crate::types::{BorderEdge, BorderSide, BorderStyle, CellStyle, CellType, StyleSheet};

use super::worksheet::CellTypeTag;

/// Compiled number format of every `cellXfs` entry.
#[derive(Debug, Default)]
pub(super) struct NumberFormats {
    by_xf: Vec<NumberFormat>,
    date1904: bool,
}

impl NumberFormats {
    pub fn new(stylesheet: &StyleSheet, date1904: bool) -> Self {
        let by_xf = stylesheet
            .cell_xfs
            .iter()
            .map(|xf| {
                xf.num_fmt_id
                    .and_then(|id| stylesheet.format_code(id))
                    .map(NumberFormat::compile)
                    .unwrap_or_default()
            })
            .collect();
        Self { by_xf, date1904 }
    }

    /// Display text of a stored number under cell format `style_idx`.
    pub fn display(&self, raw: &str, style_idx: Option<u32>) -> String {
        match style_idx.and_then(|idx| self.by_xf.get(idx as usize)) {
            Some(format) => format.apply(raw, self.date1904),
            None => raw.to_string(),
        }
    }
}

/// Resolve cell display text and type.
///
/// Numbers are shown through the number format of their own cell format.
pub(super) fn resolve_cell_value(
    raw_value: Option<&str>,
    inline_text: Option<String>,
    cell_type: CellTypeTag,
    shared_strings: &[String],
    formats: &NumberFormats,
    style_idx: Option<u32>,
) -> (Option<String>, CellType) {
    match cell_type {
        CellTypeTag::Shared => {
            let value = raw_value
                .and_then(|v| v.trim().parse::<usize>().ok())
                .and_then(|idx| shared_strings.get(idx))
                .cloned();
            (value, CellType::String)
        }
        CellTypeTag::Inline => {
            let value = inline_text.or_else(|| raw_value.map(ToString::to_string));
            (value, CellType::String)
        }
        CellTypeTag::Str => (raw_value.map(ToString::to_string), CellType::String),
        CellTypeTag::Bool => {
            let value = match raw_value {
                Some("1" | "true") => Some("TRUE".to_string()),
                Some("0" | "false") => Some("FALSE".to_string()),
                other => other.map(ToString::to_string),
            };
            (value, CellType::Boolean)
        }
        CellTypeTag::Error => (raw_value.map(ToString::to_string), CellType::Error),
        CellTypeTag::Default => {
            let Some(v) = raw_value else {
                return (inline_text, CellType::Number);
            };
            if v.trim().parse::<f64>().is_ok() {
                (Some(formats.display(v, style_idx)), CellType::Number)
            } else {
                (Some(v.to_string()), CellType::String)
            }
        }
    }
}

/// Resolve every `cellXfs` entry into a flat [`CellStyle`].
pub(super) fn resolve_styles(stylesheet: &StyleSheet) -> Vec<CellStyle> {
    stylesheet
        .cell_xfs
        .iter()
        .enumerate()
        .map(|(idx, _)| resolve_style(idx, stylesheet).unwrap_or_default())
        .collect()
}

/// Resolve a style index to a full CellStyle
pub(super) fn resolve_style(idx: usize, stylesheet: &StyleSheet) -> Option<CellStyle> {
    let xf = stylesheet.cell_xfs.get(idx)?;
    let mut style = CellStyle::default();

    if let Some(font) = xf
        .font_id
        .and_then(|id| stylesheet.fonts.get(id as usize))
    {
        style.font_family = font.name.clone();
        style.font_size = font.size;
        style.font_color = font.color_rgb.clone();
    }

    if let Some(border) = xf
        .border_id
        .and_then(|id| stylesheet.borders.get(id as usize))
    {
        style.borders = BorderEdge::ALL
            .into_iter()
            .filter_map(|edge| {
                let side_style = border.style(edge);
                (side_style != BorderStyle::None).then_some(BorderSide {
                    edge,
                    style: side_style,
                })
            })
            .collect();
    }

    if let Some(ref alignment) = xf.alignment {
        style.align_h = alignment.horizontal;
        style.align_v = alignment.vertical;
    }

    Some(style)
}
