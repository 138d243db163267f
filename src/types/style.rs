use serde::{Deserialize, Serialize};

use crate::numfmt::builtin_format;

/// Resolved cell style: the subset of a cell format the converter threads through.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    // Font
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Raw `rgb` of the font color. Carried for inspection; text is drawn without it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,

    // Borders, in left/right/top/bottom order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub borders: Vec<BorderSide>,

    // Alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_h: Option<HAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_v: Option<VAlign>,
}

/// One of a cell's four independently styled sides.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BorderEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl BorderEdge {
    /// Edges in traversal order.
    pub const ALL: [BorderEdge; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];
}

/// A styled border edge of a cell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BorderSide {
    pub edge: BorderEdge,
    pub style: BorderStyle,
}

/// Border line styles from ECMA-376 Part 1, Section 18.18.3, in declaration order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    pub fn from_xml(value: &str) -> Self {
        match value {
            "thin" => Self::Thin,
            "medium" => Self::Medium,
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            "thick" => Self::Thick,
            "double" => Self::Double,
            "hair" => Self::Hair,
            "mediumDashed" => Self::MediumDashed,
            "dashDot" => Self::DashDot,
            "mediumDashDot" => Self::MediumDashDot,
            "dashDotDot" => Self::DashDotDot,
            "mediumDashDotDot" => Self::MediumDashDotDot,
            "slantDashDot" => Self::SlantDashDot,
            _ => Self::None,
        }
    }

    /// Numeric weight code: the style's position in the ECMA-376 list (`none` = 0).
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Thin => 1,
            Self::Medium => 2,
            Self::Dashed => 3,
            Self::Dotted => 4,
            Self::Thick => 5,
            Self::Double => 6,
            Self::Hair => 7,
            Self::MediumDashed => 8,
            Self::DashDot => 9,
            Self::MediumDashDot => 10,
            Self::DashDotDot => 11,
            Self::MediumDashDotDot => 12,
            Self::SlantDashDot => 13,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HAlign {
    pub fn from_xml(value: &str) -> Option<Self> {
        Some(match value {
            "general" => Self::General,
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            "fill" => Self::Fill,
            "justify" => Self::Justify,
            "centerContinuous" => Self::CenterContinuous,
            "distributed" => Self::Distributed,
            _ => return None,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    Center, // Note: Excel uses "center" not "middle"
    Bottom,
    Justify,
    Distributed,
}

impl VAlign {
    pub fn from_xml(value: &str) -> Option<Self> {
        Some(match value {
            "top" => Self::Top,
            "center" => Self::Center,
            "bottom" => Self::Bottom,
            "justify" => Self::Justify,
            "distributed" => Self::Distributed,
            _ => return None,
        })
    }
}

/// Raw style components from styles.xml
#[derive(Debug, Default, Clone)]
pub struct RawFont {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub color_rgb: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RawBorder {
    pub left: BorderStyle,
    pub right: BorderStyle,
    pub top: BorderStyle,
    pub bottom: BorderStyle,
}

impl RawBorder {
    pub fn style_mut(&mut self, edge: BorderEdge) -> &mut BorderStyle {
        match edge {
            BorderEdge::Left => &mut self.left,
            BorderEdge::Right => &mut self.right,
            BorderEdge::Top => &mut self.top,
            BorderEdge::Bottom => &mut self.bottom,
        }
    }

    pub fn style(&self, edge: BorderEdge) -> BorderStyle {
        match edge {
            BorderEdge::Left => self.left,
            BorderEdge::Right => self.right,
            BorderEdge::Top => self.top,
            BorderEdge::Bottom => self.bottom,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RawAlignment {
    pub horizontal: Option<HAlign>,
    pub vertical: Option<VAlign>,
}

/// Cell format (xf) from cellXfs.
#[derive(Debug, Default, Clone)]
pub struct CellXf {
    pub font_id: Option<u32>,
    pub border_id: Option<u32>,
    pub num_fmt_id: Option<u32>,
    pub alignment: Option<RawAlignment>,
}

/// Parsed style data from styles.xml
#[derive(Debug, Default)]
pub struct StyleSheet {
    /// Custom `<numFmt numFmtId formatCode>` entries.
    pub num_fmts: Vec<(u32, String)>,
    pub fonts: Vec<RawFont>,
    pub borders: Vec<RawBorder>,
    pub cell_xfs: Vec<CellXf>,
}

impl StyleSheet {
    /// Format code for a number format id: custom entries first, then built-ins.
    pub fn format_code(&self, id: u32) -> Option<&str> {
        self.num_fmts
            .iter()
            .find(|(fmt_id, _)| *fmt_id == id)
            .map(|(_, code)| code.as_str())
            .or_else(|| builtin_format(id))
    }
}
