//! Page coordinate grid built from row heights and column widths.
//!
//! Everything drawn on a page is positioned through the two offset tables
//! computed here, so a sheet has exactly one coordinate space.

use serde::{Deserialize, Serialize};

use crate::model::WorkbookSource;
use crate::types::CellSpan;

/// Average digit width in pixels of the default font.
const MAX_DIGIT_WIDTH: f64 = 7.0;

/// Cell padding Excel adds to every column, in pixels.
const COLUMN_PADDING: f64 = 5.0;

/// Convert a column width in characters to pixels.
pub fn convert_col_width(width: f64) -> f64 {
    if !width.is_finite() || width <= 0.0 {
        return 0.0;
    }
    if width < 1.0 {
        return (width * 12.0 + 0.5).ceil();
    }
    (width * MAX_DIGIT_WIDTH + 0.5 + COLUMN_PADDING).ceil()
}

/// Convert a row height in points to pixels.
pub fn convert_row_height(height: f64) -> f64 {
    if !height.is_finite() || height <= 0.0 {
        return 0.0;
    }
    (height * 4.0 / 3.4).ceil()
}

/// Font size in points to the pixel size text is set at.
pub fn font_px(size: f64) -> f64 {
    convert_row_height(size)
}

/// Axis-aligned rectangle in page pixels, top-left origin.
///
/// Serialized as `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

impl From<[f64; 4]> for Rect {
    fn from([left, top, right, bottom]: [f64; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl From<Rect> for [f64; 4] {
    fn from(r: Rect) -> Self {
        [r.left, r.top, r.right, r.bottom]
    }
}

/// Cumulative pixel offsets of a sheet's row and column boundaries.
///
/// `row_offsets[i]` is the boundary below row `i` (above row `i + 1`);
/// index 0 is the top edge of the page grid and is always 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridGeometry {
    row_offsets: Vec<f64>,
    col_offsets: Vec<f64>,
}

fn cumulative(sizes: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(sizes.size_hint().0 + 1);
    let mut pos = 0.0;
    offsets.push(pos);
    for size in sizes {
        pos += size;
        offsets.push(pos);
    }
    offsets
}

impl GridGeometry {
    /// Build from native sizes: row heights in points, column widths in characters.
    pub fn from_sizes(row_heights: &[f64], col_widths: &[f64]) -> Self {
        Self {
            row_offsets: cumulative(row_heights.iter().map(|&h| convert_row_height(h))),
            col_offsets: cumulative(col_widths.iter().map(|&w| convert_col_width(w))),
        }
    }

    /// Build for rows `1..=max_row` and columns `1..=max_col` of a sheet.
    ///
    /// A size that cannot be looked up counts as 0.
    pub fn for_sheet<S: WorkbookSource + ?Sized>(
        source: &S,
        sheet: &str,
        max_row: u32,
        max_col: u32,
    ) -> Self {
        let rows = (1..=max_row).map(|row| match source.row_height(sheet, row) {
            Ok(h) => convert_row_height(h),
            Err(err) => {
                tracing::debug!(sheet, row, error = %err, "row height lookup failed, using 0");
                0.0
            }
        });
        let row_offsets = cumulative(rows);

        let cols = (1..=max_col).map(|col| match source.col_width(sheet, col) {
            Ok(w) => convert_col_width(w),
            Err(err) => {
                tracing::debug!(sheet, col, error = %err, "column width lookup failed, using 0");
                0.0
            }
        });
        let col_offsets = cumulative(cols);

        Self {
            row_offsets,
            col_offsets,
        }
    }

    pub fn row_offsets(&self) -> &[f64] {
        &self.row_offsets
    }

    pub fn col_offsets(&self) -> &[f64] {
        &self.col_offsets
    }

    /// Boundary below row `i`; `None` past the last row.
    pub fn row_offset(&self, i: u32) -> Option<f64> {
        self.row_offsets.get(i as usize).copied()
    }

    /// Boundary right of column `i`; `None` past the last column.
    pub fn col_offset(&self, i: u32) -> Option<f64> {
        self.col_offsets.get(i as usize).copied()
    }

    pub fn max_row(&self) -> u32 {
        u32::try_from(self.row_offsets.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    pub fn max_col(&self) -> u32 {
        u32::try_from(self.col_offsets.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Total grid size in pixels.
    pub fn size(&self) -> (f64, f64) {
        (
            self.col_offsets.last().copied().unwrap_or(0.0),
            self.row_offsets.last().copied().unwrap_or(0.0),
        )
    }

    /// Pixel rectangle covering every cell of `span`.
    ///
    /// `None` when the span reaches outside the grid.
    pub fn rect(&self, span: &CellSpan) -> Option<Rect> {
        Some(Rect {
            left: self.col_offset(span.start_col.checked_sub(1)?)?,
            top: self.row_offset(span.start_row.checked_sub(1)?)?,
            right: self.col_offset(span.end_col)?,
            bottom: self.row_offset(span.end_row)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn column_conversion() {
        assert_eq!(convert_col_width(0.0), 0.0);
        assert_eq!(convert_col_width(0.5), 7.0);
        assert_eq!(convert_col_width(10.0), 76.0);
        assert_eq!(convert_col_width(1.0), 13.0);
        assert_eq!(convert_col_width(-3.0), 0.0);
        assert_eq!(convert_col_width(f64::NAN), 0.0);
    }

    #[test]
    fn row_conversion() {
        assert_eq!(convert_row_height(0.0), 0.0);
        assert_eq!(convert_row_height(3.4), 4.0);
        assert_eq!(convert_row_height(15.0), 18.0);
        assert_eq!(font_px(11.0), 13.0);
    }

    #[test]
    fn offsets_accumulate() {
        let grid = GridGeometry::from_sizes(&[15.0, 0.0, 15.0], &[10.0, 10.0]);
        assert_eq!(grid.row_offsets(), &[0.0, 18.0, 18.0, 36.0]);
        assert_eq!(grid.col_offsets(), &[0.0, 76.0, 152.0]);
        assert_eq!(grid.max_row(), 3);
        assert_eq!(grid.max_col(), 2);
        assert_eq!(grid.size(), (152.0, 36.0));
    }

    #[test]
    fn rect_of_span() {
        let grid = GridGeometry::from_sizes(&[15.0, 15.0], &[10.0, 10.0]);
        let r = grid.rect(&CellSpan::new(1, 1, 2, 2)).unwrap();
        assert_eq!(r, Rect::new(0.0, 0.0, 152.0, 36.0));
        let single = grid.rect(&CellSpan::single(2, 2)).unwrap();
        assert_eq!(single, Rect::new(76.0, 18.0, 152.0, 36.0));
        assert!(grid.rect(&CellSpan::single(3, 1)).is_none());
        assert!(grid.rect(&CellSpan::single(0, 1)).is_none());
    }

    #[test]
    fn rect_serializes_as_array() {
        let json = serde_json::to_string(&Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
        let back: Rect = serde_json::from_str("[0, 0, 10, 5]").unwrap();
        assert_eq!(back.width(), 10.0);
        assert_eq!(back.height(), 5.0);
    }
}
