use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell_ref::cell_name;

/// Inclusive, 1-indexed rectangle of cells.
///
/// A standalone cell has `start == end`; a merge anchor spans the whole merge.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CellSpan {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellSpan {
    /// Build a span from two corners in any order.
    pub fn new(row_a: u32, col_a: u32, row_b: u32, col_b: u32) -> Self {
        Self {
            start_row: row_a.min(row_b),
            start_col: col_a.min(col_b),
            end_row: row_a.max(row_b),
            end_col: col_a.max(col_b),
        }
    }

    /// Span covering exactly one cell.
    pub fn single(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.start_row..=self.end_row).contains(&row)
            && (self.start_col..=self.end_col).contains(&col)
    }

    /// True when `(row, col)` is the top-left cell of the span.
    pub fn is_anchor(&self, row: u32, col: u32) -> bool {
        row == self.start_row && col == self.start_col
    }

    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }
}

impl fmt::Display for CellSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = cell_name(self.start_row, self.start_col);
        if self.is_single() {
            f.write_str(&start)
        } else {
            write!(f, "{start}:{}", cell_name(self.end_row, self.end_col))
        }
    }
}

/// Value type tag from the `t` attribute of a `<c>` element.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Number,
    String,
    Boolean,
    Error,
}

/// A single stored cell: display text plus the index of its cell format.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub cell_type: CellType,
    /// Index into the workbook's resolved `cellXfs` styles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_idx: Option<u32>,
}
