//! Read-side interface over a spreadsheet model.
//!
//! Layout only talks to [`WorkbookSource`], so any store that can answer
//! sizing, style and value lookups can be converted. [`Workbook`] is the
//! implementation backed by a parsed XLSX package.

use crate::error::{Result, XlpdfError};
use crate::types::{CellSpan, CellStyle, CellType, Sheet, Workbook};

/// Lookups the converter needs from a spreadsheet model.
///
/// Rows and columns are 1-indexed. Sizes are in spreadsheet-native units:
/// column widths in characters, row heights in points.
pub trait WorkbookSource {
    /// Sheet names in document order.
    fn sheet_names(&self) -> Vec<String>;

    /// `(max_row, max_col)` of the area to lay out.
    fn sheet_extent(&self, sheet: &str) -> Result<(u32, u32)>;

    fn row_height(&self, sheet: &str, row: u32) -> Result<f64>;

    fn col_width(&self, sheet: &str, col: u32) -> Result<f64>;

    /// Style of the cell, or the default style for unstyled cells.
    ///
    /// Cells without a format of their own take their row's, then their
    /// column's.
    fn cell_style(&self, sheet: &str, row: u32, col: u32) -> Result<CellStyle>;

    /// Display text of the cell; empty when the cell holds nothing.
    fn cell_value(&self, sheet: &str, row: u32, col: u32) -> Result<String>;

    /// Value type of the cell. Decides the side General alignment uses.
    fn cell_type(&self, _sheet: &str, _row: u32, _col: u32) -> Result<CellType> {
        Ok(CellType::String)
    }

    fn merge_ranges(&self, sheet: &str) -> Result<Vec<CellSpan>>;
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| XlpdfError::UnknownSheet(name.to_string()))
    }
}

impl WorkbookSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn sheet_extent(&self, sheet: &str) -> Result<(u32, u32)> {
        Ok(self.sheet(sheet)?.extent())
    }

    fn row_height(&self, sheet: &str, row: u32) -> Result<f64> {
        if row == 0 {
            return Err(XlpdfError::lookup(format!("{sheet} row 0"), "rows start at 1"));
        }
        Ok(self.sheet(sheet)?.row_height(row))
    }

    fn col_width(&self, sheet: &str, col: u32) -> Result<f64> {
        if col == 0 {
            return Err(XlpdfError::lookup(format!("{sheet} column 0"), "columns start at 1"));
        }
        Ok(self.sheet(sheet)?.col_width(col))
    }

    fn cell_style(&self, sheet: &str, row: u32, col: u32) -> Result<CellStyle> {
        let Some(idx) = self.sheet(sheet)?.style_index(row, col) else {
            return Ok(self.styles.first().cloned().unwrap_or_default());
        };
        self.styles.get(idx as usize).cloned().ok_or_else(|| {
            XlpdfError::lookup(
                format!("{sheet}!{}", crate::cell_ref::cell_name(row, col)),
                format!("style index {idx} out of range"),
            )
        })
    }

    fn cell_value(&self, sheet: &str, row: u32, col: u32) -> Result<String> {
        Ok(self
            .sheet(sheet)?
            .cell(row, col)
            .and_then(|c| c.value.clone())
            .unwrap_or_default())
    }

    fn cell_type(&self, sheet: &str, row: u32, col: u32) -> Result<CellType> {
        Ok(self
            .sheet(sheet)?
            .cell(row, col)
            .map_or(CellType::String, |c| c.cell_type))
    }

    fn merge_ranges(&self, sheet: &str) -> Result<Vec<CellSpan>> {
        Ok(self.sheet(sheet)?.merges.clone())
    }
}
