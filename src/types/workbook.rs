use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{Cell, CellSpan, CellStyle};

/// Excel's default column width in characters when `sheetFormatPr` has none.
pub const DEFAULT_COL_WIDTH: f64 = 9.140_625;

/// Excel's default row height in points when `sheetFormatPr` has none.
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// A complete Excel workbook
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Resolved styles indexed by `cellXfs` position.
    pub styles: Vec<CellStyle>,
}

/// Column definition from `<cols><col min max width hidden style/>`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColWidth {
    /// First column (1-indexed, inclusive)
    pub min: u32,
    /// Last column (1-indexed, inclusive)
    pub max: u32,
    /// Width in characters; `None` when the element only sets other attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default)]
    pub hidden: bool,
    /// Cell format applied to cells of these columns that have no `<c>` element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u32>,
}

/// A single worksheet, sizes kept in spreadsheet-native units.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    /// Declared `<dimension ref>`, if the sheet has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<CellSpan>,
    /// Largest row referenced by any row, cell or merge.
    pub used_max_row: u32,
    /// Largest column referenced by any cell or merge.
    pub used_max_col: u32,
    /// Default column width in characters.
    pub default_col_width: f64,
    /// Default row height in points.
    pub default_row_height: f64,
    pub col_widths: Vec<ColWidth>,
    /// Explicit row heights in points, keyed by 1-indexed row.
    pub row_heights: BTreeMap<u32, f64>,
    pub hidden_rows: HashSet<u32>,
    /// Row-level cell formats (`<row s customFormat="1">`), keyed by row.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub row_styles: BTreeMap<u32, u32>,
    /// Cells keyed by `(row, col)`, 1-indexed.
    #[serde(with = "cell_map")]
    pub cells: BTreeMap<(u32, u32), Cell>,
    pub merges: Vec<CellSpan>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_col_width: DEFAULT_COL_WIDTH,
            default_row_height: DEFAULT_ROW_HEIGHT,
            ..Self::default()
        }
    }

    /// `(max_row, max_col)` of the area to render.
    ///
    /// Uses the declared dimension when present, otherwise the used range.
    /// Never smaller than one cell.
    pub fn extent(&self) -> (u32, u32) {
        let (rows, cols) = match self.dimension {
            Some(dim) => (dim.end_row, dim.end_col),
            None => (self.used_max_row, self.used_max_col),
        };
        (rows.max(1), cols.max(1))
    }

    /// Column width in characters; hidden columns are 0.
    pub fn col_width(&self, col: u32) -> f64 {
        // Later <col> elements win, as in Excel.
        let def = self
            .col_widths
            .iter()
            .rev()
            .find(|c| (c.min..=c.max).contains(&col));
        match def {
            Some(c) if c.hidden => 0.0,
            Some(ColWidth {
                width: Some(width), ..
            }) => *width,
            _ => self.default_col_width,
        }
    }

    /// Row height in points; hidden rows are 0.
    pub fn row_height(&self, row: u32) -> f64 {
        if self.hidden_rows.contains(&row) {
            return 0.0;
        }
        self.row_heights
            .get(&row)
            .copied()
            .unwrap_or(self.default_row_height)
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Cell format index for a position: the cell's own, else its row's,
    /// else the first `<col>` covering it. Format 0 counts as unset at every
    /// level; `None` means the workbook default format.
    pub fn style_index(&self, row: u32, col: u32) -> Option<u32> {
        let set = |idx: &u32| *idx != 0;
        self.cell(row, col)
            .and_then(|c| c.style_idx)
            .filter(set)
            .or_else(|| self.row_styles.get(&row).copied().filter(set))
            .or_else(|| {
                self.col_widths
                    .iter()
                    .filter(|c| (c.min..=c.max).contains(&col))
                    .find_map(|c| c.style.filter(set))
            })
    }

    pub(crate) fn touch(&mut self, row: u32, col: u32) {
        self.used_max_row = self.used_max_row.max(row);
        self.used_max_col = self.used_max_col.max(col);
    }
}

/// Serialize the cell map as a list, since JSON keys must be strings.
mod cell_map {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use crate::types::Cell;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        row: u32,
        col: u32,
        #[serde(flatten)]
        cell: Cell,
    }

    pub fn serialize<S>(cells: &BTreeMap<(u32, u32), Cell>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<Entry> = cells
            .iter()
            .map(|(&(row, col), cell)| Entry {
                row,
                col,
                cell: cell.clone(),
            })
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<(u32, u32), Cell>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| ((e.row, e.col), e.cell))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn sizing_defaults_and_overrides() {
        let mut sheet = Sheet::new("S");
        sheet.col_widths.push(ColWidth {
            min: 2,
            max: 3,
            width: Some(20.0),
            hidden: false,
            style: None,
        });
        sheet.col_widths.push(ColWidth {
            min: 3,
            max: 3,
            width: Some(20.0),
            hidden: true,
            style: None,
        });
        sheet.row_heights.insert(2, 30.0);
        sheet.hidden_rows.insert(4);

        assert_eq!(sheet.col_width(1), DEFAULT_COL_WIDTH);
        assert_eq!(sheet.col_width(2), 20.0);
        assert_eq!(sheet.col_width(3), 0.0);
        assert_eq!(sheet.row_height(1), DEFAULT_ROW_HEIGHT);
        assert_eq!(sheet.row_height(2), 30.0);
        assert_eq!(sheet.row_height(4), 0.0);
    }

    #[test]
    fn style_index_falls_back_from_cell_to_row_to_column() {
        let mut sheet = Sheet::new("S");
        sheet.col_widths.push(ColWidth {
            min: 1,
            max: 4,
            width: None,
            hidden: false,
            style: Some(3),
        });
        sheet.row_styles.insert(2, 2);
        sheet.cells.insert(
            (2, 1),
            Cell {
                style_idx: Some(1),
                ..Cell::default()
            },
        );
        sheet.cells.insert((2, 3), Cell::default());

        assert_eq!(sheet.style_index(2, 1), Some(1));
        assert_eq!(sheet.style_index(2, 2), Some(2));
        // An unstyled <c> still picks up its row's format.
        assert_eq!(sheet.style_index(2, 3), Some(2));
        assert_eq!(sheet.style_index(1, 4), Some(3));
        assert_eq!(sheet.style_index(1, 5), None);

        // Format 0 on the cell defers to the row.
        sheet.cells.insert(
            (2, 4),
            Cell {
                style_idx: Some(0),
                ..Cell::default()
            },
        );
        assert_eq!(sheet.style_index(2, 4), Some(2));
    }

    #[test]
    fn extent_prefers_dimension() {
        let mut sheet = Sheet::new("S");
        assert_eq!(sheet.extent(), (1, 1));
        sheet.touch(7, 3);
        assert_eq!(sheet.extent(), (7, 3));
        sheet.dimension = Some(CellSpan::new(1, 1, 4, 2));
        assert_eq!(sheet.extent(), (4, 2));
    }

    #[test]
    fn cells_serialize_as_list() {
        let mut sheet = Sheet::new("S");
        sheet.cells.insert(
            (2, 3),
            Cell {
                value: Some("x".to_string()),
                ..Cell::default()
            },
        );
        let json = serde_json::to_value(&sheet).unwrap_or_default();
        assert_eq!(json["cells"][0]["row"], 2);
        assert_eq!(json["cells"][0]["col"], 3);
        assert_eq!(json["cells"][0]["value"], "x");
    }
}
