//! Utilities for parsing and formatting Excel-style cell references.
//!
//! Coordinates are 1-indexed throughout: `A1` is `(row 1, col 1)`.

use crate::types::CellSpan;

/// Parse a cell reference like "B3" into `(row, col)`, 1-indexed.
///
/// `$` anchors are ignored. Returns `None` when either part is missing or zero.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    parse_cell_ref_bytes(cell_ref.trim().as_bytes())
}

/// Byte-slice variant of [`parse_cell_ref`] for raw quick-xml attribute values.
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            // Letters after digits make the reference malformed ("A1B").
            if saw_row {
                return None;
            }
            let upper = b.to_ascii_uppercase();
            col = col
                .checked_mul(26)?
                .checked_add(u32::from(upper - b'A') + 1)?;
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((row, col))
}

/// Parse a range like "A1:B10" (or a single "A1") into a normalized [`CellSpan`].
pub fn parse_cell_range(range: &str) -> Option<CellSpan> {
    let (start, end) = range.split_once(':').unwrap_or((range, range));
    let (start_row, start_col) = parse_cell_ref(start)?;
    let (end_row, end_col) = parse_cell_ref(end)?;
    Some(CellSpan::new(start_row, start_col, end_row, end_col))
}

/// Convert a 1-indexed column number to its letters (1 → "A", 28 → "AB").
pub fn column_name(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Format 1-indexed coordinates as a cell name (`(2, 3)` → "C2").
pub fn cell_name(row: u32, col: u32) -> String {
    format!("{}{row}", column_name(col))
}
