//! Worksheet parsing - parses individual sheet XML into Sheet structs.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_range, parse_cell_ref_bytes};
use crate::error::Result;
use crate::types::{Cell, ColWidth, Sheet};
use crate::xml_helpers::{attr_bool, attr_f64, attr_string, attr_u32};

use super::styles::{resolve_cell_value, NumberFormats};

/// Sheet metadata from workbook.xml
#[derive(Debug)]
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

/// Text gathered from the children of one `<c>` element.
#[derive(Default)]
struct CellContents {
    /// `<v>` text
    value: Option<String>,
    /// Concatenated `<is>/<t>` (or `<is>/<r>/<t>`) text
    inline: Option<String>,
}

/// Read the children of a `<c>` start tag up to its matching end tag.
fn read_cell_contents<R: BufRead>(xml: &mut Reader<R>, buf: &mut Vec<u8>) -> Result<CellContents> {
    let mut contents = CellContents::default();
    let mut in_v = false;
    let mut in_is = false;
    let mut in_t = false;

    loop {
        buf.clear();
        match xml.read_event_into(buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"v" => in_v = true,
                b"is" => in_is = true,
                b"t" if in_is => {
                    in_t = true;
                    contents.inline.get_or_insert_with(String::new);
                }
                _ => {}
            },
            Event::Text(ref text) => {
                if in_v || in_t {
                    let unescaped = text.unescape()?;
                    let target = if in_v {
                        &mut contents.value
                    } else {
                        &mut contents.inline
                    };
                    target.get_or_insert_with(String::new).push_str(&unescaped);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" => in_v = false,
                b"is" => in_is = false,
                b"t" => in_t = false,
                b"c" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(contents)
}

fn parse_col(e: &BytesStart) -> Option<ColWidth> {
    let min = attr_u32(e, b"min")?;
    let max = attr_u32(e, b"max").unwrap_or(min);
    if min == 0 || max < min {
        return None;
    }
    Some(ColWidth {
        min,
        max,
        width: attr_f64(e, b"width"),
        hidden: attr_bool(e, b"hidden").unwrap_or(false),
        style: attr_u32(e, b"style"),
    })
}

/// Parse a single worksheet
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    shared_strings: &[String],
    formats: &NumberFormats,
) -> Result<Sheet> {
    let file = archive.by_name(&info.path)?;
    parse_sheet_xml(BufReader::new(file), &info.name, shared_strings, formats)
}

/// Parse worksheet XML from any buffered reader.
pub(super) fn parse_sheet_xml<R: BufRead>(
    reader: R,
    name: &str,
    shared_strings: &[String],
    formats: &NumberFormats,
) -> Result<Sheet> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut sheet = Sheet::new(name);

    let mut buf = Vec::new();
    let mut cell_buf = Vec::new();
    let mut current_row: u32 = 0;
    let mut last_col: u32 = 0;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(_) | Event::Empty(_))) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start_event = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"dimension" => {
                        sheet.dimension = attr_string(e, b"ref")
                            .as_deref()
                            .and_then(parse_cell_range);
                    }

                    b"sheetFormatPr" => {
                        // baseColWidth alone keeps the workbook default width.
                        if let Some(w) = attr_f64(e, b"defaultColWidth") {
                            sheet.default_col_width = w;
                        }
                        if let Some(h) = attr_f64(e, b"defaultRowHeight") {
                            sheet.default_row_height = h;
                        }
                    }

                    b"col" => {
                        if let Some(col) = parse_col(e) {
                            sheet.col_widths.push(col);
                        }
                    }

                    b"row" => {
                        current_row = attr_u32(e, b"r").unwrap_or(current_row + 1);
                        last_col = 0;

                        if let Some(ht) = attr_f64(e, b"ht") {
                            sheet.row_heights.insert(current_row, ht);
                        }
                        if attr_bool(e, b"hidden").unwrap_or(false) {
                            sheet.hidden_rows.insert(current_row);
                        }
                        if attr_bool(e, b"customFormat").unwrap_or(false) {
                            if let Some(s) = attr_u32(e, b"s") {
                                sheet.row_styles.insert(current_row, s);
                            }
                        }
                        sheet.used_max_row = sheet.used_max_row.max(current_row);
                    }

                    b"c" => {
                        let mut position: Option<(u32, u32)> = None;
                        let mut cell_type = CellTypeTag::Default;
                        let mut style_idx: Option<u32> = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => position = parse_cell_ref_bytes(&attr.value),
                                b"t" => cell_type = parse_cell_type_tag(&attr.value),
                                b"s" => {
                                    style_idx = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(|s| s.parse().ok());
                                }
                                _ => {}
                            }
                        }

                        // Cells without `r` follow the previous cell in the row.
                        let (row, col) = position.unwrap_or((current_row.max(1), last_col + 1));
                        last_col = col;

                        let contents = if is_start_event {
                            read_cell_contents(&mut xml, &mut cell_buf)?
                        } else {
                            CellContents::default()
                        };

                        let (value, cell_type) = resolve_cell_value(
                            contents.value.as_deref(),
                            contents.inline,
                            cell_type,
                            shared_strings,
                            formats,
                            style_idx,
                        );

                        sheet.touch(row, col);
                        sheet.cells.insert(
                            (row, col),
                            Cell {
                                value,
                                cell_type,
                                style_idx,
                            },
                        );
                    }

                    b"mergeCell" => {
                        if let Some(span) = attr_string(e, b"ref").as_deref().and_then(parse_cell_range)
                        {
                            sheet.touch(span.end_row, span.end_col);
                            sheet.merges.push(span);
                        }
                    }

                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{CellSpan, CellType, DEFAULT_COL_WIDTH};

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="A1:C3"/>
  <sheetFormatPr defaultRowHeight="14.25"/>
  <cols>
    <col min="1" max="2" width="10" customWidth="1"/>
    <col min="3" max="3" width="4" hidden="1"/>
  </cols>
  <sheetData>
    <row r="1" ht="20" customHeight="1">
      <c r="A1" s="1" t="s"><v>1</v></c>
      <c r="B1" t="inlineStr"><is><r><t>rich </t></r><r><t>text</t></r></is></c>
      <c r="C1" s="2"/>
    </row>
    <row r="2" hidden="1">
      <c r="A2"><f>1+1</f><v>2</v></c>
      <c t="b"><v>1</v></c>
      <c t="str"><v>a &amp; b</v></c>
    </row>
  </sheetData>
  <mergeCells count="1"><mergeCell ref="A3:C3"/></mergeCells>
</worksheet>"#;

    fn parse(xml: &str) -> Sheet {
        let strings = vec!["zero".to_string(), "Header".to_string()];
        parse_sheet_xml(xml.as_bytes(), "Data", &strings, &NumberFormats::default()).unwrap()
    }

    #[test]
    fn reads_dimension_and_sizes() {
        let sheet = parse(SHEET);
        assert_eq!(sheet.name, "Data");
        assert_eq!(sheet.dimension, Some(CellSpan::new(1, 1, 3, 3)));
        assert_eq!(sheet.default_row_height, 14.25);
        assert_eq!(sheet.col_width(1), 10.0);
        assert_eq!(sheet.col_width(2), 10.0);
        assert_eq!(sheet.col_width(3), 0.0);
        assert_eq!(sheet.row_height(1), 20.0);
        assert_eq!(sheet.row_height(2), 0.0);
        assert_eq!(sheet.row_height(3), 14.25);
    }

    #[test]
    fn reads_cell_values() {
        let sheet = parse(SHEET);
        let a1 = sheet.cell(1, 1).unwrap();
        assert_eq!(a1.value.as_deref(), Some("Header"));
        assert_eq!(a1.style_idx, Some(1));
        assert_eq!(a1.cell_type, CellType::String);

        assert_eq!(sheet.cell(1, 2).unwrap().value.as_deref(), Some("rich text"));

        let c1 = sheet.cell(1, 3).unwrap();
        assert_eq!(c1.value, None);
        assert_eq!(c1.style_idx, Some(2));

        let a2 = sheet.cell(2, 1).unwrap();
        assert_eq!(a2.value.as_deref(), Some("2"));
        assert_eq!(a2.cell_type, CellType::Number);

        // Positions inferred from the previous cell
        assert_eq!(sheet.cell(2, 2).unwrap().value.as_deref(), Some("TRUE"));
        assert_eq!(sheet.cell(2, 3).unwrap().value.as_deref(), Some("a & b"));
    }

    #[test]
    fn reads_merges_and_extent() {
        let sheet = parse(SHEET);
        assert_eq!(sheet.merges, vec![CellSpan::new(3, 1, 3, 3)]);
        assert_eq!(sheet.extent(), (3, 3));
    }

    #[test]
    fn extent_without_dimension_uses_cells_and_merges() {
        let xml = r#"<worksheet><sheetData>
  <row r="2"><c r="B2"><v>1</v></c></row>
</sheetData><mergeCells><mergeCell ref="D5:E6"/></mergeCells></worksheet>"#;
        let sheet = parse(xml);
        assert_eq!(sheet.dimension, None);
        assert_eq!(sheet.extent(), (6, 5));
    }

    #[test]
    fn base_col_width_keeps_default_width() {
        let xml = r#"<worksheet><sheetFormatPr baseColWidth="8" defaultRowHeight="15"/></worksheet>"#;
        let sheet = parse(xml);
        assert_eq!(sheet.default_col_width, DEFAULT_COL_WIDTH);
        assert_eq!(sheet.col_width(4), DEFAULT_COL_WIDTH);

        let xml = r#"<worksheet><sheetFormatPr baseColWidth="8" defaultColWidth="12.5"/></worksheet>"#;
        assert_eq!(parse(xml).default_col_width, 12.5);
    }

    #[test]
    fn reads_row_and_column_formats() {
        let xml = r#"<worksheet>
  <cols>
    <col min="2" max="4" width="9" style="3" customWidth="1"/>
    <col min="5" max="5" width="9"/>
  </cols>
  <sheetData>
    <row r="1" s="2" customFormat="1"><c r="A1" s="1"><v>1</v></c></row>
    <row r="2" s="5"/>
  </sheetData>
</worksheet>"#;
        let sheet = parse(xml);
        assert_eq!(sheet.col_widths[0].style, Some(3));
        assert_eq!(sheet.col_widths[1].style, None);
        assert_eq!(sheet.row_styles.get(&1), Some(&2));
        // `s` without customFormat is not a row format.
        assert_eq!(sheet.row_styles.get(&2), None);

        assert_eq!(sheet.style_index(1, 1), Some(1));
        assert_eq!(sheet.style_index(1, 3), Some(2));
        assert_eq!(sheet.style_index(2, 3), Some(3));
        assert_eq!(sheet.style_index(2, 5), None);
    }
}
