//! Main XLSX parser
//!
//! Orchestrates the parsing of all components from the ZIP archive.

mod relationships;
pub(crate) mod styles;
mod worksheet;

use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

use crate::error::Result;
use crate::types::Workbook;

use relationships::{
    get_workbook_info, parse_shared_strings, parse_stylesheet, parse_workbook_relationships,
};
use styles::{resolve_styles, NumberFormats};
use worksheet::parse_sheet;

/// Parse an XLSX file from bytes.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    // Parse workbook relationships first to get actual file paths
    let relationships = parse_workbook_relationships(&mut archive);

    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref());
    tracing::debug!(count = shared_strings.len(), "parsed shared strings");

    let stylesheet = parse_stylesheet(&mut archive, relationships.styles.as_deref())?;
    let styles = resolve_styles(&stylesheet);
    tracing::debug!(
        fonts = stylesheet.fonts.len(),
        borders = stylesheet.borders.len(),
        cell_xfs = stylesheet.cell_xfs.len(),
        num_fmts = stylesheet.num_fmts.len(),
        "parsed stylesheet"
    );

    let workbook_info = get_workbook_info(&mut archive, &relationships.worksheets)?;
    let formats = NumberFormats::new(&stylesheet, workbook_info.date1904);

    let mut sheets = Vec::with_capacity(workbook_info.sheets.len());
    for info in &workbook_info.sheets {
        let sheet = parse_sheet(&mut archive, info, &shared_strings, &formats)?;
        tracing::debug!(
            sheet = %sheet.name,
            path = %info.path,
            cells = sheet.cells.len(),
            merges = sheet.merges.len(),
            "parsed worksheet"
        );
        sheets.push(sheet);
    }

    Ok(Workbook { sheets, styles })
}

/// Read and parse an XLSX file from disk.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Workbook> {
    let data = std::fs::read(path)?;
    parse(&data)
}
