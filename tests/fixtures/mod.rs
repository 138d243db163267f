//! Builders for generating small XLSX packages in memory.
//!
//! Only the parts the converter reads are emitted: workbook relationships,
//! sheet names, shared strings, fonts, borders, alignment, number formats,
//! row and column formats, sizes and merges.
//!
//! ```rust
//! let xlsx = XlsxBuilder::new()
//!     .sheet(
//!         SheetBuilder::new("Sheet1")
//!             .cell("A1", "Hello", Some(StyleBuilder::new().border_all("thin")))
//!             .merge("A1:B2"),
//!     )
//!     .build();
//! let workbook = xlpdf::parser::parse(&xlsx).unwrap();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

// ============================================================================
// Style Builder
// ============================================================================

/// A cell format: font, per-side borders, alignment and number format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBuilder {
    /// Built-in number format id.
    num_fmt_id: Option<u32>,
    /// Custom format code, given an id from 164 up.
    num_fmt_code: Option<String>,
    font_name: Option<String>,
    font_size: Option<f64>,
    left: Option<String>,
    right: Option<String>,
    top: Option<String>,
    bottom: Option<String>,
    horizontal: Option<String>,
    vertical: Option<String>,
}

impl StyleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn font(mut self, name: &str, size: f64) -> Self {
        self.font_name = Some(name.to_string());
        self.font_size = Some(size);
        self
    }

    /// Same border style on all four sides.
    #[must_use]
    pub fn border_all(mut self, style: &str) -> Self {
        for side in [
            &mut self.left,
            &mut self.right,
            &mut self.top,
            &mut self.bottom,
        ] {
            *side = Some(style.to_string());
        }
        self
    }

    #[must_use]
    pub fn border_left(mut self, style: &str) -> Self {
        self.left = Some(style.to_string());
        self
    }

    #[must_use]
    pub fn border_bottom(mut self, style: &str) -> Self {
        self.bottom = Some(style.to_string());
        self
    }

    #[must_use]
    pub fn align(mut self, horizontal: &str, vertical: &str) -> Self {
        self.horizontal = Some(horizontal.to_string());
        self.vertical = Some(vertical.to_string());
        self
    }

    #[must_use]
    pub fn num_fmt_id(mut self, id: u32) -> Self {
        self.num_fmt_id = Some(id);
        self
    }

    #[must_use]
    pub fn num_fmt(mut self, code: &str) -> Self {
        self.num_fmt_code = Some(code.to_string());
        self
    }

    fn has_border(&self) -> bool {
        self.left.is_some() || self.right.is_some() || self.top.is_some() || self.bottom.is_some()
    }
}

// ============================================================================
// Cell Value
// ============================================================================

#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Error(String),
    InlineString(String),
    /// Style only.
    Empty,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

// ============================================================================
// Sheet Builder
// ============================================================================

#[derive(Debug, Clone)]
struct CellEntry {
    cell_ref: String,
    value: CellValue,
    style: Option<StyleBuilder>,
}

#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    name: String,
    dimension: Option<String>,
    default_col_width: Option<f64>,
    default_row_height: Option<f64>,
    cells: Vec<CellEntry>,
    merges: Vec<String>,
    /// `(min, max, width, hidden)`
    cols: Vec<(u32, u32, f64, bool)>,
    /// row -> `(height, hidden)`
    rows: BTreeMap<u32, (Option<f64>, bool)>,
    /// Formats of whole rows (`customFormat`) and column ranges.
    row_styles: BTreeMap<u32, StyleBuilder>,
    col_styles: Vec<(u32, u32, StyleBuilder)>,
}

impl SheetBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cell<V: Into<CellValue>>(
        mut self,
        cell_ref: &str,
        value: V,
        style: Option<StyleBuilder>,
    ) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: value.into(),
            style,
        });
        self
    }

    #[must_use]
    pub fn styled_cell(self, cell_ref: &str, style: StyleBuilder) -> Self {
        self.cell(cell_ref, CellValue::Empty, Some(style))
    }

    #[must_use]
    pub fn merge(mut self, range: &str) -> Self {
        self.merges.push(range.to_string());
        self
    }

    #[must_use]
    pub fn dimension(mut self, range: &str) -> Self {
        self.dimension = Some(range.to_string());
        self
    }

    #[must_use]
    pub fn defaults(mut self, col_width: f64, row_height: f64) -> Self {
        self.default_col_width = Some(col_width);
        self.default_row_height = Some(row_height);
        self
    }

    #[must_use]
    pub fn col_width(mut self, min: u32, max: u32, width: f64) -> Self {
        self.cols.push((min, max, width, false));
        self
    }

    #[must_use]
    pub fn hide_cols(mut self, min: u32, max: u32) -> Self {
        self.cols.push((min, max, 8.43, true));
        self
    }

    #[must_use]
    pub fn row_height(mut self, row: u32, height: f64) -> Self {
        self.rows.entry(row).or_default().0 = Some(height);
        self
    }

    #[must_use]
    pub fn hide_row(mut self, row: u32) -> Self {
        self.rows.entry(row).or_default().1 = true;
        self
    }

    #[must_use]
    pub fn row_style(mut self, row: u32, style: StyleBuilder) -> Self {
        self.row_styles.insert(row, style);
        self
    }

    #[must_use]
    pub fn col_style(mut self, min: u32, max: u32, style: StyleBuilder) -> Self {
        self.col_styles.push((min, max, style));
        self
    }

    fn styles(&self) -> impl Iterator<Item = &StyleBuilder> {
        self.cells
            .iter()
            .filter_map(|c| c.style.as_ref())
            .chain(self.row_styles.values())
            .chain(self.col_styles.iter().map(|(_, _, style)| style))
    }
}

// ============================================================================
// XLSX Builder
// ============================================================================

#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetBuilder>,
    date1904: bool,
}

impl XlsxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Date serials count from 1904-01-01.
    #[must_use]
    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut styles = StylesCollector::new();
        let mut strings = SharedStrings::default();
        for style in self.sheets.iter().flat_map(SheetBuilder::styles) {
            styles.add_style(style);
        }
        for cell in self.sheets.iter().flat_map(|s| &s.cells) {
            if let CellValue::String(text) = &cell.value {
                strings.intern(text);
            }
        }

        let mut package = Package::new();
        package.add("[Content_Types].xml", content_types(self.sheets.len()));
        package.add("xl/_rels/workbook.xml.rels", workbook_rels(self.sheets.len()));
        package.add("xl/workbook.xml", workbook(&self.sheets, self.date1904));
        package.add("xl/styles.xml", styles.to_xml());
        if !strings.0.is_empty() {
            package.add("xl/sharedStrings.xml", strings.to_xml());
        }
        for (n, sheet) in (1..).zip(&self.sheets) {
            package.add(
                &format!("xl/worksheets/sheet{n}.xml"),
                sheet_xml(sheet, &strings, &styles),
            );
        }
        package.finish()
    }
}

/// Deflated zip archive being assembled part by part.
struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl Package {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(zip::CompressionMethod::Deflated),
        }
    }

    fn add(&mut self, path: &str, body: String) {
        self.zip.start_file(path, self.options).unwrap();
        self.zip.write_all(body.as_bytes()).unwrap();
    }

    fn finish(mut self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

// ============================================================================
// Part Writers
// ============================================================================

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Starts a part with the XML declaration and an opened root element.
/// `root` is everything inside the opening tag, attributes included.
fn part(root: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><{root}>"#)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Ordered, deduplicated shared string table.
#[derive(Debug, Default)]
struct SharedStrings(Vec<String>);

impl SharedStrings {
    fn intern(&mut self, text: &str) {
        if !self.0.iter().any(|s| s == text) {
            self.0.push(text.to_string());
        }
    }

    fn index_of(&self, text: &str) -> usize {
        self.0.iter().position(|s| s == text).unwrap_or(0)
    }

    fn to_xml(&self) -> String {
        let n = self.0.len();
        let mut xml = part(&format!(
            r#"sst xmlns="{MAIN_NS}" count="{n}" uniqueCount="{n}""#
        ));
        for text in &self.0 {
            let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(text));
        }
        xml + "</sst>"
    }
}

/// First id available to custom number formats.
const CUSTOM_NUM_FMT_BASE: u32 = 164;

/// Deduplicates fonts, borders and formats into `styles.xml` tables.
#[derive(Debug, Default)]
struct StylesCollector {
    /// Custom format codes, numbered from [`CUSTOM_NUM_FMT_BASE`].
    num_fmts: Vec<String>,
    fonts: Vec<(String, f64)>,
    /// Left, right, top, bottom.
    borders: Vec<[Option<String>; 4]>,
    /// `(num_fmt_id, font_id, border_id, alignment)`
    formats: Vec<(u32, usize, usize, Option<(String, String)>)>,
    registered: Vec<(StyleBuilder, usize)>,
}

impl StylesCollector {
    fn new() -> Self {
        Self {
            fonts: vec![("Calibri".to_string(), 11.0)],
            borders: vec![Default::default()],
            num_fmts: Vec::new(),
            formats: vec![(0, 0, 0, None)],
            registered: Vec::new(),
        }
    }

    fn add_style(&mut self, style: &StyleBuilder) -> usize {
        if let Some(idx) = self.style_index(style) {
            return idx;
        }

        let font = (
            style.font_name.clone().unwrap_or_else(|| "Calibri".to_string()),
            style.font_size.unwrap_or(11.0),
        );
        let font_id = index_or_insert(&mut self.fonts, font);
        let border_id = if style.has_border() {
            let sides = [&style.left, &style.right, &style.top, &style.bottom].map(Option::clone);
            index_or_insert(&mut self.borders, sides)
        } else {
            0
        };
        let alignment = style.horizontal.clone().zip(style.vertical.clone());
        let num_fmt_id = match &style.num_fmt_code {
            Some(code) => CUSTOM_NUM_FMT_BASE + index_or_insert(&mut self.num_fmts, code.clone()) as u32,
            None => style.num_fmt_id.unwrap_or(0),
        };

        self.formats.push((num_fmt_id, font_id, border_id, alignment));
        let idx = self.formats.len() - 1;
        self.registered.push((style.clone(), idx));
        idx
    }

    fn style_index(&self, style: &StyleBuilder) -> Option<usize> {
        self.registered
            .iter()
            .find_map(|(known, idx)| (known == style).then_some(*idx))
    }

    fn to_xml(&self) -> String {
        let mut xml = part(&format!(r#"styleSheet xmlns="{MAIN_NS}""#));

        if !self.num_fmts.is_empty() {
            let _ = write!(xml, r#"<numFmts count="{}">"#, self.num_fmts.len());
            for (id, code) in (CUSTOM_NUM_FMT_BASE..).zip(&self.num_fmts) {
                let _ = write!(
                    xml,
                    r#"<numFmt numFmtId="{id}" formatCode="{}"/>"#,
                    escape_xml(code)
                );
            }
            xml += "</numFmts>";
        }

        let _ = write!(xml, r#"<fonts count="{}">"#, self.fonts.len());
        for (name, size) in &self.fonts {
            let _ = write!(xml, r#"<font><sz val="{size}"/><name val="{}"/></font>"#, escape_xml(name));
        }
        xml += "</fonts>";

        xml += concat!(
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill>"#,
            r#"<fill><patternFill patternType="gray125"/></fill></fills>"#
        );

        let _ = write!(xml, r#"<borders count="{}">"#, self.borders.len());
        for sides in &self.borders {
            xml += "<border>";
            for (edge, side) in ["left", "right", "top", "bottom"].into_iter().zip(sides) {
                let _ = match side {
                    Some(kind) => write!(xml, r#"<{edge} style="{kind}"><color auto="1"/></{edge}>"#),
                    None => write!(xml, "<{edge}/>"),
                };
            }
            xml += "<diagonal/></border>";
        }
        xml += "</borders>";

        xml += r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#;

        let _ = write!(xml, r#"<cellXfs count="{}">"#, self.formats.len());
        for (num_fmt_id, font_id, border_id, alignment) in &self.formats {
            let _ = write!(
                xml,
                r#"<xf numFmtId="{num_fmt_id}" fontId="{font_id}" fillId="0" borderId="{border_id}" xfId="0""#
            );
            let _ = match alignment {
                Some((h, v)) => write!(
                    xml,
                    r#" applyAlignment="1"><alignment horizontal="{h}" vertical="{v}"/></xf>"#
                ),
                None => write!(xml, "/>"),
            };
        }
        xml + "</cellXfs></styleSheet>"
    }
}

fn index_or_insert<T: PartialEq>(items: &mut Vec<T>, item: T) -> usize {
    match items.iter().position(|known| *known == item) {
        Some(idx) => idx,
        None => {
            items.push(item);
            items.len() - 1
        }
    }
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = part(r#"Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types""#);
    xml += r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#;
    xml += r#"<Default Extension="xml" ContentType="application/xml"/>"#;
    for n in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml + "</Types>"
}

/// Worksheets take `rId1..=rIdN`; styles and shared strings follow.
fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = part(&format!(r#"Relationships xmlns="{PKG_REL_NS}""#));
    let targets = (1..=sheet_count)
        .map(|n| ("worksheet", format!("worksheets/sheet{n}.xml")))
        .chain([
            ("styles", "styles.xml".to_string()),
            ("sharedStrings", "sharedStrings.xml".to_string()),
        ]);
    for (id, (kind, target)) in (1..).zip(targets) {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{id}" Type="{REL_NS}/{kind}" Target="{target}"/>"#
        );
    }
    xml + "</Relationships>"
}

fn workbook(sheets: &[SheetBuilder], date1904: bool) -> String {
    let mut xml = part(&format!(r#"workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}""#));
    if date1904 {
        xml += r#"<workbookPr date1904="1"/>"#;
    }
    xml += "<sheets>";
    for (n, sheet) in (1..).zip(sheets) {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape_xml(&sheet.name)
        );
    }
    xml + "</sheets></workbook>"
}

/// Row number of a reference like "B12".
fn ref_row(cell_ref: &str) -> u32 {
    cell_ref
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .unwrap()
}

fn cell_xml(out: &mut String, cell: &CellEntry, strings: &SharedStrings, styles: &StylesCollector) {
    let style = cell
        .style
        .as_ref()
        .and_then(|s| styles.style_index(s))
        .map(|idx| format!(r#" s="{idx}""#))
        .unwrap_or_default();
    let open = format!(r#"<c r="{}"{style}"#, cell.cell_ref);
    let _ = match &cell.value {
        CellValue::String(text) => write!(out, r#"{open} t="s"><v>{}</v></c>"#, strings.index_of(text)),
        CellValue::Number(n) => write!(out, "{open}><v>{n}</v></c>"),
        CellValue::Boolean(b) => write!(out, r#"{open} t="b"><v>{}</v></c>"#, u8::from(*b)),
        CellValue::Error(code) => write!(out, r#"{open} t="e"><v>{}</v></c>"#, escape_xml(code)),
        CellValue::InlineString(text) => {
            write!(out, r#"{open} t="inlineStr"><is><t>{}</t></is></c>"#, escape_xml(text))
        }
        CellValue::Empty => write!(out, "{open}/>"),
    };
}

fn sheet_xml(sheet: &SheetBuilder, strings: &SharedStrings, styles: &StylesCollector) -> String {
    let mut xml = part(&format!(r#"worksheet xmlns="{MAIN_NS}""#));

    if let Some(dim) = &sheet.dimension {
        let _ = write!(xml, r#"<dimension ref="{dim}"/>"#);
    }

    if sheet.default_col_width.is_some() || sheet.default_row_height.is_some() {
        xml += "<sheetFormatPr";
        if let Some(w) = sheet.default_col_width {
            let _ = write!(xml, r#" defaultColWidth="{w}""#);
        }
        if let Some(h) = sheet.default_row_height {
            let _ = write!(xml, r#" defaultRowHeight="{h}""#);
        }
        xml += "/>";
    }

    if !sheet.cols.is_empty() || !sheet.col_styles.is_empty() {
        xml += "<cols>";
        for (min, max, width, hidden) in &sheet.cols {
            let hidden = if *hidden { r#" hidden="1""# } else { "" };
            let _ = write!(
                xml,
                r#"<col min="{min}" max="{max}" width="{width}" customWidth="1"{hidden}/>"#
            );
        }
        for (min, max, style) in &sheet.col_styles {
            let idx = styles.style_index(style).unwrap_or(0);
            let width = sheet.default_col_width.unwrap_or(9.140625);
            let _ = write!(xml, r#"<col min="{min}" max="{max}" width="{width}" style="{idx}"/>"#);
        }
        xml += "</cols>";
    }

    // Rows carry cells, explicit sizing or a row format.
    let mut rows: BTreeMap<u32, Vec<&CellEntry>> = sheet
        .rows
        .keys()
        .chain(sheet.row_styles.keys())
        .map(|row| (*row, Vec::new()))
        .collect();
    for cell in &sheet.cells {
        rows.entry(ref_row(&cell.cell_ref)).or_default().push(cell);
    }

    xml += "<sheetData>";
    for (row, cells) in rows {
        let _ = write!(xml, r#"<row r="{row}""#);
        if let Some((height, hidden)) = sheet.rows.get(&row) {
            if let Some(h) = height {
                let _ = write!(xml, r#" ht="{h}" customHeight="1""#);
            }
            if *hidden {
                xml += r#" hidden="1""#;
            }
        }
        if let Some(idx) = sheet.row_styles.get(&row).and_then(|s| styles.style_index(s)) {
            let _ = write!(xml, r#" s="{idx}" customFormat="1""#);
        }
        xml += ">";
        for cell in cells {
            cell_xml(&mut xml, cell, strings, styles);
        }
        xml += "</row>";
    }
    xml += "</sheetData>";

    if !sheet.merges.is_empty() {
        let _ = write!(xml, r#"<mergeCells count="{}">"#, sheet.merges.len());
        for range in &sheet.merges {
            let _ = write!(xml, r#"<mergeCell ref="{range}"/>"#);
        }
        xml += "</mergeCells>";
    }

    xml + "</worksheet>"
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// A single sheet with one string cell.
#[must_use]
pub fn xlsx_with_text(cell_ref: &str, text: &str) -> Vec<u8> {
    XlsxBuilder::new()
        .sheet(SheetBuilder::new("Sheet1").cell(cell_ref, text, None))
        .build()
}
