//! Package-level parts: workbook relationships, the sheet list, shared
//! strings and the stylesheet.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::Result;
use crate::styles::parse_styles;
use crate::types::StyleSheet;
use crate::xml_helpers::{attr_bool, attr_string};

use super::worksheet::SheetInfo;

/// Part paths reachable from `xl/_rels/workbook.xml.rels`, as full archive paths.
#[derive(Default, Debug)]
pub(super) struct WorkbookRelationships {
    /// Relationship id to worksheet part, e.g. `rId1` to `xl/worksheets/sheet1.xml`.
    pub worksheets: HashMap<String, String>,
    pub shared_strings: Option<String>,
    pub styles: Option<String>,
}

/// The relationship types the reader follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelKind {
    Worksheet,
    SharedStrings,
    Styles,
}

impl RelKind {
    /// Classify by the last segment of the type URI, which is stable across
    /// the transitional and strict namespaces.
    fn from_type(rel_type: &str) -> Option<Self> {
        match rel_type.rsplit('/').next()? {
            "worksheet" => Some(Self::Worksheet),
            "sharedStrings" => Some(Self::SharedStrings),
            "styles" => Some(Self::Styles),
            _ => None,
        }
    }
}

/// Targets are relative to `xl/` unless absolute within the package.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

pub(super) fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> WorkbookRelationships {
    match archive.by_name("xl/_rels/workbook.xml.rels") {
        Ok(file) => parse_relationships_xml(BufReader::new(file)),
        Err(err) => {
            tracing::debug!(error = %err, "no workbook relationships, using default part paths");
            WorkbookRelationships::default()
        }
    }
}

fn parse_relationships_xml<R: BufRead>(reader: R) -> WorkbookRelationships {
    let mut rels = WorkbookRelationships::default();
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let kind = attr_string(e, b"Type").as_deref().and_then(RelKind::from_type);
                let (Some(kind), Some(target)) = (kind, attr_string(e, b"Target")) else {
                    buf.clear();
                    continue;
                };
                let path = resolve_target(&target);
                match kind {
                    RelKind::Worksheet => {
                        if let Some(id) = attr_string(e, b"Id").filter(|id| !id.is_empty()) {
                            rels.worksheets.insert(id, path);
                        }
                    }
                    RelKind::SharedStrings => rels.shared_strings = Some(path),
                    RelKind::Styles => rels.styles = Some(path),
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    rels
}

/// What `xl/workbook.xml` says about the whole workbook.
#[derive(Debug, Default)]
pub(super) struct WorkbookInfo {
    /// Sheet names and part paths, in tab order.
    pub sheets: Vec<SheetInfo>,
    /// Date serials count from 1904-01-01 instead of 1900-01-01.
    pub date1904: bool,
}

pub(super) fn get_workbook_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<WorkbookInfo> {
    let file = archive.by_name("xl/workbook.xml")?;
    parse_workbook_xml(BufReader::new(file), relationships)
}

/// The `r:id` of a `<sheet>`, whatever prefix the relationships namespace got.
fn relationship_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some())
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn parse_workbook_xml<R: BufRead>(
    reader: R,
    relationships: &HashMap<String, String>,
) -> Result<WorkbookInfo> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);
    let mut info = WorkbookInfo::default();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"workbookPr" =>
            {
                info.date1904 = attr_bool(e, b"date1904").unwrap_or(false);
            }
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                let Some(name) = attr_string(e, b"name").filter(|n| !n.is_empty()) else {
                    buf.clear();
                    continue;
                };
                let path = relationship_id(e)
                    .and_then(|id| relationships.get(&id).cloned())
                    .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", info.sheets.len() + 1));
                info.sheets.push(SheetInfo { name, path });
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

/// Plain text of every shared string item, in table order.
///
/// Rich text runs are concatenated; phonetic runs (`<rPh>`) are skipped.
/// A workbook without a shared string part has an empty table.
pub(super) fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Vec<String> {
    match archive.by_name(path.unwrap_or("xl/sharedStrings.xml")) {
        Ok(file) => parse_shared_strings_xml(BufReader::new(file)),
        Err(_) => Vec::new(),
    }
}

fn parse_shared_strings_xml<R: BufRead>(reader: R) -> Vec<String> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut item = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    item.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            // <si/> still takes a slot in the table
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::Text(ref e)) if in_t => {
                if let Ok(text) = e.unescape() {
                    item.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut item));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    strings
}

/// The stylesheet, or an empty one when the package has none.
pub(super) fn parse_stylesheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<StyleSheet> {
    match archive.by_name(path.unwrap_or("xl/styles.xml")) {
        Ok(file) => parse_styles(BufReader::new(file)),
        Err(_) => Ok(StyleSheet::default()),
    }
}
