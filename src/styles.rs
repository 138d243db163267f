//! Parsing of xl/styles.xml
//!
//! Fonts, borders, custom number formats and cell formats (xf) are read;
//! fills and differential styles have no effect on the rendered page.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;

use crate::error::Result;
use crate::types::{
    BorderEdge, BorderStyle, CellXf, HAlign, RawAlignment, RawBorder, RawFont, StyleSheet, VAlign,
};
use crate::xml_helpers::{attr_string, attr_u32, attr_val, attr_val_f64};

fn edge_for(name: &str) -> Option<BorderEdge> {
    match name {
        "left" | "start" => Some(BorderEdge::Left),
        "right" | "end" => Some(BorderEdge::Right),
        "top" => Some(BorderEdge::Top),
        "bottom" => Some(BorderEdge::Bottom),
        _ => None,
    }
}

/// Parse styles.xml content
pub fn parse_styles<R: BufRead>(reader: R) -> Result<StyleSheet> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut stylesheet = StyleSheet::default();
    let mut buf = Vec::new();

    let mut in_fonts = false;
    let mut in_borders = false;
    let mut in_cell_xfs = false;

    let mut current_font: Option<RawFont> = None;
    let mut current_border: Option<RawBorder> = None;
    let mut current_xf: Option<CellXf> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(ref e) | Event::Empty(ref e))) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = e.local_name();
                let name_str = std::str::from_utf8(name.as_ref()).unwrap_or("");

                match name_str {
                    "numFmt" => {
                        if let (Some(id), Some(code)) =
                            (attr_u32(e, b"numFmtId"), attr_string(e, b"formatCode"))
                        {
                            stylesheet.num_fmts.push((id, code));
                        }
                    }

                    "fonts" => in_fonts = true,
                    "borders" => in_borders = true,
                    "cellXfs" => in_cell_xfs = true,

                    "font" if in_fonts => {
                        if is_empty {
                            stylesheet.fonts.push(RawFont::default());
                        } else {
                            current_font = Some(RawFont::default());
                        }
                    }

                    "sz" => {
                        if let Some(ref mut font) = current_font {
                            font.size = attr_val_f64(e);
                        }
                    }

                    "name" => {
                        if let Some(ref mut font) = current_font {
                            font.name = attr_val(e);
                        }
                    }

                    "color" if current_font.is_some() => {
                        if let Some(ref mut font) = current_font {
                            font.color_rgb = attr_string(e, b"rgb");
                        }
                    }

                    "border" if in_borders => {
                        if is_empty {
                            stylesheet.borders.push(RawBorder::default());
                        } else {
                            current_border = Some(RawBorder::default());
                        }
                    }

                    side if current_border.is_some() => {
                        if let (Some(edge), Some(border)) = (edge_for(side), current_border.as_mut()) {
                            if let Some(style) = attr_string(e, b"style") {
                                *border.style_mut(edge) = BorderStyle::from_xml(&style);
                            }
                        }
                    }

                    "xf" if in_cell_xfs => {
                        let xf = CellXf {
                            font_id: attr_u32(e, b"fontId"),
                            border_id: attr_u32(e, b"borderId"),
                            num_fmt_id: attr_u32(e, b"numFmtId"),
                            alignment: None,
                        };
                        if is_empty {
                            stylesheet.cell_xfs.push(xf);
                        } else {
                            current_xf = Some(xf);
                        }
                    }

                    "alignment" => {
                        if let Some(ref mut xf) = current_xf {
                            xf.alignment = Some(RawAlignment {
                                horizontal: attr_string(e, b"horizontal")
                                    .as_deref()
                                    .and_then(HAlign::from_xml),
                                vertical: attr_string(e, b"vertical")
                                    .as_deref()
                                    .and_then(VAlign::from_xml),
                            });
                        }
                    }

                    _ => {}
                }
            }

            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                let name_str = std::str::from_utf8(name.as_ref()).unwrap_or("");

                match name_str {
                    "fonts" => in_fonts = false,
                    "borders" => in_borders = false,
                    "cellXfs" => in_cell_xfs = false,

                    "font" => {
                        if let Some(font) = current_font.take() {
                            stylesheet.fonts.push(font);
                        }
                    }

                    "border" => {
                        if let Some(border) = current_border.take() {
                            stylesheet.borders.push(border);
                        }
                    }

                    "xf" if in_cell_xfs => {
                        if let Some(xf) = current_xf.take() {
                            stylesheet.cell_xfs.push(xf);
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

    Ok(stylesheet)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy&quot;年&quot;m&quot;月&quot;"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/></font>
    <font><b/><sz val="14"/><color rgb="FFFF0000"/><name val="SimSun"/></font>
  </fonts>
  <fills count="1"><fill><patternFill patternType="none"/></fill></fills>
  <borders count="2">
    <border/>
    <border>
      <left style="thin"><color auto="1"/></left>
      <right style="medium"/>
      <top/>
      <bottom style="dashed"/>
      <diagonal style="thick"/>
    </border>
  </borders>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="164" fontId="1" fillId="0" borderId="1" applyAlignment="1">
      <alignment horizontal="center" vertical="top" wrapText="1"/>
    </xf>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn parses_fonts_borders_and_xfs() {
        let sheet = parse_styles(STYLES.as_bytes()).unwrap();

        assert_eq!(sheet.fonts.len(), 2);
        assert_eq!(sheet.fonts[0].name.as_deref(), Some("Calibri"));
        assert_eq!(sheet.fonts[0].color_rgb, None);
        assert_eq!(sheet.fonts[1].size, Some(14.0));
        assert_eq!(sheet.fonts[1].color_rgb.as_deref(), Some("FFFF0000"));

        assert_eq!(sheet.borders.len(), 2);
        assert_eq!(sheet.borders[0].left, BorderStyle::None);
        let border = &sheet.borders[1];
        assert_eq!(border.left, BorderStyle::Thin);
        assert_eq!(border.right, BorderStyle::Medium);
        assert_eq!(border.top, BorderStyle::None);
        assert_eq!(border.bottom, BorderStyle::Dashed);

        assert_eq!(sheet.cell_xfs.len(), 2);
        assert_eq!(sheet.cell_xfs[0].font_id, Some(0));
        let xf = &sheet.cell_xfs[1];
        assert_eq!(xf.border_id, Some(1));
        assert_eq!(xf.num_fmt_id, Some(164));
        let align = xf.alignment.as_ref().unwrap();
        assert_eq!(align.horizontal, Some(HAlign::Center));
        assert_eq!(align.vertical, Some(VAlign::Top));
    }

    #[test]
    fn custom_number_formats_shadow_builtins() {
        let sheet = parse_styles(STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.num_fmts, vec![(164, "yyyy\"年\"m\"月\"".to_string())]);
        assert_eq!(sheet.format_code(164), Some("yyyy\"年\"m\"月\""));
        assert_eq!(sheet.format_code(14), Some("mm-dd-yy"));
        assert_eq!(sheet.format_code(163), None);

        let overridden = StyleSheet {
            num_fmts: vec![(14, "d/m/yyyy".to_string())],
            ..StyleSheet::default()
        };
        assert_eq!(overridden.format_code(14), Some("d/m/yyyy"));
    }

    #[test]
    fn ignores_cell_style_xfs() {
        let xml = r#"<styleSheet>
  <cellStyleXfs count="1"><xf fontId="3" borderId="3"/></cellStyleXfs>
  <cellXfs count="1"><xf fontId="0" borderId="0"/></cellXfs>
</styleSheet>"#;
        let sheet = parse_styles(xml.as_bytes()).unwrap();
        assert_eq!(sheet.cell_xfs.len(), 1);
        assert_eq!(sheet.cell_xfs[0].font_id, Some(0));
    }
}
