//! PDF output surface.
//!
//! Pages are buffered as content streams and the document is assembled in
//! [`PdfSurface::finish`], once every glyph that will be shown is known.
//! TrueType fonts are embedded whole as `CIDFontType2` descendants of a
//! `Type0` font with `Identity-H` encoding, so shown strings are glyph ids.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::error::{Result, XlpdfError};

use super::colors::Rgb;
use super::element::FontSpec;
use super::surface::DrawingSurface;

/// A4 portrait, in points.
pub const A4: (f64, f64) = (595.28, 841.89);

const SYSTEM_INFO: SystemInfo = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

#[allow(clippy::cast_possible_truncation)]
fn pt(v: f64) -> f32 {
    v as f32
}

/// Scale font units to the 1000-unit glyph space PDF font dictionaries use.
fn to_glyph_space(units: f64, units_per_em: f64) -> f32 {
    pt(units * 1000.0 / units_per_em)
}

#[derive(Debug, Clone, Copy)]
struct Glyph {
    id: u16,
    /// Horizontal advance in font units.
    advance: u16,
}

#[derive(Debug, Clone, Copy)]
struct FontMetrics {
    units_per_em: f64,
    ascender: f64,
    descender: f64,
    cap_height: f64,
    bbox: [f64; 4],
}

/// A registered font and the glyphs shown with it so far.
#[derive(Debug)]
struct FontEntry {
    family: String,
    resource_name: String,
    base_name: String,
    data: Vec<u8>,
    metrics: FontMetrics,
    /// Per-glyph advance cache, in font units so it holds for every size.
    glyphs: HashMap<char, Glyph>,
    /// Glyphs shown in the document, for the `W` array and `ToUnicode`.
    used: BTreeMap<u16, (char, u16)>,
}

impl FontEntry {
    fn parse(family: &str, index: usize, data: Vec<u8>) -> Result<Self> {
        let face = Face::parse(&data, 0)
            .map_err(|e| XlpdfError::Font(format!("{family}: {e}")))?;
        let bbox = face.global_bounding_box();
        let metrics = FontMetrics {
            units_per_em: f64::from(face.units_per_em().max(1)),
            ascender: f64::from(face.ascender()),
            descender: f64::from(face.descender()),
            cap_height: f64::from(face.capital_height().unwrap_or(face.ascender())),
            bbox: [
                f64::from(bbox.x_min),
                f64::from(bbox.y_min),
                f64::from(bbox.x_max),
                f64::from(bbox.y_max),
            ],
        };

        let mut base_name: String = family.chars().filter(char::is_ascii_alphanumeric).collect();
        if base_name.is_empty() {
            base_name = format!("Font{index}");
        }

        Ok(Self {
            family: family.to_string(),
            resource_name: format!("F{index}"),
            base_name,
            data,
            metrics,
            glyphs: HashMap::new(),
            used: BTreeMap::new(),
        })
    }

    fn glyph(&mut self, ch: char) -> Result<Glyph> {
        if let Some(glyph) = self.glyphs.get(&ch) {
            return Ok(*glyph);
        }
        let face = Face::parse(&self.data, 0)
            .map_err(|e| XlpdfError::Font(format!("{}: {e}", self.family)))?;
        // Missing characters map to .notdef
        let id = face.glyph_index(ch).map_or(0, |g| g.0);
        let advance = face.glyph_hor_advance(GlyphId(id)).unwrap_or(0);
        let glyph = Glyph { id, advance };
        self.glyphs.insert(ch, glyph);
        Ok(glyph)
    }

    fn width(&mut self, text: &str, size: f64) -> Result<f64> {
        let mut units = 0.0;
        for ch in text.chars() {
            units += f64::from(self.glyph(ch)?.advance);
        }
        Ok(units * size / self.metrics.units_per_em)
    }

    fn ascent(&self, size: f64) -> f64 {
        self.metrics.ascender * size / self.metrics.units_per_em
    }
}

/// Content of one page plus the fonts it references.
struct PageBuffer {
    content: Content,
    fonts: Vec<usize>,
}

/// Drawing surface that produces a PDF document.
pub struct PdfSurface {
    page_width: f64,
    page_height: f64,
    fonts: Vec<FontEntry>,
    pages: Vec<PageBuffer>,
    current_font: Option<usize>,
    font_size: f64,
    line_width: f64,
    cursor: (f64, f64),
}

impl std::fmt::Debug for PdfSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfSurface")
            .field("page_width", &self.page_width)
            .field("page_height", &self.page_height)
            .field("fonts", &self.fonts.len())
            .field("pages", &self.pages.len())
            .finish_non_exhaustive()
    }
}

impl Default for PdfSurface {
    fn default() -> Self {
        Self::new(A4.0, A4.1)
    }
}

impl PdfSurface {
    /// Surface whose pages are `page_width` x `page_height` points.
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            page_width,
            page_height,
            fonts: Vec::new(),
            pages: Vec::new(),
            current_font: None,
            font_size: 11.0,
            line_width: 1.0,
            cursor: (0.0, 0.0),
        }
    }

    /// Register TrueType/OpenType font data under a family name.
    ///
    /// The first registered font is the default, used for families that
    /// were never registered.
    pub fn register_font(&mut self, family: &str, data: Vec<u8>) -> Result<()> {
        let entry = FontEntry::parse(family, self.fonts.len(), data)?;
        tracing::debug!(family, resource = %entry.resource_name, "registered font");
        self.fonts.push(entry);
        Ok(())
    }

    /// Read a font file and register it.
    pub fn register_font_file(&mut self, family: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| XlpdfError::Font(format!("{}: {e}", path.display())))?;
        self.register_font(family, data)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn find_font(&self, spec: &FontSpec) -> Option<usize> {
        let styled = spec
            .style
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|style| format!("{} {style}", spec.family));
        styled
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(spec.family.as_str()))
            .find_map(|name| {
                self.fonts
                    .iter()
                    .position(|f| f.family.eq_ignore_ascii_case(name))
            })
    }

    /// The selected font, falling back to the default font.
    fn active_font(&self) -> Result<usize> {
        match self.current_font {
            Some(idx) => Ok(idx),
            None if !self.fonts.is_empty() => Ok(0),
            None => Err(XlpdfError::Font("no font registered".to_string())),
        }
    }

    fn page(&mut self) -> Result<&mut PageBuffer> {
        if self.pages.is_empty() {
            self.new_page()?;
        }
        self.pages
            .last_mut()
            .ok_or_else(|| XlpdfError::Finalize("no page to draw on".to_string()))
    }

    /// Flip a top-left `y` into PDF's bottom-left space.
    fn flip(&self, y: f64) -> f32 {
        pt(self.page_height - y)
    }

    /// Assemble the document.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut next_id = 1;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let mut pdf = Pdf::new();
        let catalog_id = alloc();
        let page_tree_id = alloc();

        let font_refs: Vec<Ref> = self.fonts.iter().map(|_| alloc()).collect();
        for (font, &type0_ref) in self.fonts.iter().zip(&font_refs) {
            write_font(&mut pdf, font, type0_ref, &mut alloc)?;
        }

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let page_id = alloc();
            let content_id = alloc();
            pdf.stream(content_id, &page.content.finish());

            let mut writer = pdf.page(page_id);
            writer
                .media_box(Rect::new(0.0, 0.0, pt(self.page_width), pt(self.page_height)))
                .parent(page_tree_id)
                .contents(content_id);
            {
                let mut resources = writer.resources();
                let mut fonts = resources.fonts();
                for idx in &page.fonts {
                    if let (Some(font), Some(font_ref)) = (self.fonts.get(*idx), font_refs.get(*idx)) {
                        fonts.pair(Name(font.resource_name.as_bytes()), *font_ref);
                    }
                }
            }
            writer.finish();
            page_ids.push(page_id);
        }

        let count = i32::try_from(page_ids.len())
            .map_err(|_| XlpdfError::Finalize("too many pages".to_string()))?;
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids(page_ids).count(count);

        Ok(pdf.finish())
    }

    /// Assemble the document and write it to `path`.
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.finish()?;
        std::fs::write(path, &bytes)
            .map_err(|e| XlpdfError::Finalize(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote PDF");
        Ok(())
    }
}

fn write_font(
    pdf: &mut Pdf,
    font: &FontEntry,
    type0_ref: Ref,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<()> {
    let cid_ref = alloc();
    let descriptor_ref = alloc();
    let file_ref = alloc();
    let cmap_ref = alloc();
    let base_name = Name(font.base_name.as_bytes());
    let m = &font.metrics;

    pdf.type0_font(type0_ref)
        .base_font(base_name)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_ref)
        .to_unicode(cmap_ref);

    let mut cid = pdf.cid_font(cid_ref);
    cid.subtype(CidFontType::Type2)
        .base_font(base_name)
        .system_info(SYSTEM_INFO)
        .font_descriptor(descriptor_ref)
        .default_width(0.0)
        .cid_to_gid_map_predefined(Name(b"Identity"));
    {
        let mut widths = cid.widths();
        for (&gid, &(_, advance)) in &font.used {
            widths.consecutive(gid, [to_glyph_space(f64::from(advance), m.units_per_em)]);
        }
    }
    cid.finish();

    let [x_min, y_min, x_max, y_max] = m.bbox;
    pdf.font_descriptor(descriptor_ref)
        .name(base_name)
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(
            to_glyph_space(x_min, m.units_per_em),
            to_glyph_space(y_min, m.units_per_em),
            to_glyph_space(x_max, m.units_per_em),
            to_glyph_space(y_max, m.units_per_em),
        ))
        .italic_angle(0.0)
        .ascent(to_glyph_space(m.ascender, m.units_per_em))
        .descent(to_glyph_space(m.descender, m.units_per_em))
        .cap_height(to_glyph_space(m.cap_height, m.units_per_em))
        .stem_v(80.0)
        .font_file2(file_ref);

    let length = i32::try_from(font.data.len())
        .map_err(|_| XlpdfError::Finalize(format!("font {} is too large", font.family)))?;
    pdf.stream(file_ref, &font.data)
        .pair(Name(b"Length1"), length);

    let mut cmap = UnicodeCmap::new(Name(b"Custom"), SYSTEM_INFO);
    for (&gid, &(ch, _)) in &font.used {
        cmap.pair(gid, ch);
    }
    pdf.cmap(cmap_ref, &cmap.finish());

    Ok(())
}

impl DrawingSurface for PdfSurface {
    fn new_page(&mut self) -> Result<()> {
        self.pages.push(PageBuffer {
            content: Content::new(),
            fonts: Vec::new(),
        });
        tracing::debug!(page = self.pages.len(), "new page");
        Ok(())
    }

    fn select_font(&mut self, font: &FontSpec) -> Result<()> {
        let idx = match self.find_font(font) {
            Some(idx) => idx,
            None => {
                let fallback = self.active_font().map(|_| 0)?;
                tracing::debug!(family = %font.family, "font not registered, using default");
                fallback
            }
        };
        self.current_font = Some(idx);
        self.font_size = font.size;
        Ok(())
    }

    fn set_text_color(&mut self, color: Rgb) {
        let [r, g, b] = color.to_unit();
        if let Ok(page) = self.page() {
            page.content.set_fill_rgb(r, g, b);
        }
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        let [r, g, b] = color.to_unit();
        if let Ok(page) = self.page() {
            page.content.set_stroke_rgb(r, g, b);
        }
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        let (y1, y2) = (self.flip(y1), self.flip(y2));
        let width = pt(self.line_width);
        let page = self.page()?;
        page.content
            .set_line_width(width)
            .move_to(pt(x1), y1)
            .line_to(pt(x2), y2)
            .stroke();
        Ok(())
    }

    fn measure_text_width(&mut self, text: &str) -> Result<f64> {
        let idx = self.active_font()?;
        let size = self.font_size;
        match self.fonts.get_mut(idx) {
            Some(font) => font.width(text, size),
            None => Err(XlpdfError::Font(format!("font index {idx} out of range"))),
        }
    }

    fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        let idx = self.active_font()?;
        let size = self.font_size;
        let (x, y) = self.cursor;

        let font = self
            .fonts
            .get_mut(idx)
            .ok_or_else(|| XlpdfError::Font(format!("font index {idx} out of range")))?;
        let mut encoded = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let glyph = font.glyph(ch)?;
            font.used.entry(glyph.id).or_insert((ch, glyph.advance));
            encoded.extend_from_slice(&glyph.id.to_be_bytes());
        }
        let baseline = self.page_height - (y + font.ascent(size));
        let resource = font.resource_name.clone();

        let page = self.page()?;
        if !page.fonts.contains(&idx) {
            page.fonts.push(idx);
        }
        page.content
            .begin_text()
            .set_font(Name(resource.as_bytes()), pt(size))
            .set_text_matrix([1.0, 0.0, 0.0, 1.0, pt(x), pt(baseline)])
            .show(Str(&encoded))
            .end_text();
        Ok(())
    }
}
