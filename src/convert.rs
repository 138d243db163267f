//! Sheet-to-page conversion.
//!
//! Each sheet becomes one page. Layout runs two passes over the sheet's
//! extent: borders for every cell, then text for every non-empty cell that
//! is not inside a merge. The result is a list of [`DrawElement`]s that the
//! [`RenderDispatcher`] draws onto a surface.

use crate::error::Result;
use crate::layout::{
    compose_borders, font_px, CellPlacement, GridGeometry, MergeResolver, Rect, SegmentSet,
};
use crate::model::WorkbookSource;
use crate::options::RenderOptions;
use crate::render::{
    DrawElement, DrawingSurface, FontSpec, HorizontalAlign, LineSegment, PdfSurface,
    RenderDispatcher, TextBlock, VerticalAlign,
};
use crate::types::{CellSpan, CellStyle, CellType, HAlign, VAlign};

/// A laid-out sheet.
#[derive(Debug, Clone)]
pub struct SheetPage {
    pub name: String,
    pub grid: GridGeometry,
    /// Border lines first, then text blocks in row-major order.
    pub elements: Vec<DrawElement>,
}

impl SheetPage {
    pub fn lines(&self) -> impl Iterator<Item = &LineSegment> {
        self.elements.iter().filter_map(|e| match e {
            DrawElement::Line(line) => Some(line),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextBlock> {
        self.elements.iter().filter_map(|e| match e {
            DrawElement::Text(text) => Some(text),
            _ => None,
        })
    }
}

/// Horizontal side for a cell. General (or unset) puts numbers on the right.
pub fn horizontal_align(align: Option<HAlign>, cell_type: CellType) -> HorizontalAlign {
    match align {
        Some(HAlign::Center | HAlign::CenterContinuous) => HorizontalAlign::Center,
        Some(HAlign::Right) => HorizontalAlign::Right,
        Some(HAlign::Left | HAlign::Fill | HAlign::Justify | HAlign::Distributed) => {
            HorizontalAlign::Left
        }
        Some(HAlign::General) | None => match cell_type {
            CellType::Number => HorizontalAlign::Right,
            CellType::String | CellType::Boolean | CellType::Error => HorizontalAlign::Left,
        },
    }
}

/// Vertical side for a cell. Unset means bottom, as in a spreadsheet.
pub fn vertical_align(align: Option<VAlign>) -> VerticalAlign {
    match align {
        Some(VAlign::Top | VAlign::Justify | VAlign::Distributed) => VerticalAlign::Top,
        Some(VAlign::Center) => VerticalAlign::Middle,
        Some(VAlign::Bottom) | None => VerticalAlign::Bottom,
    }
}

fn style_or_default<S: WorkbookSource + ?Sized>(
    source: &S,
    sheet: &str,
    row: u32,
    col: u32,
) -> CellStyle {
    source.cell_style(sheet, row, col).unwrap_or_else(|err| {
        tracing::debug!(sheet, row, col, error = %err, "style lookup failed, using default");
        CellStyle::default()
    })
}

fn text_block(
    content: String,
    rect: Rect,
    style: &CellStyle,
    cell_type: CellType,
    options: &RenderOptions,
) -> TextBlock {
    let px = font_px(style.font_size.unwrap_or(options.default_font_size));
    TextBlock {
        content,
        rect,
        font: Some(FontSpec::new(style.font_family.clone().unwrap_or_default(), px)),
        horizontal_align: horizontal_align(style.align_h, cell_type),
        vertical_align: vertical_align(style.align_v),
        padding: options.padding,
        line_height: px + options.line_gap,
        word_space: options.word_space,
        max_content_length: options.max_content_length,
        color: None,
    }
}

/// Lay out one sheet as a page of drawing elements.
pub fn layout_sheet<S: WorkbookSource + ?Sized>(
    source: &S,
    sheet: &str,
    options: &RenderOptions,
) -> Result<SheetPage> {
    let (max_row, max_col) = source.sheet_extent(sheet)?;
    let grid = GridGeometry::for_sheet(source, sheet, max_row, max_col);
    let mut elements = Vec::new();

    // Borders ignore merges: every cell's own edges are drawn.
    let mut seen = SegmentSet::new();
    for row in 1..=max_row {
        for col in 1..=max_col {
            let style = style_or_default(source, sheet, row, col);
            if style.borders.is_empty() {
                continue;
            }
            elements.extend(
                compose_borders(&grid, row, col, &style.borders, &mut seen)
                    .into_iter()
                    .map(DrawElement::Line),
            );
        }
    }
    let line_count = elements.len();

    let merges = source.merge_ranges(sheet).unwrap_or_else(|err| {
        tracing::debug!(sheet, error = %err, "merge lookup failed, treating cells as unmerged");
        Vec::new()
    });
    let resolver = MergeResolver::new(&merges);

    for row in 1..=max_row {
        for col in 1..=max_col {
            let span = match resolver.resolve(row, col) {
                CellPlacement::Suppressed => continue,
                CellPlacement::Span(span) => span,
            };
            let value = match source.cell_value(sheet, row, col) {
                Ok(value) if !value.is_empty() => value,
                Ok(_) => continue,
                Err(err) => {
                    tracing::debug!(sheet, row, col, error = %err, "value lookup failed, skipping");
                    continue;
                }
            };
            let Some(rect) = grid.rect(&clamp_span(span, max_row, max_col)) else {
                continue;
            };
            let style = style_or_default(source, sheet, row, col);
            let cell_type = source.cell_type(sheet, row, col).unwrap_or(CellType::String);
            elements.push(DrawElement::Text(text_block(value, rect, &style, cell_type, options)));
        }
    }

    tracing::debug!(
        sheet,
        max_row,
        max_col,
        lines = line_count,
        texts = elements.len() - line_count,
        "laid out sheet"
    );

    Ok(SheetPage {
        name: sheet.to_string(),
        grid,
        elements,
    })
}

/// Keep a merge that runs past the sheet extent inside the grid.
fn clamp_span(span: CellSpan, max_row: u32, max_col: u32) -> CellSpan {
    CellSpan {
        end_row: span.end_row.min(max_row),
        end_col: span.end_col.min(max_col),
        ..span
    }
}

/// Render every sheet of `source` onto its own page of `surface`.
///
/// Returns the number of pages drawn.
pub fn convert_workbook<S, D>(source: &S, surface: &mut D, options: &RenderOptions) -> Result<usize>
where
    S: WorkbookSource + ?Sized,
    D: DrawingSurface + ?Sized,
{
    let dispatcher = RenderDispatcher::new();
    let names = source.sheet_names();
    for name in &names {
        let page = layout_sheet(source, name, options)?;
        surface.new_page()?;
        dispatcher.draw_all(surface, &page.elements)?;
        tracing::info!(sheet = %name, elements = page.elements.len(), "rendered sheet");
    }
    Ok(names.len())
}

/// Render every sheet into `surface` and return the PDF bytes.
pub fn convert_to_pdf<S: WorkbookSource + ?Sized>(
    source: &S,
    mut surface: PdfSurface,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    convert_workbook(source, &mut surface, options)?;
    surface.finish()
}
