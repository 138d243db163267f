//! Text wrapping and alignment inside a cell rectangle.
//!
//! Text is measured and wrapped one code point at a time, so scripts
//! without spaces (CJK) wrap like any other. Each wrapped line keeps the
//! widths of its glyphs, and placement turns them into absolute positions.

use crate::error::Result;
use crate::render::{HorizontalAlign, TextBlock, VerticalAlign};

/// One wrapped line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub content: String,
    /// Sum of `glyph width + spacing` over the line's glyphs.
    pub width: f64,
    pub height: f64,
    glyph_widths: Vec<f64>,
}

impl TextLine {
    fn empty(height: f64) -> Self {
        Self {
            content: String::new(),
            width: 0.0,
            height,
            glyph_widths: Vec::new(),
        }
    }

    fn push(&mut self, ch: char, glyph_width: f64, spacing: f64) {
        self.content.push(ch);
        self.glyph_widths.push(glyph_width);
        self.width += glyph_width + spacing;
    }
}

/// A glyph at its final position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    pub x: f64,
    pub width: f64,
}

/// A line with its top-left origin and positioned glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub glyphs: Vec<PlacedGlyph>,
}

impl PlacedLine {
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

/// Keep the first `max` code points. `None` and `Some(0)` keep everything.
pub fn truncate_chars(content: &str, max: Option<usize>) -> &str {
    match max {
        Some(max) if max > 0 => match content.char_indices().nth(max) {
            Some((idx, _)) => content.get(..idx).unwrap_or(content),
            None => content,
        },
        _ => content,
    }
}

/// Split into paragraphs on `\n`; a `\r\n` pair is one break.
fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|p| p.strip_suffix('\r').unwrap_or(p))
}

/// Greedy wrap at code-point granularity.
///
/// A glyph starts a new line when adding it would push the running width
/// past `box_width`. A line never starts empty, so a glyph wider than the
/// box sits alone on its own line. Empty `text` yields no lines.
pub fn wrap_text<F>(
    text: &str,
    box_width: f64,
    line_height: f64,
    spacing: f64,
    measure: &mut F,
) -> Result<Vec<TextLine>>
where
    F: FnMut(char) -> Result<f64>,
{
    let mut lines = Vec::new();
    if text.is_empty() {
        return Ok(lines);
    }

    for paragraph in paragraphs(text) {
        let mut line = TextLine::empty(line_height);
        for ch in paragraph.chars() {
            let glyph = measure(ch)?;
            if !line.content.is_empty() && line.width + glyph > box_width {
                let full = std::mem::replace(&mut line, TextLine::empty(line_height));
                lines.push(full);
            }
            line.push(ch, glyph, spacing);
        }
        lines.push(line);
    }

    Ok(lines)
}

/// Top of the first line.
///
/// Middle and bottom fall back to top when the lines do not fit `box_height`.
pub fn vertical_start(lines: &[TextLine], align: VerticalAlign, top: f64, box_height: f64) -> f64 {
    if align == VerticalAlign::Top {
        return top;
    }
    let total: f64 = lines.iter().map(|l| l.height).sum();
    if total > box_height {
        return top;
    }
    match align {
        VerticalAlign::Middle => top + (box_height - total) / 2.0,
        VerticalAlign::Bottom => top + box_height - total,
        VerticalAlign::Top => top,
    }
}

/// Left edge of a line. Lines wider than the box always start at `left`.
pub fn line_start(line_width: f64, align: HorizontalAlign, left: f64, box_width: f64) -> f64 {
    if align == HorizontalAlign::Left || line_width > box_width {
        return left;
    }
    match align {
        HorizontalAlign::Center => left + (box_width - line_width) / 2.0,
        HorizontalAlign::Right => left + box_width - line_width,
        HorizontalAlign::Left => left,
    }
}

/// Wrap and place a text block's content inside its rectangle.
pub fn layout_text<F>(block: &TextBlock, measure: &mut F) -> Result<Vec<PlacedLine>>
where
    F: FnMut(char) -> Result<f64>,
{
    let text = truncate_chars(&block.content, block.max_content_length);

    let left = block.rect.left + block.padding;
    let top = block.rect.top + block.padding;
    let box_width = block.rect.width() - block.padding * 2.0;
    let box_height = block.rect.height() - block.padding;

    let lines = wrap_text(text, box_width, block.line_height, block.word_space, measure)?;
    let mut y = vertical_start(&lines, block.vertical_align, top, box_height);

    let mut placed = Vec::with_capacity(lines.len());
    for line in lines {
        let x = line_start(line.width, block.horizontal_align, left, box_width);
        let mut cursor = x;
        let glyphs = line
            .content
            .chars()
            .zip(line.glyph_widths.iter().copied())
            .map(|(ch, width)| {
                let glyph = PlacedGlyph { ch, x: cursor, width };
                cursor += width + block.word_space;
                glyph
            })
            .collect();
        placed.push(PlacedLine {
            x,
            y,
            width: line.width,
            height: line.height,
            glyphs,
        });
        y += line.height;
    }

    Ok(placed)
}
