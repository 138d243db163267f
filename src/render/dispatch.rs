//! Dispatch of drawing elements to a surface.

use crate::error::Result;
use crate::layout::layout_text;

use super::element::{DrawElement, LineSegment, TextBlock};
use super::surface::DrawingSurface;

/// Routes each [`DrawElement`] to the routine that draws it.
///
/// Holds no state between elements; everything persistent lives in the
/// surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderDispatcher;

impl RenderDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Draw one element. Unsupported elements are logged and skipped.
    pub fn draw<S: DrawingSurface + ?Sized>(&self, surface: &mut S, element: &DrawElement) -> Result<()> {
        match element {
            DrawElement::Line(line) => self.draw_line(surface, line),
            DrawElement::Text(text) => self.draw_text(surface, text),
            DrawElement::Unsupported { .. } => {
                if let Some(err) = element.unsupported_error() {
                    tracing::warn!(error = %err, "skipping drawing element");
                }
                Ok(())
            }
        }
    }

    /// Draw a page's elements in order.
    pub fn draw_all<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        elements: &[DrawElement],
    ) -> Result<()> {
        for element in elements {
            self.draw(surface, element)?;
        }
        Ok(())
    }

    pub fn draw_line<S: DrawingSurface + ?Sized>(&self, surface: &mut S, line: &LineSegment) -> Result<()> {
        if let Some(color) = line.color {
            surface.set_stroke_color(color);
        }
        surface.set_line_width(line.width);
        surface.draw_line(line.x1, line.y1, line.x2, line.y2)
    }

    pub fn draw_text<S: DrawingSurface + ?Sized>(&self, surface: &mut S, text: &TextBlock) -> Result<()> {
        if let Some(ref font) = text.font {
            surface.select_font(font)?;
        }
        if let Some(color) = text.color {
            surface.set_text_color(color);
        }

        let mut buf = [0u8; 4];
        let lines = layout_text(text, &mut |ch: char| {
            surface.measure_text_width(ch.encode_utf8(&mut buf))
        })?;

        for line in &lines {
            for glyph in &line.glyphs {
                surface.set_cursor(glyph.x, line.y);
                surface.emit_text(glyph.ch.encode_utf8(&mut buf))?;
            }
        }
        Ok(())
    }
}
