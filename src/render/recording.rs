//! In-memory surface that records every call.
//!
//! Useful for inspecting what a conversion would draw without producing a
//! document, and for asserting on emitted instructions in tests.

use crate::error::Result;

use super::colors::Rgb;
use super::element::FontSpec;
use super::surface::DrawingSurface;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    NewPage,
    Font(FontSpec),
    TextColor(Rgb),
    StrokeColor(Rgb),
    LineWidth(f64),
    Line(f64, f64, f64, f64),
    Cursor(f64, f64),
    Text(String),
}

/// A surface where every glyph has the same width.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    glyph_width: f64,
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new(glyph_width: f64) -> Self {
        Self {
            glyph_width,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn page_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::NewPage))
            .count()
    }

    /// Lines drawn, as `(x1, y1, x2, y2)`.
    pub fn lines(&self) -> Vec<(f64, f64, f64, f64)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                SurfaceCall::Line(x1, y1, x2, y2) => Some((x1, y1, x2, y2)),
                _ => None,
            })
            .collect()
    }

    /// Emitted text paired with the cursor it was emitted at.
    pub fn emitted(&self) -> Vec<(f64, f64, String)> {
        let mut cursor = (0.0, 0.0);
        let mut out = Vec::new();
        for call in &self.calls {
            match call {
                SurfaceCall::Cursor(x, y) => cursor = (*x, *y),
                SurfaceCall::Text(text) => out.push((cursor.0, cursor.1, text.clone())),
                _ => {}
            }
        }
        out
    }
}

impl DrawingSurface for RecordingSurface {
    fn new_page(&mut self) -> Result<()> {
        self.calls.push(SurfaceCall::NewPage);
        Ok(())
    }

    fn select_font(&mut self, font: &FontSpec) -> Result<()> {
        self.calls.push(SurfaceCall::Font(font.clone()));
        Ok(())
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.calls.push(SurfaceCall::TextColor(color));
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.calls.push(SurfaceCall::StrokeColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.calls.push(SurfaceCall::LineWidth(width));
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        self.calls.push(SurfaceCall::Line(x1, y1, x2, y2));
        Ok(())
    }

    fn measure_text_width(&mut self, text: &str) -> Result<f64> {
        Ok(self.glyph_width * text.chars().count() as f64)
    }

    fn set_cursor(&mut self, x: f64, y: f64) {
        self.calls.push(SurfaceCall::Cursor(x, y));
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        self.calls.push(SurfaceCall::Text(text.to_string()));
        Ok(())
    }
}
