//! Drawing surface trait for pluggable output documents.
//!
//! Coordinates are page pixels with the origin at the top-left corner and
//! `y` growing downward. A text cursor position is the top-left of the
//! glyph box, not its baseline.

use crate::error::Result;

use super::colors::Rgb;
use super::element::FontSpec;

pub trait DrawingSurface {
    /// Start a new page at the surface's default page size.
    fn new_page(&mut self) -> Result<()>;

    /// Select the font for subsequent measuring and text emission.
    fn select_font(&mut self, font: &FontSpec) -> Result<()>;

    fn set_text_color(&mut self, color: Rgb);

    fn set_stroke_color(&mut self, color: Rgb);

    fn set_line_width(&mut self, width: f64);

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()>;

    /// Width of `text` in the current font.
    fn measure_text_width(&mut self, text: &str) -> Result<f64>;

    fn set_cursor(&mut self, x: f64, y: f64);

    /// Emit `text` at the cursor.
    fn emit_text(&mut self, text: &str) -> Result<()>;
}
