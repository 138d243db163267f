//! Rendering: drawing elements, surfaces and the PDF writer.
//!
//! This module provides:
//! - The [`DrawElement`] model a laid-out page is made of
//! - The [`DrawingSurface`] trait output documents implement
//! - [`RenderDispatcher`], which routes elements to a surface
//! - [`PdfSurface`] and the in-memory [`RecordingSurface`]

pub mod colors;
mod dispatch;
pub mod element;
mod pdf;
mod recording;
mod surface;

pub use colors::Rgb;
pub use dispatch::RenderDispatcher;
pub use element::{
    pages_from_json, DrawElement, FontSpec, HorizontalAlign, LineSegment, TextBlock, VerticalAlign,
};
pub use pdf::{PdfSurface, A4};
pub use recording::{RecordingSurface, SurfaceCall};
pub use surface::DrawingSurface;
