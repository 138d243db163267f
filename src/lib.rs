//! xlpdf - XLSX to PDF conversion
//!
//! Renders every sheet of a workbook onto its own PDF page:
//! - Row heights and column widths become a pixel grid
//! - Cell borders become deduplicated line segments
//! - Merged regions carry one text block spanning the merge
//! - Text is wrapped and aligned inside each cell's rectangle
//!
//! # Usage
//!
//! ```no_run
//! use xlpdf::{convert_to_pdf, parser, PdfSurface, RenderOptions};
//!
//! # fn main() -> xlpdf::Result<()> {
//! let workbook = parser::parse_file("book.xlsx")?;
//! let options = RenderOptions::default();
//! let mut surface = PdfSurface::new(options.page_width, options.page_height);
//! surface.register_font_file("Calibri", "fonts/Carlito-Regular.ttf")?;
//! let pdf = convert_to_pdf(&workbook, surface, &options)?;
//! std::fs::write("book.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```

// Reading
pub mod cell_ref;
pub mod error;
pub mod model;
pub mod numfmt;
pub mod parser;
pub mod styles;
pub mod types;
pub mod xml_helpers;

// Layout and output
pub mod convert;
pub mod layout;
pub mod options;
pub mod render;

pub use convert::{convert_to_pdf, convert_workbook, layout_sheet, SheetPage};
pub use error::{Result, XlpdfError};
pub use model::WorkbookSource;
pub use options::RenderOptions;
pub use render::{
    DrawElement, DrawingSurface, PdfSurface, RecordingSurface, RenderDispatcher, SurfaceCall,
};
pub use types::*;
