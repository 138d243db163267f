//! Data types for the parsed workbook.

mod cell;
mod style;
mod workbook;

pub use cell::*;
pub use style::*;
pub use workbook::*;
