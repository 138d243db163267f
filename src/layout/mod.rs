//! Layout engine: page geometry, merges, borders and text placement.
//!
//! This module handles:
//! - Converting row heights and column widths to a pixel grid
//! - Resolving merged regions to content spans
//! - Turning cell borders into deduplicated line segments
//! - Wrapping and aligning cell text inside its rectangle

mod borders;
mod grid;
mod merge;
mod text;

pub use borders::{compose_borders, edge_endpoints, SegmentSet, StrokeWeight};
pub use grid::{convert_col_width, convert_row_height, font_px, GridGeometry, Rect};
pub use merge::{CellPlacement, MergeResolver};
pub use text::{
    layout_text, line_start, truncate_chars, vertical_start, wrap_text, PlacedGlyph, PlacedLine,
    TextLine,
};
