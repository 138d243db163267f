//! Cell border edges to deduplicated line segments.

use std::collections::HashSet;

use crate::render::LineSegment;
use crate::types::{BorderEdge, BorderSide};

use super::grid::GridGeometry;

/// Stroke class of a border style's weight code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeWeight {
    Thin,
    Medium,
    Heavy,
}

impl StrokeWeight {
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => Self::Medium,
            3 => Self::Heavy,
            _ => Self::Thin,
        }
    }

    pub fn width(self) -> f64 {
        match self {
            Self::Thin => 1.0,
            Self::Medium => 2.0,
            Self::Heavy => 3.0,
        }
    }
}

/// Endpoints `(x1, y1, x2, y2)` of one edge of cell `(row, col)`.
///
/// `None` when the cell lies outside the grid.
pub fn edge_endpoints(
    grid: &GridGeometry,
    row: u32,
    col: u32,
    edge: BorderEdge,
) -> Option<(f64, f64, f64, f64)> {
    let left = grid.col_offset(col.checked_sub(1)?)?;
    let right = grid.col_offset(col)?;
    let top = grid.row_offset(row.checked_sub(1)?)?;
    let bottom = grid.row_offset(row)?;
    Some(match edge {
        BorderEdge::Left => (left, top, left, bottom),
        BorderEdge::Right => (right, top, right, bottom),
        BorderEdge::Top => (left, top, right, top),
        BorderEdge::Bottom => (left, bottom, right, bottom),
    })
}

/// Segments already drawn on the current page.
///
/// Create one per page and drop it with the page.
#[derive(Debug, Default)]
pub struct SegmentSet {
    seen: HashSet<[u64; 4]>,
}

fn coord_bits(v: f64) -> u64 {
    // -0.0 and 0.0 are the same coordinate.
    if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a segment; returns `false` if it was already present.
    ///
    /// Segments are identified by their endpoints regardless of direction.
    pub fn insert(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
        let a = [coord_bits(x1), coord_bits(y1)];
        let b = [coord_bits(x2), coord_bits(y2)];
        let (first, second) = if (x1, y1) <= (x2, y2) { (a, b) } else { (b, a) };
        self.seen
            .insert([first[0], first[1], second[0], second[1]])
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Line segments for the styled edges of one cell, skipping any already in `seen`.
///
/// Edges are visited left, right, top, bottom.
pub fn compose_borders(
    grid: &GridGeometry,
    row: u32,
    col: u32,
    borders: &[BorderSide],
    seen: &mut SegmentSet,
) -> Vec<LineSegment> {
    let mut segments = Vec::new();
    for edge in BorderEdge::ALL {
        let Some(side) = borders.iter().find(|b| b.edge == edge) else {
            continue;
        };
        let Some((x1, y1, x2, y2)) = edge_endpoints(grid, row, col, edge) else {
            continue;
        };
        if !seen.insert(x1, y1, x2, y2) {
            continue;
        }
        let weight = StrokeWeight::from_code(side.style.code());
        segments.push(LineSegment::new(x1, y1, x2, y2, weight.width()));
    }
    segments
}
