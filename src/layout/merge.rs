//! Merge-aware content spans.

use crate::types::CellSpan;

/// How a cell takes part in content layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPlacement {
    /// Interior of a merge, not its top-left cell: no content of its own.
    Suppressed,
    /// Content is laid out over this span.
    Span(CellSpan),
}

/// Resolves each cell to the span its content occupies.
#[derive(Debug, Default)]
pub struct MergeResolver {
    merges: Vec<CellSpan>,
}

impl MergeResolver {
    pub fn new(merges: &[CellSpan]) -> Self {
        Self {
            merges: merges.to_vec(),
        }
    }

    pub fn resolve(&self, row: u32, col: u32) -> CellPlacement {
        // Overlapping merges are invalid; the first one listed wins.
        match self.merges.iter().find(|m| m.contains(row, col)) {
            Some(merge) if merge.is_anchor(row, col) => CellPlacement::Span(*merge),
            Some(_) => CellPlacement::Suppressed,
            None => CellPlacement::Span(CellSpan::single(row, col)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_gets_full_span() {
        let merge = CellSpan::new(1, 1, 2, 2);
        let resolver = MergeResolver::new(&[merge]);
        assert_eq!(resolver.resolve(1, 1), CellPlacement::Span(merge));
        assert_eq!(resolver.resolve(1, 2), CellPlacement::Suppressed);
        assert_eq!(resolver.resolve(2, 1), CellPlacement::Suppressed);
        assert_eq!(resolver.resolve(2, 2), CellPlacement::Suppressed);
    }

    #[test]
    fn unmerged_cell_spans_itself() {
        let resolver = MergeResolver::new(&[CellSpan::new(1, 1, 2, 2)]);
        assert_eq!(
            resolver.resolve(3, 1),
            CellPlacement::Span(CellSpan::single(3, 1))
        );
        assert_eq!(
            MergeResolver::new(&[]).resolve(1, 1),
            CellPlacement::Span(CellSpan::single(1, 1))
        );
    }

    #[test]
    fn first_overlapping_merge_wins() {
        let first = CellSpan::new(1, 1, 2, 2);
        let second = CellSpan::new(2, 2, 3, 3);
        let resolver = MergeResolver::new(&[first, second]);
        assert_eq!(resolver.resolve(2, 2), CellPlacement::Suppressed);
        assert_eq!(resolver.resolve(3, 3), CellPlacement::Suppressed);
    }
}
