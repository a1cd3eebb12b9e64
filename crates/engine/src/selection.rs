//! The cursor/anchor marker pair and selection-aware run splitting.
//!
//! A selection is never stored as a range: it is always derived from the
//! cursor and anchor markers plus the `anything_selected` flag, so edits
//! that reposition the markers can never leave a stale range behind.

use crate::layout::Layout;
use crate::marker::Marker;

/// The engine's caret state: the cursor, its anchor, and whether the pair
/// currently selects anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection {
    pub cursor: Marker,
    pub anchor: Marker,
    pub anything_selected: bool,
}

impl Selection {
    /// The ordered byte range between anchor and cursor, or `None` when
    /// nothing is selected.
    pub fn range(&self, layout: &Layout) -> Option<(usize, usize)> {
        if !self.anything_selected {
            return None;
        }
        let a = self.cursor.abs_index(layout);
        let b = self.anchor.abs_index(layout);
        Some((a.min(b), a.max(b)))
    }

    /// Recomputes `anything_selected` from the marker positions.
    pub(crate) fn recompute(&mut self, layout: &Layout) {
        self.anything_selected =
            self.cursor.abs_index(layout) != self.anchor.abs_index(layout);
    }

    /// Collapses the selection by snapping the anchor onto the cursor.
    pub(crate) fn collapse_to_cursor(&mut self) {
        self.anchor = self.cursor;
        self.anything_selected = false;
    }
}

/// Splits the byte span `[start, end)` of one run against an ordered
/// selection range, yielding at most three `(start, end, selected)`
/// segments in order. Empty segments are dropped.
pub(crate) fn split_for_selection(
    start: usize,
    end: usize,
    selection: Option<(usize, usize)>,
) -> Vec<(usize, usize, bool)> {
    let (sel_start, sel_end) = match selection {
        Some(range) => range,
        None => return vec![(start, end, false)],
    };
    let s = sel_start.max(start);
    let e = sel_end.min(end);
    if s >= e {
        return vec![(start, end, false)];
    }
    let mut segments = Vec::with_capacity(3);
    if start < s {
        segments.push((start, s, false));
    }
    segments.push((s, e, true));
    if e < end {
        segments.push((e, end, false));
    }
    segments
}
