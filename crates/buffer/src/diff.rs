//! Minimal text diffing for undo records.
//!
//! The undo engine snapshots the whole buffer before an edit and diffs it
//! against the buffer after the edit. The diff is the classic common-prefix
//! / common-suffix scan: walk forward while bytes match, then walk backward
//! while bytes match, stopping the backward scan before the two windows
//! would overlap. What remains in the middle is the minimal changed span.

/// The minimal changed span between two texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    /// Byte offset where the texts diverge.
    pub pos: usize,
    /// The bytes present in the old text at `pos` (empty for pure inserts).
    pub removed: String,
    /// The bytes present in the new text at `pos` (empty for pure deletes).
    pub inserted: String,
}

impl TextDiff {
    /// Reconstructs the new text from the old text plus this diff.
    pub fn apply(&self, old: &str) -> String {
        let mut out = String::with_capacity(old.len() + self.inserted.len());
        out.push_str(&old[..self.pos]);
        out.push_str(&self.inserted);
        out.push_str(&old[self.pos + self.removed.len()..]);
        out
    }

    /// Reconstructs the old text from the new text plus this diff.
    pub fn revert(&self, new: &str) -> String {
        let mut out = String::with_capacity(new.len() + self.removed.len());
        out.push_str(&new[..self.pos]);
        out.push_str(&self.removed);
        out.push_str(&new[self.pos + self.inserted.len()..]);
        out
    }
}

/// Computes the minimal changed span between `old` and `new`.
///
/// Returns `None` when the texts are identical. The cut points are snapped
/// to char boundaries of both texts so the removed/inserted pieces are
/// valid UTF-8; snapping only widens the span, never narrows it.
pub fn diff_texts(old: &str, new: &str) -> Option<TextDiff> {
    if old == new {
        return None;
    }

    let old_bytes = old.as_bytes();
    let new_bytes = new.as_bytes();
    let min_len = old.len().min(new.len());

    // Forward scan: length of the common prefix.
    let mut same_start = 0;
    while same_start < min_len && old_bytes[same_start] == new_bytes[same_start] {
        same_start += 1;
    }

    // Backward scan: length of the common suffix. The scan must stop before
    // it reaches into the prefix window, otherwise the two would overlap
    // (e.g. "aa" vs "aaa").
    let max_suffix = min_len - same_start;
    let mut same_end = 0;
    while same_end < max_suffix
        && old_bytes[old.len() - 1 - same_end] == new_bytes[new.len() - 1 - same_end]
    {
        same_end += 1;
    }

    // Snap both cut points to char boundaries. The prefix bytes are equal in
    // both texts, so a boundary in one is a boundary in the other; the same
    // holds for the suffix.
    while same_start > 0 && !old.is_char_boundary(same_start) {
        same_start -= 1;
    }
    while same_end > 0 && !old.is_char_boundary(old.len() - same_end) {
        same_end -= 1;
    }

    Some(TextDiff {
        pos: same_start,
        removed: old[same_start..old.len() - same_end].to_string(),
        inserted: new[same_start..new.len() - same_end].to_string(),
    })
}
