//! Literal forward search.

/// Finds the first occurrence of `needle` at or after byte `from`,
/// returning its `(start, end)` byte range. Empty needles never match.
pub(crate) fn find_forward(text: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let from = from.min(text.len());
    text[from..]
        .find(needle)
        .map(|i| (from + i, from + i + needle.len()))
}

/// Like [`find_forward`], but wraps to the start of the text when nothing
/// matches after `from`.
pub(crate) fn find_wrapping(text: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    find_forward(text, needle, from).or_else(|| find_forward(text, needle, 0))
}
