//! TextBuffer is the owned text storage for the engine.
//!
//! It is a plain contiguous `String` with byte-offset mutation operations.
//! There is deliberately no gap or rope structure behind it: the layout
//! engine rebuilds its run list in full after every mutation, so amortized
//! mid-buffer insertion would buy nothing.
//!
//! Every mutation reports whether the content actually changed, so the
//! caller can decide whether a layout rebuild and change notifications are
//! needed.

/// An owned contiguous UTF-8 text buffer with byte-offset editing.
///
/// The buffer maintains two invariants:
/// - it never contains a `\r` byte (line endings are normalized on input)
/// - all stored text is valid UTF-8 (inherited from `String`)
///
/// Offsets passed to any method are clamped to `[0, len]` and snapped down
/// to the nearest `char` boundary.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
}

/// Drops every `\r` byte from `s`, returning the normalized text.
///
/// Returns a borrowed slice when nothing needed stripping, so the common
/// case allocates nothing.
fn normalize(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains('\r') {
        std::borrow::Cow::Owned(s.chars().filter(|&c| c != '\r').collect())
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

impl TextBuffer {
    /// Creates a new empty text buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer initialized with the given content.
    ///
    /// The content is normalized: every `\r` is dropped.
    pub fn from_text(content: &str) -> Self {
        Self {
            text: normalize(content).into_owned(),
        }
    }

    // ==================== Accessors ====================

    /// Returns the buffer length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the entire buffer content.
    pub fn content(&self) -> &str {
        &self.text
    }

    /// Returns the text in `[beg, end)`, clamping and ordering the bounds.
    pub fn slice(&self, beg: usize, end: usize) -> &str {
        let a = self.clamp_offset(beg);
        let b = self.clamp_offset(end);
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        &self.text[a..b]
    }

    /// Returns the character starting at `offset`, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.text.len() {
            return None;
        }
        let offset = self.clamp_offset(offset);
        self.text[offset..].chars().next()
    }

    /// Clamps `offset` to `[0, len]` and snaps it down to a char boundary.
    pub fn clamp_offset(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while offset > 0 && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Returns the byte offset of the char boundary before `offset`, or 0
    /// if `offset` is at the start of the buffer.
    pub fn prev_char_boundary(&self, offset: usize) -> usize {
        let offset = self.clamp_offset(offset);
        if offset == 0 {
            return 0;
        }
        let mut prev = offset - 1;
        while prev > 0 && !self.text.is_char_boundary(prev) {
            prev -= 1;
        }
        prev
    }

    /// Returns the byte offset of the char boundary after `offset`, or
    /// `len` if `offset` is at or past the end.
    pub fn next_char_boundary(&self, offset: usize) -> usize {
        let offset = self.clamp_offset(offset);
        if offset >= self.text.len() {
            return self.text.len();
        }
        let mut next = offset + 1;
        while next < self.text.len() && !self.text.is_char_boundary(next) {
            next += 1;
        }
        next
    }

    // ==================== Mutations ====================

    /// Replaces the entire buffer content.
    ///
    /// Returns true if the stored text changed.
    pub fn set_text(&mut self, content: &str) -> bool {
        let normalized = normalize(content);
        if self.text == normalized.as_ref() {
            return false;
        }
        self.text = normalized.into_owned();
        true
    }

    /// Inserts `s` at byte offset `at`.
    ///
    /// The insertion offset is clamped to `[0, len]`. Returns true if the
    /// buffer changed (i.e. the normalized text was non-empty).
    pub fn insert_text(&mut self, s: &str, at: usize) -> bool {
        let normalized = normalize(s);
        if normalized.is_empty() {
            return false;
        }
        let at = self.clamp_offset(at);
        self.text.insert_str(at, &normalized);
        true
    }

    /// Inserts a single character at byte offset `at`.
    ///
    /// `\r` is dropped like any other input. Returns true if the buffer
    /// changed.
    pub fn insert_char(&mut self, c: char, at: usize) -> bool {
        if c == '\r' {
            return false;
        }
        let at = self.clamp_offset(at);
        self.text.insert(at, c);
        true
    }

    /// Deletes the bytes in `[beg, end)`.
    ///
    /// The bounds are an unordered pair: reversed arguments are swapped.
    /// Both are clamped to the buffer. Equal bounds are a no-op. Returns
    /// true if anything was deleted.
    pub fn delete_range(&mut self, beg: usize, end: usize) -> bool {
        let a = self.clamp_offset(beg);
        let b = self.clamp_offset(end);
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        if a == b {
            return false;
        }
        self.text.replace_range(a..b, "");
        true
    }

    /// Replaces `remove_len` bytes at `at` with `insert`, verbatim.
    ///
    /// This is the raw splice used by undo/redo to re-apply recorded diffs.
    /// The caller guarantees `insert` is already normalized and that the
    /// spliced range sits on char boundaries (diff cut points always do).
    pub fn splice(&mut self, at: usize, remove_len: usize, insert: &str) {
        let at = self.clamp_offset(at);
        let end = self.clamp_offset(at + remove_len);
        self.text.replace_range(at..end, insert);
    }
}
