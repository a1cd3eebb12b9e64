//! runedit-buffer: text storage for the runedit layout engine.
//!
//! This crate provides the two text-level building blocks the engine is
//! built on:
//!
//! - [`TextBuffer`], an owned contiguous UTF-8 buffer with byte-offset
//!   insert/delete and newline normalization (every `\r` is dropped on the
//!   way in, so the buffer only ever contains bare `\n`).
//! - [`diff_texts`], the minimal common-prefix/common-suffix text diff the
//!   undo engine records per edit.
//!
//! # Offsets
//!
//! All positions are byte offsets into the post-normalization buffer.
//! Offsets passed in are clamped to `[0, len]` and snapped down to a `char`
//! boundary, so callers can hand in stale or approximate offsets without
//! panicking on multi-byte text.
//!
//! # Example
//!
//! ```
//! use runedit_buffer::TextBuffer;
//!
//! let mut buffer = TextBuffer::new();
//! buffer.insert_text("hello\r\nworld", 0);
//! assert_eq!(buffer.content(), "hello\nworld");
//!
//! buffer.delete_range(5, 11);
//! assert_eq!(buffer.content(), "hello");
//! ```

mod diff;
mod text_buffer;

pub use diff::{diff_texts, TextDiff};
pub use text_buffer::TextBuffer;
