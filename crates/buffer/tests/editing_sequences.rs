//! Integration tests for realistic buffer editing sequences.
//!
//! These tests drive the buffer and the diff together the way the undo
//! engine does: snapshot, edit, diff, then splice the diff back.

use runedit_buffer::{diff_texts, TextBuffer};

#[test]
fn test_type_word_then_delete_entirely() {
    let mut buf = TextBuffer::new();

    for (i, ch) in "hello".chars().enumerate() {
        buf.insert_char(ch, i);
    }
    assert_eq!(buf.content(), "hello");

    for _ in 0..5 {
        let end = buf.len();
        let beg = buf.prev_char_boundary(end);
        buf.delete_range(beg, end);
    }
    assert!(buf.is_empty());
}

#[test]
fn test_diff_splice_round_trip_through_edit_sequence() {
    let mut buf = TextBuffer::from_text("the quick brown fox");
    let mut snapshots = vec![buf.content().to_string()];

    // A batch of edits, snapshotting before each one.
    buf.delete_range(4, 10); // drop "quick "
    snapshots.push(buf.content().to_string());
    buf.insert_text("lazy ", 4);
    snapshots.push(buf.content().to_string());
    buf.set_text("something else entirely");
    snapshots.push(buf.content().to_string());

    // Walk backward through the history by reverting diffs.
    for pair in snapshots.windows(2).rev() {
        let (older, newer) = (&pair[0], &pair[1]);
        let d = diff_texts(older, newer).expect("every edit changed the text");
        buf.splice(d.pos, d.inserted.len(), &d.removed);
        assert_eq!(buf.content(), older);
    }
    assert_eq!(buf.content(), "the quick brown fox");
}

#[test]
fn test_pasted_crlf_document_normalizes_once() {
    let mut buf = TextBuffer::new();
    buf.insert_text("line one\r\nline two\r\nline three", 0);
    assert_eq!(buf.content(), "line one\nline two\nline three");

    // Subsequent edits never see a \r, so offsets computed against the
    // normalized text stay valid.
    buf.insert_char('!', 8);
    assert_eq!(buf.content(), "line one!\nline two\nline three");
}

#[test]
fn test_multibyte_editing_keeps_valid_offsets() {
    let mut buf = TextBuffer::from_text("héllo wörld");
    let w = buf.content().find('w').unwrap();
    buf.delete_range(0, w);
    assert_eq!(buf.content(), "wörld");

    // Offset 2 lands inside the two-byte 'ö' and snaps down to 1.
    buf.insert_char('x', 2);
    assert_eq!(buf.content(), "wxörld");
}
