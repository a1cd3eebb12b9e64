//! Diff-based undo history.
//!
//! Undo points are recorded by diffing whole-buffer snapshots: the engine
//! calls [`UndoStack::prepare`] before a burst of edits and
//! [`UndoStack::commit`] after, and the stack stores the minimal
//! prefix/suffix diff between the two snapshots together with the marker
//! state on each side. A single vector plus a pointer holds both directions:
//! records left of the pointer are undoable, records right of it redoable.

use runedit_buffer::diff_texts;

use crate::error::EngineError;

/// Snapshot of the caret pair as absolute byte indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerState {
    pub cursor: usize,
    pub anchor: usize,
    pub anything_selected: bool,
}

/// One undoable edit: the text swap at `pos` plus the marker state to
/// restore on each side.
#[derive(Debug, Clone)]
pub struct UndoRecord {
    /// Byte position of the differing region.
    pub pos: usize,
    /// Text occupying the region before the edit.
    pub old_text: String,
    /// Text occupying the region after the edit.
    pub new_text: String,
    /// Marker state captured at prepare time.
    pub old_state: MarkerState,
    /// Marker state captured at commit time.
    pub new_state: MarkerState,
}

#[derive(Debug)]
struct Prepared {
    text: String,
    state: MarkerState,
}

/// The undo/redo stack.
#[derive(Debug, Default)]
pub struct UndoStack {
    records: Vec<UndoRecord>,
    /// Number of undoable records; `records[pointer..]` are redoable.
    pointer: usize,
    prepared: Option<Prepared>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the "before" snapshot for the next commit. A prepare while
    /// another is pending discards the earlier snapshot.
    pub fn prepare(&mut self, text: &str, state: MarkerState) {
        if self.prepared.is_some() {
            tracing::debug!("discarding unconsumed undo snapshot");
        }
        self.prepared = Some(Prepared {
            text: text.to_string(),
            state,
        });
    }

    /// Returns true if a prepared snapshot is pending.
    pub fn has_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Diffs the prepared snapshot against the current text and pushes a
    /// record. Consumes the snapshot either way; returns `Ok(false)` when
    /// the texts are identical (no record pushed). Committing a record
    /// truncates any redoable records past the pointer.
    pub fn commit(
        &mut self,
        current_text: &str,
        current_state: MarkerState,
    ) -> Result<bool, EngineError> {
        let prepared = self.prepared.take().ok_or(EngineError::NoPreparedUndo)?;
        let diff = match diff_texts(&prepared.text, current_text) {
            Some(diff) => diff,
            None => return Ok(false),
        };
        self.records.truncate(self.pointer);
        self.records.push(UndoRecord {
            pos: diff.pos,
            old_text: diff.removed,
            new_text: diff.inserted,
            old_state: prepared.state,
            new_state: current_state,
        });
        self.pointer = self.records.len();
        tracing::debug!(points = self.pointer, "undo point committed");
        Ok(true)
    }

    /// The record an undo would revert, if any.
    pub fn back(&self) -> Option<&UndoRecord> {
        self.pointer.checked_sub(1).map(|i| &self.records[i])
    }

    /// The record a redo would reapply, if any.
    pub fn forward(&self) -> Option<&UndoRecord> {
        self.records.get(self.pointer)
    }

    /// Moves the pointer one record back. Callers pair this with [`back`].
    ///
    /// [`back`]: UndoStack::back
    pub fn retreat(&mut self) {
        debug_assert!(self.pointer > 0);
        self.pointer -= 1;
    }

    /// Moves the pointer one record forward. Callers pair this with
    /// [`forward`].
    ///
    /// [`forward`]: UndoStack::forward
    pub fn advance(&mut self) {
        debug_assert!(self.pointer < self.records.len());
        self.pointer += 1;
    }

    /// Number of records an undo can revert.
    pub fn undo_points_remaining(&self) -> usize {
        self.pointer
    }

    /// Number of records a redo can reapply.
    pub fn redo_points_remaining(&self) -> usize {
        self.records.len() - self.pointer
    }

    /// Drops all history and any pending snapshot. Returns true if the
    /// pointer moved (i.e. there were undoable records).
    pub fn clear(&mut self) -> bool {
        let moved = self.pointer != 0;
        self.records.clear();
        self.pointer = 0;
        self.prepared = None;
        moved
    }
}
