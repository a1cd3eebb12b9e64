//! Multi-caret editing layered on the engine's public surface.
//!
//! The engine itself owns exactly one cursor/anchor pair; this view holds
//! any number of pairs as absolute byte indices and replays an edit at each
//! of them. Edits are applied back to front so earlier positions stay
//! valid, every other caret is shifted by the net size change, and the
//! whole batch lands as a single undo point and a single dirty rect.

use crate::engine::Engine;

/// One caret: a cursor/anchor pair as absolute byte indices. Equal indices
/// mean a collapsed caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretPair {
    pub cursor: usize,
    pub anchor: usize,
}

impl CaretPair {
    /// A collapsed caret at `at`.
    pub fn caret(at: usize) -> Self {
        Self { cursor: at, anchor: at }
    }

    /// A caret selecting between `anchor` and `cursor` (either order).
    pub fn selection(anchor: usize, cursor: usize) -> Self {
        Self { cursor, anchor }
    }

    fn lo(&self) -> usize {
        self.cursor.min(self.anchor)
    }

    fn hi(&self) -> usize {
        self.cursor.max(self.anchor)
    }

    /// Shifts both indices by `delta` if they sit past `at`, clamping at
    /// `at` so a caret never crosses into the edited region.
    fn shift(&mut self, at: usize, delta: isize) {
        let adjust = |p: usize| {
            if p > at {
                (p as isize + delta).max(at as isize) as usize
            } else {
                p
            }
        };
        self.cursor = adjust(self.cursor);
        self.anchor = adjust(self.anchor);
    }
}

/// A set of carets driving batch edits against one engine.
#[derive(Debug, Default)]
pub struct MultiCaretView {
    carets: Vec<CaretPair>,
}

impl MultiCaretView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view seeded with the engine's current cursor/anchor pair.
    pub fn from_engine(engine: &Engine) -> Self {
        Self {
            carets: vec![CaretPair {
                cursor: engine.cursor_index(),
                anchor: engine.anchor_index(),
            }],
        }
    }

    pub fn add_caret(&mut self, pair: CaretPair) {
        self.carets.push(pair);
    }

    pub fn carets(&self) -> &[CaretPair] {
        &self.carets
    }

    pub fn len(&self) -> usize {
        self.carets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carets.is_empty()
    }

    pub fn clear(&mut self) {
        self.carets.clear();
    }

    /// Inserts `text` at every caret, replacing each caret's selection.
    /// Returns false when the view is empty or nothing changed.
    pub fn insert_text(&mut self, engine: &mut Engine, text: &str) -> bool {
        self.apply(engine, |engine, lo, hi| {
            if lo != hi {
                engine.delete_range(lo, hi);
            }
            engine.insert_text(text, lo);
            lo
        })
    }

    /// Backspace at every caret: deletes each selection, or the character
    /// left of each collapsed caret.
    pub fn delete_left(&mut self, engine: &mut Engine) -> bool {
        self.apply(engine, |engine, lo, hi| {
            if lo != hi {
                engine.delete_range(lo, hi);
                return lo;
            }
            if lo == 0 {
                return lo;
            }
            let text = engine.text();
            let mut prev = lo - 1;
            while prev > 0 && !text.is_char_boundary(prev) {
                prev -= 1;
            }
            engine.delete_range(prev, lo);
            prev
        })
    }

    /// Deletes every caret's selection, leaving collapsed carets alone.
    pub fn delete_selections(&mut self, engine: &mut Engine) -> bool {
        self.apply(engine, |engine, lo, hi| {
            if lo != hi {
                engine.delete_range(lo, hi);
            }
            lo
        })
    }

    /// Runs `edit` once per caret, back to front, under one undo point and
    /// one dirty scope. The closure edits some region starting at the
    /// offset it returns and ending at `hi`; the caret collapses to the end
    /// of whatever replaced that region.
    fn apply<F>(&mut self, engine: &mut Engine, mut edit: F) -> bool
    where
        F: FnMut(&mut Engine, usize, usize) -> usize,
    {
        if self.carets.is_empty() {
            return false;
        }
        self.normalize(engine);

        engine.prepare_undo_point();
        engine.begin_dirty();
        let mut changed = false;

        // Descending by range start so unedited offsets stay valid.
        let mut order: Vec<usize> = (0..self.carets.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.carets[i].lo()));

        for idx in order {
            let pair = self.carets[idx];
            let (lo, hi) = (pair.lo(), pair.hi());
            let before = engine.text_len() as isize;
            let beg = edit(engine, lo, hi);
            let delta = engine.text_len() as isize - before;

            // [beg, hi) was replaced by (hi - beg) + delta bytes.
            let landed = (hi as isize + delta).max(beg as isize) as usize;
            self.carets[idx] = CaretPair::caret(landed);

            if delta != 0 || lo != hi {
                changed = true;
                for (i, other) in self.carets.iter_mut().enumerate() {
                    if i != idx {
                        other.shift(beg, delta);
                    }
                }
            }
        }

        let _ = engine.commit_undo_point();
        if let Some(primary) = self.carets.first().copied() {
            engine.select(primary.anchor, primary.cursor);
        }
        engine.end_dirty();
        changed
    }

    /// Clamps carets to the buffer, orders them, and drops duplicates.
    fn normalize(&mut self, engine: &Engine) {
        let len = engine.text_len();
        for pair in &mut self.carets {
            pair.cursor = pair.cursor.min(len);
            pair.anchor = pair.anchor.min(len);
        }
        self.carets.sort_by_key(|p| (p.lo(), p.hi()));
        self.carets.dedup();
    }
}
