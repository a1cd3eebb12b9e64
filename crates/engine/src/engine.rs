//! The engine façade: one object tying buffer, styles, layout, markers,
//! undo, and the host protocol together.
//!
//! Hosts drive the engine synchronously: call an editing or movement
//! method, receive hook notifications before it returns, then repaint the
//! dirtied region via [`Engine::paint`]. Dirty rectangles are batched
//! through a reference-counted scope so a compound operation (say, replace
//! selection then insert) reaches the host as a single invalidation.

use std::ops::{Deref, DerefMut};

use runedit_buffer::TextBuffer;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::Rect;
use crate::host::{EngineHooks, Metrics, Painter};
use crate::layout::{Layout, RunKind};
use crate::marker::{rel_x_in_run, Marker, MarkerCtx};
use crate::search::{find_forward, find_wrapping};
use crate::selection::{split_for_selection, Selection};
use crate::style::{FontMetrics, StyleRole, StyleSlot, StyleTable};
use crate::undo::{MarkerState, UndoStack};

/// A text layout and editing engine for one buffer.
pub struct Engine {
    buffer: TextBuffer,
    styles: StyleTable,
    layout: Layout,
    caret: Selection,
    undo: UndoStack,
    config: EngineConfig,
    metrics: Option<Box<dyn Metrics>>,
    hooks: Option<Box<dyn EngineHooks>>,
    dirty_depth: u32,
    dirty_accum: Rect,
    selection_mode: u32,
    cursor_shown: bool,
    blink_on: bool,
    blink_remaining_ms: u32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            buffer: TextBuffer::new(),
            styles: StyleTable::new(),
            layout: Layout::new(),
            caret: Selection::default(),
            undo: UndoStack::new(),
            blink_remaining_ms: config.blink_rate_ms,
            config,
            metrics: None,
            hooks: None,
            dirty_depth: 0,
            dirty_accum: Rect::EMPTY,
            selection_mode: 0,
            cursor_shown: true,
            blink_on: true,
        }
    }

    // ==================== Host wiring ====================

    /// Installs the measurement callbacks and relays out.
    pub fn set_metrics(&mut self, metrics: Box<dyn Metrics>) {
        self.metrics = Some(metrics);
        self.refresh_layout();
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn EngineHooks>) {
        self.hooks = Some(hooks);
    }

    /// Registers a style token, relaying out since glyph metrics may have
    /// changed.
    pub fn register_style(
        &mut self,
        token: u64,
        metrics: FontMetrics,
    ) -> Result<StyleSlot, EngineError> {
        let slot = self.styles.register(token, metrics)?;
        self.refresh_layout();
        Ok(slot)
    }

    /// Binds a style role. Rebinding the default role relays out; other
    /// roles only repaint.
    pub fn set_style_role(&mut self, role: StyleRole, slot: StyleSlot) {
        self.styles.set_role(role, slot);
        if role == StyleRole::Default {
            self.refresh_layout();
        } else {
            let rect = self.container_rect();
            self.add_dirty(rect);
        }
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    // ==================== Accessors ====================

    pub fn text(&self) -> &str {
        self.buffer.content()
    }

    pub fn text_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn line_count(&self) -> usize {
        self.layout.line_count()
    }

    /// Total laid-out content size, for host scroll ranges.
    pub fn content_size(&self) -> (f32, f32) {
        (self.layout.width, self.layout.height)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Absolute byte index of the cursor.
    pub fn cursor_index(&self) -> usize {
        self.caret.cursor.abs_index(&self.layout)
    }

    /// Absolute byte index of the selection anchor.
    pub fn anchor_index(&self) -> usize {
        self.caret.anchor.abs_index(&self.layout)
    }

    pub fn is_anything_selected(&self) -> bool {
        self.caret.anything_selected
    }

    /// The selected text, if any.
    pub fn selected_text(&self) -> Option<&str> {
        self.caret
            .range(&self.layout)
            .map(|(s, e)| self.buffer.slice(s, e))
    }

    /// The cursor bar's rectangle in container space.
    pub fn cursor_rect(&self) -> Rect {
        if let Some(run) = self.layout.runs.get(self.caret.cursor.run) {
            let line = self.layout.lines[run.line];
            let (x, _) = self.caret.cursor.pixel_position(&self.layout);
            Rect::new(
                x - self.config.scroll_x,
                line.y - self.config.scroll_y,
                self.config.cursor_width,
                line.height,
            )
        } else {
            let height = self.styles.default_metrics().map_or(0.0, |m| m.line_height);
            Rect::new(
                -self.config.scroll_x,
                -self.config.scroll_y,
                self.config.cursor_width,
                height,
            )
        }
    }

    fn container_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.config.container_width, self.config.container_height)
    }

    fn tab_width(&self) -> f32 {
        self.config.tab_size as f32
            * self.styles.default_metrics().map_or(0.0, |m| m.space_width)
    }

    // ==================== Dirty batching ====================

    /// Opens a dirty scope: rectangles accumulate until the matching
    /// [`end_dirty`](Engine::end_dirty) closes the outermost scope, at
    /// which point the union is delivered through `on_dirty` once.
    pub fn begin_dirty(&mut self) {
        self.dirty_depth += 1;
    }

    /// Closes a dirty scope. Unbalanced calls are ignored.
    pub fn end_dirty(&mut self) {
        if self.dirty_depth == 0 {
            return;
        }
        self.dirty_depth -= 1;
        if self.dirty_depth == 0 {
            let rect = std::mem::replace(&mut self.dirty_accum, Rect::EMPTY);
            if !rect.is_degenerate() {
                if let Some(hooks) = self.hooks.as_mut() {
                    hooks.on_dirty(rect);
                }
            }
        }
    }

    /// Marks a container-space rectangle as needing repaint: delivered
    /// immediately outside a dirty scope, accumulated inside one.
    pub fn add_dirty(&mut self, rect: Rect) {
        if rect.is_degenerate() {
            return;
        }
        if self.dirty_depth > 0 {
            self.dirty_accum = self.dirty_accum.union(rect);
        } else if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_dirty(rect);
        }
    }

    // ==================== Layout plumbing ====================

    fn rebuild_layout(&mut self) {
        self.layout.rebuild(
            self.buffer.content(),
            &self.styles,
            self.metrics.as_deref(),
            self.config.tab_size,
        );
        #[cfg(debug_assertions)]
        self.layout.assert_coverage(self.buffer.len());
    }

    /// Re-resolves both markers at the given absolute indices against the
    /// current layout and recomputes the selection flag.
    fn reposition_markers(&mut self, cursor_abs: usize, anchor_abs: usize) {
        let tab_width = self.tab_width();
        let mut caret = self.caret;
        {
            let ctx = MarkerCtx {
                layout: &self.layout,
                text: self.buffer.content(),
                metrics: self.metrics.as_deref(),
                styles: &self.styles,
                tab_width,
            };
            caret.cursor.move_to_index(&ctx, cursor_abs);
            caret.anchor.move_to_index(&ctx, anchor_abs);
        }
        caret.recompute(&self.layout);
        self.caret = caret;
    }

    /// Full relayout preserving marker positions; used when a
    /// layout-affecting input other than the text changes.
    fn refresh_layout(&mut self) {
        let cursor = self.cursor_index();
        let anchor = self.anchor_index();
        self.begin_dirty();
        self.rebuild_layout();
        self.reposition_markers(cursor, anchor);
        let rect = self.container_rect();
        self.add_dirty(rect);
        self.end_dirty();
    }

    /// Post-mutation pipeline: relayout, reposition markers, notify, dirty
    /// the container.
    fn finish_mutation(&mut self, cursor_abs: usize, anchor_abs: usize) {
        self.begin_dirty();
        self.rebuild_layout();
        self.reposition_markers(cursor_abs, anchor_abs);
        self.reset_blink();
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_text_changed();
        }
        let rect = self.container_rect();
        self.add_dirty(rect);
        self.end_dirty();
    }

    // ==================== Editing ====================

    /// Replaces the whole buffer (input is CR-normalized) and homes the
    /// markers. Returns false if the text is unchanged.
    pub fn set_text(&mut self, text: &str) -> bool {
        if !self.buffer.set_text(text) {
            return false;
        }
        self.finish_mutation(0, 0);
        true
    }

    /// Inserts normalized text at a byte offset (clamped and snapped to a
    /// char boundary). Markers at or after the insertion point shift right.
    pub fn insert_text(&mut self, text: &str, at: usize) -> bool {
        let at = self.buffer.clamp_offset(at);
        let before = self.buffer.len();
        if !self.buffer.insert_text(text, at) {
            return false;
        }
        let delta = self.buffer.len() - before;
        let cursor = self.cursor_index();
        let anchor = self.anchor_index();
        let adjust = |p: usize| if p >= at { p + delta } else { p };
        self.finish_mutation(adjust(cursor), adjust(anchor));
        true
    }

    /// Inserts one character at a byte offset. Carriage returns are
    /// silently dropped (a no-op returning false).
    pub fn insert_char(&mut self, ch: char, at: usize) -> bool {
        let at = self.buffer.clamp_offset(at);
        if !self.buffer.insert_char(ch, at) {
            return false;
        }
        let delta = ch.len_utf8();
        let cursor = self.cursor_index();
        let anchor = self.anchor_index();
        let adjust = |p: usize| if p >= at { p + delta } else { p };
        self.finish_mutation(adjust(cursor), adjust(anchor));
        true
    }

    /// Deletes a byte range (any order, clamped). Markers inside the range
    /// collapse to its start; markers past it shift left.
    pub fn delete_range(&mut self, from: usize, to: usize) -> bool {
        let beg = self.buffer.clamp_offset(from.min(to));
        let end = self.buffer.clamp_offset(from.max(to));
        if !self.buffer.delete_range(beg, end) {
            return false;
        }
        let removed = end - beg;
        let cursor = self.cursor_index();
        let anchor = self.anchor_index();
        let adjust = |p: usize| {
            if p >= end {
                p - removed
            } else {
                p.min(beg)
            }
        };
        self.finish_mutation(adjust(cursor), adjust(anchor));
        true
    }

    /// Types a character at the cursor, replacing the selection if one is
    /// active. One dirty rect reaches the host for the whole compound.
    pub fn insert_char_at_cursor(&mut self, ch: char) -> bool {
        self.begin_dirty();
        if self.caret.anything_selected {
            self.delete_selection();
        }
        let at = self.cursor_index();
        let inserted = self.insert_char(ch, at);
        self.end_dirty();
        inserted
    }

    /// Pastes text at the cursor, replacing the selection if one is active.
    pub fn insert_text_at_cursor(&mut self, text: &str) -> bool {
        self.begin_dirty();
        if self.caret.anything_selected {
            self.delete_selection();
        }
        let at = self.cursor_index();
        let inserted = self.insert_text(text, at);
        self.end_dirty();
        inserted
    }

    /// Backspace: deletes the selection, or the char left of the cursor.
    pub fn delete_char_left_of_cursor(&mut self) -> bool {
        if self.caret.anything_selected {
            return self.delete_selection();
        }
        let abs = self.cursor_index();
        if abs == 0 {
            return false;
        }
        let prev = self.buffer.prev_char_boundary(abs);
        self.delete_range(prev, abs)
    }

    /// Forward delete: deletes the selection, or the char right of the
    /// cursor.
    pub fn delete_char_right_of_cursor(&mut self) -> bool {
        if self.caret.anything_selected {
            return self.delete_selection();
        }
        let abs = self.cursor_index();
        if abs >= self.buffer.len() {
            return false;
        }
        let next = self.buffer.next_char_boundary(abs);
        self.delete_range(abs, next)
    }

    /// Deletes the selected range, if any.
    pub fn delete_selection(&mut self) -> bool {
        match self.caret.range(&self.layout) {
            Some((s, e)) => self.delete_range(s, e),
            None => false,
        }
    }

    // ==================== Selection ====================

    /// Places the anchor and cursor explicitly. Returns false if neither
    /// marker moved.
    pub fn select(&mut self, anchor: usize, cursor: usize) -> bool {
        let before = (self.cursor_index(), self.anchor_index());
        self.begin_dirty();
        let old_rect = self.cursor_rect();
        self.reposition_markers(cursor, anchor);
        let after = (self.cursor_index(), self.anchor_index());
        if after != before {
            self.reset_blink();
            if let Some(hooks) = self.hooks.as_mut() {
                hooks.on_cursor_move();
            }
            let rect = old_rect.union(self.container_rect());
            self.add_dirty(rect);
        }
        self.end_dirty();
        after != before
    }

    pub fn select_all(&mut self) -> bool {
        let len = self.buffer.len();
        self.select(0, len)
    }

    /// Raises the selection-mode count: cursor movement extends the
    /// selection from the anchor while the count is nonzero.
    pub fn enter_selection_mode(&mut self) {
        self.selection_mode += 1;
    }

    /// Lowers the selection-mode count; never goes below zero.
    pub fn leave_selection_mode(&mut self) {
        self.selection_mode = self.selection_mode.saturating_sub(1);
    }

    pub fn is_selection_mode_active(&self) -> bool {
        self.selection_mode > 0
    }

    /// RAII form of enter/leave: selection mode lasts as long as the
    /// returned scope, which derefs to the engine.
    pub fn selection_scope(&mut self) -> SelectionScope<'_> {
        self.enter_selection_mode();
        SelectionScope { engine: self }
    }

    // ==================== Cursor movement ====================

    fn apply_cursor_move<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Marker, &MarkerCtx<'_>) -> bool,
    {
        let old_rect = self.cursor_rect();
        let tab_width = self.tab_width();
        let mut cursor = self.caret.cursor;
        let moved = {
            let ctx = MarkerCtx {
                layout: &self.layout,
                text: self.buffer.content(),
                metrics: self.metrics.as_deref(),
                styles: &self.styles,
                tab_width,
            };
            f(&mut cursor, &ctx)
        };
        if !moved {
            return false;
        }
        self.caret.cursor = cursor;
        self.after_cursor_move(old_rect);
        true
    }

    fn after_cursor_move(&mut self, old_rect: Rect) {
        self.begin_dirty();
        if self.selection_mode > 0 {
            self.caret.recompute(&self.layout);
            let rect = self.container_rect();
            self.add_dirty(rect);
        } else {
            let had_selection = self.caret.anything_selected;
            self.caret.collapse_to_cursor();
            if had_selection {
                let rect = self.container_rect();
                self.add_dirty(rect);
            }
        }
        self.reset_blink();
        let rect = old_rect.union(self.cursor_rect());
        self.add_dirty(rect);
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_cursor_move();
        }
        self.end_dirty();
    }

    pub fn cursor_left(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| m.move_left(ctx))
    }

    pub fn cursor_right(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| m.move_right(ctx))
    }

    pub fn cursor_up(&mut self) -> bool {
        self.move_cursor_lines(-1)
    }

    pub fn cursor_down(&mut self) -> bool {
        self.move_cursor_lines(1)
    }

    /// Moves the cursor `amount` lines down (negative = up), clamped to
    /// the text.
    pub fn move_cursor_lines(&mut self, amount: isize) -> bool {
        self.apply_cursor_move(|m, ctx| m.move_y(ctx, amount))
    }

    /// Moves by whole pages, sized from the container height and the
    /// default style's line height.
    pub fn move_cursor_pages(&mut self, pages: isize) -> bool {
        let line_height = self.styles.default_metrics().map_or(0.0, |m| m.line_height);
        let lines = if line_height > 0.0 {
            ((self.config.container_height / line_height).floor() as isize).max(1)
        } else {
            1
        };
        self.move_cursor_lines(pages * lines)
    }

    pub fn cursor_page_up(&mut self) -> bool {
        self.move_cursor_pages(-1)
    }

    pub fn cursor_page_down(&mut self) -> bool {
        self.move_cursor_pages(1)
    }

    /// Hit test: moves the cursor to the container-space point, which is
    /// translated by the scroll offset into content space.
    pub fn move_cursor_to_point(&mut self, x: f32, y: f32) -> bool {
        let cx = x + self.config.scroll_x;
        let cy = y + self.config.scroll_y;
        self.apply_cursor_move(|m, ctx| m.move_to_point(ctx, cx, cy))
    }

    /// Moves the cursor to an absolute byte index (clamped, boundary
    /// snapped).
    pub fn move_cursor_to_index(&mut self, index: usize) -> bool {
        self.apply_cursor_move(|m, ctx| m.move_to_index(ctx, index))
    }

    pub fn cursor_to_line_start(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| {
            let line = ctx.layout.runs.get(m.run).map_or(0, |r| r.line);
            m.to_line_start(ctx, line)
        })
    }

    pub fn cursor_to_line_end(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| {
            let line = ctx.layout.runs.get(m.run).map_or(0, |r| r.line);
            m.to_line_end(ctx, line)
        })
    }

    pub fn cursor_to_text_start(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| m.to_text_start(ctx))
    }

    pub fn cursor_to_text_end(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| m.to_text_end(ctx))
    }

    pub fn cursor_end_of_word(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| m.end_of_word(ctx))
    }

    pub fn cursor_start_of_word(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| m.start_of_word(ctx))
    }

    pub fn cursor_start_of_next_word(&mut self) -> bool {
        self.apply_cursor_move(|m, ctx| m.start_of_next_word(ctx))
    }

    // ==================== Undo ====================

    fn marker_state(&self) -> MarkerState {
        MarkerState {
            cursor: self.cursor_index(),
            anchor: self.anchor_index(),
            anything_selected: self.caret.anything_selected,
        }
    }

    /// Snapshots the buffer and markers as the "before" side of the next
    /// undo point.
    pub fn prepare_undo_point(&mut self) {
        let state = self.marker_state();
        self.undo.prepare(self.buffer.content(), state);
    }

    /// Commits the prepared snapshot against the current state. `Ok(false)`
    /// means nothing changed since prepare.
    pub fn commit_undo_point(&mut self) -> Result<bool, EngineError> {
        let state = self.marker_state();
        let committed = self.undo.commit(self.buffer.content(), state)?;
        if committed {
            let pointer = self.undo.undo_points_remaining();
            if let Some(hooks) = self.hooks.as_mut() {
                hooks.on_undo_point_changed(pointer);
            }
        }
        Ok(committed)
    }

    /// Reverts the most recent undo point, restoring text and markers.
    pub fn undo(&mut self) -> bool {
        let (pos, applied_len, restore, state) = match self.undo.back() {
            Some(rec) => (rec.pos, rec.new_text.len(), rec.old_text.clone(), rec.old_state),
            None => return false,
        };
        self.undo.retreat();
        self.apply_history_swap(pos, applied_len, &restore, state);
        true
    }

    /// Reapplies the next redoable point.
    pub fn redo(&mut self) -> bool {
        let (pos, applied_len, restore, state) = match self.undo.forward() {
            Some(rec) => (rec.pos, rec.old_text.len(), rec.new_text.clone(), rec.new_state),
            None => return false,
        };
        self.undo.advance();
        self.apply_history_swap(pos, applied_len, &restore, state);
        true
    }

    fn apply_history_swap(&mut self, pos: usize, remove_len: usize, insert: &str, state: MarkerState) {
        self.begin_dirty();
        self.buffer.splice(pos, remove_len, insert);
        self.rebuild_layout();
        self.reposition_markers(state.cursor, state.anchor);
        self.reset_blink();
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_text_changed();
        }
        let pointer = self.undo.undo_points_remaining();
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_undo_point_changed(pointer);
        }
        let rect = self.container_rect();
        self.add_dirty(rect);
        self.end_dirty();
    }

    pub fn undo_points_remaining(&self) -> usize {
        self.undo.undo_points_remaining()
    }

    pub fn redo_points_remaining(&self) -> usize {
        self.undo.redo_points_remaining()
    }

    /// Drops all undo history.
    pub fn clear_undo_history(&mut self) {
        if self.undo.clear() {
            if let Some(hooks) = self.hooks.as_mut() {
                hooks.on_undo_point_changed(0);
            }
        }
    }

    // ==================== Search ====================

    /// Finds the next occurrence of `needle` from the cursor, wrapping to
    /// the start of the text. A hit becomes the selection with the cursor
    /// at its end, so repeated calls walk successive matches.
    pub fn find_next(&mut self, needle: &str) -> Option<(usize, usize)> {
        let hit = find_wrapping(self.buffer.content(), needle, self.cursor_index())?;
        self.select(hit.0, hit.1);
        Some(hit)
    }

    /// Like [`find_next`](Engine::find_next) without wrapping.
    pub fn find_next_no_wrap(&mut self, needle: &str) -> Option<(usize, usize)> {
        let hit = find_forward(self.buffer.content(), needle, self.cursor_index())?;
        self.select(hit.0, hit.1);
        Some(hit)
    }

    // ==================== Configuration ====================

    pub fn set_container_size(&mut self, width: f32, height: f32) {
        if (self.config.container_width, self.config.container_height) == (width, height) {
            return;
        }
        self.config.container_width = width;
        self.config.container_height = height;
        let rect = self.container_rect();
        self.add_dirty(rect);
    }

    pub fn set_scroll_offset(&mut self, x: f32, y: f32) {
        if (self.config.scroll_x, self.config.scroll_y) == (x, y) {
            return;
        }
        self.config.scroll_x = x;
        self.config.scroll_y = y;
        let rect = self.container_rect();
        self.add_dirty(rect);
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        if self.config.tab_size == tab_size {
            return;
        }
        self.config.tab_size = tab_size;
        self.refresh_layout();
    }

    pub fn set_cursor_width(&mut self, width: f32) {
        if self.config.cursor_width == width {
            return;
        }
        let old = self.cursor_rect();
        self.config.cursor_width = width;
        self.add_dirty(old.union(self.cursor_rect()));
    }

    pub fn set_blink_rate(&mut self, ms: u32) {
        self.config.blink_rate_ms = ms;
        self.reset_blink();
    }

    // ==================== Cursor blink ====================

    fn reset_blink(&mut self) {
        let was_on = self.blink_on;
        self.blink_on = true;
        self.blink_remaining_ms = self.config.blink_rate_ms;
        if !was_on {
            let rect = self.cursor_rect();
            self.add_dirty(rect);
        }
    }

    /// Advances the blink clock; the host calls this from its timer. When
    /// the half-period expires the bar toggles and its rectangle is
    /// dirtied.
    pub fn step(&mut self, elapsed_ms: u32) {
        if !self.cursor_shown {
            return;
        }
        if elapsed_ms >= self.blink_remaining_ms {
            self.blink_on = !self.blink_on;
            self.blink_remaining_ms = self.config.blink_rate_ms;
            let rect = self.cursor_rect();
            self.add_dirty(rect);
        } else {
            self.blink_remaining_ms -= elapsed_ms;
        }
    }

    /// Shows or hides the cursor entirely (focus changes).
    pub fn set_cursor_shown(&mut self, shown: bool) {
        if self.cursor_shown == shown {
            return;
        }
        self.cursor_shown = shown;
        self.blink_on = true;
        self.blink_remaining_ms = self.config.blink_rate_ms;
        let rect = self.cursor_rect();
        self.add_dirty(rect);
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_shown && self.blink_on
    }

    // ==================== Paint ====================

    /// Paints the content under `clip` (container space): line by line,
    /// splitting runs against the selection, with blank strips flanking
    /// each line's content and the cursor bar on top.
    pub fn paint(&self, clip: Rect, painter: &mut dyn Painter) {
        let clip = clip.intersect(self.container_rect());
        if clip.is_degenerate() {
            return;
        }
        let default_token = self.styles.default_token();
        if self.layout.lines.is_empty() {
            painter.paint_rect(default_token, clip);
            self.paint_cursor(clip, painter);
            return;
        }

        let tab_width = self.tab_width();
        let ctx = MarkerCtx {
            layout: &self.layout,
            text: self.buffer.content(),
            metrics: self.metrics.as_deref(),
            styles: &self.styles,
            tab_width,
        };
        let ox = -self.config.scroll_x;
        let oy = -self.config.scroll_y;
        let selection_token = self.styles.token(self.styles.role(StyleRole::Selection));
        let active_token = self
            .styles
            .token(self.styles.role(StyleRole::ActiveLine))
            .or(default_token);
        let selection = self.caret.range(&self.layout);
        let cursor_line = self.layout.runs.get(self.caret.cursor.run).map(|r| r.line);
        let text = self.buffer.content();

        for (li, line) in self.layout.lines.iter().enumerate() {
            let top = line.y + oy;
            if top >= clip.bottom() {
                break;
            }
            if top + line.height <= clip.y {
                continue;
            }
            let line_bg = if Some(li) == cursor_line {
                active_token
            } else {
                default_token
            };
            let runs = &self.layout.runs[line.first_run..=line.last_run];

            let left_edge = runs[0].x + ox;
            if left_edge > clip.x {
                painter.paint_rect(line_bg, Rect::new(clip.x, top, left_edge - clip.x, line.height));
            }

            for run in runs {
                let rx = run.x + ox;
                if rx >= clip.right() {
                    break;
                }
                if run.width > 0.0 && rx + run.width <= clip.x {
                    continue;
                }
                if matches!(run.kind, RunKind::Newline | RunKind::Terminal) {
                    continue;
                }
                for (s, e, selected) in split_for_selection(run.start, run.end, selection) {
                    let x0 = rx + rel_x_in_run(&ctx, run, s - run.start);
                    let x1 = rx + rel_x_in_run(&ctx, run, e - run.start);
                    let bg = if selected {
                        selection_token.or(line_bg)
                    } else {
                        line_bg
                    };
                    let rect = Rect::new(x0, top, x1 - x0, line.height);
                    match run.kind {
                        RunKind::Text => painter.paint_run(default_token, bg, &text[s..e], rect),
                        RunKind::Tab => painter.paint_rect(bg, rect),
                        RunKind::Newline | RunKind::Terminal => {}
                    }
                }
            }

            // Blank strip right of the line's content.
            let last = &runs[runs.len() - 1];
            let right_edge = (last.x + last.width + ox).max(clip.x);
            if right_edge < clip.right() {
                painter.paint_rect(
                    line_bg,
                    Rect::new(right_edge, top, clip.right() - right_edge, line.height),
                );
            }
        }

        // Blank area below the last line.
        let content_bottom = (self.layout.height + oy).max(clip.y);
        if content_bottom < clip.bottom() {
            painter.paint_rect(
                default_token,
                Rect::new(clip.x, content_bottom, clip.w, clip.bottom() - content_bottom),
            );
        }

        self.paint_cursor(clip, painter);
    }

    fn paint_cursor(&self, clip: Rect, painter: &mut dyn Painter) {
        if !self.is_cursor_visible() {
            return;
        }
        let rect = self.cursor_rect();
        if rect.intersect(clip).is_degenerate() {
            return;
        }
        let token = self
            .styles
            .token(self.styles.role(StyleRole::Cursor))
            .or(self.styles.default_token());
        painter.paint_rect(token, rect);
    }
}

/// RAII selection mode: created by
/// [`Engine::selection_scope`], leaves selection mode on drop.
pub struct SelectionScope<'a> {
    engine: &'a mut Engine,
}

impl Deref for SelectionScope<'_> {
    type Target = Engine;

    fn deref(&self) -> &Engine {
        self.engine
    }
}

impl DerefMut for SelectionScope<'_> {
    fn deref_mut(&mut self) -> &mut Engine {
        self.engine
    }
}

impl Drop for SelectionScope<'_> {
    fn drop(&mut self) {
        self.engine.leave_selection_mode();
    }
}
