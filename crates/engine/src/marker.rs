//! Markers: logical editing positions over the run layout.
//!
//! A marker addresses a position as (run index, byte offset within the run)
//! plus two cached pixel values: `relative_x`, the offset from the owning
//! run's left edge, and `sticky_x`, the absolute x the marker tries to
//! return to when moving vertically.
//!
//! Markers store run *indices* because runs are fully rebuilt on every edit;
//! after a rebuild the engine repositions each marker from its absolute
//! byte index. A marker sitting exactly at a run's length normalizes to
//! offset 0 of the next run, except at the terminal run.

use crate::host::Metrics;
use crate::layout::{is_symbol_or_whitespace, tab_run_width, Layout, Run, RunKind};
use crate::style::StyleTable;

/// Everything marker movement needs to resolve positions: the current
/// layout, the buffer text it was built from, and the measurement path.
pub(crate) struct MarkerCtx<'a> {
    pub layout: &'a Layout,
    pub text: &'a str,
    pub metrics: Option<&'a dyn Metrics>,
    pub styles: &'a StyleTable,
    pub tab_width: f32,
}

impl<'a> MarkerCtx<'a> {
    fn run(&self, index: usize) -> &'a Run {
        &self.layout.runs[index]
    }

    fn run_text(&self, run: &Run) -> &'a str {
        &self.text[run.start..run.end]
    }
}

/// Pixel offset of byte `offset` from the left edge of `run`.
///
/// Text runs resolve through the host measurement callback; tab runs are
/// resolved analytically from the tab-stop formula (the callback knows
/// nothing about tab stops); newline/terminal runs are zero-width.
pub(crate) fn rel_x_in_run(ctx: &MarkerCtx<'_>, run: &Run, offset: usize) -> f32 {
    match run.kind {
        RunKind::Text => match (ctx.metrics, ctx.styles.default_token()) {
            (Some(m), Some(token)) => m.cursor_position_from_char(token, ctx.run_text(run), offset),
            _ => 0.0,
        },
        RunKind::Tab => {
            if offset == 0 {
                0.0
            } else {
                tab_run_width(run.x, offset, ctx.tab_width)
            }
        }
        RunKind::Newline | RunKind::Terminal => 0.0,
    }
}

/// A logical cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Marker {
    /// Index of the owning run. Only valid against the layout generation
    /// it was resolved for.
    pub run: usize,
    /// Byte offset within the run; always `< run.len()` except on the
    /// terminal run where it is 0.
    pub offset: usize,
    /// Cached pixel offset from the run's left edge.
    pub relative_x: f32,
    /// Absolute x this marker returns to on vertical moves.
    pub sticky_x: f32,
}

impl Marker {
    /// Absolute byte index of this marker.
    pub fn abs_index(&self, layout: &Layout) -> usize {
        match layout.runs.get(self.run) {
            Some(run) => run.start + self.offset,
            None => 0,
        }
    }

    /// Absolute pixel position `(x, line_top)` in content space.
    pub fn pixel_position(&self, layout: &Layout) -> (f32, f32) {
        match layout.runs.get(self.run) {
            Some(run) => (run.x + self.relative_x, run.y),
            None => (0.0, 0.0),
        }
    }

    fn reset_to_origin(&mut self) {
        *self = Marker::default();
    }

    /// Repositions the marker at absolute byte index `abs`.
    ///
    /// The index is clamped to `[0, len]` and snapped down to a char
    /// boundary. Updates `relative_x` and `sticky_x`. Returns true if the
    /// marker's run or offset changed.
    pub(crate) fn move_to_index(&mut self, ctx: &MarkerCtx<'_>, abs: usize) -> bool {
        let before = (self.run, self.offset);
        if ctx.layout.runs.is_empty() {
            self.reset_to_origin();
            return before != (0, 0);
        }

        let mut abs = abs.min(ctx.text.len());
        while abs > 0 && !ctx.text.is_char_boundary(abs) {
            abs -= 1;
        }

        // run_containing is total for non-empty layouts.
        let mut run_idx = ctx.layout.run_containing(abs).unwrap_or(0);
        let mut offset = abs - ctx.run(run_idx).start;

        // Normalize: a marker at a run's length belongs to the next run.
        if offset == ctx.run(run_idx).len() && ctx.run(run_idx).kind != RunKind::Terminal {
            run_idx += 1;
            offset = 0;
        }

        self.run = run_idx;
        self.offset = offset;
        self.relative_x = rel_x_in_run(ctx, ctx.run(run_idx), offset);
        self.sticky_x = ctx.run(run_idx).x + self.relative_x;
        (self.run, self.offset) != before
    }

    // ==================== Character movement ====================

    /// Moves one character left, hopping run boundaries. Returns false at
    /// the start of text.
    pub(crate) fn move_left(&mut self, ctx: &MarkerCtx<'_>) -> bool {
        if ctx.layout.runs.is_empty() {
            return false;
        }
        let abs = self.abs_index(ctx.layout);
        if abs == 0 {
            return false;
        }
        let mut prev = abs - 1;
        while prev > 0 && !ctx.text.is_char_boundary(prev) {
            prev -= 1;
        }
        self.move_to_index(ctx, prev)
    }

    /// Moves one character right, hopping run boundaries. Returns false at
    /// the end of text.
    pub(crate) fn move_right(&mut self, ctx: &MarkerCtx<'_>) -> bool {
        if ctx.layout.runs.is_empty() {
            return false;
        }
        let abs = self.abs_index(ctx.layout);
        if abs >= ctx.text.len() {
            return false;
        }
        let mut next = abs + 1;
        while next < ctx.text.len() && !ctx.text.is_char_boundary(next) {
            next += 1;
        }
        self.move_to_index(ctx, next)
    }

    // ==================== Vertical movement ====================

    /// Moves `amount` lines down (negative = up), resolving against
    /// `sticky_x` on the target line. Vertical moves never update
    /// `sticky_x`, so repeated moves through short lines remember the
    /// original column. Returns false if the clamped target is the current
    /// line.
    pub(crate) fn move_y(&mut self, ctx: &MarkerCtx<'_>, amount: isize) -> bool {
        if ctx.layout.lines.is_empty() {
            return false;
        }
        let current = ctx.run(self.run).line;
        let last = ctx.layout.line_count() - 1;
        let target = (current as isize + amount).clamp(0, last as isize) as usize;
        if target == current {
            return false;
        }
        let sticky = self.sticky_x;
        self.locate_in_line(ctx, target, sticky);
        self.sticky_x = sticky;
        true
    }

    // ==================== Point hit test ====================

    /// Positions the marker at the content-space point `(x, y)`. The line
    /// is clamped to the first/last line when `y` is outside all content.
    /// Returns true if the marker changed run/offset.
    pub(crate) fn move_to_point(&mut self, ctx: &MarkerCtx<'_>, x: f32, y: f32) -> bool {
        let before = (self.run, self.offset);
        let line = match ctx.layout.line_at_y(y) {
            Some(line) => line,
            None => return false,
        };
        self.locate_in_line(ctx, line, x);
        self.sticky_x = ctx.run(self.run).x + self.relative_x;
        (self.run, self.offset) != before
    }

    /// Shared hit-test core: resolve `x` within `line_idx`. Sets run,
    /// offset and `relative_x`; the caller decides what happens to
    /// `sticky_x`.
    fn locate_in_line(&mut self, ctx: &MarkerCtx<'_>, line_idx: usize, x: f32) {
        let line = ctx.layout.lines[line_idx];
        let runs = &ctx.layout.runs[line.first_run..=line.last_run];

        // Left of all content on the line.
        if x < runs[0].x {
            self.run = line.first_run;
            self.offset = 0;
            self.relative_x = 0.0;
            return;
        }

        for (i, run) in runs.iter().enumerate() {
            if x >= run.x + run.width {
                continue;
            }
            let run_idx = line.first_run + i;
            match run.kind {
                RunKind::Text => {
                    let (snapped, byte_idx) = match (ctx.metrics, ctx.styles.default_token()) {
                        (Some(m), Some(token)) => m.cursor_position_from_point(
                            token,
                            ctx.run_text(run),
                            run.width,
                            x - run.x,
                        ),
                        _ => (0.0, 0),
                    };
                    if byte_idx >= run.len() {
                        // Snapped past the run's last character: normalize
                        // onto the next run (same line; text runs are never
                        // last on a line).
                        self.run = run_idx + 1;
                        self.offset = 0;
                        self.relative_x = 0.0;
                    } else {
                        self.run = run_idx;
                        self.offset = byte_idx;
                        self.relative_x = snapped;
                    }
                }
                RunKind::Tab => {
                    // Locate the tab cell containing x and round to the
                    // nearer edge.
                    let count = run.len();
                    let edge = |cell: usize| {
                        if cell == 0 {
                            run.x
                        } else {
                            run.x + tab_run_width(run.x, cell, ctx.tab_width)
                        }
                    };
                    let mut cell = 0usize;
                    while cell < count {
                        let left = edge(cell);
                        let right = edge(cell + 1);
                        if x < right {
                            let offset = if x - left < right - x { cell } else { cell + 1 };
                            if offset >= count {
                                self.run = run_idx + 1;
                                self.offset = 0;
                                self.relative_x = 0.0;
                            } else {
                                self.run = run_idx;
                                self.offset = offset;
                                self.relative_x = rel_x_in_run(ctx, run, offset);
                            }
                            return;
                        }
                        cell += 1;
                    }
                    // x beyond the last cell edge; fall through to the next
                    // run on the next loop iteration.
                    continue;
                }
                RunKind::Newline | RunKind::Terminal => {
                    self.run = run_idx;
                    self.offset = 0;
                    self.relative_x = 0.0;
                }
            }
            return;
        }

        // Right of all content: end of line (the last run is always a
        // newline or the terminal).
        self.run = line.last_run;
        self.offset = 0;
        self.relative_x = 0.0;
    }

    // ==================== Line and text bounds ====================

    /// Jumps to the first character of `line_idx`. Returns false for an
    /// out-of-range line.
    pub(crate) fn to_line_start(&mut self, ctx: &MarkerCtx<'_>, line_idx: usize) -> bool {
        match ctx.layout.lines.get(line_idx) {
            Some(line) => self.move_to_index(ctx, ctx.run(line.first_run).start),
            None => false,
        }
    }

    /// Jumps past the last character of `line_idx` (onto its terminating
    /// newline or the terminal run). Returns false for an out-of-range
    /// line.
    pub(crate) fn to_line_end(&mut self, ctx: &MarkerCtx<'_>, line_idx: usize) -> bool {
        match ctx.layout.lines.get(line_idx) {
            Some(line) => self.move_to_index(ctx, ctx.run(line.last_run).start),
            None => false,
        }
    }

    /// Jumps to the start of the text.
    pub(crate) fn to_text_start(&mut self, ctx: &MarkerCtx<'_>) -> bool {
        self.move_to_index(ctx, 0)
    }

    /// Jumps to the end of the text (the terminal run).
    pub(crate) fn to_text_end(&mut self, ctx: &MarkerCtx<'_>) -> bool {
        self.move_to_index(ctx, ctx.text.len())
    }

    // ==================== Word movement ====================

    /// Moves to the end of the current word. From a symbol/whitespace
    /// character this is a single character step; from inside a word it
    /// scans until the classifier flips.
    pub(crate) fn end_of_word(&mut self, ctx: &MarkerCtx<'_>) -> bool {
        let abs = self.abs_index(ctx.layout);
        match end_of_word_from(ctx.text, abs) {
            Some(next) => self.move_to_index(ctx, next),
            None => false,
        }
    }

    /// Moves to the start of the next word: end-of-word, then skip the
    /// following symbol/whitespace span.
    pub(crate) fn start_of_next_word(&mut self, ctx: &MarkerCtx<'_>) -> bool {
        let abs = self.abs_index(ctx.layout);
        let mut pos = match end_of_word_from(ctx.text, abs) {
            Some(next) => next,
            None => return false,
        };
        let bytes = ctx.text.as_bytes();
        while pos < bytes.len() && is_symbol_or_whitespace(bytes[pos]) {
            pos = next_boundary(ctx.text, pos);
        }
        self.move_to_index(ctx, pos)
    }

    /// Moves to the start of the current word: skip trailing
    /// symbol/whitespace backward, then the contiguous word run backward.
    pub(crate) fn start_of_word(&mut self, ctx: &MarkerCtx<'_>) -> bool {
        let abs = self.abs_index(ctx.layout);
        if abs == 0 {
            return false;
        }
        let bytes = ctx.text.as_bytes();
        let mut pos = abs;
        while pos > 0 {
            let prev = prev_boundary(ctx.text, pos);
            if !is_symbol_or_whitespace(bytes[prev]) {
                break;
            }
            pos = prev;
        }
        while pos > 0 {
            let prev = prev_boundary(ctx.text, pos);
            if is_symbol_or_whitespace(bytes[prev]) {
                break;
            }
            pos = prev;
        }
        self.move_to_index(ctx, pos)
    }
}

fn prev_boundary(text: &str, pos: usize) -> usize {
    let mut prev = pos.saturating_sub(1);
    while prev > 0 && !text.is_char_boundary(prev) {
        prev -= 1;
    }
    prev
}

fn next_boundary(text: &str, pos: usize) -> usize {
    let mut next = (pos + 1).min(text.len());
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}

/// Target of an end-of-word step from `abs`, or `None` at end of text.
fn end_of_word_from(text: &str, abs: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if abs >= bytes.len() {
        return None;
    }
    if is_symbol_or_whitespace(bytes[abs]) {
        return Some(next_boundary(text, abs));
    }
    let mut pos = abs;
    while pos < bytes.len() && !is_symbol_or_whitespace(bytes[pos]) {
        pos = next_boundary(text, pos);
    }
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FontMetrics, StyleRole};
    use crate::tutils::FixedMetrics;

    const CHAR_W: f32 = 8.0;

    struct Fixture {
        layout: Layout,
        styles: StyleTable,
        metrics: FixedMetrics,
        text: String,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let mut styles = StyleTable::new();
            let slot = styles
                .register(
                    1,
                    FontMetrics {
                        ascent: 12.0,
                        descent: 4.0,
                        line_height: 16.0,
                        space_width: CHAR_W,
                    },
                )
                .unwrap();
            styles.set_role(StyleRole::Default, slot);
            let metrics = FixedMetrics::new(CHAR_W, 16.0);
            let mut layout = Layout::new();
            layout.rebuild(text, &styles, Some(&metrics), 4);
            Self {
                layout,
                styles,
                metrics,
                text: text.to_string(),
            }
        }

        fn ctx(&self) -> MarkerCtx<'_> {
            MarkerCtx {
                layout: &self.layout,
                text: &self.text,
                metrics: Some(&self.metrics),
                styles: &self.styles,
                tab_width: 4.0 * CHAR_W,
            }
        }
    }

    // ==================== Absolute index round trip ====================

    #[test]
    fn move_to_index_round_trips_every_boundary() {
        let fx = Fixture::new("ab\tcd\nef");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        for i in 0..=fx.text.len() {
            marker.move_to_index(&ctx, i);
            assert_eq!(marker.abs_index(&fx.layout), i, "index {i}");
        }
    }

    #[test]
    fn marker_at_run_length_normalizes_to_next_run() {
        let fx = Fixture::new("ab\ncd");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        // Index 2 is the end of "ab" and the start of the newline run.
        marker.move_to_index(&ctx, 2);
        assert_eq!(fx.layout.runs[marker.run].kind, RunKind::Newline);
        assert_eq!(marker.offset, 0);
    }

    #[test]
    fn end_of_text_stays_on_terminal() {
        let fx = Fixture::new("ab");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_index(&ctx, 2);
        assert_eq!(fx.layout.runs[marker.run].kind, RunKind::Terminal);
        assert_eq!(marker.offset, 0);
        assert_eq!(marker.abs_index(&fx.layout), 2);
    }

    // ==================== Character movement ====================

    #[test]
    fn left_right_walk_the_whole_text() {
        let fx = Fixture::new("a\tb\nc");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        let mut seen = vec![marker.abs_index(&fx.layout)];
        while marker.move_right(&ctx) {
            seen.push(marker.abs_index(&fx.layout));
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        while marker.move_left(&ctx) {}
        assert_eq!(marker.abs_index(&fx.layout), 0);
    }

    #[test]
    fn left_at_start_and_right_at_end_are_noops() {
        let fx = Fixture::new("ab");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(!marker.move_left(&ctx));
        marker.move_to_index(&ctx, 2);
        assert!(!marker.move_right(&ctx));
    }

    #[test]
    fn movement_steps_whole_multibyte_chars() {
        let fx = Fixture::new("aéb");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(marker.move_right(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 1);
        assert!(marker.move_right(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 3); // skipped over 'é'
        assert!(marker.move_left(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 1);
    }

    #[test]
    fn horizontal_moves_update_sticky_x() {
        let fx = Fixture::new("abcd");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_right(&ctx);
        assert_eq!(marker.sticky_x, CHAR_W);
        marker.move_right(&ctx);
        assert_eq!(marker.sticky_x, 2.0 * CHAR_W);
    }

    // ==================== Vertical movement ====================

    #[test]
    fn vertical_moves_remember_the_column() {
        // Middle line is shorter than the marker's column.
        let fx = Fixture::new("abcdef\nab\nabcdef");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_index(&ctx, 5); // column 5 on line 0
        assert!(marker.move_y(&ctx, 1));
        assert_eq!(marker.abs_index(&fx.layout), 9); // clamped to end of "ab"
        assert!(marker.move_y(&ctx, 1));
        // Sticky x restores the original column on the long line.
        assert_eq!(marker.abs_index(&fx.layout), 15);
    }

    #[test]
    fn move_y_clamps_to_first_and_last_line() {
        let fx = Fixture::new("a\nb\nc");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(!marker.move_y(&ctx, -1));
        assert!(marker.move_y(&ctx, 100));
        assert_eq!(fx.layout.runs[marker.run].line, 2);
        assert!(!marker.move_y(&ctx, 1));
    }

    // ==================== Point hit test ====================

    #[test]
    fn point_hit_snaps_to_nearer_char_edge() {
        let fx = Fixture::new("abcd");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        // 3px into the first 8px char: rounds left.
        marker.move_to_point(&ctx, 3.0, 0.0);
        assert_eq!(marker.abs_index(&fx.layout), 0);
        // 5px in: rounds right.
        marker.move_to_point(&ctx, 5.0, 0.0);
        assert_eq!(marker.abs_index(&fx.layout), 1);
    }

    #[test]
    fn point_left_of_line_goes_to_line_start() {
        let fx = Fixture::new("ab\ncd");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_point(&ctx, -100.0, 20.0);
        assert_eq!(marker.abs_index(&fx.layout), 3);
    }

    #[test]
    fn point_right_of_line_goes_to_line_end() {
        let fx = Fixture::new("ab\ncd");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_point(&ctx, 1000.0, 0.0);
        // End of line 0 is the newline run at index 2.
        assert_eq!(marker.abs_index(&fx.layout), 2);
    }

    #[test]
    fn point_below_content_clamps_to_last_line() {
        let fx = Fixture::new("ab\ncd");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_point(&ctx, 0.0, 1000.0);
        assert_eq!(fx.layout.runs[marker.run].line, 1);
    }

    #[test]
    fn point_in_tab_rounds_to_cell_edge() {
        let fx = Fixture::new("\tx");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        // Tab cell spans [0, 32): 10px rounds to the left edge.
        marker.move_to_point(&ctx, 10.0, 0.0);
        assert_eq!(marker.abs_index(&fx.layout), 0);
        // 20px rounds to the right edge, which normalizes onto "x".
        marker.move_to_point(&ctx, 20.0, 0.0);
        assert_eq!(marker.abs_index(&fx.layout), 1);
    }

    // ==================== Line/text bounds ====================

    #[test]
    fn line_bounds() {
        let fx = Fixture::new("ab\ncde");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(marker.to_line_start(&ctx, 1));
        assert_eq!(marker.abs_index(&fx.layout), 3);
        assert!(marker.to_line_end(&ctx, 1));
        assert_eq!(marker.abs_index(&fx.layout), 6);
        assert!(!marker.to_line_start(&ctx, 9));
    }

    #[test]
    fn text_bounds() {
        let fx = Fixture::new("ab\ncd");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(marker.to_text_end(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 5);
        assert!(marker.to_text_start(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 0);
    }

    // ==================== Word movement ====================

    #[test]
    fn end_of_word_from_inside_a_word() {
        let fx = Fixture::new("hello world");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_index(&ctx, 1);
        assert!(marker.end_of_word(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 5);
    }

    #[test]
    fn end_of_word_from_whitespace_is_single_step() {
        let fx = Fixture::new("a  b");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_index(&ctx, 1);
        assert!(marker.end_of_word(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 2);
    }

    #[test]
    fn start_of_next_word_skips_separators() {
        let fx = Fixture::new("foo  bar");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(marker.start_of_next_word(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 5);
    }

    #[test]
    fn start_of_word_backs_over_whitespace_then_word() {
        let fx = Fixture::new("foo  bar");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        marker.move_to_index(&ctx, 5); // start of "bar"
        assert!(marker.start_of_word(&ctx));
        assert_eq!(marker.abs_index(&fx.layout), 0);
    }

    #[test]
    fn word_movement_at_text_edges() {
        let fx = Fixture::new("word");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(!marker.start_of_word(&ctx));
        marker.move_to_index(&ctx, 4);
        assert!(!marker.end_of_word(&ctx));
        assert!(!marker.start_of_next_word(&ctx));
    }

    // ==================== Empty text ====================

    #[test]
    fn empty_text_pins_marker_at_origin() {
        let fx = Fixture::new("");
        let ctx = fx.ctx();
        let mut marker = Marker::default();
        assert!(!marker.move_left(&ctx));
        assert!(!marker.move_right(&ctx));
        assert!(!marker.move_y(&ctx, 1));
        assert!(!marker.move_to_point(&ctx, 10.0, 10.0));
        assert_eq!(marker.abs_index(&fx.layout), 0);
        assert_eq!(marker.pixel_position(&fx.layout), (0.0, 0.0));
    }
}
