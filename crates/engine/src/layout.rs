//! Run layout: splitting the buffer into positioned, measured runs.
//!
//! A run is a maximal span of text that is homogeneous for layout purposes:
//! a group of consecutive tabs, a single newline, the zero-width terminal
//! sentinel, or a maximal stretch of ordinary characters. Runs are grouped
//! into lines and positioned in content pixel space.
//!
//! The layout is rebuilt in full after every buffer mutation or
//! layout-affecting configuration change; there is no incremental patching.
//! Consumers hold run *indices*, never references, and re-resolve them after
//! any rebuild.

use crate::host::Metrics;
use crate::style::StyleTable;

/// Classifies a byte as "symbol or whitespace" for word-boundary purposes.
///
/// This is an exact ASCII-range test, not a general Unicode whitespace test:
/// everything below `'0'`, between `':'` and `'A'`, between `'['` and `'a'`,
/// or above `'{'`. Word movement depends on this exact classification.
pub fn is_symbol_or_whitespace(b: u8) -> bool {
    b < b'0' || (b >= b':' && b < b'A') || (b >= b'[' && b < b'a') || b > b'{'
}

/// What a run is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// A maximal stretch of characters that are not tabs or newlines.
    Text,
    /// One or more consecutive tab characters.
    Tab,
    /// Exactly one newline character; terminates its line.
    Newline,
    /// The zero-width end-of-text sentinel. Always present (for non-empty
    /// text) so a marker can sit after the last character.
    Terminal,
}

/// A positioned, measured span of buffer text.
#[derive(Debug, Clone)]
pub struct Run {
    /// Index of the owning line.
    pub line: usize,
    /// Start byte offset into the buffer.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Left edge in content space.
    pub x: f32,
    /// Top edge in content space (the owning line's top).
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: RunKind,
}

impl Run {
    /// Length of the run's span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true for the zero-width terminal run.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One laid-out line: a contiguous range of runs plus its vertical extent.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    /// Index of the first run on this line.
    pub first_run: usize,
    /// Index of the last run on this line (inclusive; always a newline or
    /// the terminal run).
    pub last_run: usize,
    /// Top edge in content space.
    pub y: f32,
    /// Line height: the max run height seen on the line.
    pub height: f32,
}

/// The full run layout of the buffer.
///
/// Invariant (non-empty text): runs are contiguous, ordered by byte offset,
/// cover exactly `[0, len]`, and end with a zero-width terminal run. Empty
/// text produces zero runs and zero lines; callers special-case that.
#[derive(Debug, Default)]
pub struct Layout {
    pub runs: Vec<Run>,
    pub lines: Vec<Line>,
    /// Overall bounding width (max over lines), for host scroll ranges.
    pub width: f32,
    /// Overall bounding height.
    pub height: f32,
}

/// Finds the next run boundary at `pos`. Boundary precedence: maximal tab
/// run, single newline, terminal, maximal normal run.
fn next_boundary(bytes: &[u8], pos: usize) -> (RunKind, usize) {
    if pos >= bytes.len() {
        return (RunKind::Terminal, pos);
    }
    match bytes[pos] {
        b'\t' => {
            let mut end = pos;
            while end < bytes.len() && bytes[end] == b'\t' {
                end += 1;
            }
            (RunKind::Tab, end)
        }
        b'\n' => (RunKind::Newline, pos + 1),
        _ => {
            let mut end = pos;
            while end < bytes.len() && bytes[end] != b'\t' && bytes[end] != b'\n' {
                end += 1;
            }
            (RunKind::Text, end)
        }
    }
}

/// Pixel width of `count` tabs starting at `x`: tabs always land on the
/// next tab-stop column, so the width depends on where the run starts.
pub(crate) fn tab_run_width(x: f32, count: usize, tab_width: f32) -> f32 {
    if tab_width <= 0.0 {
        return 0.0;
    }
    count as f32 * tab_width - x % tab_width
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of laid-out lines (0 for empty text).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the run whose span contains byte `offset`; offsets at or
    /// past the end resolve to the terminal run. Returns `None` only for
    /// empty text.
    pub fn run_containing(&self, offset: usize) -> Option<usize> {
        if self.runs.is_empty() {
            return None;
        }
        let idx = self.runs.partition_point(|r| !r.is_empty() && r.end <= offset);
        Some(idx.min(self.runs.len() - 1))
    }

    /// Index of the line whose vertical span contains `y`, clamped to the
    /// first/last line when outside all content. Returns `None` only for
    /// empty text.
    pub fn line_at_y(&self, y: f32) -> Option<usize> {
        if self.lines.is_empty() {
            return None;
        }
        let idx = self.lines.partition_point(|l| l.y + l.height <= y);
        Some(idx.min(self.lines.len() - 1))
    }

    /// Rebuilds the entire run list from scratch.
    ///
    /// Normal runs are measured through the host `metrics` with the
    /// default-role style token; when either is absent, layout proceeds
    /// with zero-width runs rather than failing. `tab_size` is in spaces.
    pub fn rebuild(
        &mut self,
        text: &str,
        styles: &StyleTable,
        metrics: Option<&dyn Metrics>,
        tab_size: usize,
    ) {
        self.runs.clear();
        self.lines.clear();
        self.width = 0.0;
        self.height = 0.0;

        if text.is_empty() {
            return;
        }

        let default_token = styles.default_token();
        let base_height = styles.default_metrics().map_or(0.0, |m| m.line_height);
        let space_width = styles.default_metrics().map_or(0.0, |m| m.space_width);
        let tab_width = tab_size as f32 * space_width;

        let bytes = text.as_bytes();
        let mut pos = 0usize;
        let mut line = 0usize;
        let mut first_run = 0usize;
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        let mut line_height = 0.0f32;

        loop {
            let (kind, end) = next_boundary(bytes, pos);
            let (w, h) = match kind {
                RunKind::Tab => (tab_run_width(x, end - pos, tab_width), base_height),
                RunKind::Newline | RunKind::Terminal => (0.0, base_height),
                RunKind::Text => match (metrics, default_token) {
                    (Some(m), Some(token)) => m.measure_string(token, &text[pos..end]),
                    _ => (0.0, base_height),
                },
            };

            self.runs.push(Run {
                line,
                start: pos,
                end,
                x,
                y,
                width: w,
                height: h,
                kind,
            });
            x += w;
            line_height = line_height.max(h);
            pos = end;

            match kind {
                RunKind::Newline | RunKind::Terminal => {
                    self.lines.push(Line {
                        first_run,
                        last_run: self.runs.len() - 1,
                        y,
                        height: line_height,
                    });
                    self.width = self.width.max(x);
                    y += line_height;
                    if kind == RunKind::Terminal {
                        break;
                    }
                    line += 1;
                    first_run = self.runs.len();
                    x = 0.0;
                    line_height = 0.0;
                }
                _ => {}
            }
        }

        self.height = y;
        tracing::trace!(
            runs = self.runs.len(),
            lines = self.lines.len(),
            width = self.width,
            height = self.height,
            "layout rebuilt"
        );
    }

    /// Checks the coverage invariant: runs are contiguous, ordered, cover
    /// `[0, text_len]`, and end with the terminal sentinel. Panics on
    /// violation; the engine runs this after every rebuild in debug builds.
    pub(crate) fn assert_coverage(&self, text_len: usize) {
        if text_len == 0 {
            assert!(self.runs.is_empty(), "empty text must produce zero runs");
            return;
        }
        let mut expected = 0usize;
        for run in &self.runs {
            assert_eq!(run.start, expected, "run gap/overlap at {}", run.start);
            expected = run.end;
        }
        assert_eq!(expected, text_len, "runs must cover the whole buffer");
        let last = self.runs.last().unwrap();
        assert_eq!(last.kind, RunKind::Terminal);
        assert!(last.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FontMetrics, StyleRole};
    use crate::tutils::FixedMetrics;

    // FixedMetrics: every char 8px wide, line height 16px.
    const CHAR_W: f32 = 8.0;

    fn styled_table() -> StyleTable {
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
        styles
    }

    fn build(text: &str, tab_size: usize) -> Layout {
        let styles = styled_table();
        let metrics = FixedMetrics::new(CHAR_W, 16.0);
        let mut layout = Layout::new();
        layout.rebuild(text, &styles, Some(&metrics), tab_size);
        layout.assert_coverage(text.len());
        layout
    }

    // ==================== Classifier ====================

    #[test]
    fn classifier_ascii_ranges() {
        assert!(is_symbol_or_whitespace(b' '));
        assert!(is_symbol_or_whitespace(b'\t'));
        assert!(is_symbol_or_whitespace(b'\n'));
        assert!(is_symbol_or_whitespace(b'.'));
        assert!(is_symbol_or_whitespace(b':'));
        assert!(is_symbol_or_whitespace(b'@'));
        assert!(is_symbol_or_whitespace(b'['));
        assert!(is_symbol_or_whitespace(b'`'));
        assert!(is_symbol_or_whitespace(b'|'));
        assert!(is_symbol_or_whitespace(b'~'));

        assert!(!is_symbol_or_whitespace(b'0'));
        assert!(!is_symbol_or_whitespace(b'9'));
        assert!(!is_symbol_or_whitespace(b'A'));
        assert!(!is_symbol_or_whitespace(b'Z'));
        assert!(!is_symbol_or_whitespace(b'a'));
        assert!(!is_symbol_or_whitespace(b'z'));
        // The range test deliberately leaves '{' on the word side.
        assert!(!is_symbol_or_whitespace(b'{'));
    }

    // ==================== Run boundaries ====================

    #[test]
    fn tabbed_line_splits_into_expected_runs() {
        // "ab\tcd\n" with tab size 4: the run after the tab starts at the
        // next tab stop past the end of "ab".
        let layout = build("ab\tcd\n", 4);
        let spans: Vec<(usize, usize, RunKind)> =
            layout.runs.iter().map(|r| (r.start, r.end, r.kind)).collect();
        assert_eq!(
            spans,
            vec![
                (0, 2, RunKind::Text),
                (2, 3, RunKind::Tab),
                (3, 5, RunKind::Text),
                (5, 6, RunKind::Newline),
                (6, 6, RunKind::Terminal),
            ]
        );
        let tab_stop = 4.0 * CHAR_W;
        assert_eq!(layout.runs[2].x, tab_stop);
    }

    #[test]
    fn consecutive_tabs_form_one_run() {
        let layout = build("a\t\t\tb", 4);
        assert_eq!(layout.runs[1].kind, RunKind::Tab);
        assert_eq!(layout.runs[1].len(), 3);
        // One char in, three tabs: first reaches 32, the rest add 32 each.
        assert_eq!(layout.runs[2].x, 3.0 * 32.0);
    }

    #[test]
    fn tab_always_lands_on_next_stop() {
        // Different leading content, same post-tab column.
        for lead in ["x", "xy", "xyz"] {
            let text = format!("{lead}\tq");
            let layout = build(&text, 4);
            let q_run = &layout.runs[2];
            let stop = 4.0 * CHAR_W;
            assert_eq!(q_run.x % stop, 0.0, "lead {lead:?}");
            assert!(q_run.x >= lead.len() as f32 * CHAR_W);
        }
    }

    #[test]
    fn tab_at_exact_stop_advances_full_cell() {
        // "abcd" ends exactly on the stop; the tab must advance a whole
        // cell, not collapse to zero width.
        let layout = build("abcd\tx", 4);
        assert_eq!(layout.runs[1].width, 4.0 * CHAR_W);
    }

    #[test]
    fn empty_text_has_zero_runs_and_lines() {
        let layout = build("", 4);
        assert!(layout.runs.is_empty());
        assert_eq!(layout.line_count(), 0);
        assert_eq!(layout.width, 0.0);
        assert_eq!(layout.height, 0.0);
    }

    #[test]
    fn text_without_trailing_newline_ends_with_terminal() {
        let layout = build("hi", 4);
        assert_eq!(layout.runs.len(), 2);
        assert_eq!(layout.runs[1].kind, RunKind::Terminal);
        assert_eq!(layout.runs[1].start, 2);
        assert_eq!(layout.line_count(), 1);
    }

    #[test]
    fn trailing_newline_puts_terminal_on_its_own_line() {
        let layout = build("hi\n", 4);
        assert_eq!(layout.line_count(), 2);
        let term = layout.runs.last().unwrap();
        assert_eq!(term.kind, RunKind::Terminal);
        assert_eq!(term.line, 1);
        assert_eq!(term.x, 0.0);
    }

    // ==================== Line geometry ====================

    #[test]
    fn lines_stack_by_height() {
        let layout = build("a\nb\nc", 4);
        assert_eq!(layout.line_count(), 3);
        assert_eq!(layout.lines[0].y, 0.0);
        assert_eq!(layout.lines[1].y, 16.0);
        assert_eq!(layout.lines[2].y, 32.0);
        assert_eq!(layout.height, 48.0);
    }

    #[test]
    fn width_is_max_over_lines() {
        let layout = build("abc\nabcdef\nab", 4);
        assert_eq!(layout.width, 6.0 * CHAR_W);
    }

    #[test]
    fn line_at_y_clamps() {
        let layout = build("a\nb", 4);
        assert_eq!(layout.line_at_y(-5.0), Some(0));
        assert_eq!(layout.line_at_y(0.0), Some(0));
        assert_eq!(layout.line_at_y(17.0), Some(1));
        assert_eq!(layout.line_at_y(1000.0), Some(1));
    }

    #[test]
    fn run_containing_resolves_all_offsets() {
        let layout = build("ab\tcd", 4);
        assert_eq!(layout.run_containing(0), Some(0));
        assert_eq!(layout.run_containing(1), Some(0));
        assert_eq!(layout.run_containing(2), Some(1));
        assert_eq!(layout.run_containing(3), Some(2));
        assert_eq!(layout.run_containing(4), Some(2));
        // End-of-text resolves to the terminal run.
        assert_eq!(layout.run_containing(5), Some(3));
        assert_eq!(layout.run_containing(99), Some(3));
    }

    // ==================== Degraded modes ====================

    #[test]
    fn missing_metrics_yields_zero_width_runs() {
        let styles = styled_table();
        let mut layout = Layout::new();
        layout.rebuild("hello world", &styles, None, 4);
        layout.assert_coverage(11);
        assert!(layout.runs.iter().all(|r| r.kind != RunKind::Text || r.width == 0.0));
    }

    #[test]
    fn missing_default_style_yields_zero_sizes() {
        let styles = StyleTable::new();
        let metrics = FixedMetrics::new(CHAR_W, 16.0);
        let mut layout = Layout::new();
        layout.rebuild("a\tb", &styles, Some(&metrics), 4);
        layout.assert_coverage(3);
        assert_eq!(layout.width, 0.0);
        assert_eq!(layout.height, 0.0);
    }
}
