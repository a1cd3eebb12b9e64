//! Test utilities: deterministic host implementations.
//!
//! These back the crate's own unit and integration tests and are exported
//! for host crates that want a predictable fake while wiring the engine up.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::Rect;
use crate::host::{EngineHooks, Metrics, Painter};

/// Monospace [`Metrics`]: every char is `char_width` wide regardless of
/// style token, every measurement is `line_height` tall.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl FixedMetrics {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl Metrics for FixedMetrics {
    fn measure_string(&self, _token: u64, text: &str) -> (f32, f32) {
        (text.chars().count() as f32 * self.char_width, self.line_height)
    }

    fn cursor_position_from_point(
        &self,
        _token: u64,
        text: &str,
        _max_width: f32,
        x: f32,
    ) -> (f32, usize) {
        let chars = text.chars().count();
        let nearest = (x / self.char_width).round().clamp(0.0, chars as f32) as usize;
        let byte_idx = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .nth(nearest)
            .unwrap_or(text.len());
        (nearest as f32 * self.char_width, byte_idx)
    }

    fn cursor_position_from_char(&self, _token: u64, text: &str, index: usize) -> f32 {
        text[..index.min(text.len())].chars().count() as f32 * self.char_width
    }
}

/// One recorded paint request.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Run {
        fg: Option<u64>,
        bg: Option<u64>,
        text: String,
        rect: Rect,
    },
    Rect {
        token: Option<u64>,
        rect: Rect,
    },
}

/// A [`Painter`] that records every request for later assertion.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub ops: Vec<PaintOp>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text of every `paint_run` request, in paint order.
    pub fn run_texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Run { text, .. } => Some(text.as_str()),
                PaintOp::Rect { .. } => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn paint_run(&mut self, fg: Option<u64>, bg: Option<u64>, text: &str, rect: Rect) {
        self.ops.push(PaintOp::Run {
            fg,
            bg,
            text: text.to_string(),
            rect,
        });
    }

    fn paint_rect(&mut self, token: Option<u64>, rect: Rect) {
        self.ops.push(PaintOp::Rect { token, rect });
    }
}

/// What [`RecordingHooks`] observed, shared with the test through an `Rc`.
#[derive(Debug, Default)]
pub struct HookLog {
    pub dirty: Vec<Rect>,
    pub text_changes: usize,
    pub undo_pointers: Vec<usize>,
    pub cursor_moves: usize,
}

/// [`EngineHooks`] that appends everything to a shared [`HookLog`].
#[derive(Debug, Default)]
pub struct RecordingHooks {
    log: Rc<RefCell<HookLog>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle onto the log that survives handing the hooks to the engine.
    pub fn log(&self) -> Rc<RefCell<HookLog>> {
        Rc::clone(&self.log)
    }
}

impl EngineHooks for RecordingHooks {
    fn on_dirty(&mut self, rect: Rect) {
        self.log.borrow_mut().dirty.push(rect);
    }

    fn on_text_changed(&mut self) {
        self.log.borrow_mut().text_changes += 1;
    }

    fn on_undo_point_changed(&mut self, pointer: usize) {
        self.log.borrow_mut().undo_pointers.push(pointer);
    }

    fn on_cursor_move(&mut self) {
        self.log.borrow_mut().cursor_moves += 1;
    }
}
