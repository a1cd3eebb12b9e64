//! Host capability traits.
//!
//! The engine knows nothing about pixels beyond arithmetic: fonts, glyph
//! measurement, drawing, and invalidation delivery all live on the host
//! side, injected through the three traits below. Style tokens are the
//! opaque `u64` values the host registered with the style table; the engine
//! hands them back verbatim.
//!
//! All methods are invoked synchronously from within the engine call that
//! triggered them. Hook methods carry data only (never a live engine
//! reference); a host that needs to read engine state in response should do
//! so after the triggering call returns.

use crate::geometry::Rect;

/// Text measurement, injected by the host.
///
/// Byte indices passed in and out refer to the `text` argument of the same
/// call and always sit on char boundaries.
pub trait Metrics {
    /// Measures `text` rendered with the style `token`, returning
    /// `(width, height)` in pixels.
    fn measure_string(&self, token: u64, text: &str) -> (f32, f32);

    /// Resolves a horizontal pixel offset `x` within `text` (rendered at up
    /// to `max_width`) to a cursor position: returns the snapped pixel
    /// offset of the nearest char boundary and its byte index.
    fn cursor_position_from_point(
        &self,
        token: u64,
        text: &str,
        max_width: f32,
        x: f32,
    ) -> (f32, usize);

    /// Returns the pixel offset of the char boundary at byte `index` within
    /// `text`.
    fn cursor_position_from_char(&self, token: u64, text: &str, index: usize) -> f32;
}

/// Paint sink, driven by [`Engine::paint`](crate::Engine::paint).
///
/// The engine walks visible content and pushes draw requests here; the host
/// translates them into whatever its drawing backend wants.
pub trait Painter {
    /// Paints a measured sub-run of text with foreground/background style
    /// tokens. `bg` is the sentinel-free token of the background style, or
    /// `None` when no background role is bound.
    fn paint_run(&mut self, fg: Option<u64>, bg: Option<u64>, text: &str, rect: Rect);

    /// Fills a rectangle with the style `token`'s background (blank strips,
    /// tab cells, the cursor bar).
    fn paint_rect(&mut self, token: Option<u64>, rect: Rect);
}

/// Fire-and-forget engine notifications.
///
/// Default implementations are no-ops so hosts implement only what they
/// observe.
pub trait EngineHooks {
    /// A region of the container needs repainting.
    fn on_dirty(&mut self, _rect: Rect) {}

    /// The buffer content changed (edit, undo, redo, set_text).
    fn on_text_changed(&mut self) {}

    /// The undo pointer moved; `pointer` is the new number of undoable
    /// points.
    fn on_undo_point_changed(&mut self, _pointer: usize) {}

    /// The cursor marker changed position.
    fn on_cursor_move(&mut self) {}
}
