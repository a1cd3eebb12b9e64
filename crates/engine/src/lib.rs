//! runedit: a host-agnostic text layout and editing engine.
//!
//! The engine owns a normalized text buffer, a bounded style table, a fully
//! rebuilt run layout, a cursor/anchor marker pair, and a diff-based undo
//! stack. The host owns everything pixel-shaped: it injects glyph
//! measurement through [`Metrics`], receives draw requests through
//! [`Painter`], and hears about invalidation and state changes through
//! [`EngineHooks`].
//!
//! Typical wiring:
//!
//! ```
//! use runedit::{Engine, FontMetrics, StyleRole};
//! use runedit::tutils::FixedMetrics;
//!
//! let mut engine = Engine::new();
//! engine.set_metrics(Box::new(FixedMetrics::new(8.0, 16.0)));
//! let slot = engine
//!     .register_style(1, FontMetrics {
//!         ascent: 12.0,
//!         descent: 4.0,
//!         line_height: 16.0,
//!         space_width: 8.0,
//!     })
//!     .unwrap();
//! engine.set_style_role(StyleRole::Default, slot);
//! engine.set_container_size(640.0, 480.0);
//!
//! engine.set_text("hello");
//! engine.cursor_to_text_end();
//! engine.insert_text_at_cursor(" world");
//! assert_eq!(engine.text(), "hello world");
//! ```

mod config;
mod engine;
mod error;
mod geometry;
mod host;
mod layout;
mod marker;
mod multi_caret;
mod search;
mod selection;
mod style;
mod undo;

pub mod tutils;

pub use config::EngineConfig;
pub use engine::{Engine, SelectionScope};
pub use error::EngineError;
pub use geometry::{Point, Rect};
pub use host::{EngineHooks, Metrics, Painter};
pub use layout::{is_symbol_or_whitespace, Layout, Line, Run, RunKind};
pub use marker::Marker;
pub use multi_caret::{CaretPair, MultiCaretView};
pub use selection::Selection;
pub use style::{FontMetrics, StyleRole, StyleSlot, StyleTable};
pub use undo::{MarkerState, UndoRecord, UndoStack};

pub use runedit_buffer::{diff_texts, TextBuffer, TextDiff};
