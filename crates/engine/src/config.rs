//! Engine configuration.
//!
//! Everything here is host-settable at runtime through the engine's setter
//! methods; the struct is serializable so hosts can persist it alongside
//! their own settings.

use serde::{Deserialize, Serialize};

/// Runtime configuration for one engine instance. Pixel values are in the
/// host's content space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width of the visible container the engine paints into.
    pub container_width: f32,
    /// Height of the visible container.
    pub container_height: f32,
    /// Horizontal scroll offset (content pixels scrolled off the left).
    pub scroll_x: f32,
    /// Vertical scroll offset.
    pub scroll_y: f32,
    /// Tab size in spaces.
    pub tab_size: usize,
    /// Width of the painted cursor bar in pixels.
    pub cursor_width: f32,
    /// Half-period of the cursor blink in milliseconds.
    pub blink_rate_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            container_width: 0.0,
            container_height: 0.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            tab_size: 4,
            cursor_width: 2.0,
            blink_rate_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.tab_size, 4);
        assert_eq!(cfg.blink_rate_ms, 500);
        assert_eq!(cfg.scroll_x, 0.0);
    }

    #[test]
    fn serde_round_trip() {
        let mut cfg = EngineConfig::default();
        cfg.tab_size = 8;
        cfg.container_width = 640.0;
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"tab_size": 2}"#).unwrap();
        assert_eq!(cfg.tab_size, 2);
        assert_eq!(cfg.blink_rate_ms, 500);
    }
}
