//! The bounded style table.
//!
//! Styles are opaque to the engine: each slot pairs an application-defined
//! token (handed back verbatim through the measurement and paint callbacks)
//! with the font metrics snapshot supplied at registration. The engine never
//! owns host-side font objects; re-registering a token refreshes its
//! metrics.
//!
//! The table holds at most 255 entries. Slot index 255 is the reserved
//! sentinel meaning "no slot registered".

use crate::error::EngineError;

/// Resolved font metrics for one style, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
    pub space_width: f32,
}

/// An index into the style table.
///
/// Valid slots are `0..255`; [`StyleSlot::NONE`] (255) is the sentinel for
/// "no slot registered".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSlot(u8);

impl StyleSlot {
    /// The reserved "no slot" sentinel.
    pub const NONE: StyleSlot = StyleSlot(u8::MAX);

    /// Returns true if this is the sentinel slot.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for StyleSlot {
    fn default() -> Self {
        Self::NONE
    }
}

/// The named roles a host can bind table slots to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRole {
    Default,
    Selection,
    ActiveLine,
    Cursor,
    LineNumbers,
}

const ROLE_COUNT: usize = 5;

impl StyleRole {
    fn index(self) -> usize {
        match self {
            StyleRole::Default => 0,
            StyleRole::Selection => 1,
            StyleRole::ActiveLine => 2,
            StyleRole::Cursor => 3,
            StyleRole::LineNumbers => 4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StyleEntry {
    token: u64,
    metrics: FontMetrics,
}

/// The fixed-capacity style table plus the role bindings.
#[derive(Debug, Default)]
pub struct StyleTable {
    entries: Vec<StyleEntry>,
    roles: [StyleSlot; ROLE_COUNT],
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` with the given metrics.
    ///
    /// If the token is already registered its metrics are updated in place
    /// and the existing slot is returned (the caller is responsible for the
    /// layout refresh this implies). A full table fails with
    /// [`EngineError::StyleTableFull`] and leaves existing entries
    /// untouched.
    pub fn register(&mut self, token: u64, metrics: FontMetrics) -> Result<StyleSlot, EngineError> {
        if let Some(i) = self.entries.iter().position(|e| e.token == token) {
            self.entries[i].metrics = metrics;
            tracing::debug!(token, slot = i, "style metrics refreshed");
            return Ok(StyleSlot(i as u8));
        }
        if self.entries.len() >= u8::MAX as usize {
            return Err(EngineError::StyleTableFull);
        }
        self.entries.push(StyleEntry { token, metrics });
        let slot = StyleSlot((self.entries.len() - 1) as u8);
        tracing::debug!(token, slot = slot.0, "style registered");
        Ok(slot)
    }

    /// Returns the metrics for `slot`, if it names a registered entry.
    pub fn metrics(&self, slot: StyleSlot) -> Option<&FontMetrics> {
        if slot.is_none() {
            return None;
        }
        self.entries.get(slot.index()).map(|e| &e.metrics)
    }

    /// Returns the application token for `slot`.
    pub fn token(&self, slot: StyleSlot) -> Option<u64> {
        if slot.is_none() {
            return None;
        }
        self.entries.get(slot.index()).map(|e| e.token)
    }

    /// Binds a role to a slot. Binding to [`StyleSlot::NONE`] clears it.
    pub fn set_role(&mut self, role: StyleRole, slot: StyleSlot) {
        self.roles[role.index()] = slot;
    }

    /// Returns the slot bound to `role` (possibly the sentinel).
    pub fn role(&self, role: StyleRole) -> StyleSlot {
        self.roles[role.index()]
    }

    /// Metrics of the default-role style, if one is bound.
    pub fn default_metrics(&self) -> Option<&FontMetrics> {
        self.metrics(self.role(StyleRole::Default))
    }

    /// Token of the default-role style, if one is bound.
    pub fn default_token(&self) -> Option<u64> {
        self.token(self.role(StyleRole::Default))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no styles are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(space_width: f32) -> FontMetrics {
        FontMetrics {
            ascent: 12.0,
            descent: 4.0,
            line_height: 16.0,
            space_width,
        }
    }

    #[test]
    fn register_returns_distinct_slots() {
        let mut table = StyleTable::new();
        let a = table.register(1, metrics(8.0)).unwrap();
        let b = table.register(2, metrics(9.0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(table.metrics(a).unwrap().space_width, 8.0);
        assert_eq!(table.metrics(b).unwrap().space_width, 9.0);
    }

    #[test]
    fn reregister_updates_in_place() {
        let mut table = StyleTable::new();
        let a = table.register(1, metrics(8.0)).unwrap();
        let a2 = table.register(1, metrics(10.0)).unwrap();
        assert_eq!(a, a2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.metrics(a).unwrap().space_width, 10.0);
    }

    #[test]
    fn table_full_fails_and_preserves_entries() {
        let mut table = StyleTable::new();
        for t in 0..255u64 {
            table.register(t, metrics(8.0)).unwrap();
        }
        assert_eq!(table.len(), 255);
        assert_eq!(table.register(999, metrics(8.0)), Err(EngineError::StyleTableFull));
        assert_eq!(table.len(), 255);
        // Re-registering an existing token still works on a full table.
        assert!(table.register(42, metrics(9.0)).is_ok());
    }

    #[test]
    fn sentinel_slot_resolves_to_nothing() {
        let table = StyleTable::new();
        assert!(table.metrics(StyleSlot::NONE).is_none());
        assert!(table.token(StyleSlot::NONE).is_none());
    }

    #[test]
    fn roles_default_to_sentinel() {
        let table = StyleTable::new();
        assert!(table.role(StyleRole::Default).is_none());
        assert!(table.default_metrics().is_none());
    }

    #[test]
    fn role_binding_round_trip() {
        let mut table = StyleTable::new();
        let slot = table.register(7, metrics(8.0)).unwrap();
        table.set_role(StyleRole::Selection, slot);
        assert_eq!(table.role(StyleRole::Selection), slot);
        table.set_role(StyleRole::Selection, StyleSlot::NONE);
        assert!(table.role(StyleRole::Selection).is_none());
    }
}
