//! Logical key to injection-protocol key translation.
//!
//! The canonical input representation from remote providers is the Android
//! key code; the kernel expects Linux `KEY_*` / `BTN_*` codes.  The
//! [`KeyCodeTable`] converts between them.
//!
//! # One-time initialisation
//!
//! The lookup map is built from [`tv_keys::TV_KEYS`] the first time any caller
//! asks for it and is shared by the whole process afterwards.  The build runs
//! under a [`OnceLock`], so two threads racing on the first lookup still see
//! exactly one fully built table.

pub mod tv_keys;

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::event::codes::KEY_UNKNOWN;
use tv_keys::{KeyMapping, TV_KEYS};

static TABLE: OnceLock<KeyCodeTable> = OnceLock::new();

/// Process-wide key translation table.
#[derive(Debug)]
pub struct KeyCodeTable {
    by_logical: HashMap<i32, u16>,
    entries: &'static [KeyMapping],
}

impl KeyCodeTable {
    /// Returns the shared table, building it on first use.
    pub fn global() -> &'static KeyCodeTable {
        TABLE.get_or_init(|| {
            let table = Self::from_entries(TV_KEYS);
            debug!(entries = table.len(), "key code table initialised");
            table
        })
    }

    fn from_entries(entries: &'static [KeyMapping]) -> Self {
        let by_logical = entries.iter().map(|m| (m.logical, m.protocol)).collect();
        Self {
            by_logical,
            entries,
        }
    }

    /// Translates an Android key code to a Linux key code.
    ///
    /// Returns [`KEY_UNKNOWN`] for any key not in the table.  This function
    /// never fails; callers compare against the sentinel (or use
    /// [`KeyCodeTable::lookup`]) and drop the event.
    pub fn translate(&self, logical: i32) -> u16 {
        self.by_logical.get(&logical).copied().unwrap_or(KEY_UNKNOWN)
    }

    /// Like [`translate`](Self::translate) but maps the sentinel to `None`.
    pub fn lookup(&self, logical: i32) -> Option<u16> {
        match self.translate(logical) {
            KEY_UNKNOWN => None,
            code => Some(code),
        }
    }

    /// All rows in declaration order.
    pub fn entries(&self) -> &'static [KeyMapping] {
        self.entries
    }

    /// Every protocol code in the table, in declaration order.
    ///
    /// This is the key capability set declared on every virtual device.
    pub fn protocol_codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.iter().map(|m| m.protocol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shorthand for `KeyCodeTable::global().translate(logical)`.
pub fn translate(logical: i32) -> u16 {
    KeyCodeTable::global().translate(logical)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_keys_translate_to_declared_codes() {
        for m in TV_KEYS {
            // Arrange / Act
            let code = translate(m.logical);

            // Assert
            assert_eq!(
                code, m.protocol,
                "logical key {} should map to {}",
                m.logical, m.protocol
            );
        }
    }

    #[test]
    fn test_unknown_keys_translate_to_sentinel() {
        for unknown in [0, -1, 1, 2, 5, 6, 9999, i32::MIN, i32::MAX] {
            assert_eq!(translate(unknown), KEY_UNKNOWN, "{unknown} should be unknown");
        }
    }

    #[test]
    fn test_lookup_returns_none_for_unknown() {
        let table = KeyCodeTable::global();
        assert_eq!(table.lookup(0), None);
        assert_eq!(table.lookup(19), Some(103)); // DPAD_UP → KEY_UP
    }

    #[test]
    fn test_dpad_center_maps_to_key_select() {
        assert_eq!(translate(23), 353);
    }

    #[test]
    fn test_logical_keys_are_unique() {
        let mut seen = HashSet::new();
        for m in TV_KEYS {
            assert!(seen.insert(m.logical), "duplicate logical key {}", m.logical);
        }
    }

    #[test]
    fn test_table_never_contains_the_sentinel() {
        assert!(KeyCodeTable::global()
            .protocol_codes()
            .all(|code| code != KEY_UNKNOWN));
    }

    #[test]
    fn test_global_returns_the_same_instance() {
        let a = KeyCodeTable::global() as *const KeyCodeTable;
        let b = KeyCodeTable::global() as *const KeyCodeTable;
        assert_eq!(a, b);
    }

    #[test]
    fn test_concurrent_first_use_sees_a_complete_table() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| KeyCodeTable::global().len()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), TV_KEYS.len());
        }
    }
}
