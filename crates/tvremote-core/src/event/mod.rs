//! Raw kernel event records and the constants that describe them.

pub mod codes;

use codes::{EV_ABS, EV_KEY, EV_MSC, EV_REL, EV_SYN, SYN_REPORT};

/// One `(type, code, value)` record as written to the injection interface.
///
/// The timestamp is left to the kernel, so it is not part of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub const fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
        }
    }

    pub const fn key(code: u16, down: bool) -> Self {
        Self::new(EV_KEY, code, if down { 1 } else { 0 })
    }

    pub const fn rel(code: u16, value: i32) -> Self {
        Self::new(EV_REL, code, value)
    }

    pub const fn abs(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    pub const fn misc(code: u16, value: i32) -> Self {
        Self::new(EV_MSC, code, value)
    }

    /// The frame boundary marker.
    pub const fn sync() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    pub fn is_sync(&self) -> bool {
        self.event_type == EV_SYN && self.code == SYN_REPORT
    }
}
