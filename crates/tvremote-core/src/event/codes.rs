//! Linux input event type and code constants.
//!
//! Values mirror `linux/input-event-codes.h` and `linux/input.h`.  Only the
//! codes the bridge declares or emits are listed here; the key codes used by
//! the key table live next to the table in [`crate::keymap::tv_keys`].
//!
//! # Event records (for beginners)
//!
//! Every event the kernel sees is a `(type, code, value)` triple:
//!
//! | type     | code example         | value meaning                  |
//! |----------|----------------------|--------------------------------|
//! | `EV_KEY` | `KEY_UP` (103)       | 1 = pressed, 0 = released      |
//! | `EV_REL` | `REL_X` (0)          | relative motion in device units |
//! | `EV_ABS` | `ABS_MT_SLOT` (0x2f) | absolute position / slot index |
//! | `EV_MSC` | `MSC_ANDROID_TIME_SEC` | timestamp component          |
//! | `EV_SYN` | `SYN_REPORT` (0)     | always 0; ends a frame         |
//!
//! Consumers only act on a group of events once the `SYN_REPORT` that
//! follows them arrives.

// ── Event types ───────────────────────────────────────────────────────────────

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;

// ── Synchronization ───────────────────────────────────────────────────────────

pub const SYN_REPORT: u16 = 0x00;

// ── Relative axes ─────────────────────────────────────────────────────────────

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_HWHEEL: u16 = 0x06;
pub const REL_WHEEL: u16 = 0x08;

// ── Absolute axes ─────────────────────────────────────────────────────────────

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_Z: u16 = 0x02;
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;
pub const ABS_RZ: u16 = 0x05;
pub const ABS_GAS: u16 = 0x09;
pub const ABS_BRAKE: u16 = 0x0a;
pub const ABS_HAT0X: u16 = 0x10;
pub const ABS_HAT0Y: u16 = 0x11;

pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;

/// Tracking id value that lifts the contact in the currently selected slot.
pub const TRACKING_ID_NONE: i32 = -1;

// ── Misc ──────────────────────────────────────────────────────────────────────

/// Android's EventHub reads these two misc codes as the event timestamp.
pub const MSC_ANDROID_TIME_SEC: u16 = 0x06;
pub const MSC_ANDROID_TIME_USEC: u16 = 0x07;

// ── Buttons ───────────────────────────────────────────────────────────────────

pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;

pub const BTN_SOUTH: u16 = 0x130;
pub const BTN_EAST: u16 = 0x131;
pub const BTN_C: u16 = 0x132;
pub const BTN_NORTH: u16 = 0x133;
pub const BTN_WEST: u16 = 0x134;
pub const BTN_Z: u16 = 0x135;
pub const BTN_TL: u16 = 0x136;
pub const BTN_TR: u16 = 0x137;
pub const BTN_TL2: u16 = 0x138;
pub const BTN_TR2: u16 = 0x139;
pub const BTN_SELECT: u16 = 0x13a;
pub const BTN_START: u16 = 0x13b;
pub const BTN_MODE: u16 = 0x13c;
pub const BTN_THUMBL: u16 = 0x13d;
pub const BTN_THUMBR: u16 = 0x13e;

/// Sentinel returned by the key table for logical keys it does not know.
pub const KEY_UNKNOWN: u16 = 240;

// ── Device identity ───────────────────────────────────────────────────────────

pub const BUS_VIRTUAL: u16 = 0x06;

pub const INPUT_PROP_POINTER: u16 = 0x00;

/// Size of the kernel's device name buffer, including the trailing NUL.
pub const UINPUT_MAX_NAME_SIZE: usize = 80;
