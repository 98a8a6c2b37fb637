//! # tvremote-core
//!
//! Shared library for the tvremote bridge: the key table, kernel event
//! constants, multi-touch slot allocation, device profiles and the
//! control-channel protocol.
//!
//! It performs no system calls and opens no sockets, so everything here runs
//! and tests the same way on any platform.
//!
//! # Architecture overview (for beginners)
//!
//! tvremote lets a remote-control provider (a phone app, a TV remote service)
//! act as a real input device on a Linux host.  The provider sends high-level
//! intents such as "finger 3 touched (120, 40)" or "D-pad up pressed"; the
//! bridge turns those into the exact low-level event stream a physical
//! touchpad or game controller would produce.
//!
//! This crate is the platform-independent foundation:
//!
//! - **`event`** – the `(type, code, value)` records the kernel understands,
//!   plus the numeric constants for every code the bridge uses.
//!
//! - **`keymap`** – the fixed table translating Android key codes into Linux
//!   key codes.
//!
//! - **`domain`** – slot allocation for multi-touch contacts, the two device
//!   profiles, and the capability set each profile declares.
//!
//! - **`protocol`** – how intents travel over the network: a 24-byte header
//!   followed by a typed payload.

pub mod domain;
pub mod event;
pub mod keymap;
pub mod protocol;

pub use domain::capabilities::{AbsAxisSetup, DeviceCapabilities};
pub use domain::profile::{
    AxisCalibration, AxisGroup, ConfigError, DeviceConfig, DeviceProfile, MouseButton,
};
pub use domain::slots::{ContactId, SlotAllocator, MAX_CONTACT_SLOTS};
pub use event::RawEvent;
pub use keymap::KeyCodeTable;
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::{BridgeMessage, BridgeToken};
