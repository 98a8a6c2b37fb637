//! tvremote-bridge library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tvremote-bridge do? (for beginners)
//!
//! A remote-control provider (a phone app, a TV remote service) wants to act
//! as a touchpad, mouse or game controller on a Linux host.  It connects to
//! this daemon over TCP, opens a *bridge* under a token of its choosing, and
//! then streams intents: "finger 3 touched (120, 40)", "D-pad up pressed",
//! "left stick moved".
//!
//! For every bridge the daemon:
//!
//! 1. Registers a virtual input device with the kernel through `/dev/uinput`,
//!    declaring exactly the keys and axes its profile needs.
//! 2. Assigns kernel multi-touch slots to the provider's contact ids.
//! 3. Translates Android key codes to Linux key codes.
//! 4. Writes the low-level event sequence a physical device would produce.
//!
//! When the provider disconnects, its bridges are reset and destroyed.

/// Application layer: devices, translation, routing.
pub mod application;

/// Infrastructure layer: uinput, network, config file.
pub mod infrastructure;

pub use application::bridge_registry::{BridgeError, BridgeRegistry};
pub use application::translate_input::{EventTranslator, InputError};
pub use application::virtual_device::{DeviceError, DeviceHandle, InjectionBackend, VirtualDevice};
