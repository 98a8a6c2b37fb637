//! Application layer use cases for the bridge.
//!
//! # What lives here?
//!
//! - **`virtual_device`** – `VirtualDevice` plus the `InjectionBackend` /
//!   `DeviceHandle` seam.  Opening validates the config, derives the
//!   capability set and asks the backend to register it; closing tears the
//!   device down exactly once.
//!
//! - **`translate_input`** – `EventTranslator`, which turns key, contact,
//!   mouse and axis intents into ordered raw event sequences and owns the
//!   device's slot table.
//!
//! - **`bridge_registry`** – `BridgeRegistry`, one translator per provider
//!   token, and the routing of control-channel messages to them.

pub mod bridge_registry;
pub mod translate_input;
pub mod virtual_device;
