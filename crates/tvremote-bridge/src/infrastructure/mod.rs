//! Infrastructure layer for the bridge daemon.
//!
//! Contains the OS-facing adapters: kernel device injection, the TCP control
//! server and the configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tvremote_core`, but MUST NOT be imported by the `application` layer
//! outside of tests.
//!
//! # Sub-modules
//!
//! - **`uinput`** – `InjectionBackend` implementations.  `UinputBackend`
//!   drives `/dev/uinput` on Linux; `MockInjectionBackend` records events in
//!   memory.
//!
//! - **`network`** – `ControlServer`, which accepts provider connections,
//!   reads framed messages and routes them through the shared
//!   `BridgeRegistry`.
//!
//! - **`storage`** – loading `config.toml`.

pub mod network;
pub mod storage;
pub mod uinput;
