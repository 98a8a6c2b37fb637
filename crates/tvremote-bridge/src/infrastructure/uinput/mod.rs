//! Injection backends.
//!
//! The kernel backend is compiled only on Linux.  The recording mock is
//! always available: tests use it everywhere, and the binary falls back to it
//! on other platforms so the control channel can still be exercised.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

pub use mock::MockInjectionBackend;

#[cfg(target_os = "linux")]
pub use linux::{UinputBackend, DEFAULT_UINPUT_PATH};
