//! Domain entities for the tvremote bridge.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What lives here (for beginners)
//!
//! The domain layer holds the rules that make a virtual remote behave like
//! real hardware, without touching the kernel:
//!
//! - Which contact (finger) owns which multi-touch slot.
//! - What a device of a given profile must declare to the kernel.
//! - Which device configurations are acceptable in the first place.
//!
//! Everything here compiles and tests on any platform.  The bridge crate's
//! infrastructure layer turns these values into real system calls.

/// Multi-touch slot bookkeeping.  See [`slots::SlotAllocator`].
pub mod slots;

/// Device profiles, axis groups and [`profile::DeviceConfig`] validation.
pub mod profile;

/// Capability sets derived from a device config.
pub mod capabilities;
