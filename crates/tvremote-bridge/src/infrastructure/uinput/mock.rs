//! Recording injection backend for tests and non-Linux builds.
//!
//! # Why a mock backend?
//!
//! The real [`UinputBackend`](super::UinputBackend) registers devices with
//! the kernel, which needs `/dev/uinput` write access and changes the state of
//! the machine running the tests.  The `MockInjectionBackend` keeps every
//! declared capability set and every written event in memory instead, so tests
//! can assert the exact event sequence a translator produced.
//!
//! # Usage in tests
//!
//! ```ignore
//! let backend = Arc::new(MockInjectionBackend::new());
//! let device = VirtualDevice::open(backend.as_ref(), config)?;
//! let mut translator = EventTranslator::new(device);
//!
//! translator.sync()?;
//!
//! assert_eq!(backend.events(0), vec![RawEvent::sync()]);
//! ```
//!
//! # Failure injection
//!
//! `should_fail_create` makes every `create` call fail.  `set_fail_writes`
//! can be toggled at any time, including while devices are open, and makes
//! every `write_event` call fail without recording anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;
use tvremote_core::{DeviceCapabilities, RawEvent};

use crate::application::virtual_device::{DeviceError, DeviceHandle, InjectionBackend};

/// Everything one created device saw.
#[derive(Debug, Clone, Default)]
pub struct DeviceRecord {
    pub capabilities: DeviceCapabilities,
    pub events: Vec<RawEvent>,
    pub destroy_calls: usize,
}

#[derive(Default)]
struct Shared {
    devices: Mutex<Vec<DeviceRecord>>,
    fail_writes: AtomicBool,
}

impl Shared {
    fn devices(&self) -> MutexGuard<'_, Vec<DeviceRecord>> {
        // A poisoned lock only means a test thread panicked mid-record.
        self.devices.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A backend that records instead of registering kernel devices.
#[derive(Default)]
pub struct MockInjectionBackend {
    shared: Arc<Shared>,
    /// When `true`, `create` returns [`DeviceError::Unavailable`].
    pub should_fail_create: bool,
}

impl MockInjectionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `create` always fails.
    pub fn failing() -> Self {
        Self {
            should_fail_create: true,
            ..Self::default()
        }
    }

    /// Makes subsequent writes on every device (open or future) fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of devices successfully created so far.
    pub fn device_count(&self) -> usize {
        self.shared.devices().len()
    }

    /// Snapshot of the device created `index`-th (0-based).
    pub fn device(&self, index: usize) -> Option<DeviceRecord> {
        self.shared.devices().get(index).cloned()
    }

    /// Events written to the `index`-th device, empty if it does not exist.
    pub fn events(&self, index: usize) -> Vec<RawEvent> {
        self.device(index).map(|d| d.events).unwrap_or_default()
    }

    /// Drops the recorded events of the `index`-th device.
    pub fn clear_events(&self, index: usize) {
        if let Some(d) = self.shared.devices().get_mut(index) {
            d.events.clear();
        }
    }

    /// How many times `destroy` ran on the `index`-th device.
    pub fn destroy_calls(&self, index: usize) -> usize {
        self.device(index).map(|d| d.destroy_calls).unwrap_or(0)
    }

    /// Devices created and not yet destroyed.
    pub fn live_devices(&self) -> usize {
        self.shared
            .devices()
            .iter()
            .filter(|d| d.destroy_calls == 0)
            .count()
    }
}

impl InjectionBackend for MockInjectionBackend {
    fn create(
        &self,
        capabilities: &DeviceCapabilities,
    ) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        if self.should_fail_create {
            return Err(DeviceError::Unavailable("mock failure".into()));
        }
        let mut devices = self.shared.devices();
        devices.push(DeviceRecord {
            capabilities: capabilities.clone(),
            ..DeviceRecord::default()
        });
        Ok(Box::new(RecordingHandle {
            shared: Arc::clone(&self.shared),
            index: devices.len() - 1,
        }))
    }
}

struct RecordingHandle {
    shared: Arc<Shared>,
    index: usize,
}

impl DeviceHandle for RecordingHandle {
    fn write_event(&mut self, event: RawEvent) -> Result<(), DeviceError> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(DeviceError::Write(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )));
        }
        trace!(device = self.index, ?event, "mock event");
        if let Some(d) = self.shared.devices().get_mut(self.index) {
            d.events.push(event);
        }
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), DeviceError> {
        if let Some(d) = self.shared.devices().get_mut(self.index) {
            d.destroy_calls += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvremote_core::{DeviceConfig, RawEvent};

    fn caps() -> DeviceCapabilities {
        DeviceCapabilities::for_config(&DeviceConfig::touchpad("t", "t:1", 10, 10, 1))
    }

    #[test]
    fn test_records_events_per_device_in_order() {
        // Arrange
        let backend = MockInjectionBackend::new();
        let mut a = backend.create(&caps()).unwrap();
        let mut b = backend.create(&caps()).unwrap();

        // Act
        a.write_event(RawEvent::key(1, true)).unwrap();
        b.write_event(RawEvent::sync()).unwrap();
        a.write_event(RawEvent::key(1, false)).unwrap();

        // Assert
        assert_eq!(backend.device_count(), 2);
        assert_eq!(
            backend.events(0),
            vec![RawEvent::key(1, true), RawEvent::key(1, false)]
        );
        assert_eq!(backend.events(1), vec![RawEvent::sync()]);
    }

    #[test]
    fn test_failing_backend_creates_nothing() {
        let backend = MockInjectionBackend::failing();
        assert!(backend.create(&caps()).is_err());
        assert_eq!(backend.device_count(), 0);
    }

    #[test]
    fn test_write_failure_toggle_applies_to_open_handles() {
        // Arrange
        let backend = MockInjectionBackend::new();
        let mut h = backend.create(&caps()).unwrap();

        // Act
        backend.set_fail_writes(true);
        let failed = h.write_event(RawEvent::sync());
        backend.set_fail_writes(false);
        let ok = h.write_event(RawEvent::sync());

        // Assert
        assert!(matches!(failed, Err(DeviceError::Write(_))));
        assert!(ok.is_ok());
        assert_eq!(backend.events(0).len(), 1);
    }

    #[test]
    fn test_destroy_is_counted() {
        let backend = MockInjectionBackend::new();
        let mut h = backend.create(&caps()).unwrap();
        assert_eq!(backend.live_devices(), 1);

        h.destroy().unwrap();

        assert_eq!(backend.destroy_calls(0), 1);
        assert_eq!(backend.live_devices(), 0);
    }
}
