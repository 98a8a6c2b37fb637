//! VirtualDevice: one registered kernel input device and its raw event sink.
//!
//! The application layer never talks to the kernel directly.  It asks an
//! [`InjectionBackend`] to register a device from a [`DeviceCapabilities`]
//! value and receives a [`DeviceHandle`] it can write raw events to.  The
//! real backend (uinput) and the recording mock both live in the
//! infrastructure layer.
//!
//! # Lifecycle (for beginners)
//!
//! ```text
//! VirtualDevice::open(backend, config)
//!     ├─ config.validate()            → DeviceError::Config on failure
//!     ├─ DeviceCapabilities::for_config
//!     └─ backend.create(&caps)        → all-or-nothing registration
//! device.emit(event) ...              → one raw record per call, no implied sync
//! device.close()                      → destroy exactly once, consumes the device
//! ```
//!
//! `close` takes `self` by value, so a closed device cannot be used again and
//! cannot be closed twice.  If a device is dropped without `close`, the drop
//! handler logs a warning and tears it down anyway.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info, warn};
use tvremote_core::{ConfigError, DeviceCapabilities, DeviceConfig, DeviceProfile, RawEvent};

/// Errors raised while opening, writing to or closing a virtual device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device config was rejected before any OS resource was acquired.
    #[error("invalid device config: {0}")]
    Config(#[from] ConfigError),

    /// The injection interface node could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A registration step failed; nothing was left registered.
    #[error("device setup failed at {step}: {source}")]
    Setup {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Writing one event record failed.  The device stays registered.
    #[error("event write failed: {0}")]
    Write(#[source] std::io::Error),

    /// Deregistration failed.  The handle is released regardless.
    #[error("device teardown failed: {0}")]
    Destroy(#[source] std::io::Error),

    /// The backend cannot provide devices (e.g. unsupported platform).
    #[error("injection backend unavailable: {0}")]
    Unavailable(String),

    #[error("device is closed")]
    Closed,
}

/// Registers virtual devices with the OS.
///
/// Implementations must be all-or-nothing: on error, every resource acquired
/// during `create` has already been released.
pub trait InjectionBackend: Send + Sync {
    fn create(&self, capabilities: &DeviceCapabilities)
        -> Result<Box<dyn DeviceHandle>, DeviceError>;
}

/// An exclusively owned, registered device.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceHandle: Send {
    /// Writes one raw event record.  Implementations must not add a sync.
    fn write_event(&mut self, event: RawEvent) -> Result<(), DeviceError>;

    /// Deregisters the device and releases the OS handle.
    ///
    /// Called exactly once by [`VirtualDevice`].
    fn destroy(&mut self) -> Result<(), DeviceError>;
}

/// A registered virtual input device.
pub struct VirtualDevice {
    handle: Option<Box<dyn DeviceHandle>>,
    config: DeviceConfig,
    capabilities: DeviceCapabilities,
}

impl VirtualDevice {
    /// Validates `config`, derives its capabilities and registers the device.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Config`] if validation fails, otherwise whatever the
    /// backend reports.  No device exists after an error.
    pub fn open(backend: &dyn InjectionBackend, config: DeviceConfig) -> Result<Self, DeviceError> {
        config.validate()?;
        let capabilities = DeviceCapabilities::for_config(&config);

        info!(
            name = %capabilities.name,
            phys = %capabilities.phys,
            width = config.width,
            height = config.height,
            max_contacts = config.max_contacts,
            profile = ?config.profile,
            "registering virtual input device"
        );

        let handle = backend.create(&capabilities)?;
        Ok(Self {
            handle: Some(handle),
            config,
            capabilities,
        })
    }

    /// Writes one raw event.  No sync is implied.
    pub fn emit(&mut self, event: RawEvent) -> Result<(), DeviceError> {
        let handle = self.handle.as_mut().ok_or(DeviceError::Closed)?;
        handle.write_event(event)
    }

    /// Shorthand for `emit(RawEvent::new(event_type, code, value))`.
    pub fn emit_raw(&mut self, event_type: u16, code: u16, value: i32) -> Result<(), DeviceError> {
        self.emit(RawEvent::new(event_type, code, value))
    }

    /// Deregisters the device and releases its handle.
    pub fn close(mut self) -> Result<(), DeviceError> {
        match self.handle.take() {
            Some(mut handle) => {
                info!(name = %self.capabilities.name, "unregistering virtual input device");
                handle.destroy()
            }
            None => Ok(()),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.config.profile
    }

    pub fn max_contacts(&self) -> usize {
        self.config.max_contacts
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            warn!(
                name = %self.capabilities.name,
                "virtual device dropped without close; tearing it down"
            );
            match handle.destroy() {
                Ok(()) => debug!("late teardown succeeded"),
                Err(e) => error!("late teardown failed: {e}"),
            }
        }
    }
}

impl std::fmt::Debug for VirtualDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualDevice")
            .field("name", &self.capabilities.name)
            .field("profile", &self.config.profile)
            .field("open", &self.handle.is_some())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use std::sync::Mutex;
    use tvremote_core::event::codes::{EV_KEY, EV_SYN};

    /// Hands out one pre-configured handle, then fails.
    struct OneShotBackend {
        handle: Mutex<Option<MockDeviceHandle>>,
        seen: Mutex<Vec<DeviceCapabilities>>,
    }

    impl OneShotBackend {
        fn new(handle: MockDeviceHandle) -> Self {
            Self {
                handle: Mutex::new(Some(handle)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl InjectionBackend for OneShotBackend {
        fn create(
            &self,
            capabilities: &DeviceCapabilities,
        ) -> Result<Box<dyn DeviceHandle>, DeviceError> {
            self.seen.lock().unwrap().push(capabilities.clone());
            match self.handle.lock().unwrap().take() {
                Some(h) => Ok(Box::new(h)),
                None => Err(DeviceError::Unavailable("exhausted".into())),
            }
        }
    }

    fn touchpad() -> DeviceConfig {
        DeviceConfig::touchpad("Remote", "remote:1", 1920, 1080, 2)
    }

    #[test]
    fn test_open_passes_derived_capabilities_to_backend() {
        // Arrange
        let mut handle = MockDeviceHandle::new();
        handle.expect_destroy().times(1).returning(|| Ok(()));
        let backend = OneShotBackend::new(handle);

        // Act
        let device = VirtualDevice::open(&backend, touchpad()).unwrap();

        // Assert
        {
            let seen = backend.seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0], DeviceCapabilities::for_config(&touchpad()));
            assert_eq!(device.capabilities(), &seen[0]);
        }
        device.close().unwrap();
    }

    #[test]
    fn test_open_rejects_invalid_config_before_touching_backend() {
        // Arrange
        let backend = OneShotBackend::new(MockDeviceHandle::new());
        let config = DeviceConfig::touchpad("Remote", "remote:1", 1920, 1080, 64);

        // Act
        let result = VirtualDevice::open(&backend, config);

        // Assert
        assert!(matches!(result, Err(DeviceError::Config(_))));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_backend_failure_produces_no_device() {
        let backend = OneShotBackend {
            handle: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        };
        let result = VirtualDevice::open(&backend, touchpad());
        assert!(matches!(result, Err(DeviceError::Unavailable(_))));
    }

    #[test]
    fn test_emit_writes_exactly_the_given_event() {
        // Arrange
        let mut handle = MockDeviceHandle::new();
        handle
            .expect_write_event()
            .with(eq(RawEvent::new(EV_KEY, 103, 1)))
            .times(1)
            .returning(|_| Ok(()));
        handle.expect_destroy().times(1).returning(|| Ok(()));
        let backend = OneShotBackend::new(handle);
        let mut device = VirtualDevice::open(&backend, touchpad()).unwrap();

        // Act
        let result = device.emit_raw(EV_KEY, 103, 1);

        // Assert
        assert!(result.is_ok());
        device.close().unwrap();
    }

    #[test]
    fn test_write_failure_is_returned_and_device_stays_open() {
        // Arrange
        let mut handle = MockDeviceHandle::new();
        handle.expect_write_event().times(2).returning(|e| {
            if e.event_type == EV_SYN {
                Ok(())
            } else {
                Err(DeviceError::Write(std::io::Error::from_raw_os_error(11)))
            }
        });
        handle.expect_destroy().times(1).returning(|| Ok(()));
        let backend = OneShotBackend::new(handle);
        let mut device = VirtualDevice::open(&backend, touchpad()).unwrap();

        // Act
        let failed = device.emit(RawEvent::key(103, true));
        let recovered = device.emit(RawEvent::sync());

        // Assert
        assert!(matches!(failed, Err(DeviceError::Write(_))));
        assert!(recovered.is_ok());
        device.close().unwrap();
    }

    #[test]
    fn test_close_destroys_exactly_once() {
        let mut handle = MockDeviceHandle::new();
        handle.expect_destroy().times(1).returning(|| Ok(()));
        let backend = OneShotBackend::new(handle);
        let device = VirtualDevice::open(&backend, touchpad()).unwrap();

        // Dropping after close must not destroy again; mockall verifies `times(1)`.
        device.close().unwrap();
    }

    #[test]
    fn test_drop_without_close_still_destroys() {
        let mut handle = MockDeviceHandle::new();
        handle.expect_destroy().times(1).returning(|| Ok(()));
        let backend = OneShotBackend::new(handle);
        let device = VirtualDevice::open(&backend, touchpad()).unwrap();

        drop(device);
    }

    #[test]
    fn test_close_reports_teardown_failure() {
        let mut handle = MockDeviceHandle::new();
        handle
            .expect_destroy()
            .times(1)
            .returning(|| Err(DeviceError::Destroy(std::io::Error::from_raw_os_error(19))));
        let backend = OneShotBackend::new(handle);
        let device = VirtualDevice::open(&backend, touchpad()).unwrap();

        assert!(matches!(device.close(), Err(DeviceError::Destroy(_))));
    }
}
