//! Device profiles and the configuration a virtual device is opened with.
//!
//! A [`DeviceConfig`] is everything a remote provider tells the bridge about
//! the device it wants: a display name, a unique id, the touch surface size,
//! how many fingers it can report, and which [`DeviceProfile`] to present.
//!
//! # Profiles (for beginners)
//!
//! The kernel decides how to treat an input device purely from the
//! *capabilities* it declares at creation time.  Two fixed shapes are
//! supported:
//!
//! - **Touchpad** – a multi-touch surface.  Fingers are reported with absolute
//!   X/Y positions in numbered slots.
//! - **PointerHybrid** – a mouse (relative motion, wheel, two buttons) that
//!   optionally also behaves as a game controller.  The controller half only
//!   exists when an [`AxisCalibration`] is supplied.
//!
//! Capabilities cannot be changed after creation, so the profile is fixed for
//! the life of the device.

use thiserror::Error;

use crate::domain::slots::MAX_CONTACT_SLOTS;
use crate::event::codes::{
    ABS_BRAKE, ABS_GAS, ABS_HAT0X, ABS_HAT0Y, ABS_RX, ABS_RY, ABS_RZ, ABS_X, ABS_Y, ABS_Z,
    BTN_LEFT, BTN_RIGHT,
};

/// Errors raised by [`DeviceConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max contacts {requested} exceeds the supported maximum of {max}")]
    TooManyContacts { requested: usize, max: usize },

    #[error("touchpad must declare at least one contact")]
    NoContacts,

    #[error("touchpad surface must be at least 1x1, got {width}x{height}")]
    InvalidSurface { width: i32, height: i32 },

    #[error("axis calibration is inconsistent: {0}")]
    InvalidCalibration(String),

    #[error("{field} must not contain a NUL byte")]
    NulByte { field: &'static str },
}

/// Range and noise settings for the two caller-calibrated axis pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisCalibration {
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
}

impl AxisCalibration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidCalibration(format!(
                "min {} is greater than max {}",
                self.min, self.max
            )));
        }
        if self.fuzz < 0 || self.flat < 0 {
            return Err(ConfigError::InvalidCalibration(format!(
                "fuzz {} and flat {} must not be negative",
                self.fuzz, self.flat
            )));
        }
        // The kernel compares flat against max - min in a 32-bit int.
        let range = self.max.checked_sub(self.min).ok_or_else(|| {
            ConfigError::InvalidCalibration(format!(
                "range {}..{} does not fit in 32 bits",
                self.min, self.max
            ))
        })?;
        if self.flat > range {
            return Err(ConfigError::InvalidCalibration(format!(
                "flat {} exceeds the axis range {}",
                self.flat, range
            )));
        }
        Ok(())
    }
}

/// The capability shape a virtual device presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceProfile {
    Touchpad,
    PointerHybrid {
        /// `Some` adds the game-controller buttons and calibrated axes.
        calibration: Option<AxisCalibration>,
    },
}

impl DeviceProfile {
    pub fn is_touchpad(&self) -> bool {
        matches!(self, DeviceProfile::Touchpad)
    }

    /// The calibration, when this is a hybrid profile with a controller half.
    pub fn calibration(&self) -> Option<&AxisCalibration> {
        match self {
            DeviceProfile::PointerHybrid { calibration } => calibration.as_ref(),
            DeviceProfile::Touchpad => None,
        }
    }
}

/// Selects which pair of absolute axes an axis event drives.
///
/// The numeric values are part of the control-channel contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum AxisGroup {
    /// D-pad hat: `ABS_HAT0X`, `ABS_HAT0Y`.
    Hat = 1,
    /// `ABS_RX`, `ABS_BRAKE`.
    RxBrake = 2,
    /// `ABS_RY`, `ABS_GAS`.
    RyGas = 3,
    /// Left stick: `ABS_X`, `ABS_Y`.
    LeftStick = 4,
    /// Right stick: `ABS_Z`, `ABS_RZ`.
    RightStick = 5,
}

impl AxisGroup {
    /// The `(x, y)` absolute axis codes this group drives.
    pub const fn axes(self) -> (u16, u16) {
        match self {
            AxisGroup::Hat => (ABS_HAT0X, ABS_HAT0Y),
            AxisGroup::RxBrake => (ABS_RX, ABS_BRAKE),
            AxisGroup::RyGas => (ABS_RY, ABS_GAS),
            AxisGroup::LeftStick => (ABS_X, ABS_Y),
            AxisGroup::RightStick => (ABS_Z, ABS_RZ),
        }
    }

    pub const fn selector(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for AxisGroup {
    /// The rejected selector.
    type Error = i32;

    fn try_from(selector: i32) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(AxisGroup::Hat),
            2 => Ok(AxisGroup::RxBrake),
            3 => Ok(AxisGroup::RyGas),
            4 => Ok(AxisGroup::LeftStick),
            5 => Ok(AxisGroup::RightStick),
            other => Err(other),
        }
    }
}

/// Mouse buttons the hybrid profile can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
}

impl MouseButton {
    pub const fn code(self) -> u16 {
        match self {
            MouseButton::Left => BTN_LEFT,
            MouseButton::Right => BTN_RIGHT,
        }
    }
}

impl TryFrom<u8> for MouseButton {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MouseButton::Left),
            1 => Ok(MouseButton::Right),
            other => Err(other),
        }
    }
}

/// Parameters for opening one virtual device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Display name reported to the kernel.  Truncated to fit the kernel's
    /// name buffer when capabilities are built.
    pub name: String,
    /// Stable identifier written to the device's `phys` property.
    pub unique_id: String,
    /// Touch surface width in device units.
    pub width: i32,
    /// Touch surface height in device units.
    pub height: i32,
    /// Maximum simultaneous contacts (slot count).
    pub max_contacts: usize,
    pub profile: DeviceProfile,
}

impl DeviceConfig {
    pub fn touchpad(
        name: impl Into<String>,
        unique_id: impl Into<String>,
        width: i32,
        height: i32,
        max_contacts: usize,
    ) -> Self {
        Self {
            name: name.into(),
            unique_id: unique_id.into(),
            width,
            height,
            max_contacts,
            profile: DeviceProfile::Touchpad,
        }
    }

    pub fn pointer_hybrid(
        name: impl Into<String>,
        unique_id: impl Into<String>,
        calibration: Option<AxisCalibration>,
    ) -> Self {
        Self {
            name: name.into(),
            unique_id: unique_id.into(),
            width: 0,
            height: 0,
            max_contacts: 0,
            profile: DeviceProfile::PointerHybrid { calibration },
        }
    }

    /// Checks the config before any kernel resource is acquired.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.contains('\0') {
            return Err(ConfigError::NulByte { field: "name" });
        }
        if self.unique_id.contains('\0') {
            return Err(ConfigError::NulByte { field: "unique id" });
        }
        if self.max_contacts > MAX_CONTACT_SLOTS {
            return Err(ConfigError::TooManyContacts {
                requested: self.max_contacts,
                max: MAX_CONTACT_SLOTS,
            });
        }
        match &self.profile {
            DeviceProfile::Touchpad => {
                if self.max_contacts == 0 {
                    return Err(ConfigError::NoContacts);
                }
                if self.width <= 0 || self.height <= 0 {
                    return Err(ConfigError::InvalidSurface {
                        width: self.width,
                        height: self.height,
                    });
                }
            }
            DeviceProfile::PointerHybrid { calibration } => {
                if let Some(calibration) = calibration {
                    calibration.validate()?;
                }
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
