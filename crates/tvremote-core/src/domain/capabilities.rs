//! The complete, OS-independent description of what a virtual device declares.
//!
//! [`DeviceCapabilities::for_config`] turns a validated [`DeviceConfig`] into
//! the exact set of identity fields, capability bits and absolute-axis ranges
//! an injection backend must register.  Backends only have to walk this value
//! in order; none of the profile logic lives in OS-specific code.

use std::collections::BTreeSet;

use crate::domain::profile::{AxisCalibration, DeviceConfig, DeviceProfile};
use crate::event::codes::*;
use crate::keymap::KeyCodeTable;

/// Range, noise and resolution of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsAxisSetup {
    pub code: u16,
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

impl AbsAxisSetup {
    const fn range(code: u16, min: i32, max: i32) -> Self {
        Self {
            code,
            min,
            max,
            fuzz: 0,
            flat: 0,
            resolution: 0,
        }
    }

    const fn calibrated(code: u16, c: &AxisCalibration) -> Self {
        Self {
            code,
            min: c.min,
            max: c.max,
            fuzz: c.fuzz,
            flat: c.flat,
            resolution: 1,
        }
    }
}

// Stick and trigger ranges for the controller half of the hybrid profile.
const STICK_RANGE: i32 = 0xFFFF;
const STICK_FLAT: i32 = 0x10000;
const TRIGGER_RANGE: i32 = 0x7FFF;
const TRIGGER_NOISE: i32 = 0xFF;

/// Buttons added when the hybrid profile carries a controller half.
pub const GAMEPAD_BUTTONS: [u16; 11] = [
    BTN_SOUTH, BTN_EAST, BTN_NORTH, BTN_WEST, BTN_START, BTN_SELECT, BTN_MODE, BTN_THUMBL,
    BTN_THUMBR, BTN_TL, BTN_TR,
];

/// Everything a backend registers for one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Name as it will be written to the kernel (already truncated).
    pub name: String,
    /// Unique id, written to the `phys` property.
    pub phys: String,
    pub bus_type: u16,
    pub version: u16,
    /// `INPUT_PROP_*` bits.
    pub properties: Vec<u16>,
    /// Key and button codes, ascending and unique.
    pub keys: Vec<u16>,
    pub rel_axes: Vec<u16>,
    pub abs_axes: Vec<AbsAxisSetup>,
    pub misc: Vec<u16>,
}

impl DeviceCapabilities {
    /// Builds the capability set for `config`'s profile.
    ///
    /// The config is expected to have passed [`DeviceConfig::validate`].
    pub fn for_config(config: &DeviceConfig) -> Self {
        let mut keys: BTreeSet<u16> = KeyCodeTable::global().protocol_codes().collect();
        let mut properties = Vec::new();
        let mut rel_axes = Vec::new();
        let mut abs_axes = Vec::new();

        match &config.profile {
            DeviceProfile::Touchpad => {
                let slots = config.max_contacts.max(1) as i32;
                abs_axes.push(AbsAxisSetup::range(ABS_MT_SLOT, 0, slots - 1));
                abs_axes.push(AbsAxisSetup::range(ABS_MT_TRACKING_ID, 0, 0xFFFF));
                abs_axes.push(AbsAxisSetup::range(ABS_MT_POSITION_X, 0, config.width - 1));
                abs_axes.push(AbsAxisSetup::range(ABS_MT_POSITION_Y, 0, config.height - 1));
            }
            DeviceProfile::PointerHybrid { calibration } => {
                properties.push(INPUT_PROP_POINTER);
                keys.extend([BTN_LEFT, BTN_RIGHT]);
                rel_axes.extend([REL_X, REL_Y, REL_HWHEEL, REL_WHEEL]);

                if let Some(cal) = calibration {
                    keys.extend(GAMEPAD_BUTTONS);
                    abs_axes.extend(controller_axes(cal));
                }
            }
        }

        Self {
            name: truncate_name(&config.name),
            phys: config.unique_id.clone(),
            bus_type: BUS_VIRTUAL,
            version: 1,
            properties,
            keys: keys.into_iter().collect(),
            rel_axes,
            abs_axes,
            misc: vec![MSC_ANDROID_TIME_SEC, MSC_ANDROID_TIME_USEC],
        }
    }

    /// The `EV_*` types this device declares, ascending.
    pub fn event_types(&self) -> Vec<u16> {
        let mut types = vec![EV_SYN];
        if !self.keys.is_empty() {
            types.push(EV_KEY);
        }
        if !self.rel_axes.is_empty() {
            types.push(EV_REL);
        }
        if !self.abs_axes.is_empty() {
            types.push(EV_ABS);
        }
        if !self.misc.is_empty() {
            types.push(EV_MSC);
        }
        types
    }

    pub fn has_key(&self, code: u16) -> bool {
        self.keys.binary_search(&code).is_ok()
    }

    pub fn abs_axis(&self, code: u16) -> Option<&AbsAxisSetup> {
        self.abs_axes.iter().find(|a| a.code == code)
    }
}

fn controller_axes(cal: &AxisCalibration) -> [AbsAxisSetup; 10] {
    let stick = |code| AbsAxisSetup {
        code,
        min: -STICK_RANGE,
        max: STICK_RANGE,
        fuzz: 1,
        flat: STICK_FLAT,
        resolution: 1,
    };
    let trigger = |code| AbsAxisSetup {
        code,
        min: -TRIGGER_RANGE,
        max: TRIGGER_RANGE,
        fuzz: TRIGGER_NOISE,
        flat: TRIGGER_NOISE,
        resolution: 1,
    };
    [
        AbsAxisSetup::range(ABS_HAT0X, -1, 1),
        AbsAxisSetup::range(ABS_HAT0Y, -1, 1),
        stick(ABS_X),
        stick(ABS_Y),
        AbsAxisSetup::calibrated(ABS_Z, cal),
        AbsAxisSetup::calibrated(ABS_RZ, cal),
        AbsAxisSetup::calibrated(ABS_RX, cal),
        AbsAxisSetup::calibrated(ABS_BRAKE, cal),
        trigger(ABS_RY),
        trigger(ABS_GAS),
    ]
}

/// Cuts `name` to at most `UINPUT_MAX_NAME_SIZE - 1` bytes on a char boundary.
pub fn truncate_name(name: &str) -> String {
    let limit = UINPUT_MAX_NAME_SIZE - 1;
    if name.len() <= limit {
        return name.to_owned();
    }
    let mut end = limit;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
