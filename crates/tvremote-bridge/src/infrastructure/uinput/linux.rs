//! Linux uinput injection backend.
//!
//! Registers virtual devices by writing to `/dev/uinput` and driving the
//! `UI_*` ioctls directly through `nix`.  Events are written one
//! `input_event` record at a time, exactly as the translator produced them;
//! this backend never adds `SYN_REPORT` on its own.
//!
//! # Registration order
//!
//! 1. open the node write-only, non-blocking
//! 2. `UI_DEV_SETUP` with name, `BUS_VIRTUAL` and version
//! 3. `UI_SET_PHYS` with the unique id
//! 4. `UI_SET_EVBIT` / `KEYBIT` / `RELBIT` / `ABSBIT` / `MSCBIT` / `PROPBIT`
//! 5. `UI_ABS_SETUP` for every absolute axis
//! 6. `UI_DEV_CREATE`
//!
//! Any failure drops the `File`, which closes the descriptor; the kernel
//! discards a half-configured uinput context when its descriptor closes.
//!
//! # Safety
//!
//! Every `unsafe` block below is an ioctl on a descriptor we own, with a
//! pointer to a `#[repr(C)]` value that outlives the call.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::os::raw::{c_char, c_int};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::{
    ioctl_none, ioctl_write_int, ioctl_write_ptr, ioctl_write_ptr_bad, request_code_write,
};
use tracing::{debug, info, trace};
use tvremote_core::{
    event::codes::UINPUT_MAX_NAME_SIZE,
    AbsAxisSetup, DeviceCapabilities, RawEvent,
};

use crate::application::virtual_device::{DeviceError, DeviceHandle, InjectionBackend};

/// Default path of the uinput control node.
pub const DEFAULT_UINPUT_PATH: &str = "/dev/uinput";

// ── Kernel ABI (linux/uinput.h) ───────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct InputId {
    bustype: u16,
    vendor: u16,
    product: u16,
    version: u16,
}

#[repr(C)]
struct UinputSetup {
    id: InputId,
    name: [c_char; UINPUT_MAX_NAME_SIZE],
    ff_effects_max: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct InputAbsinfo {
    value: i32,
    minimum: i32,
    maximum: i32,
    fuzz: i32,
    flat: i32,
    resolution: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct UinputAbsSetup {
    code: u16,
    absinfo: InputAbsinfo,
}

#[repr(C)]
struct InputEvent {
    time: libc::timeval,
    type_: u16,
    code: u16,
    value: i32,
}

const UINPUT_IOCTL_BASE: u8 = b'U';

ioctl_none!(ui_dev_create, UINPUT_IOCTL_BASE, 1);
ioctl_none!(ui_dev_destroy, UINPUT_IOCTL_BASE, 2);
ioctl_write_ptr!(ui_dev_setup, UINPUT_IOCTL_BASE, 3, UinputSetup);
ioctl_write_ptr!(ui_abs_setup, UINPUT_IOCTL_BASE, 4, UinputAbsSetup);
ioctl_write_int!(ui_set_evbit, UINPUT_IOCTL_BASE, 100);
ioctl_write_int!(ui_set_keybit, UINPUT_IOCTL_BASE, 101);
ioctl_write_int!(ui_set_relbit, UINPUT_IOCTL_BASE, 102);
ioctl_write_int!(ui_set_absbit, UINPUT_IOCTL_BASE, 103);
ioctl_write_int!(ui_set_mscbit, UINPUT_IOCTL_BASE, 104);
ioctl_write_int!(ui_set_propbit, UINPUT_IOCTL_BASE, 110);
// UI_SET_PHYS is declared as _IOW('U', 108, char*): the size is that of a pointer.
ioctl_write_ptr_bad!(
    ui_set_phys,
    request_code_write!(UINPUT_IOCTL_BASE, 108, std::mem::size_of::<*const c_char>()),
    c_char
);

type BitSetter = unsafe fn(c_int, nix::sys::ioctl::ioctl_param_type) -> nix::Result<c_int>;

// ── Backend ───────────────────────────────────────────────────────────────────

/// Creates devices through a uinput node.
#[derive(Debug, Clone)]
pub struct UinputBackend {
    device_path: PathBuf,
}

impl UinputBackend {
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
        }
    }

    pub fn device_path(&self) -> &Path {
        &self.device_path
    }
}

impl Default for UinputBackend {
    fn default() -> Self {
        Self::new(DEFAULT_UINPUT_PATH)
    }
}

impl InjectionBackend for UinputBackend {
    fn create(
        &self,
        capabilities: &DeviceCapabilities,
    ) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.device_path)
            .map_err(|source| DeviceError::Open {
                path: self.device_path.clone(),
                source,
            })?;

        // On error `file` is dropped here, closing the descriptor.
        register(&file, capabilities)?;

        info!(
            name = %capabilities.name,
            path = %self.device_path.display(),
            "uinput device created"
        );
        Ok(Box::new(UinputDevice { file: Some(file) }))
    }
}

fn register(file: &File, caps: &DeviceCapabilities) -> Result<(), DeviceError> {
    let fd = file.as_raw_fd();

    let setup = UinputSetup {
        id: InputId {
            bustype: caps.bus_type,
            version: caps.version,
            ..InputId::default()
        },
        name: name_field(&caps.name),
        ff_effects_max: 0,
    };
    step("UI_DEV_SETUP", unsafe { ui_dev_setup(fd, &setup) })?;

    let phys = CString::new(caps.phys.as_str()).map_err(|e| DeviceError::Setup {
        step: "UI_SET_PHYS",
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;
    step("UI_SET_PHYS", unsafe { ui_set_phys(fd, phys.as_ptr()) })?;

    for ev in caps.event_types() {
        set_bit("UI_SET_EVBIT", ui_set_evbit, fd, ev)?;
    }
    for &key in &caps.keys {
        set_bit("UI_SET_KEYBIT", ui_set_keybit, fd, key)?;
    }
    for &rel in &caps.rel_axes {
        set_bit("UI_SET_RELBIT", ui_set_relbit, fd, rel)?;
    }
    for axis in &caps.abs_axes {
        set_bit("UI_SET_ABSBIT", ui_set_absbit, fd, axis.code)?;
    }
    for &msc in &caps.misc {
        set_bit("UI_SET_MSCBIT", ui_set_mscbit, fd, msc)?;
    }
    for &prop in &caps.properties {
        set_bit("UI_SET_PROPBIT", ui_set_propbit, fd, prop)?;
    }

    for axis in &caps.abs_axes {
        let abs = abs_setup(axis);
        step("UI_ABS_SETUP", unsafe { ui_abs_setup(fd, &abs) })?;
    }

    debug!(
        keys = caps.keys.len(),
        rel = caps.rel_axes.len(),
        abs = caps.abs_axes.len(),
        "uinput capabilities declared"
    );

    step("UI_DEV_CREATE", unsafe { ui_dev_create(fd) })
}

fn step(name: &'static str, result: nix::Result<c_int>) -> Result<(), DeviceError> {
    result.map(|_| ()).map_err(|errno| DeviceError::Setup {
        step: name,
        source: io::Error::from(errno),
    })
}

fn set_bit(name: &'static str, setter: BitSetter, fd: c_int, bit: u16) -> Result<(), DeviceError> {
    step(name, unsafe {
        setter(fd, bit as nix::sys::ioctl::ioctl_param_type)
    })
}

fn name_field(name: &str) -> [c_char; UINPUT_MAX_NAME_SIZE] {
    let mut field = [0 as c_char; UINPUT_MAX_NAME_SIZE];
    for (dst, &src) in field
        .iter_mut()
        .zip(name.as_bytes().iter().take(UINPUT_MAX_NAME_SIZE - 1))
    {
        *dst = src as c_char;
    }
    field
}

fn abs_setup(axis: &AbsAxisSetup) -> UinputAbsSetup {
    UinputAbsSetup {
        code: axis.code,
        absinfo: InputAbsinfo {
            value: 0,
            minimum: axis.min,
            maximum: axis.max,
            fuzz: axis.fuzz,
            flat: axis.flat,
            resolution: axis.resolution,
        },
    }
}

// ── Device handle ─────────────────────────────────────────────────────────────

struct UinputDevice {
    file: Option<File>,
}

impl DeviceHandle for UinputDevice {
    fn write_event(&mut self, event: RawEvent) -> Result<(), DeviceError> {
        let file = self.file.as_mut().ok_or(DeviceError::Closed)?;
        let record = InputEvent {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_: event.event_type,
            code: event.code,
            value: event.value,
        };
        trace!(?event, "uinput write");
        file.write_all(as_bytes(&record)).map_err(DeviceError::Write)
    }

    fn destroy(&mut self) -> Result<(), DeviceError> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let result = unsafe { ui_dev_destroy(file.as_raw_fd()) };
        drop(file);
        result
            .map(|_| ())
            .map_err(|errno| DeviceError::Destroy(io::Error::from(errno)))
    }
}

fn as_bytes(event: &InputEvent) -> &[u8] {
    // SAFETY: `InputEvent` is `#[repr(C)]` plain data; the slice covers
    // exactly its bytes and borrows `event`.
    unsafe {
        std::slice::from_raw_parts(
            (event as *const InputEvent).cast::<u8>(),
            std::mem::size_of::<InputEvent>(),
        )
    }
}
