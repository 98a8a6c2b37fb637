//! EventTranslator: turns high-level remote intents into kernel event frames.
//!
//! Each intent maps to a fixed, ordered sequence of raw events written to one
//! [`VirtualDevice`].  Multi-touch contacts are given kernel slots by a
//! per-device [`SlotAllocator`]; logical keys go through the process-wide
//! [`KeyCodeTable`].
//!
//! Only [`EventTranslator::sync`], [`EventTranslator::clear`], the mouse
//! button and the mouse move intents end a frame.  Contact, key, wheel,
//! timestamp and axis events are left open so the caller can batch several
//! of them under one sync.

use thiserror::Error;
use tracing::{debug, trace, warn};
use tvremote_core::{
    event::codes::{
        ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID, MSC_ANDROID_TIME_SEC,
        MSC_ANDROID_TIME_USEC, REL_HWHEEL, REL_WHEEL, REL_X, REL_Y, TRACKING_ID_NONE,
    },
    AxisGroup, ContactId, DeviceConfig, KeyCodeTable, MouseButton, RawEvent, SlotAllocator,
};

use crate::application::virtual_device::{DeviceError, VirtualDevice};

/// Per-intent failures.  None of them tear the device down.
#[derive(Debug, Error)]
pub enum InputError {
    /// The logical key has no entry in the key table; nothing was emitted.
    #[error("unknown logical key {0}")]
    UnknownKey(i32),

    /// The axis selector is outside 1..=5; nothing was emitted.
    #[error("unknown axis group selector {0}")]
    UnknownAxisGroup(i32),

    /// Every slot is taken; the contact was dropped.
    #[error("no free slot for contact {contact} (capacity {capacity})")]
    SlotsExhausted { contact: ContactId, capacity: usize },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Intent-level façade over one virtual device.
#[derive(Debug)]
pub struct EventTranslator {
    device: VirtualDevice,
    slots: SlotAllocator,
    keys: &'static KeyCodeTable,
}

impl EventTranslator {
    /// Wraps an open device.  The slot table is sized to its contact count.
    pub fn new(device: VirtualDevice) -> Self {
        let slots = SlotAllocator::new(device.max_contacts());
        Self {
            device,
            slots,
            keys: KeyCodeTable::global(),
        }
    }

    /// Emits the provider's event time as two misc events.
    pub fn timestamp(&mut self, timestamp_ms: i64) -> Result<(), InputError> {
        let sec = timestamp_ms / 1000;
        let usec = (timestamp_ms % 1000) * 1000;
        // Kernel misc values are 32-bit; seconds wrap like the C `int` they land in.
        self.emit(RawEvent::misc(MSC_ANDROID_TIME_SEC, sec as i32))?;
        self.emit(RawEvent::misc(MSC_ANDROID_TIME_USEC, usec as i32))
    }

    /// Presses or releases a logical key.
    pub fn key(&mut self, logical: i32, down: bool) -> Result<(), InputError> {
        let Some(code) = self.keys.lookup(logical) else {
            warn!(logical, "dropping unknown key");
            return Err(InputError::UnknownKey(logical));
        };
        trace!(logical, code, down, "key");
        self.emit(RawEvent::key(code, down))
    }

    /// Starts or moves a contact.  Does not sync.
    pub fn contact_down(&mut self, contact: ContactId, x: i32, y: i32) -> Result<(), InputError> {
        let slot = match self.slots.find(contact) {
            Some(slot) => slot,
            None => self.slots.assign(contact).ok_or_else(|| {
                warn!(contact, capacity = self.slots.capacity(), "no free slot; contact dropped");
                InputError::SlotsExhausted {
                    contact,
                    capacity: self.slots.capacity(),
                }
            })?,
        };
        trace!(contact, slot, x, y, "contact down");

        self.emit(RawEvent::abs(ABS_MT_SLOT, slot as i32))?;
        self.emit(RawEvent::abs(ABS_MT_TRACKING_ID, contact))?;
        self.emit(RawEvent::abs(ABS_MT_POSITION_X, x))?;
        self.emit(RawEvent::abs(ABS_MT_POSITION_Y, y))
    }

    /// Lifts a contact.  Unknown contacts are ignored.  Does not sync.
    pub fn contact_up(&mut self, contact: ContactId) -> Result<(), InputError> {
        let Some(slot) = self.slots.find(contact) else {
            debug!(contact, "contact up for unknown contact ignored");
            return Ok(());
        };
        trace!(contact, slot, "contact up");

        self.emit(RawEvent::abs(ABS_MT_SLOT, slot as i32))?;
        self.emit(RawEvent::abs(ABS_MT_TRACKING_ID, TRACKING_ID_NONE))?;
        self.slots.release(contact);
        Ok(())
    }

    /// Ends the current frame.
    pub fn sync(&mut self) -> Result<(), InputError> {
        self.emit(RawEvent::sync())
    }

    /// Returns the device to a neutral state: every declared key and button
    /// up, every contact lifted, then one sync.
    ///
    /// All contacts are released from the slot table before any event is
    /// written, so a write failure still leaves the table empty.
    pub fn clear(&mut self) -> Result<(), InputError> {
        let live = self.slots.drain();
        let codes = self.device.capabilities().keys.clone();
        debug!(contacts = live.len(), keys = codes.len(), "clearing device state");

        for code in codes {
            self.emit(RawEvent::key(code, false))?;
        }
        for (_, slot) in live {
            self.emit(RawEvent::abs(ABS_MT_SLOT, slot as i32))?;
            self.emit(RawEvent::abs(ABS_MT_TRACKING_ID, TRACKING_ID_NONE))?;
        }
        self.sync()
    }

    /// Presses or releases a mouse button, then syncs.
    pub fn mouse_button(&mut self, button: MouseButton, down: bool) -> Result<(), InputError> {
        self.emit(RawEvent::key(button.code(), down))?;
        self.sync()
    }

    /// Relative pointer motion, then sync.
    pub fn mouse_move(&mut self, dx: i32, dy: i32) -> Result<(), InputError> {
        self.emit(RawEvent::rel(REL_X, dx))?;
        self.emit(RawEvent::rel(REL_Y, dy))?;
        self.sync()
    }

    /// Wheel motion.  Zero components are skipped; does not sync.
    pub fn mouse_wheel(&mut self, x: i32, y: i32) -> Result<(), InputError> {
        if x != 0 {
            self.emit(RawEvent::rel(REL_HWHEEL, x))?;
        }
        if y != 0 {
            self.emit(RawEvent::rel(REL_WHEEL, y))?;
        }
        Ok(())
    }

    /// Drives one two-axis group.  Does not sync.
    pub fn axis(&mut self, x: i32, y: i32, selector: i32) -> Result<(), InputError> {
        let group = AxisGroup::try_from(selector).map_err(|s| {
            warn!(selector = s, "dropping axis event for unknown group");
            InputError::UnknownAxisGroup(s)
        })?;
        let (x_code, y_code) = group.axes();
        self.emit(RawEvent::abs(x_code, x))?;
        self.emit(RawEvent::abs(y_code, y))
    }

    /// Destroys the device.  Slots are discarded with the translator.
    pub fn close(self) -> Result<(), DeviceError> {
        self.device.close()
    }

    pub fn config(&self) -> &DeviceConfig {
        self.device.config()
    }

    pub fn slots(&self) -> &SlotAllocator {
        &self.slots
    }

    fn emit(&mut self, event: RawEvent) -> Result<(), InputError> {
        self.device.emit(event).map_err(InputError::from)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
