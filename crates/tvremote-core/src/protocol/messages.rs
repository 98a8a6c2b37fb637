//! All control-channel message types.
//!
//! Remote providers drive virtual devices through these messages.  Every
//! message that targets a device starts with the 16-byte [`BridgeToken`] the
//! provider chose when it sent [`BridgeMessage::OpenBridge`].

use uuid::Uuid;

use crate::domain::profile::{AxisCalibration, DeviceConfig, DeviceProfile, MouseButton};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Total size of the common message header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Identifies one bridge (one virtual device) for the lifetime of a session.
pub type BridgeToken = Uuid;

// ── Message type codes ────────────────────────────────────────────────────────

/// All message type codes understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    // Control (0x00–0x3F)
    OpenBridge = 0x01,
    BridgeOpened = 0x02,
    BridgeOpenFailed = 0x03,
    CloseBridge = 0x04,
    ClearBridge = 0x05,
    Ping = 0x06,
    Pong = 0x07,
    // Input (0x40–0x7F)
    Timestamp = 0x40,
    Key = 0x41,
    PointerDown = 0x42,
    PointerUp = 0x43,
    PointerSync = 0x44,
    MouseButton = 0x45,
    MouseMove = 0x46,
    MouseWheel = 0x47,
    AxisEvent = 0x48,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(MessageType::OpenBridge),
            0x02 => Ok(MessageType::BridgeOpened),
            0x03 => Ok(MessageType::BridgeOpenFailed),
            0x04 => Ok(MessageType::CloseBridge),
            0x05 => Ok(MessageType::ClearBridge),
            0x06 => Ok(MessageType::Ping),
            0x07 => Ok(MessageType::Pong),
            0x40 => Ok(MessageType::Timestamp),
            0x41 => Ok(MessageType::Key),
            0x42 => Ok(MessageType::PointerDown),
            0x43 => Ok(MessageType::PointerUp),
            0x44 => Ok(MessageType::PointerSync),
            0x45 => Ok(MessageType::MouseButton),
            0x46 => Ok(MessageType::MouseMove),
            0x47 => Ok(MessageType::MouseWheel),
            0x48 => Ok(MessageType::AxisEvent),
            _ => Err(()),
        }
    }
}

impl MessageType {
    /// `true` for the input range (0x40–0x7F).
    pub fn is_input(self) -> bool {
        (self as u8) & 0xC0 == 0x40
    }
}

// ── Common message header ─────────────────────────────────────────────────────

/// 24-byte header prepended to every message on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Protocol version; always [`PROTOCOL_VERSION`].
    pub version: u8,
    pub message_type: MessageType,
    /// Length of the payload in bytes (not including this header).
    pub payload_length: u32,
    pub sequence_number: u64,
    /// Microseconds since Unix epoch at time of generation.
    pub timestamp_us: u64,
}

// ── Per-message payload structs ───────────────────────────────────────────────

/// Wire tag for [`DeviceProfile`] inside [`OpenBridgeMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProfileKind {
    Touchpad = 0x01,
    PointerHybrid = 0x02,
}

impl TryFrom<u8> for ProfileKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(ProfileKind::Touchpad),
            0x02 => Ok(ProfileKind::PointerHybrid),
            _ => Err(()),
        }
    }
}

/// OPEN_BRIDGE (0x01): create a virtual device bound to `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBridgeMessage {
    pub token: BridgeToken,
    pub name: String,
    /// Empty means "derive one from the token".
    pub unique_id: String,
    pub width: i32,
    pub height: i32,
    pub max_contacts: u16,
    pub profile: DeviceProfile,
}

impl OpenBridgeMessage {
    /// The device config this request describes.
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig {
            name: self.name.clone(),
            unique_id: self.unique_id.clone(),
            width: self.width,
            height: self.height,
            max_contacts: self.max_contacts as usize,
            profile: self.profile,
        }
    }

    pub fn profile_kind(&self) -> ProfileKind {
        match self.profile {
            DeviceProfile::Touchpad => ProfileKind::Touchpad,
            DeviceProfile::PointerHybrid { .. } => ProfileKind::PointerHybrid,
        }
    }

    pub fn calibration(&self) -> Option<&AxisCalibration> {
        self.profile.calibration()
    }
}

/// BRIDGE_OPEN_FAILED (0x03): the device for `token` could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOpenFailedMessage {
    pub token: BridgeToken,
    /// Human-readable cause, for logging on the provider side.
    pub reason: String,
}

/// TIMESTAMP (0x40): event time for the frame that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampMessage {
    pub token: BridgeToken,
    /// Milliseconds; split into seconds and microseconds on emission.
    pub timestamp_ms: i64,
}

/// KEY (0x41): logical key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMessage {
    pub token: BridgeToken,
    /// Android key code.
    pub key_code: i32,
    pub down: bool,
}

/// POINTER_DOWN (0x42): contact placed or moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDownMessage {
    pub token: BridgeToken,
    pub pointer_id: i32,
    pub x: i32,
    pub y: i32,
}

/// POINTER_UP (0x43): contact lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerUpMessage {
    pub token: BridgeToken,
    pub pointer_id: i32,
}

/// MOUSE_BUTTON (0x45).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonMessage {
    pub token: BridgeToken,
    pub button: MouseButton,
    pub down: bool,
}

/// MOUSE_MOVE (0x46): relative motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseMoveMessage {
    pub token: BridgeToken,
    pub dx: i32,
    pub dy: i32,
}

/// MOUSE_WHEEL (0x47): horizontal (`x`) and vertical (`y`) wheel steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseWheelMessage {
    pub token: BridgeToken,
    pub x: i32,
    pub y: i32,
}

/// AXIS_EVENT (0x48): one two-axis group update.
///
/// `axis` is carried raw so an unknown selector reaches the translator and is
/// reported there, not rejected by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisEventMessage {
    pub token: BridgeToken,
    pub x: i32,
    pub y: i32,
    pub axis: i32,
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// All valid control-channel messages, discriminated by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    OpenBridge(OpenBridgeMessage),
    BridgeOpened { token: BridgeToken },
    BridgeOpenFailed(BridgeOpenFailedMessage),
    CloseBridge { token: BridgeToken },
    ClearBridge { token: BridgeToken },
    Ping(u64),
    Pong(u64),
    Timestamp(TimestampMessage),
    Key(KeyMessage),
    PointerDown(PointerDownMessage),
    PointerUp(PointerUpMessage),
    PointerSync { token: BridgeToken },
    MouseButton(MouseButtonMessage),
    MouseMove(MouseMoveMessage),
    MouseWheel(MouseWheelMessage),
    AxisEvent(AxisEventMessage),
}

impl BridgeMessage {
    /// Returns the [`MessageType`] discriminant for this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            BridgeMessage::OpenBridge(_) => MessageType::OpenBridge,
            BridgeMessage::BridgeOpened { .. } => MessageType::BridgeOpened,
            BridgeMessage::BridgeOpenFailed(_) => MessageType::BridgeOpenFailed,
            BridgeMessage::CloseBridge { .. } => MessageType::CloseBridge,
            BridgeMessage::ClearBridge { .. } => MessageType::ClearBridge,
            BridgeMessage::Ping(_) => MessageType::Ping,
            BridgeMessage::Pong(_) => MessageType::Pong,
            BridgeMessage::Timestamp(_) => MessageType::Timestamp,
            BridgeMessage::Key(_) => MessageType::Key,
            BridgeMessage::PointerDown(_) => MessageType::PointerDown,
            BridgeMessage::PointerUp(_) => MessageType::PointerUp,
            BridgeMessage::PointerSync { .. } => MessageType::PointerSync,
            BridgeMessage::MouseButton(_) => MessageType::MouseButton,
            BridgeMessage::MouseMove(_) => MessageType::MouseMove,
            BridgeMessage::MouseWheel(_) => MessageType::MouseWheel,
            BridgeMessage::AxisEvent(_) => MessageType::AxisEvent,
        }
    }

    /// The bridge this message addresses, if any.
    pub fn token(&self) -> Option<BridgeToken> {
        match self {
            BridgeMessage::OpenBridge(m) => Some(m.token),
            BridgeMessage::BridgeOpened { token }
            | BridgeMessage::CloseBridge { token }
            | BridgeMessage::ClearBridge { token }
            | BridgeMessage::PointerSync { token } => Some(*token),
            BridgeMessage::BridgeOpenFailed(m) => Some(m.token),
            BridgeMessage::Ping(_) | BridgeMessage::Pong(_) => None,
            BridgeMessage::Timestamp(m) => Some(m.token),
            BridgeMessage::Key(m) => Some(m.token),
            BridgeMessage::PointerDown(m) => Some(m.token),
            BridgeMessage::PointerUp(m) => Some(m.token),
            BridgeMessage::MouseButton(m) => Some(m.token),
            BridgeMessage::MouseMove(m) => Some(m.token),
            BridgeMessage::MouseWheel(m) => Some(m.token),
            BridgeMessage::AxisEvent(m) => Some(m.token),
        }
    }
}
