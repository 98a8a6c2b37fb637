//! Binary codec for encoding and decoding control-channel messages.
//!
//! Wire format:
//! ```text
//! [version:1][msg_type:1][reserved:2][payload_len:4][seq:8][timestamp_us:8][payload:N]
//! ```
//! Total header size: 24 bytes. All multi-byte integers are big-endian.
//!
//! Payload layouts (token = 16 raw UUID bytes, str = u16 length + UTF-8):
//!
//! | Message            | Payload                                                              |
//! |--------------------|----------------------------------------------------------------------|
//! | OpenBridge         | token, kind:u8, name:str, unique_id:str, width:i32, height:i32, max_contacts:u16, has_cal:u8, [min,max,fuzz,flat]:i32 |
//! | BridgeOpened       | token                                                                |
//! | BridgeOpenFailed   | token, reason:str                                                    |
//! | Close/ClearBridge  | token                                                                |
//! | Ping / Pong        | value:u64                                                            |
//! | Timestamp          | token, ms:i64                                                        |
//! | Key                | token, key_code:i32, down:u8                                         |
//! | PointerDown        | token, pointer_id:i32, x:i32, y:i32                                  |
//! | PointerUp          | token, pointer_id:i32                                                |
//! | PointerSync        | token                                                                |
//! | MouseButton        | token, button:u8, down:u8                                            |
//! | MouseMove          | token, dx:i32, dy:i32                                                |
//! | MouseWheel         | token, x:i32, y:i32                                                  |
//! | AxisEvent          | token, x:i32, y:i32, axis:i32                                        |

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use uuid::Uuid;

use crate::domain::profile::{AxisCalibration, DeviceProfile, MouseButton};
use crate::protocol::messages::{
    AxisEventMessage, BridgeMessage, BridgeOpenFailedMessage, KeyMessage, MessageHeader,
    MessageType, MouseButtonMessage, MouseMoveMessage, MouseWheelMessage, OpenBridgeMessage,
    PointerDownMessage, PointerUpMessage, ProfileKind, TimestampMessage, HEADER_SIZE,
    PROTOCOL_VERSION,
};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The message type byte in the header is not a recognized value.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The payload could not be parsed (field value out of range, UTF-8 error, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The encoded payload length field does not match the actual data available.
    #[error("payload length mismatch: header says {declared}, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },

    /// The header announces a payload larger than the receiver accepts.
    #[error("payload of {declared} bytes exceeds the limit of {max}")]
    PayloadTooLarge { declared: usize, max: usize },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`BridgeMessage`] into a byte vector including the 24-byte header.
///
/// The sequence number is **not** set by this function – pass a pre-incremented
/// value from a [`crate::protocol::SequenceCounter`].
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if a string field is longer
/// than a u16 length prefix can describe.
///
/// # Examples
///
/// ```rust
/// use tvremote_core::protocol::{decode_message, encode_message, BridgeMessage};
///
/// let msg = BridgeMessage::Ping(42);
/// let bytes = encode_message(&msg, 0, 0).unwrap();
/// let (decoded, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(
    msg: &BridgeMessage,
    sequence_number: u64,
    timestamp_us: u64,
) -> Result<Vec<u8>, ProtocolError> {
    let payload = encode_payload(msg)?;
    let payload_len = payload.len() as u32;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());

    buf.push(PROTOCOL_VERSION);
    buf.push(msg.message_type() as u8);
    buf.push(0x00); // reserved
    buf.push(0x00); // reserved
    buf.extend_from_slice(&payload_len.to_be_bytes());
    buf.extend_from_slice(&sequence_number.to_be_bytes());
    buf.extend_from_slice(&timestamp_us.to_be_bytes());

    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Encodes a [`BridgeMessage`] using the current system time as the timestamp.
pub fn encode_message_now(
    msg: &BridgeMessage,
    sequence_number: u64,
) -> Result<Vec<u8>, ProtocolError> {
    encode_message(msg, sequence_number, current_timestamp_us())
}

/// Microseconds since the Unix epoch, or 0 if the clock is before it.
pub fn current_timestamp_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Parses and validates the 24-byte header at the start of `bytes`.
///
/// Stream readers call this on the header alone to learn how many payload
/// bytes to read next.
pub fn decode_header(bytes: &[u8]) -> Result<MessageHeader, ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let msg_type_byte = bytes[1];
    let message_type = MessageType::try_from(msg_type_byte)
        .map_err(|_| ProtocolError::UnknownMessageType(msg_type_byte))?;

    // bytes[2..4] are reserved – ignored on decode

    Ok(MessageHeader {
        version,
        message_type,
        payload_length: read_u32(bytes, 4)?,
        sequence_number: read_u64(bytes, 8)?,
        timestamp_us: read_u64(bytes, 16)?,
    })
}

/// Decodes one [`BridgeMessage`] from the beginning of `bytes`.
///
/// Returns the decoded message and the total number of bytes consumed
/// (header + payload), so the caller can advance their read cursor.
pub fn decode_message(bytes: &[u8]) -> Result<(BridgeMessage, usize), ProtocolError> {
    let header = decode_header(bytes)?;
    let payload_len = header.payload_length as usize;

    let total_needed = HEADER_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::PayloadLengthMismatch {
            declared: payload_len,
            available: bytes.len() - HEADER_SIZE,
        });
    }

    let payload = &bytes[HEADER_SIZE..total_needed];
    let msg = decode_payload(header.message_type, payload)?;
    Ok((msg, total_needed))
}

/// Decodes a payload whose header has already been parsed.
pub fn decode_payload(
    msg_type: MessageType,
    payload: &[u8],
) -> Result<BridgeMessage, ProtocolError> {
    let p = payload;
    match msg_type {
        MessageType::OpenBridge => decode_open_bridge(p).map(BridgeMessage::OpenBridge),
        MessageType::BridgeOpened => Ok(BridgeMessage::BridgeOpened {
            token: read_uuid(p, 0)?,
        }),
        MessageType::BridgeOpenFailed => {
            let token = read_uuid(p, 0)?;
            let (reason, _) = read_length_prefixed_string(p, 16)?;
            Ok(BridgeMessage::BridgeOpenFailed(BridgeOpenFailedMessage {
                token,
                reason,
            }))
        }
        MessageType::CloseBridge => Ok(BridgeMessage::CloseBridge {
            token: read_uuid(p, 0)?,
        }),
        MessageType::ClearBridge => Ok(BridgeMessage::ClearBridge {
            token: read_uuid(p, 0)?,
        }),
        MessageType::Ping => Ok(BridgeMessage::Ping(read_u64(p, 0)?)),
        MessageType::Pong => Ok(BridgeMessage::Pong(read_u64(p, 0)?)),
        MessageType::Timestamp => {
            require_len(p, 24, "Timestamp")?;
            Ok(BridgeMessage::Timestamp(TimestampMessage {
                token: read_uuid(p, 0)?,
                timestamp_ms: read_u64(p, 16)? as i64,
            }))
        }
        MessageType::Key => {
            require_len(p, 21, "Key")?;
            Ok(BridgeMessage::Key(KeyMessage {
                token: read_uuid(p, 0)?,
                key_code: read_i32(p, 16)?,
                down: p[20] != 0,
            }))
        }
        MessageType::PointerDown => {
            require_len(p, 28, "PointerDown")?;
            Ok(BridgeMessage::PointerDown(PointerDownMessage {
                token: read_uuid(p, 0)?,
                pointer_id: read_i32(p, 16)?,
                x: read_i32(p, 20)?,
                y: read_i32(p, 24)?,
            }))
        }
        MessageType::PointerUp => {
            require_len(p, 20, "PointerUp")?;
            Ok(BridgeMessage::PointerUp(PointerUpMessage {
                token: read_uuid(p, 0)?,
                pointer_id: read_i32(p, 16)?,
            }))
        }
        MessageType::PointerSync => Ok(BridgeMessage::PointerSync {
            token: read_uuid(p, 0)?,
        }),
        MessageType::MouseButton => {
            require_len(p, 18, "MouseButton")?;
            let button = MouseButton::try_from(p[16]).map_err(|b| {
                ProtocolError::MalformedPayload(format!("unknown mouse button: {b}"))
            })?;
            Ok(BridgeMessage::MouseButton(MouseButtonMessage {
                token: read_uuid(p, 0)?,
                button,
                down: p[17] != 0,
            }))
        }
        MessageType::MouseMove => {
            require_len(p, 24, "MouseMove")?;
            Ok(BridgeMessage::MouseMove(MouseMoveMessage {
                token: read_uuid(p, 0)?,
                dx: read_i32(p, 16)?,
                dy: read_i32(p, 20)?,
            }))
        }
        MessageType::MouseWheel => {
            require_len(p, 24, "MouseWheel")?;
            Ok(BridgeMessage::MouseWheel(MouseWheelMessage {
                token: read_uuid(p, 0)?,
                x: read_i32(p, 16)?,
                y: read_i32(p, 20)?,
            }))
        }
        MessageType::AxisEvent => {
            require_len(p, 28, "AxisEvent")?;
            Ok(BridgeMessage::AxisEvent(AxisEventMessage {
                token: read_uuid(p, 0)?,
                x: read_i32(p, 16)?,
                y: read_i32(p, 20)?,
                axis: read_i32(p, 24)?,
            }))
        }
    }
}

// ── Payload encoding ──────────────────────────────────────────────────────────

fn encode_payload(msg: &BridgeMessage) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::new();
    match msg {
        BridgeMessage::OpenBridge(m) => encode_open_bridge(&mut buf, m)?,
        BridgeMessage::BridgeOpened { token }
        | BridgeMessage::CloseBridge { token }
        | BridgeMessage::ClearBridge { token }
        | BridgeMessage::PointerSync { token } => buf.extend_from_slice(token.as_bytes()),
        BridgeMessage::BridgeOpenFailed(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            write_length_prefixed_string(&mut buf, &m.reason)?;
        }
        BridgeMessage::Ping(value) | BridgeMessage::Pong(value) => {
            buf.extend_from_slice(&value.to_be_bytes())
        }
        BridgeMessage::Timestamp(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            buf.extend_from_slice(&m.timestamp_ms.to_be_bytes());
        }
        BridgeMessage::Key(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            buf.extend_from_slice(&m.key_code.to_be_bytes());
            buf.push(m.down as u8);
        }
        BridgeMessage::PointerDown(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            write_i32s(&mut buf, &[m.pointer_id, m.x, m.y]);
        }
        BridgeMessage::PointerUp(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            buf.extend_from_slice(&m.pointer_id.to_be_bytes());
        }
        BridgeMessage::MouseButton(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            buf.push(m.button as u8);
            buf.push(m.down as u8);
        }
        BridgeMessage::MouseMove(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            write_i32s(&mut buf, &[m.dx, m.dy]);
        }
        BridgeMessage::MouseWheel(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            write_i32s(&mut buf, &[m.x, m.y]);
        }
        BridgeMessage::AxisEvent(m) => {
            buf.extend_from_slice(m.token.as_bytes());
            write_i32s(&mut buf, &[m.x, m.y, m.axis]);
        }
    }
    Ok(buf)
}

fn encode_open_bridge(buf: &mut Vec<u8>, m: &OpenBridgeMessage) -> Result<(), ProtocolError> {
    buf.extend_from_slice(m.token.as_bytes());
    buf.push(m.profile_kind() as u8);
    write_length_prefixed_string(buf, &m.name)?;
    write_length_prefixed_string(buf, &m.unique_id)?;
    write_i32s(buf, &[m.width, m.height]);
    buf.extend_from_slice(&m.max_contacts.to_be_bytes());
    match m.calibration() {
        Some(c) => {
            buf.push(0x01);
            write_i32s(buf, &[c.min, c.max, c.fuzz, c.flat]);
        }
        None => buf.push(0x00),
    }
    Ok(())
}

// ── Payload decoding ──────────────────────────────────────────────────────────

fn decode_open_bridge(p: &[u8]) -> Result<OpenBridgeMessage, ProtocolError> {
    // 16 (token) + 1 (kind) + 2 + 2 (empty strings) + 4 + 4 + 2 + 1 = 32
    require_len(p, 32, "OpenBridge")?;
    let token = read_uuid(p, 0)?;
    let kind = ProfileKind::try_from(p[16])
        .map_err(|_| ProtocolError::MalformedPayload(format!("unknown profile: {}", p[16])))?;
    let (name, name_end) = read_length_prefixed_string(p, 17)?;
    let (unique_id, id_end) = read_length_prefixed_string(p, name_end)?;

    let off = id_end;
    require_len(p, off + 11, "OpenBridge.geometry")?;
    let width = read_i32(p, off)?;
    let height = read_i32(p, off + 4)?;
    let max_contacts = u16::from_be_bytes([p[off + 8], p[off + 9]]);
    let has_calibration = p[off + 10] != 0;

    let calibration = if has_calibration {
        let c = off + 11;
        require_len(p, c + 16, "OpenBridge.calibration")?;
        Some(AxisCalibration {
            min: read_i32(p, c)?,
            max: read_i32(p, c + 4)?,
            fuzz: read_i32(p, c + 8)?,
            flat: read_i32(p, c + 12)?,
        })
    } else {
        None
    };

    let profile = match (kind, calibration) {
        (ProfileKind::Touchpad, None) => DeviceProfile::Touchpad,
        (ProfileKind::Touchpad, Some(_)) => {
            return Err(ProtocolError::MalformedPayload(
                "touchpad profile cannot carry axis calibration".to_string(),
            ))
        }
        (ProfileKind::PointerHybrid, calibration) => DeviceProfile::PointerHybrid { calibration },
    };

    Ok(OpenBridgeMessage {
        token,
        name,
        unique_id,
        width,
        height,
        max_contacts,
        profile,
    })
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn require_len(buf: &[u8], needed: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::MalformedPayload(format!(
            "{context}: need {needed} bytes, got {}",
            buf.len()
        )))
    } else {
        Ok(())
    }
}

fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], ProtocolError> {
    buf.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or(ProtocolError::InsufficientData {
            needed: offset + N,
            available: buf.len(),
        })
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, ProtocolError> {
    read_array::<4>(buf, offset).map(u32::from_be_bytes)
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, ProtocolError> {
    read_array::<4>(buf, offset).map(i32::from_be_bytes)
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, ProtocolError> {
    read_array::<8>(buf, offset).map(u64::from_be_bytes)
}

fn read_uuid(buf: &[u8], offset: usize) -> Result<Uuid, ProtocolError> {
    read_array::<16>(buf, offset)
        .map(Uuid::from_bytes)
        .map_err(|_| {
            ProtocolError::MalformedPayload(format!(
                "need 16 bytes for token at offset {offset}, got {}",
                buf.len().saturating_sub(offset)
            ))
        })
}

fn write_i32s(buf: &mut Vec<u8>, values: &[i32]) {
    for v in values {
        buf.extend_from_slice(&v.to_be_bytes());
    }
}

/// Writes a 2-byte length prefix followed by the UTF-8 string bytes.
fn write_length_prefixed_string(buf: &mut Vec<u8>, s: &str) -> Result<(), ProtocolError> {
    let len = u16::try_from(s.len()).map_err(|_| {
        ProtocolError::MalformedPayload(format!("string of {} bytes is too long", s.len()))
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Reads a 2-byte length prefix and then that many UTF-8 bytes.
/// Returns the string and the offset of the byte after the string.
fn read_length_prefixed_string(
    buf: &[u8],
    offset: usize,
) -> Result<(String, usize), ProtocolError> {
    if buf.len() < offset + 2 {
        return Err(ProtocolError::MalformedPayload(format!(
            "need 2 bytes for string length at offset {offset}"
        )));
    }
    let len = u16::from_be_bytes([buf[offset], buf[offset + 1]]) as usize;
    let start = offset + 2;
    if buf.len() < start + len {
        return Err(ProtocolError::MalformedPayload(format!(
            "string of length {len} at offset {start} exceeds buffer"
        )));
    }
    let s = std::str::from_utf8(&buf[start..start + len])
        .map_err(|e| ProtocolError::MalformedPayload(format!("invalid UTF-8: {e}")))?
        .to_string();
    Ok((s, start + len))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
