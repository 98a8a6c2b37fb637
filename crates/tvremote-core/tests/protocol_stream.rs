//! Integration tests for the tvremote-core protocol codec.
//!
//! These tests drive the public API the way the control server does: frames
//! are concatenated into one byte stream and split back apart using only the
//! header, then the decoded messages are turned into domain values.

use tvremote_core::{
    decode_message, encode_message,
    protocol::{
        decode_header, decode_payload,
        messages::{
            AxisEventMessage, KeyMessage, OpenBridgeMessage, PointerDownMessage,
            PointerUpMessage, HEADER_SIZE,
        },
        SequenceCounter,
    },
    AxisGroup, BridgeMessage, DeviceCapabilities, DeviceProfile, ProtocolError,
};
use uuid::Uuid;

fn touchpad_open(token: Uuid) -> BridgeMessage {
    BridgeMessage::OpenBridge(OpenBridgeMessage {
        token,
        name: "Living room remote".to_string(),
        unique_id: String::new(),
        width: 1920,
        height: 1080,
        max_contacts: 2,
        profile: DeviceProfile::Touchpad,
    })
}

fn encode_stream(messages: &[BridgeMessage]) -> Vec<u8> {
    let counter = SequenceCounter::new();
    messages
        .iter()
        .flat_map(|m| encode_message(m, counter.next(), 1_000).expect("encode must succeed"))
        .collect()
}

#[test]
fn test_stream_of_frames_splits_back_into_the_same_messages() {
    // Arrange
    let token = Uuid::new_v4();
    let messages = vec![
        touchpad_open(token),
        BridgeMessage::PointerDown(PointerDownMessage {
            token,
            pointer_id: 10,
            x: 100,
            y: 200,
        }),
        BridgeMessage::PointerSync { token },
        BridgeMessage::PointerUp(PointerUpMessage {
            token,
            pointer_id: 10,
        }),
        BridgeMessage::PointerSync { token },
        BridgeMessage::CloseBridge { token },
    ];
    let stream = encode_stream(&messages);

    // Act – split frames using the header alone, like a socket reader would
    let mut decoded = Vec::new();
    let mut sequence_numbers = Vec::new();
    let mut cursor = 0;
    while cursor < stream.len() {
        let header = decode_header(&stream[cursor..]).expect("header must parse");
        let start = cursor + HEADER_SIZE;
        let end = start + header.payload_length as usize;
        decoded.push(decode_payload(header.message_type, &stream[start..end]).unwrap());
        sequence_numbers.push(header.sequence_number);
        cursor = end;
    }

    // Assert
    assert_eq!(decoded, messages);
    assert_eq!(sequence_numbers, (0..messages.len() as u64).collect::<Vec<_>>());
}

#[test]
fn test_every_bridge_message_carries_its_token() {
    let token = Uuid::new_v4();
    let messages = [
        touchpad_open(token),
        BridgeMessage::Key(KeyMessage {
            token,
            key_code: 19,
            down: true,
        }),
        BridgeMessage::ClearBridge { token },
        BridgeMessage::AxisEvent(AxisEventMessage {
            token,
            x: 1,
            y: -1,
            axis: 1,
        }),
    ];

    for msg in &messages {
        let bytes = encode_message(msg, 0, 0).unwrap();
        assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 16], token.as_bytes());
        assert_eq!(decode_message(&bytes).unwrap().0.token(), Some(token));
    }
}

#[test]
fn test_decoded_open_request_yields_declarable_capabilities() {
    // Arrange
    let bytes = encode_message(&touchpad_open(Uuid::new_v4()), 0, 0).unwrap();

    // Act
    let (msg, _) = decode_message(&bytes).unwrap();
    let BridgeMessage::OpenBridge(open) = msg else {
        panic!("expected OpenBridge");
    };
    let config = open.device_config();
    config.validate().expect("decoded config must validate");
    let caps = DeviceCapabilities::for_config(&config);

    // Assert
    assert_eq!(caps.name, "Living room remote");
    assert_eq!(caps.abs_axes.len(), 4);
}

#[test]
fn test_decoded_axis_selector_maps_to_axis_group() {
    let msg = BridgeMessage::AxisEvent(AxisEventMessage {
        token: Uuid::nil(),
        x: 0,
        y: 0,
        axis: 3,
    });
    let (decoded, _) = decode_message(&encode_message(&msg, 0, 0).unwrap()).unwrap();
    let BridgeMessage::AxisEvent(axis) = decoded else {
        panic!("expected AxisEvent");
    };
    assert_eq!(AxisGroup::try_from(axis.axis), Ok(AxisGroup::RyGas));
}

#[test]
fn test_partial_frame_reports_mismatch_until_complete() {
    let bytes = encode_message(&touchpad_open(Uuid::nil()), 0, 0).unwrap();

    for cut in [HEADER_SIZE, HEADER_SIZE + 5, bytes.len() - 1] {
        assert!(matches!(
            decode_message(&bytes[..cut]),
            Err(ProtocolError::PayloadLengthMismatch { .. })
        ));
    }
    assert!(decode_message(&bytes).is_ok());
}
