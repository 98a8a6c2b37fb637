//! Control-channel protocol: message types, the binary codec and frame numbering.

pub mod codec;
pub mod messages;
pub mod sequence;

pub use codec::{
    current_timestamp_us, decode_header, decode_message, decode_payload, encode_message,
    encode_message_now, ProtocolError,
};
pub use messages::*;
pub use sequence::SequenceCounter;
