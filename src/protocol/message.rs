//! Protocol message kinds and the fixed-size wire codec.
//!
//! Every datagram is exactly [`WIRE_LEN`] bytes: two magic bytes, a wire
//! version, and an explicit numeric message tag. The sender address is not
//! part of the payload — ESP-NOW delivers it out of band with each frame.

use crate::error::DecodeError;

use super::state::DeviceIdentity;

/// Frame magic: `"PP"`.
pub const MAGIC: [u8; 2] = [0x50, 0x50];

/// Wire format version. Both units of a pair must agree.
pub const WIRE_VERSION: u8 = 1;

/// Fixed frame length in bytes.
pub const WIRE_LEN: usize = 4;

/// Explicit numeric tag discriminating the four protocol messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    /// Leader broadcast: "anyone out there?"
    PairRequest = 1,
    /// Follower unicast reply to a `PairRequest`.
    PairEcho = 2,
    /// Leader unicast to the stored partner: "restart the clock".
    SyncRequest = 3,
    /// Follower unicast reply to a `SyncRequest`.
    SyncEcho = 4,
}

impl MessageKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::PairRequest => "PairRequest",
            Self::PairEcho => "PairEcho",
            Self::SyncRequest => "SyncRequest",
            Self::SyncEcho => "SyncEcho",
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::PairRequest),
            2 => Some(Self::PairEcho),
            3 => Some(Self::SyncRequest),
            4 => Some(Self::SyncEcho),
            _ => None,
        }
    }
}

/// A validated inbound datagram, as handed to the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundMessage {
    pub kind: MessageKind,
    pub sender: DeviceIdentity,
}

/// Encode a message for transmission.
pub fn encode(kind: MessageKind) -> [u8; WIRE_LEN] {
    [MAGIC[0], MAGIC[1], WIRE_VERSION, kind as u8]
}

/// Decode a received payload. Rejects wrong length, magic, version, or tag.
pub fn decode(payload: &[u8]) -> Result<MessageKind, DecodeError> {
    if payload.len() != WIRE_LEN {
        return Err(DecodeError::BadLength);
    }
    if payload[0..2] != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    if payload[2] != WIRE_VERSION {
        return Err(DecodeError::BadVersion);
    }
    MessageKind::from_tag(payload[3]).ok_or(DecodeError::BadTag)
}
