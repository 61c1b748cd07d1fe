//! Protocol frame type shared by the inbound and outbound paths

use std::fmt;

use crate::protocol::checksum;
use crate::protocol::{FRAME_MARKER, FRAME_OVERHEAD};

/// A checksum-valid protocol unit.
///
/// The payload always holds exactly `length` bytes, and for telemetry and command
/// frames its first byte is the message code. Frames are transient: the framer
/// builds them, the decoder or encoder consumes them, and they are dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    length: u8,
    payload: Vec<u8>,
    checksum: u8,
}

impl Frame {
    /// Build a frame around `payload`, computing the length and checksum.
    ///
    /// Returns `None` if the payload does not fit the single-byte length field.
    pub fn new(payload: Vec<u8>) -> Option<Self> {
        let length = u8::try_from(payload.len()).ok()?;
        let checksum = checksum::compute(length, &payload);
        Some(Self { length, payload, checksum })
    }

    /// Build a frame from a message code and the data bytes that follow it.
    pub fn with_code(code: u8, data: &[u8]) -> Option<Self> {
        let mut payload = Vec::with_capacity(1 + data.len());
        payload.push(code);
        payload.extend_from_slice(data);
        Self::new(payload)
    }

    /// Split a complete envelope (`AA 55 L payload checksum`) into a frame.
    ///
    /// The envelope must be exactly `4 + L` bytes with a matching checksum.
    pub fn from_envelope(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < FRAME_OVERHEAD || bytes[..2] != FRAME_MARKER {
            return None;
        }
        let length = bytes[2];
        if bytes.len() != FRAME_OVERHEAD + length as usize {
            return None;
        }
        let payload = bytes[3..3 + length as usize].to_vec();
        let frame = Self { length, payload, checksum: bytes[bytes.len() - 1] };
        checksum::verify(&frame).then_some(frame)
    }

    /// Payload byte count as carried in the length field.
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Message code, or `None` for an empty payload.
    pub fn code(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Payload bytes, code included at index 0.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Total size on the wire.
    pub fn wire_len(&self) -> usize {
        FRAME_OVERHEAD + self.length as usize
    }

    /// Serialize the full envelope.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.wire_len());
        bytes.extend_from_slice(&FRAME_MARKER);
        bytes.push(self.length);
        bytes.extend_from_slice(&self.payload);
        bytes.push(self.checksum);
        bytes
    }

    pub(crate) fn from_parts_unchecked(length: u8, payload: Vec<u8>, checksum: u8) -> Self {
        debug_assert_eq!(payload.len(), length as usize);
        Self { length, payload, checksum }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("length", &self.length)
            .field("code", &self.code())
            .field("payload", &format_args!("{:02X?}", self.payload))
            .field("checksum", &format_args!("{:#04x}", self.checksum))
            .finish()
    }
}
