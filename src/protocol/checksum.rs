//! Single-byte modular checksum.
//!
//! The checksum covers the length byte and every payload byte, wrapping at 256.
//! The marker bytes are not included.

use crate::types::Frame;

/// Compute the checksum for a length byte and payload.
pub fn compute(length: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(length, |acc, &b| acc.wrapping_add(b))
}

/// Recompute a frame's checksum and compare it with the trailing byte.
pub fn verify(frame: &Frame) -> bool {
    compute(frame.length(), frame.payload()) == frame.checksum()
}

/// Verify a complete `AA 55 L payload checksum` envelope.
///
/// Returns false for any slice whose size disagrees with its length byte.
pub fn verify_envelope(bytes: &[u8]) -> bool {
    let Some((&checksum, body)) = bytes.split_last() else {
        return false;
    };
    if body.len() < 3 {
        return false;
    }
    let length = body[2];
    let payload = &body[3..];
    payload.len() == length as usize && compute(length, payload) == checksum
}
