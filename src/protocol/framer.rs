//! Incremental framer for the `AA 55` length-prefixed serial protocol.
//!
//! The serial link delivers an unframed byte stream in arbitrary chunks. The framer
//! buffers the unconsumed tail, locates frame markers, and yields frames whose
//! checksum matches. Anything before a marker is treated as noise and dropped for
//! good; a checksum mismatch drops only the two marker bytes so that a marker pattern
//! that happened to sit inside a corrupt frame can still be found on the next scan.

use bytes::{Buf, BytesMut};
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::checksum;
use super::{FRAME_MARKER, FRAME_OVERHEAD};
use crate::types::Frame;

/// Default bound on buffered bytes when no marker can be found.
pub const DEFAULT_CEILING: usize = 4096;

/// Running counters describing stream health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FramerStats {
    /// Frames emitted with a matching checksum.
    pub frames: u64,
    /// Candidate frames rejected by the checksum.
    pub checksum_failures: u64,
    /// Bytes dropped as noise, stray markers, or overrun resets.
    pub bytes_discarded: u64,
    /// Times the tail exceeded the ceiling without a marker and was cleared.
    pub overrun_resets: u64,
}

/// Turns a fragmented byte stream into checksum-valid frames.
#[derive(Debug)]
pub struct PacketFramer {
    buf: BytesMut,
    ceiling: usize,
    stats: FramerStats,
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketFramer {
    pub fn new() -> Self {
        Self::with_ceiling(DEFAULT_CEILING)
    }

    /// Create a framer with a custom bound on marker-less buffered data.
    pub fn with_ceiling(ceiling: usize) -> Self {
        let ceiling = ceiling.max(FRAME_OVERHEAD);
        Self {
            buf: BytesMut::with_capacity(ceiling.min(DEFAULT_CEILING)),
            ceiling,
            stats: FramerStats::default(),
        }
    }

    /// Append bytes to the unconsumed tail.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Drain every complete frame currently extractable.
    pub fn poll(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// Convenience for `feed` followed by `poll`.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Frame> {
        self.feed(bytes);
        self.poll()
    }

    /// Extract the next complete frame, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let Some(start) = find_marker(&self.buf) else {
                self.guard_overrun();
                return None;
            };

            if start > 0 {
                trace!("Resync: dropping {} bytes before marker", start);
                self.discard(start);
            }

            if self.buf.len() < FRAME_OVERHEAD {
                return None;
            }

            let length = self.buf[2];
            let total = FRAME_OVERHEAD + length as usize;
            if self.buf.len() < total {
                return None;
            }

            if !checksum::verify_envelope(&self.buf[..total]) {
                self.stats.checksum_failures += 1;
                debug!(
                    "Checksum mismatch on {}-byte frame (stored {:#04x}, computed {:#04x})",
                    total,
                    self.buf[total - 1],
                    checksum::compute(length, &self.buf[3..total - 1])
                );
                self.discard(FRAME_MARKER.len());
                continue;
            }

            let envelope = self.buf.split_to(total);
            let payload = envelope[3..total - 1].to_vec();
            self.stats.frames += 1;
            trace!("Frame: length={}, code={:?}", length, payload.first());
            return Some(Frame::from_parts_unchecked(length, payload, envelope[total - 1]));
        }
    }

    /// Discard every buffered byte not yet framed.
    pub fn clear(&mut self) {
        if !self.buf.is_empty() {
            debug!("Clearing {} unframed bytes", self.buf.len());
            self.stats.bytes_discarded += self.buf.len() as u64;
            self.buf.clear();
        }
    }

    /// Bytes buffered but not yet framed.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    pub fn stats(&self) -> FramerStats {
        self.stats
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    fn discard(&mut self, count: usize) {
        self.buf.advance(count);
        self.stats.bytes_discarded += count as u64;
    }

    fn guard_overrun(&mut self) {
        if self.buf.len() <= self.ceiling {
            return;
        }
        // A trailing 0xAA may be the first half of a marker split across reads.
        let keep = usize::from(self.buf.last() == Some(&FRAME_MARKER[0]));
        let dropped = self.buf.len() - keep;
        warn!("No frame marker in {} buffered bytes, discarding stream tail", dropped);
        self.stats.overrun_resets += 1;
        self.discard(dropped);
    }
}

fn find_marker(buf: &[u8]) -> Option<usize> {
    buf.windows(FRAME_MARKER.len()).position(|w| w == FRAME_MARKER)
}
