//! Frame builders shared by unit tests, integration tests and benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use crate::protocol::CODE_TELEMETRY;
use crate::types::Frame;

/// Payload of a vital-signs frame: code, reserved, waveform, reserved, SpO2,
/// pulse-rate MSB/LSB and three reserved bytes.
pub fn telemetry_payload(waveform: u8, spo2: u8, pulse_msb: u8, pulse_lsb: u8) -> Vec<u8> {
    vec![CODE_TELEMETRY, 0x00, waveform, 0x00, spo2, pulse_msb, pulse_lsb, 0x00, 0x00, 0x00]
}

/// A vital-signs frame.
pub fn telemetry_frame_struct(waveform: u8, spo2: u8, pulse_msb: u8, pulse_lsb: u8) -> Frame {
    match Frame::new(telemetry_payload(waveform, spo2, pulse_msb, pulse_lsb)) {
        Some(frame) => frame,
        None => unreachable!("ten-byte payload always fits"),
    }
}

/// Wire bytes of a vital-signs frame.
pub fn telemetry_frame(waveform: u8, spo2: u8, pulse_msb: u8, pulse_lsb: u8) -> Vec<u8> {
    telemetry_frame_struct(waveform, spo2, pulse_msb, pulse_lsb).to_bytes()
}

/// A synthetic capture: `count` telemetry frames tracing a sawtooth pleth wave, with
/// noise bytes every `noise_every` frames (0 disables noise).
pub fn synthetic_capture(count: usize, noise_every: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(count * 15);
    for i in 0..count {
        if noise_every > 0 && i % noise_every == 0 {
            bytes.extend_from_slice(&[0x13, 0x37, 0x00]);
        }
        let wave = (i % 100) as u8 + 20;
        bytes.extend(telemetry_frame(wave, 97, 0x00, 72));
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::checksum;

    #[test]
    fn builders_produce_valid_envelopes() {
        let bytes = telemetry_frame(0x32, 0x50, 0x00, 0x50);
        assert_eq!(
            bytes,
            vec![0xAA, 0x55, 0x0A, 0x15, 0x00, 0x32, 0x00, 0x50, 0x00, 0x50, 0x00, 0x00, 0x00, 0xF1]
        );
        assert!(checksum::verify_envelope(&bytes));
    }

    #[test]
    fn synthetic_capture_interleaves_noise() {
        let capture = synthetic_capture(10, 5);
        assert_eq!(capture.len(), 10 * 14 + 2 * 3);
    }
}
