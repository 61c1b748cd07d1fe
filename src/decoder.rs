//! Vital-signs telemetry decoding.
//!
//! Code-21 frames carry one plethysmograph sample plus the device's current SpO2 and
//! pulse-rate estimates. Offsets are relative to the payload start (the code byte is
//! payload offset 0):
//!
//! | offset | field            |
//! |--------|------------------|
//! | 2      | waveform sample  |
//! | 4      | SpO2 (%)         |
//! | 5      | pulse rate MSB   |
//! | 6      | pulse rate LSB   |
//!
//! Bytes past offset 6 are reserved.

use tracing::trace;

use crate::protocol::CODE_TELEMETRY;
use crate::types::{Frame, Reading};

/// Minimum payload length of a telemetry frame.
pub const TELEMETRY_MIN_LEN: u8 = 10;

const OFFSET_WAVEFORM: usize = 2;
const OFFSET_SPO2: usize = 4;
const OFFSET_PULSE_MSB: usize = 5;
const OFFSET_PULSE_LSB: usize = 6;

/// Raw waveform or SpO2 byte meaning "no valid reading".
pub const SENTINEL_8BIT: u8 = 127;

/// Pulse-rate value meaning "no valid reading".
pub const SENTINEL_PULSE_RATE: u16 = 255;

/// Readings extracted from one telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Smoothed waveform value, absent when the sensor reported no pulse.
    pub waveform: Option<u8>,
    pub spo2: Reading,
    pub pulse_rate: Reading,
}

/// Decoder for vital-signs frames.
///
/// Holds the waveform smoothing state: each accepted sample is averaged with the
/// previous smoothed value, starting from zero.
#[derive(Debug, Default, Clone)]
pub struct TelemetryDecoder {
    previous: u8,
}

impl TelemetryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a validated frame.
    ///
    /// Returns `None` for frames that are not vital-signs telemetry; they carry no
    /// readings and are ignored.
    pub fn decode(&mut self, frame: &Frame) -> Option<Decoded> {
        if frame.code() != Some(CODE_TELEMETRY) || frame.length() < TELEMETRY_MIN_LEN {
            trace!("Ignoring frame code={:?} length={}", frame.code(), frame.length());
            return None;
        }
        let payload = frame.payload();

        let raw_wave = payload[OFFSET_WAVEFORM];
        let waveform = (raw_wave != SENTINEL_8BIT).then(|| self.smooth(raw_wave));

        let raw_spo2 = payload[OFFSET_SPO2];
        let spo2 = match raw_spo2 {
            SENTINEL_8BIT => Reading::Unknown,
            v => Reading::Valid(u16::from(v)),
        };

        let raw_pulse = u16::from_be_bytes([payload[OFFSET_PULSE_MSB], payload[OFFSET_PULSE_LSB]]);
        let pulse_rate = match raw_pulse {
            SENTINEL_PULSE_RATE | u16::MAX => Reading::Unknown,
            v => Reading::Valid(v),
        };

        trace!(
            "Telemetry: wave={} -> {:?}, spo2={}, pulse_rate={}",
            raw_wave, waveform, spo2, pulse_rate
        );

        Some(Decoded { waveform, spo2, pulse_rate })
    }

    /// Last smoothed waveform value.
    pub fn smoothing_state(&self) -> u8 {
        self.previous
    }

    fn smooth(&mut self, raw: u8) -> u8 {
        // Average of two u8 values always fits in u8.
        let smoothed = ((u16::from(self.previous) + u16::from(raw)) / 2) as u8;
        self.previous = smoothed;
        smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::telemetry_frame_struct;

    #[test]
    fn decodes_field_offsets() {
        let mut decoder = TelemetryDecoder::new();
        let decoded = decoder.decode(&telemetry_frame_struct(0x32, 80, 0x00, 0x50)).unwrap();

        assert_eq!(decoded.waveform, Some(25));
        assert_eq!(decoded.spo2, Reading::Valid(80));
        assert_eq!(decoded.pulse_rate, Reading::Valid(80));
    }

    #[test]
    fn pulse_rate_is_big_endian() {
        let mut decoder = TelemetryDecoder::new();
        let decoded = decoder.decode(&telemetry_frame_struct(10, 97, 0x01, 0x02)).unwrap();
        assert_eq!(decoded.pulse_rate, Reading::Valid(258));
    }

    #[test]
    fn smoothing_carries_across_frames() {
        let mut decoder = TelemetryDecoder::new();
        let values: Vec<_> = [100, 100, 100, 0]
            .into_iter()
            .map(|w| decoder.decode(&telemetry_frame_struct(w, 95, 0, 70)).unwrap().waveform)
            .collect();
        assert_eq!(values, vec![Some(50), Some(75), Some(87), Some(43)]);
        assert_eq!(decoder.smoothing_state(), 43);
    }

    #[test]
    fn sentinels_map_to_unknown() {
        let mut decoder = TelemetryDecoder::new();
        decoder.decode(&telemetry_frame_struct(200, 95, 0, 70));

        let decoded = decoder.decode(&telemetry_frame_struct(127, 127, 0xFF, 0xFF)).unwrap();
        assert_eq!(decoded.waveform, None);
        assert_eq!(decoded.spo2, Reading::Unknown);
        assert_eq!(decoded.pulse_rate, Reading::Unknown);
        // A rejected sample leaves the smoothing state alone.
        assert_eq!(decoder.smoothing_state(), 100);

        let decoded = decoder.decode(&telemetry_frame_struct(0, 0, 0x00, 0xFF)).unwrap();
        assert_eq!(decoded.spo2, Reading::Valid(0));
        assert_eq!(decoded.pulse_rate, Reading::Unknown);
    }

    #[test]
    fn readings_update_independently() {
        let mut decoder = TelemetryDecoder::new();
        let decoded = decoder.decode(&telemetry_frame_struct(40, 127, 0, 72)).unwrap();
        assert_eq!(decoded.spo2, Reading::Unknown);
        assert_eq!(decoded.pulse_rate, Reading::Valid(72));
    }

    #[test]
    fn ignores_other_codes_and_short_frames() {
        let mut decoder = TelemetryDecoder::new();
        assert!(decoder.decode(&Frame::with_code(6, &[0xC1]).unwrap()).is_none());
        assert!(decoder.decode(&Frame::with_code(21, &[0; 8]).unwrap()).is_none());
        assert!(decoder.decode(&Frame::new(Vec::new()).unwrap()).is_none());
        assert!(decoder.decode(&Frame::with_code(21, &[0; 9]).unwrap()).is_some());
        assert_eq!(decoder.smoothing_state(), 0);
    }
}
