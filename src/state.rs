//! Latest readings and the freeze flag

use serde::Serialize;

use crate::decoder::Decoded;
use crate::types::Reading;

/// Current SpO2, pulse rate and freeze flag.
///
/// SpO2 and pulse rate are written only by decoded telemetry; `frozen` only by the
/// explicit freeze controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadingState {
    pub spo2: Reading,
    pub pulse_rate: Reading,
    pub frozen: bool,
}

impl ReadingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the readings of one telemetry frame.
    ///
    /// Both readings are written every frame, independently of each other: an unknown
    /// SpO2 does not hold back a valid pulse rate.
    pub(crate) fn apply(&mut self, decoded: &Decoded) {
        self.spo2 = decoded.spo2;
        self.pulse_rate = decoded.pulse_rate;
    }

    /// Set the frozen flag. Returns whether it changed.
    pub(crate) fn set_frozen(&mut self, frozen: bool) -> bool {
        let changed = self.frozen != frozen;
        self.frozen = frozen;
        changed
    }
}
