//! Timestamped waveform sample

use serde::{Deserialize, Serialize};

/// One smoothed plethysmograph sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformSample {
    /// Smoothed value in raw device units (0-254).
    pub value: u8,
    /// Arrival time in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl WaveformSample {
    pub fn new(value: u8, timestamp_ms: i64) -> Self {
        Self { value, timestamp_ms }
    }

    /// Age of the sample relative to `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp_ms
    }
}
