//! Outbound device commands.
//!
//! Only two things are ever written to the sensor: the fixed start-streaming preamble
//! sent once after the port opens, and the response-time setting frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::CODE_SETTING;
use crate::types::Frame;
use crate::{OximeterError, Result};

/// Preamble that switches the sensor into continuous streaming.
///
/// It predates the `AA 55` envelope and is written verbatim.
pub const START_STREAMING: [u8; 3] = [0xBF, 0x5F, 0xFF];

/// Fixed frequency/mode bits carried by every settings byte
/// (bit 7: 100 Hz report rate, bit 6: adult mode).
const SETTINGS_BASE: u8 = 0b1100_0000;

/// Device averaging window, in seconds, applied to displayed readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ResponseTime {
    Fast,
    Normal,
    Slow,
}

impl ResponseTime {
    pub const ALL: [ResponseTime; 3] =
        [ResponseTime::Fast, ResponseTime::Normal, ResponseTime::Slow];

    pub fn seconds(self) -> u32 {
        match self {
            ResponseTime::Fast => 4,
            ResponseTime::Normal => 8,
            ResponseTime::Slow => 16,
        }
    }

    /// Response-time bits of the settings byte.
    fn bits(self) -> u8 {
        match self {
            ResponseTime::Fast => 0b0000_0001,
            ResponseTime::Normal => 0b0000_0010,
            ResponseTime::Slow => 0b0000_0100,
        }
    }

    /// The complete settings byte sent to the device.
    pub fn settings_byte(self) -> u8 {
        SETTINGS_BASE | self.bits()
    }

    /// Build the setting frame for this response time.
    pub fn to_frame(self) -> Frame {
        let payload = vec![CODE_SETTING, self.settings_byte()];
        let checksum = super::checksum::compute(2, &payload);
        Frame::from_parts_unchecked(2, payload, checksum)
    }
}

impl TryFrom<u32> for ResponseTime {
    type Error = OximeterError;

    fn try_from(seconds: u32) -> Result<Self> {
        match seconds {
            4 => Ok(ResponseTime::Fast),
            8 => Ok(ResponseTime::Normal),
            16 => Ok(ResponseTime::Slow),
            _ => Err(OximeterError::InvalidResponseTime { seconds }),
        }
    }
}

impl From<ResponseTime> for u32 {
    fn from(value: ResponseTime) -> Self {
        value.seconds()
    }
}

impl fmt::Display for ResponseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds())
    }
}

/// Encode the response-time setting command for `seconds` (4, 8 or 16).
///
/// Any other value is rejected with [`OximeterError::InvalidResponseTime`].
pub fn encode_response_time_setting(seconds: u32) -> Result<Vec<u8>> {
    let response_time = ResponseTime::try_from(seconds)?;
    let bytes = response_time.to_frame().to_bytes();
    debug!("Encoded response time {} as {:02X?}", response_time, bytes);
    Ok(bytes)
}
