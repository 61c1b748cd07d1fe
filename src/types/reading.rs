//! Physiological reading values with an explicit "unknown" state

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single physiological reading.
///
/// The sensor reports reserved sentinel values when it has no valid measurement;
/// those decode to [`Reading::Unknown`] so consumers can tell "no reading" apart from
/// a genuine zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    /// No valid reading this cycle.
    #[default]
    Unknown,
    /// A valid value in device units (% for SpO2, bpm for pulse rate).
    Valid(u16),
}

impl Reading {
    /// The value if known.
    pub fn value(self) -> Option<u16> {
        match self {
            Reading::Valid(v) => Some(v),
            Reading::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Reading::Valid(_))
    }

    /// Integer encoding used by storage and report collaborators: `-1` for unknown.
    pub fn as_i32(self) -> i32 {
        self.value().map_or(-1, i32::from)
    }
}

impl From<Option<u16>> for Reading {
    fn from(value: Option<u16>) -> Self {
        value.map_or(Reading::Unknown, Reading::Valid)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Valid(v) => write!(f, "{v}"),
            Reading::Unknown => f.write_str("--"),
        }
    }
}
