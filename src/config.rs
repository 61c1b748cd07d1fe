//! Monitor configuration.
//!
//! Loaded from YAML; every key is optional and falls back to the device defaults.
//!
//! ```yaml
//! retention_ms: 20000
//! display_points: 200
//! framer_ceiling: 4096
//! telemetry_hz: 100
//! initial_response_time: 8
//! send_start_command: true
//! serial:
//!   port: /dev/ttyUSB0
//!   baud_rate: 375000
//!   data_bits: 8
//!   parity: odd
//!   stop_bits: 1
//! ```
//!
//! The `serial` block is never interpreted here. It is handed to whatever opens the
//! port.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::protocol::framer::DEFAULT_CEILING;
use crate::protocol::{FRAME_OVERHEAD, ResponseTime};
use crate::waveform::{DEFAULT_DISPLAY_POINTS, DEFAULT_RETENTION_MS};
use crate::{OximeterError, Result};

/// Serial parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Serial line settings for the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "COM8".to_string(),
            baud_rate: 375_000,
            data_bits: 8,
            parity: Parity::Odd,
            stop_bits: 1,
        }
    }
}

/// Tunables for a monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Waveform history retention in milliseconds.
    pub retention_ms: i64,
    /// Points in the display view.
    pub display_points: usize,
    /// Maximum marker-less bytes buffered before the tail is discarded.
    pub framer_ceiling: usize,
    /// Nominal telemetry frame rate, used to normalize throttled subscriptions.
    pub telemetry_hz: f64,
    /// Response time applied when the driver starts.
    pub initial_response_time: Option<ResponseTime>,
    /// Write the start-streaming preamble when the driver starts.
    pub send_start_command: bool,
    pub serial: SerialSettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            retention_ms: DEFAULT_RETENTION_MS,
            display_points: DEFAULT_DISPLAY_POINTS,
            framer_ceiling: DEFAULT_CEILING,
            telemetry_hz: 100.0,
            initial_response_time: None,
            send_start_command: true,
            serial: SerialSettings::default(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: MonitorConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading monitor configuration from {}", path.display());
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| OximeterError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retention_ms <= 0 {
            return Err(OximeterError::config_error(
                "retention_ms",
                format!("must be positive, got {}", self.retention_ms),
            ));
        }
        if self.display_points == 0 {
            return Err(OximeterError::config_error("display_points", "must be at least 1"));
        }
        if self.framer_ceiling < FRAME_OVERHEAD {
            return Err(OximeterError::config_error(
                "framer_ceiling",
                format!("must be at least {} bytes, got {}", FRAME_OVERHEAD, self.framer_ceiling),
            ));
        }
        if !(self.telemetry_hz.is_finite() && self.telemetry_hz > 0.0) {
            return Err(OximeterError::config_error(
                "telemetry_hz",
                format!("must be a positive rate, got {}", self.telemetry_hz),
            ));
        }
        let serial = &self.serial;
        if serial.baud_rate == 0 {
            return Err(OximeterError::config_error("serial.baud_rate", "must be non-zero"));
        }
        if !(5..=8).contains(&serial.data_bits) {
            return Err(OximeterError::config_error(
                "serial.data_bits",
                format!("must be 5-8, got {}", serial.data_bits),
            ));
        }
        if !matches!(serial.stop_bits, 1 | 2) {
            return Err(OximeterError::config_error(
                "serial.stop_bits",
                format!("must be 1 or 2, got {}", serial.stop_bits),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = MonitorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.retention_ms, 20_000);
        assert_eq!(config.display_points, 200);
        assert_eq!(config.serial.baud_rate, 375_000);
        assert_eq!(config.serial.parity, Parity::Odd);
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
retention_ms: 10000
display_points: 120
initial_response_time: 16
send_start_command: false
serial:
  port: /dev/ttyUSB1
  parity: none
"#;
        let config = MonitorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.retention_ms, 10_000);
        assert_eq!(config.display_points, 120);
        assert_eq!(config.initial_response_time, Some(ResponseTime::Slow));
        assert!(!config.send_start_command);
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.serial.parity, Parity::None);
        assert_eq!(config.serial.data_bits, 8);
    }

    #[test]
    fn rejects_invalid_values() {
        for yaml in [
            "retention_ms: 0",
            "display_points: 0",
            "framer_ceiling: 2",
            "telemetry_hz: 0",
            "initial_response_time: 5",
            "serial: { data_bits: 9 }",
            "serial: { stop_bits: 3 }",
            "serial: { baud_rate: 0 }",
        ] {
            let err = MonitorConfig::from_yaml_str(yaml).unwrap_err();
            assert!(matches!(err, OximeterError::Config { .. }), "{yaml}: {err:?}");
        }
    }

    #[test]
    fn yaml_round_trip() {
        let config = MonitorConfig {
            initial_response_time: Some(ResponseTime::Fast),
            ..MonitorConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(MonitorConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = MonitorConfig::from_path("/nonexistent/oxiwave.yaml").unwrap_err();
        assert!(matches!(err, OximeterError::File { .. }));
    }
}
