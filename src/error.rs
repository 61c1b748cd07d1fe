//! Error types for oximeter stream processing.
//!
//! Only conditions a caller can act on are errors. Stream-level problems (partial
//! frames, checksum mismatches, unknown message codes, overrun resets) are absorbed by
//! the framer and decoder and reported through `tracing` diagnostics and counters
//! instead; they never surface as `Err`.
//!
//! ## Error Categories
//!
//! - **Command Errors**: invalid arguments for outbound device commands
//! - **Transport Errors**: the byte-stream collaborator failed to read or write
//! - **Configuration Errors**: unreadable or invalid monitor configuration
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use oxiwave::OximeterError;
//!
//! let error = OximeterError::transport_failed("port closed");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for oximeter operations.
pub type Result<T, E = OximeterError> = std::result::Result<T, E>;

/// Main error type for oximeter operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OximeterError {
    #[error("Unsupported response time {seconds}s (expected 4, 8 or 16)")]
    InvalidResponseTime { seconds: u32 },

    #[error("Transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Monitor is frozen; {operation} was not performed")]
    Frozen { operation: String },
}

impl OximeterError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// The core itself never retries; this is guidance for the collaborator that owns
    /// the serial port lifecycle.
    pub fn is_retryable(&self) -> bool {
        match self {
            OximeterError::Transport { .. } => true,
            OximeterError::Frozen { .. } => true,
            OximeterError::InvalidResponseTime { .. } => false,
            OximeterError::File { .. } => false,
            OximeterError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            OximeterError::InvalidResponseTime { .. } => {
                vec!["Use one of the supported response times: 4, 8 or 16 seconds"]
            }
            OximeterError::Transport { .. } => vec![
                "Check the sensor cable and serial adapter",
                "Verify the port name and line settings",
                "Reopen the port and resume the monitor",
            ],
            OximeterError::File { .. } => vec![
                "Check the configuration file exists and is readable",
                "Check file permissions",
            ],
            OximeterError::Config { .. } => vec![
                "Compare the configuration against the documented defaults",
                "Remove the offending key to fall back to its default",
            ],
            OximeterError::Frozen { .. } => {
                vec!["Unfreeze the monitor before sending device commands"]
            }
        }
    }

    /// Helper constructor for transport errors.
    pub fn transport_failed(reason: impl Into<String>) -> Self {
        OximeterError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with source.
    pub fn transport_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        OximeterError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        OximeterError::File { path, source }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        OximeterError::Config { context: context.into(), details: details.into() }
    }
}

impl From<std::io::Error> for OximeterError {
    fn from(err: std::io::Error) -> Self {
        OximeterError::Transport { reason: err.to_string(), source: Some(Box::new(err)) }
    }
}

impl From<serde_yaml_ng::Error> for OximeterError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        OximeterError::Config { context: "YAML".to_string(), details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            reason in ".*",
            seconds in 0u32..1000u32,
            details in ".*"
          ) {
            let transport = OximeterError::transport_failed(reason.clone());
            prop_assert!(transport.to_string().contains(&reason));

            let invalid = OximeterError::InvalidResponseTime { seconds };
            prop_assert!(invalid.to_string().contains(&seconds.to_string()));

            let config = OximeterError::config_error("serial", details.clone());
            prop_assert!(config.to_string().contains(&details));
          }
        }
    }

    #[test]
    fn io_errors_become_transport_errors_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "cable unplugged");
        let err: OximeterError = io_err.into();

        match &err {
            OximeterError::Transport { reason, source } => {
                assert_eq!(reason, "cable unplugged");
                assert!(source.is_some());
            }
            other => panic!("Expected Transport error, got {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn transport_error_keeps_underlying_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "no data for 2s");
        let err = OximeterError::transport_failed_with_source("COM8 read", Box::new(cause));

        assert_eq!(err.to_string(), "Transport failure: COM8 read");
        assert!(err.is_retryable());
        let source = std::error::Error::source(&err).expect("source attached");
        assert_eq!(source.to_string(), "no data for 2s");
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<OximeterError>();
    }

    #[test]
    fn retry_classification() {
        assert!(OximeterError::transport_failed("x").is_retryable());
        assert!(!OximeterError::InvalidResponseTime { seconds: 5 }.is_retryable());
        assert!(!OximeterError::config_error("a", "b").is_retryable());

        for err in [
            OximeterError::transport_failed("x"),
            OximeterError::InvalidResponseTime { seconds: 5 },
            OximeterError::config_error("a", "b"),
            OximeterError::Frozen { operation: "write".into() },
        ] {
            let suggestions = err.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }
}
