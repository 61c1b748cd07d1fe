//! Stream framing, decoding and windowed waveform history for serial pulse-oximetry
//! sensors.
//!
//! A pulse oximeter streams `AA 55`-framed telemetry over a serial link: one
//! plethysmograph sample plus the current SpO2 and pulse-rate estimates per frame.
//! Oxiwave rebuilds frames from the unframed byte stream, verifies their checksums,
//! decodes readings (mapping the device's "no reading" sentinels to
//! [`Reading::Unknown`]), and keeps the last 20 seconds of smoothed waveform for
//! display and export.
//!
//! # Features
//!
//! - **Resynchronizing framer**: survives noise, truncated frames and stray markers
//! - **Consistent snapshots**: readers never observe a half-applied update
//! - **Per-signal notifications**: SpO2, pulse rate, waveform and freeze state
//! - **Replay**: run captured byte streams through the same pipeline
//!
//! ## Example (synchronous feeding)
//!
//! ```rust
//! use oxiwave::{Monitor, MonitorConfig, Reading};
//!
//! let monitor = Monitor::new(MonitorConfig::default());
//! monitor.feed(&[0xAA, 0x55, 0x0A, 0x15, 0x00, 0x32, 0x00]);
//! monitor.feed(&[0x50, 0x00, 0x50, 0x00, 0x00, 0x00, 0xF1]);
//!
//! assert_eq!(monitor.spo2(), Reading::Valid(80));
//! assert_eq!(monitor.display_waveform(), vec![25]);
//! ```
//!
//! ## Example (capture replay)
//!
//! ```rust,no_run
//! use oxiwave::{Oximeter, MonitorConfig};
//!
//! #[tokio::main]
//! async fn main() -> oxiwave::Result<()> {
//!     let connection = Oximeter::replay("capture.bin", MonitorConfig::default()).await?;
//!     connection.driver().finished().await;
//!     println!("SpO2: {}", connection.spo2());
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Protocol and decoding
pub mod clock;
pub mod config;
pub mod decoder;
pub mod protocol;
pub mod state;
pub mod waveform;

// Session and stream plumbing
pub mod connection;
pub mod driver;
pub mod monitor;
pub mod stream;
pub mod transport;
pub mod transports;

// Core exports
pub use error::*;
pub use types::*;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MonitorConfig, Parity, SerialSettings};
pub use connection::Connection;
pub use decoder::{Decoded, TelemetryDecoder};
pub use driver::{Driver, DriverHandle, DriverOptions, LinkStatus};
pub use monitor::{FeedSummary, Monitor, Update, WaveformExport};
pub use protocol::{FramerStats, PacketFramer, ResponseTime, encode_response_time_setting};
pub use state::ReadingState;
pub use transport::Transport;
pub use transports::{ChannelFeeder, ChannelTransport, ReplayTransport};
pub use waveform::WindowedWaveformBuffer;

/// Unified entry point for oximeter sessions.
///
/// ```rust,no_run
/// use oxiwave::{ChannelTransport, MonitorConfig, Oximeter};
///
/// #[tokio::main]
/// async fn main() -> oxiwave::Result<()> {
///     let (transport, feeder) = ChannelTransport::pair(64);
///     let connection = Oximeter::attach(transport, MonitorConfig::default())?;
///     feeder.send(vec![0xAA, 0x55, 0x00, 0x00]).await?;
///     connection.set_response_time(8).await?;
///     Ok(())
/// }
/// ```
pub struct Oximeter;

impl Oximeter {
    /// Start a session over any byte-stream transport.
    ///
    /// Writes the start-streaming preamble and the configured initial response time,
    /// then feeds every received chunk to the monitor until the transport ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn attach<T: Transport>(transport: T, config: MonitorConfig) -> Result<Connection> {
        Connection::attach(transport, config)
    }

    /// Replay a captured byte stream.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The capture file does not exist or is not readable
    /// - The configuration fails validation
    pub async fn replay<P: AsRef<std::path::Path>>(
        path: P,
        config: MonitorConfig,
    ) -> Result<Connection> {
        Connection::replay(path, config).await
    }

    /// Load a YAML configuration file.
    pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> Result<MonitorConfig> {
        MonitorConfig::from_path(path)
    }
}
