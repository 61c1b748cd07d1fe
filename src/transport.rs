//! Transport trait for the serial byte stream

use crate::Result;

/// Byte-stream collaborator delivering sensor data and accepting device commands.
///
/// Implementations own the port lifecycle (line settings, open, close). The core only
/// reads what is available and writes encoded commands; it never retries a failed
/// operation.
#[async_trait::async_trait]
pub trait Transport: Send + 'static {
    /// Wait for the next chunk of received bytes
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - New bytes available (never empty)
    /// - `Ok(None)` - Stream ended (port closed normally, replay finished)
    /// - `Err(e)` - Transport failure
    ///
    /// Must be cancel-safe: the driver races it against outbound commands and
    /// shutdown, and a dropped call must not lose bytes.
    async fn read_available(&mut self) -> Result<Option<Vec<u8>>>;

    /// Write raw bytes to the device.
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Short description for logs.
    fn describe(&self) -> String;
}
