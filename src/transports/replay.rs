//! Replay transport for captured serial streams

use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::transport::Transport;
use crate::{OximeterError, Result};

/// Default chunk size, roughly what a 375 kbaud port delivers per read.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Default pacing between chunks.
pub const DEFAULT_CHUNK_INTERVAL: Duration = Duration::from_millis(2);

/// Transport that plays back a raw byte capture in fixed-size chunks.
///
/// Writes are accepted and kept so tests can inspect the commands sent.
pub struct ReplayTransport {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    chunk_interval: Duration,
    period: Duration,
    interval: Option<Interval>,
    written: Vec<Vec<u8>>,
    label: String,
}

impl ReplayTransport {
    /// Open a capture file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).map_err(|e| OximeterError::file_error(path.to_path_buf(), e))?;
        info!("Opened capture {}: {} bytes", path.display(), data.len());
        Ok(Self::from_bytes(data).with_label(path.display().to_string()))
    }

    /// Replay an in-memory capture.
    ///
    /// Pacing starts with the first read, so the transport can be built outside a
    /// runtime.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            period: DEFAULT_CHUNK_INTERVAL,
            interval: None,
            written: Vec::new(),
            label: "memory".to_string(),
        }
    }

    /// Set the number of bytes delivered per read.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the pacing between reads.
    pub fn with_chunk_interval(mut self, chunk_interval: Duration) -> Self {
        self.chunk_interval = chunk_interval.max(Duration::from_micros(1));
        self.period = self.chunk_interval;
        self.interval = None;
        self
    }

    fn with_label(mut self, label: String) -> Self {
        self.label = label;
        self
    }

    /// Playback speed multiplier relative to the configured interval.
    pub fn set_speed(&mut self, speed: f64) {
        let speed = speed.clamp(0.1, 100.0);
        self.period = self.chunk_interval.div_f64(speed);
        self.interval = None;
        debug!("Replay speed set to {}x", speed);
    }

    /// Bytes not yet delivered.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Everything written so far, one entry per `write` call.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }
}

fn paced(period: Duration) -> Interval {
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[async_trait::async_trait]
impl Transport for ReplayTransport {
    async fn read_available(&mut self) -> Result<Option<Vec<u8>>> {
        if self.position >= self.data.len() {
            debug!("Reached end of capture");
            return Ok(None);
        }

        let period = self.period;
        self.interval.get_or_insert_with(|| paced(period)).tick().await;

        let end = (self.position + self.chunk_size).min(self.data.len());
        let chunk = self.data[self.position..end].to_vec();
        self.position = end;
        trace!("Replay chunk {} bytes ({} remaining)", chunk.len(), self.remaining());
        Ok(Some(chunk))
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        trace!("Replay transport discarding write of {} bytes", bytes.len());
        self.written.push(bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("replay:{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test(start_paused = true)]
    async fn delivers_capture_in_chunks() {
        let mut transport =
            ReplayTransport::from_bytes((0u8..10).collect::<Vec<_>>()).with_chunk_size(4);

        assert_eq!(transport.read_available().await.unwrap(), Some(vec![0, 1, 2, 3]));
        assert_eq!(transport.read_available().await.unwrap(), Some(vec![4, 5, 6, 7]));
        assert_eq!(transport.read_available().await.unwrap(), Some(vec![8, 9]));
        assert_eq!(transport.read_available().await.unwrap(), None);
        assert_eq!(transport.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn opens_capture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xAA, 0x55, 0x00, 0x00]).unwrap();

        let mut transport = ReplayTransport::open(file.path()).unwrap();
        assert!(transport.describe().starts_with("replay:"));
        assert_eq!(transport.read_available().await.unwrap(), Some(vec![0xAA, 0x55, 0x00, 0x00]));

        transport.write(&[1, 2]).await.unwrap();
        assert_eq!(transport.written(), &[vec![1, 2]]);
    }

    #[tokio::test]
    async fn missing_capture_is_a_file_error() {
        let err = ReplayTransport::open("/nonexistent/capture.bin").err().unwrap();
        assert!(matches!(err, OximeterError::File { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn speed_scales_chunk_pacing() {
        let mut transport = ReplayTransport::from_bytes(vec![0u8; 12])
            .with_chunk_size(4)
            .with_chunk_interval(Duration::from_millis(100));
        transport.set_speed(4.0);

        // The first tick completes immediately; later ones wait one period.
        transport.read_available().await.unwrap();
        let start = tokio::time::Instant::now();
        transport.read_available().await.unwrap();
        transport.read_available().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(50), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(100), "{elapsed:?}");
        assert_eq!(transport.read_available().await.unwrap(), None);
    }

    #[test]
    fn opens_outside_runtime() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xAA, 0x55, 0x00, 0x00]).unwrap();

        let mut transport = ReplayTransport::open(file.path()).unwrap();
        assert_eq!(transport.remaining(), 4);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let chunk = runtime.block_on(transport.read_available()).unwrap();
        assert_eq!(chunk, Some(vec![0xAA, 0x55, 0x00, 0x00]));
    }
}
