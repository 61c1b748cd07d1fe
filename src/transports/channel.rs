//! In-memory transport backed by Tokio channels.
//!
//! Hosts that already own a serial port (or a test) push received chunks into the
//! [`ChannelFeeder`] and read back what the core wrote from [`ChannelFeeder::written`].

use tokio::sync::mpsc;
use tracing::trace;

use crate::transport::Transport;
use crate::{OximeterError, Result};

/// Transport reading from an mpsc channel.
#[derive(Debug)]
pub struct ChannelTransport {
    inbound: mpsc::Receiver<Vec<u8>>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

/// Host side of a [`ChannelTransport`].
#[derive(Debug)]
pub struct ChannelFeeder {
    inbound: mpsc::Sender<Vec<u8>>,
    outbound: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl ChannelTransport {
    /// Create a connected transport/feeder pair with `capacity` queued chunks.
    pub fn pair(capacity: usize) -> (ChannelTransport, ChannelFeeder) {
        let (in_tx, in_rx) = mpsc::channel(capacity.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        (
            ChannelTransport { inbound: in_rx, outbound: out_tx },
            ChannelFeeder { inbound: in_tx, outbound: out_rx },
        )
    }
}

impl ChannelFeeder {
    /// Deliver received bytes. Fails once the transport has been dropped.
    pub async fn send(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.inbound
            .send(bytes.into())
            .await
            .map_err(|_| OximeterError::transport_failed("channel transport closed"))
    }

    /// Next chunk the core wrote to the device, if any is queued.
    pub fn try_written(&mut self) -> Option<Vec<u8>> {
        self.outbound.try_recv().ok()
    }

    /// Wait for the next chunk the core writes.
    pub async fn written(&mut self) -> Option<Vec<u8>> {
        self.outbound.recv().await
    }
}

#[async_trait::async_trait]
impl Transport for ChannelTransport {
    async fn read_available(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            match self.inbound.recv().await {
                Some(bytes) if bytes.is_empty() => continue,
                Some(bytes) => {
                    trace!("Channel transport received {} bytes", bytes.len());
                    return Ok(Some(bytes));
                }
                None => return Ok(None),
            }
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.outbound
            .send(bytes.to_vec())
            .map_err(|_| OximeterError::transport_failed("channel transport writer dropped"))
    }

    fn describe(&self) -> String {
        "channel".to_string()
    }
}
