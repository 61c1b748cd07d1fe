//! Driver task pumping transport bytes into a monitor

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::config::MonitorConfig;
use crate::monitor::Monitor;
use crate::protocol::{ResponseTime, START_STREAMING, encode_response_time_setting};
use crate::transport::Transport;
use crate::{OximeterError, Result};

/// Queued outbound commands before `set_response_time` starts waiting.
const COMMAND_QUEUE: usize = 8;

/// Lifecycle of the link as seen by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Task spawned, start-up commands not yet written
    Starting,
    /// Reading from the transport
    Streaming,
    /// Transport ended or the driver was cancelled
    Ended,
    /// Transport failed; the driver stopped without retrying
    Failed(String),
}

impl LinkStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LinkStatus::Ended | LinkStatus::Failed(_))
    }
}

/// Start-up behavior of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    pub send_start_command: bool,
    pub initial_response_time: Option<ResponseTime>,
}

impl From<&MonitorConfig> for DriverOptions {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            send_start_command: config.send_start_command,
            initial_response_time: config.initial_response_time,
        }
    }
}

/// Handle to a running driver.
#[derive(Debug)]
pub struct DriverHandle {
    status: watch::Receiver<LinkStatus>,
    commands: mpsc::Sender<Vec<u8>>,
    monitor: Monitor,
    cancel: CancellationToken,
}

impl DriverHandle {
    /// Send the response-time setting to the device.
    ///
    /// The argument is validated before anything is queued; an unsupported value
    /// sends nothing. Commands are refused while the monitor is frozen because the
    /// link is expected to be closed.
    pub async fn set_response_time(&self, seconds: u32) -> Result<()> {
        let bytes = encode_response_time_setting(seconds)?;
        if self.monitor.is_frozen() {
            return Err(OximeterError::Frozen { operation: format!("response time {seconds}s") });
        }
        self.commands
            .send(bytes)
            .await
            .map_err(|_| OximeterError::transport_failed("driver is not running"))
    }

    /// Current link status.
    pub fn status(&self) -> LinkStatus {
        self.status.borrow().clone()
    }

    /// Watch receiver for link status changes.
    pub fn status_updates(&self) -> watch::Receiver<LinkStatus> {
        self.status.clone()
    }

    /// Wait until the driver stops and return its final status.
    pub async fn finished(&self) -> LinkStatus {
        let mut status = self.status.clone();
        match status.wait_for(LinkStatus::is_terminal).await {
            Ok(final_status) => final_status.clone(),
            // Sender dropped without a terminal status: the task is gone.
            Err(_) => LinkStatus::Ended,
        }
    }

    /// Stop the driver task.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Spawns and manages the ingestion task
///
/// The task owns the transport. It reads chunks as they arrive and hands each one to
/// [`Monitor::feed`], which frames and decodes synchronously, so chunks are never
/// processed concurrently. Outbound commands are written from the same task.
pub struct Driver;

impl Driver {
    /// Spawn the driver task for `transport`. Must be called within a Tokio runtime.
    pub fn spawn<T>(transport: T, monitor: Monitor, options: DriverOptions) -> DriverHandle
    where
        T: Transport,
    {
        let (status_tx, status_rx) = watch::channel(LinkStatus::Starting);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let cancel = CancellationToken::new();

        let task_monitor = monitor.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            Self::pump_task(transport, task_monitor, options, command_rx, status_tx, task_cancel)
                .await;
        });

        DriverHandle { status: status_rx, commands: command_tx, monitor, cancel }
    }

    async fn pump_task<T>(
        mut transport: T,
        monitor: Monitor,
        options: DriverOptions,
        mut commands: mpsc::Receiver<Vec<u8>>,
        status: watch::Sender<LinkStatus>,
        cancel: CancellationToken,
    ) where
        T: Transport,
    {
        let name = transport.describe();
        info!("Driver started on {}", name);

        if let Err(e) = Self::write_startup(&mut transport, options).await {
            error!("Start-up write to {} failed: {}", name, e);
            status.send_replace(LinkStatus::Failed(e.to_string()));
            return;
        }
        status.send_replace(LinkStatus::Streaming);

        let mut chunk_count = 0u64;
        let mut frame_count = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Driver cancelled");
                    status.send_replace(LinkStatus::Ended);
                    break;
                }
                Some(command) = commands.recv() => {
                    debug!("Writing command {:02X?}", command);
                    if let Err(e) = transport.write(&command).await {
                        error!("Command write to {} failed: {}", name, e);
                        status.send_replace(LinkStatus::Failed(e.to_string()));
                        break;
                    }
                }
                result = transport.read_available() => match result {
                    Ok(Some(bytes)) => {
                        chunk_count += 1;
                        let summary = monitor.feed(&bytes);
                        frame_count += summary.frames;
                        trace!("Chunk {}: {} bytes, {:?}", chunk_count, bytes.len(), summary);
                    }
                    Ok(None) => {
                        info!("Transport {} ended after {} chunks", name, chunk_count);
                        status.send_replace(LinkStatus::Ended);
                        break;
                    }
                    Err(e) => {
                        error!("Transport {} failed: {}", name, e);
                        status.send_replace(LinkStatus::Failed(e.to_string()));
                        break;
                    }
                },
            }
        }

        info!("Driver ended ({} chunks, {} frames)", chunk_count, frame_count);
    }

    async fn write_startup<T: Transport>(transport: &mut T, options: DriverOptions) -> Result<()> {
        if options.send_start_command {
            debug!("Writing start-streaming preamble");
            transport.write(&START_STREAMING).await?;
        }
        if let Some(response_time) = options.initial_response_time {
            debug!("Applying initial response time {}", response_time);
            transport.write(&response_time.to_frame().to_bytes()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::telemetry_frame;
    use crate::transports::ChannelTransport;
    use crate::types::Reading;

    struct FailingTransport;

    #[async_trait::async_trait]
    impl Transport for FailingTransport {
        async fn read_available(&mut self) -> Result<Option<Vec<u8>>> {
            Err(OximeterError::transport_failed("port vanished"))
        }

        async fn write(&mut self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn options() -> DriverOptions {
        DriverOptions {
            send_start_command: true,
            initial_response_time: Some(ResponseTime::Normal),
        }
    }

    #[tokio::test]
    async fn writes_startup_commands_then_streams() {
        let (transport, mut feeder) = ChannelTransport::pair(8);
        let monitor = Monitor::new(MonitorConfig::default());
        let handle = Driver::spawn(transport, monitor.clone(), options());

        assert_eq!(feeder.written().await, Some(START_STREAMING.to_vec()));
        assert_eq!(feeder.written().await, Some(ResponseTime::Normal.to_frame().to_bytes()));

        let mut spo2 = monitor.subscribe_spo2();
        feeder.send(telemetry_frame(40, 96, 0, 75)).await.unwrap();
        spo2.changed().await.unwrap();
        assert_eq!(monitor.spo2(), Reading::Valid(96));

        drop(feeder);
        assert_eq!(handle.finished().await, LinkStatus::Ended);
    }

    #[tokio::test]
    async fn response_time_commands_are_validated_and_written() {
        let (transport, mut feeder) = ChannelTransport::pair(8);
        let monitor = Monitor::new(MonitorConfig::default());
        let handle = Driver::spawn(
            transport,
            monitor.clone(),
            DriverOptions { send_start_command: false, initial_response_time: None },
        );

        let err = handle.set_response_time(5).await.unwrap_err();
        assert!(matches!(err, OximeterError::InvalidResponseTime { seconds: 5 }));

        handle.set_response_time(16).await.unwrap();
        assert_eq!(feeder.written().await, Some(encode_response_time_setting(16).unwrap()));

        monitor.freeze();
        let err = handle.set_response_time(4).await.unwrap_err();
        assert!(matches!(err, OximeterError::Frozen { .. }));
        assert!(feeder.try_written().is_none());

        handle.cancel();
        assert_eq!(handle.finished().await, LinkStatus::Ended);
    }

    #[tokio::test]
    async fn transport_failure_stops_driver_without_retry() {
        let monitor = Monitor::new(MonitorConfig::default());
        let handle = Driver::spawn(FailingTransport, monitor, options());

        match handle.finished().await {
            LinkStatus::Failed(reason) => assert!(reason.contains("port vanished")),
            other => panic!("Expected failure, got {other:?}"),
        }
        assert!(handle.set_response_time(8).await.is_err());
    }
}
