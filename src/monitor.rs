//! Decoding session: framer, decoder, waveform history and readings behind one lock.
//!
//! [`Monitor`] is the object collaborators talk to. The transport side calls
//! [`Monitor::feed`] with each chunk of received bytes; display, storage and export
//! code query snapshots or subscribe to the four change notifications.
//!
//! Every `feed` call frames, decodes, appends and evicts under a single lock
//! acquisition, and every query takes the same lock, so a reader never observes a
//! half-applied chunk. Notifications are published after the lock is released and
//! carry a sequence number counting how many times the signal fired.
//!
//! ```rust
//! use oxiwave::{Monitor, MonitorConfig, Reading};
//!
//! let monitor = Monitor::new(MonitorConfig::default());
//! monitor.feed(&[
//!     0xAA, 0x55, 0x0A, 0x15, 0x00, 0x32, 0x00, 0x50, 0x00, 0x50, 0x00, 0x00, 0x00, 0xF1,
//! ]);
//! assert_eq!(monitor.spo2(), Reading::Valid(80));
//! assert_eq!(monitor.pulse_rate(), Reading::Valid(80));
//! assert_eq!(monitor.waveform_all(), vec![25]);
//! ```

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::decoder::TelemetryDecoder;
use crate::protocol::{FramerStats, PacketFramer};
use crate::state::ReadingState;
use crate::stream::ThrottleExt;
use crate::types::{Reading, UpdateRate, WaveformSample};
use crate::waveform::WindowedWaveformBuffer;

/// A change notification: the latest value and how many times the signal has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Update<T> {
    pub seq: u64,
    pub value: T,
}

/// Result of one [`Monitor::feed`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Checksum-valid frames extracted from the stream.
    pub frames: usize,
    /// Frames decoded as vital-signs telemetry.
    pub telemetry: usize,
    /// Waveform samples appended.
    pub samples: usize,
    /// Bytes dropped because the monitor was frozen.
    pub dropped: usize,
}

/// Waveform history and readings captured atomically for report and storage
/// collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaveformExport {
    pub values: Vec<u8>,
    pub timestamps_ms: Vec<i64>,
    pub spo2: Reading,
    pub pulse_rate: Reading,
}

struct Core {
    framer: PacketFramer,
    decoder: TelemetryDecoder,
    buffer: WindowedWaveformBuffer,
    state: ReadingState,
}

struct Notifiers {
    spo2: watch::Sender<Update<Reading>>,
    pulse_rate: watch::Sender<Update<Reading>>,
    waveform: watch::Sender<Update<Option<WaveformSample>>>,
    frozen: watch::Sender<Update<bool>>,
}

struct Shared {
    core: Mutex<Core>,
    notifiers: Notifiers,
    clock: Arc<dyn Clock>,
    display_points: usize,
    telemetry_hz: f64,
}

/// Shared handle to a decoding session. Clones refer to the same session.
#[derive(Clone)]
pub struct Monitor {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor").field("state", &self.reading_state()).finish_non_exhaustive()
    }
}

impl Monitor {
    /// Create a monitor timestamping samples with the system clock.
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create a monitor with a custom timestamp source.
    pub fn with_clock<C: Clock>(config: MonitorConfig, clock: C) -> Self {
        info!(
            "Monitor created (retention {}ms, {} display points)",
            config.retention_ms, config.display_points
        );
        let core = Core {
            framer: PacketFramer::with_ceiling(config.framer_ceiling),
            decoder: TelemetryDecoder::new(),
            buffer: WindowedWaveformBuffer::new(config.retention_ms),
            state: ReadingState::new(),
        };
        let notifiers = Notifiers {
            spo2: watch::Sender::new(Update::default()),
            pulse_rate: watch::Sender::new(Update::default()),
            waveform: watch::Sender::new(Update::default()),
            frozen: watch::Sender::new(Update::default()),
        };
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(core),
                notifiers,
                clock: Arc::new(clock),
                display_points: config.display_points,
                telemetry_hz: config.telemetry_hz,
            }),
        }
    }

    /// Hand newly received bytes to the session.
    ///
    /// While frozen the bytes are dropped and nothing changes.
    pub fn feed(&self, bytes: &[u8]) -> FeedSummary {
        let mut summary = FeedSummary::default();
        let mut spo2 = None;
        let mut pulse_rate = None;
        let mut last_sample = None;

        {
            let mut core = self.shared.core.lock();
            if core.state.frozen {
                trace!("Frozen: dropping {} bytes", bytes.len());
                summary.dropped = bytes.len();
                return summary;
            }

            let Core { framer, decoder, buffer, state } = &mut *core;
            framer.feed(bytes);
            while let Some(frame) = framer.next_frame() {
                summary.frames += 1;
                let Some(decoded) = decoder.decode(&frame) else {
                    continue;
                };
                summary.telemetry += 1;

                if let Some(value) = decoded.waveform {
                    let now = self.shared.clock.now_ms();
                    let sample = WaveformSample::new(value, now);
                    buffer.push(sample, now);
                    summary.samples += 1;
                    last_sample = Some(sample);
                }
                state.apply(&decoded);
                spo2 = Some(decoded.spo2);
                pulse_rate = Some(decoded.pulse_rate);
            }
        }

        let notifiers = &self.shared.notifiers;
        if let Some(sample) = last_sample {
            publish(&notifiers.waveform, summary.samples as u64, Some(sample));
        }
        if let Some(value) = spo2 {
            publish(&notifiers.spo2, summary.telemetry as u64, value);
        }
        if let Some(value) = pulse_rate {
            publish(&notifiers.pulse_rate, summary.telemetry as u64, value);
        }
        summary
    }

    /// Stop consuming bytes. Unframed bytes are discarded. Idempotent.
    pub fn freeze(&self) {
        self.set_frozen(true);
    }

    /// Resume consuming bytes from a clean framer. Idempotent.
    pub fn unfreeze(&self) {
        self.set_frozen(false);
    }

    fn set_frozen(&self, frozen: bool) {
        let changed = {
            let mut core = self.shared.core.lock();
            core.framer.clear();
            core.state.set_frozen(frozen)
        };
        if changed {
            info!("Monitor {}", if frozen { "frozen" } else { "resumed" });
            publish(&self.shared.notifiers.frozen, 1, frozen);
        } else {
            debug!("Monitor already {}", if frozen { "frozen" } else { "active" });
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.shared.core.lock().state.frozen
    }

    pub fn spo2(&self) -> Reading {
        self.shared.core.lock().state.spo2
    }

    pub fn pulse_rate(&self) -> Reading {
        self.shared.core.lock().state.pulse_rate
    }

    pub fn reading_state(&self) -> ReadingState {
        self.shared.core.lock().state
    }

    /// Waveform values no older than `window`, oldest first.
    pub fn waveform_snapshot(&self, window: Duration) -> Vec<u8> {
        self.shared.core.lock().buffer.snapshot_window(window)
    }

    /// Every retained waveform value, oldest first.
    pub fn waveform_all(&self) -> Vec<u8> {
        self.shared.core.lock().buffer.snapshot_all()
    }

    /// Timestamps matching [`waveform_all`](Self::waveform_all).
    pub fn waveform_timestamps(&self) -> Vec<i64> {
        self.shared.core.lock().buffer.timestamps()
    }

    /// The most recent display-sized slice of the waveform.
    pub fn display_waveform(&self) -> Vec<u8> {
        self.shared.core.lock().buffer.snapshot_display(self.shared.display_points)
    }

    /// Values, timestamps and readings taken under one lock.
    pub fn export_waveform(&self) -> WaveformExport {
        let core = self.shared.core.lock();
        WaveformExport {
            values: core.buffer.snapshot_all(),
            timestamps_ms: core.buffer.timestamps(),
            spo2: core.state.spo2,
            pulse_rate: core.state.pulse_rate,
        }
    }

    pub fn framer_stats(&self) -> FramerStats {
        self.shared.core.lock().framer.stats()
    }

    /// Bytes buffered but not yet framed.
    pub fn pending_bytes(&self) -> usize {
        self.shared.core.lock().framer.pending().len()
    }

    pub fn subscribe_spo2(&self) -> watch::Receiver<Update<Reading>> {
        self.shared.notifiers.spo2.subscribe()
    }

    pub fn subscribe_pulse_rate(&self) -> watch::Receiver<Update<Reading>> {
        self.shared.notifiers.pulse_rate.subscribe()
    }

    pub fn subscribe_waveform(&self) -> watch::Receiver<Update<Option<WaveformSample>>> {
        self.shared.notifiers.waveform.subscribe()
    }

    pub fn subscribe_frozen(&self) -> watch::Receiver<Update<bool>> {
        self.shared.notifiers.frozen.subscribe()
    }

    /// SpO2 changes as a stream, optionally throttled.
    pub fn spo2_updates(&self, rate: UpdateRate) -> impl Stream<Item = Reading> + 'static {
        self.rated(self.subscribe_spo2(), rate)
    }

    /// Pulse-rate changes as a stream, optionally throttled.
    pub fn pulse_rate_updates(&self, rate: UpdateRate) -> impl Stream<Item = Reading> + 'static {
        self.rated(self.subscribe_pulse_rate(), rate)
    }

    /// Display-sized waveform views, recomputed whenever a sample is appended.
    pub fn display_updates(&self, rate: UpdateRate) -> impl Stream<Item = Vec<u8>> + 'static {
        let monitor = self.clone();
        self.rated(self.subscribe_waveform(), rate).map(move |_| monitor.display_waveform())
    }

    /// Freeze transitions as a stream.
    pub fn frozen_updates(&self) -> impl Stream<Item = bool> + 'static {
        WatchStream::from_changes(self.subscribe_frozen()).map(|update| update.value)
    }

    fn rated<T>(
        &self,
        rx: watch::Receiver<Update<T>>,
        rate: UpdateRate,
    ) -> futures::stream::BoxStream<'static, T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let values = WatchStream::from_changes(rx).map(|update| update.value);
        match rate.throttle_interval(self.shared.telemetry_hz) {
            None => values.boxed(),
            Some(interval) => values.throttle(interval).boxed(),
        }
    }
}

fn publish<T>(tx: &watch::Sender<Update<T>>, fired: u64, value: T) {
    tx.send_modify(|update| {
        update.seq += fired;
        update.value = value;
    });
}
