//! Time-windowed waveform history.
//!
//! Samples arrive in timestamp order from a single producer, so eviction only ever
//! pops from the front and costs O(evicted). The display view is derived from the same
//! deque on demand; there is no second copy to keep in sync.

use std::collections::VecDeque;
use std::time::Duration;

use crate::types::WaveformSample;

/// Default retention window in milliseconds.
pub const DEFAULT_RETENTION_MS: i64 = 20_000;

/// Default number of points in the display view.
pub const DEFAULT_DISPLAY_POINTS: usize = 200;

/// Bounded, time-evicting sample history.
#[derive(Debug, Clone)]
pub struct WindowedWaveformBuffer {
    samples: VecDeque<WaveformSample>,
    retention_ms: i64,
}

impl Default for WindowedWaveformBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_MS)
    }
}

impl WindowedWaveformBuffer {
    pub fn new(retention_ms: i64) -> Self {
        Self { samples: VecDeque::new(), retention_ms: retention_ms.max(0) }
    }

    /// Append a sample and evict everything older than the window at `now_ms`.
    pub fn push(&mut self, sample: WaveformSample, now_ms: i64) -> usize {
        self.samples.push_back(sample);
        self.evict(now_ms)
    }

    /// Drop samples with `now_ms - timestamp > retention`. Returns the count removed.
    pub fn evict(&mut self, now_ms: i64) -> usize {
        let mut evicted = 0;
        while let Some(front) = self.samples.front() {
            if front.age_ms(now_ms) <= self.retention_ms {
                break;
            }
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// All retained values, oldest first.
    pub fn snapshot_all(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// The most recent `max_points` values, oldest first.
    pub fn snapshot_display(&self, max_points: usize) -> Vec<u8> {
        let start = self.samples.len().saturating_sub(max_points);
        self.samples.range(start..).map(|s| s.value).collect()
    }

    /// Values no older than `window`, measured from the newest sample.
    ///
    /// A window at least as long as the retention period returns everything retained.
    pub fn snapshot_window(&self, window: Duration) -> Vec<u8> {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        if window_ms >= self.retention_ms {
            return self.snapshot_all();
        }
        let Some(newest) = self.samples.back() else {
            return Vec::new();
        };
        let start = self.samples.partition_point(|s| s.age_ms(newest.timestamp_ms) > window_ms);
        self.samples.range(start..).map(|s| s.value).collect()
    }

    /// Timestamps in the same order as [`snapshot_all`](Self::snapshot_all).
    pub fn timestamps(&self) -> Vec<i64> {
        self.samples.iter().map(|s| s.timestamp_ms).collect()
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &WaveformSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn retention_ms(&self) -> i64 {
        self.retention_ms
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
