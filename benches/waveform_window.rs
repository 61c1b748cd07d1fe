//! Benchmarks for the windowed waveform buffer
//!
//! A 100 Hz stream holds roughly 2 000 samples in a 20 s window. These cover the
//! steady-state append/evict cost and the snapshot views readers take.

use criterion::{Criterion, criterion_group, criterion_main};
use oxiwave::{WaveformSample, WindowedWaveformBuffer};
use std::hint::black_box;
use std::time::Duration;

const PERIOD_MS: i64 = 10;

fn full_buffer() -> (WindowedWaveformBuffer, i64) {
    let mut buffer = WindowedWaveformBuffer::default();
    for i in 0..2_000 {
        let now = i * PERIOD_MS;
        buffer.push(WaveformSample::new((i % 200) as u8, now), now);
    }
    (buffer, 1_999 * PERIOD_MS)
}

fn bench_steady_state_push(c: &mut Criterion) {
    let (mut buffer, mut now) = full_buffer();

    c.bench_function("push_with_eviction", |b| {
        b.iter(|| {
            now += PERIOD_MS;
            black_box(buffer.push(black_box(WaveformSample::new(100, now)), now))
        })
    });
}

fn bench_snapshots(c: &mut Criterion) {
    let (buffer, _) = full_buffer();

    let mut group = c.benchmark_group("snapshots");
    group.bench_function("all", |b| b.iter(|| black_box(buffer.snapshot_all())));
    group.bench_function("display_200", |b| b.iter(|| black_box(buffer.snapshot_display(200))));
    group.bench_function("window_5s", |b| {
        b.iter(|| black_box(buffer.snapshot_window(Duration::from_secs(5))))
    });
    group.finish();
}

criterion_group!(benches, bench_steady_state_push, bench_snapshots);
criterion_main!(benches);
