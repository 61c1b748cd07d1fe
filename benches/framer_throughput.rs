//! Benchmarks for stream framing and decoding
//!
//! Measures how fast a synthetic capture moves through:
//! - The framer alone, fed in serial-port-sized chunks
//! - The full monitor pipeline (frame, decode, append, evict)
//!
//! Platform: Cross-platform (synthetic captures, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxiwave::test_utils::synthetic_capture;
use oxiwave::{ManualClock, Monitor, MonitorConfig, PacketFramer};
use std::hint::black_box;

const FRAMES: usize = 2_000;

fn bench_framer_chunks(c: &mut Criterion) {
    let capture = synthetic_capture(FRAMES, 25);

    let mut group = c.benchmark_group("framer_chunks");
    group.throughput(Throughput::Bytes(capture.len() as u64));

    for chunk_size in [1usize, 16, 64, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk_size), &chunk_size, |b, &size| {
            b.iter(|| {
                let mut framer = PacketFramer::new();
                let mut frames = 0;
                for chunk in capture.chunks(size) {
                    frames += framer.push(black_box(chunk)).len();
                }
                black_box(frames)
            })
        });
    }

    group.finish();
}

fn bench_monitor_pipeline(c: &mut Criterion) {
    let capture = synthetic_capture(FRAMES, 0);

    let mut group = c.benchmark_group("monitor_pipeline");
    group.throughput(Throughput::Elements(FRAMES as u64));

    group.bench_function("feed_64_byte_chunks", |b| {
        b.iter(|| {
            let clock = ManualClock::new(0);
            let monitor = Monitor::with_clock(MonitorConfig::default(), clock.clone());
            for chunk in capture.chunks(64) {
                clock.advance(4);
                black_box(monitor.feed(black_box(chunk)));
            }
            black_box(monitor.display_waveform())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_framer_chunks, bench_monitor_pipeline);
criterion_main!(benches);
