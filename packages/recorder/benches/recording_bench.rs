// packages/recorder/benches/recording_bench.rs
//! Ingestion overhead of the heap recorder

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heaptrack_recorder::{
    AllocCallbackInfo, FreeCallbackInfo, HeapObserver, HeapRecorder, HeapTrackOptions,
    RecorderConfig,
};
use std::time::Duration;
use tempfile::tempdir;

fn bench_on_alloc(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_alloc");
    group.throughput(Throughput::Elements(1));

    for capacity in [64usize, 1024, 16 * 1024] {
        let dir = tempdir().unwrap();
        let recorder = HeapRecorder::create(
            HeapTrackOptions::default(),
            dir.path().join("heap.ts"),
            RecorderConfig::default()
                .with_buffer_capacity(capacity)
                .with_flush_interval(Duration::from_secs(3600)),
        )
        .unwrap();

        let mut address = 0usize;
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| {
                address = address.wrapping_add(16);
                recorder.on_alloc(black_box(&AllocCallbackInfo::new(address, 64)));
            });
        });

        recorder.close().unwrap();
    }

    group.finish();
}

fn bench_alloc_free_pairs(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let recorder = HeapRecorder::create(
        HeapTrackOptions::default(),
        dir.path().join("heap.ts"),
        RecorderConfig::default(),
    )
    .unwrap();

    c.bench_function("alloc_free_pair", |b| {
        b.iter(|| {
            recorder.on_alloc(black_box(&AllocCallbackInfo::new(0x1000, 64).with_call_site(1)));
            recorder.on_free(black_box(&FreeCallbackInfo::new(0x1000, 64)));
        });
    });

    recorder.close().unwrap();
}

criterion_group!(benches, bench_on_alloc, bench_alloc_free_pairs);
criterion_main!(benches);
