//! Benchmarks for the per-frame arena.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lumen_core::alloc::FrameArena;

#[derive(Clone, Copy, Debug, Default)]
struct InstData {
    transform: [f32; 16],
    sort_key: u32,
    depth: f32,
}

fn bench_frame_arena_fill_reset(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_arena_fill_reset");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut arena = FrameArena::with_capacity(size);
            b.iter(|| {
                for _ in 0..size {
                    arena.alloc(black_box(InstData::default()));
                }
                arena.reset();
            });
        });
    }

    group.finish();
}

fn bench_frame_arena_resolve(c: &mut Criterion) {
    let mut arena = FrameArena::new();
    let handles: Vec<_> = (0..10000).map(|_| arena.alloc(InstData::default())).collect();

    c.bench_function("frame_arena_resolve_10000", |b| {
        b.iter(|| {
            let mut sum = 0u32;
            for &h in &handles {
                sum = sum.wrapping_add(arena.get(h).sort_key);
            }
            black_box(sum)
        });
    });
}

criterion_group!(benches, bench_frame_arena_fill_reset, bench_frame_arena_resolve);
criterion_main!(benches);
