//! Performance benchmarks for the Adler-32 checksum
//!
//! This benchmark suite evaluates:
//! - Throughput (MB/s) across data sizes
//! - Sensitivity to data patterns
//! - Incremental vs single-shot updates

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use zlibstream_core::adler32::Adler32;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Random data - varied byte values
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// All bytes 0xFF, the worst case for the deferred modulo
    pub fn saturated(size: usize) -> Vec<u8> {
        vec![0xFF; size]
    }

    /// Text-like data
    pub fn text_like(size: usize) -> Vec<u8> {
        b"The quick brown fox jumps over the lazy dog. "
            .iter()
            .copied()
            .cycle()
            .take(size)
            .collect()
    }
}

fn bench_adler32_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("adler32_sizes");

    let sizes = [
        ("16B", 16),
        ("256B", 256),
        ("4KB", 4 * 1024),
        ("64KB", 64 * 1024),
        ("1MB", 1024 * 1024),
    ];

    for (size_name, size) in sizes {
        let data = test_data::text_like(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| black_box(Adler32::checksum(black_box(data))));
        });
    }

    group.finish();
}

fn bench_adler32_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("adler32_patterns");

    let patterns: [(&str, PatternGenerator); 3] = [
        ("random", test_data::random as PatternGenerator),
        ("saturated", test_data::saturated as PatternGenerator),
        ("text", test_data::text_like as PatternGenerator),
    ];

    let size = 64 * 1024;
    for (pattern_name, generator) in patterns {
        let data = generator(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern_name),
            &data,
            |b, data| {
                b.iter(|| black_box(Adler32::checksum(black_box(data))));
            },
        );
    }

    group.finish();
}

fn bench_adler32_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("adler32_incremental");

    let size = 64 * 1024;
    let data = test_data::text_like(size);

    for chunk_size in [64, 1024, 16384] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("chunks_{}", chunk_size)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut adler = Adler32::new();
                    for chunk in data.chunks(chunk_size) {
                        adler.update(black_box(chunk));
                    }
                    black_box(adler.finish())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_adler32_sizes,
    bench_adler32_patterns,
    bench_adler32_incremental,
);
criterion_main!(benches);
