//! Performance benchmarks for zlib compression and decompression
//!
//! This benchmark suite evaluates:
//! - Compression throughput per level
//! - Compression throughput per strategy
//! - Decompression throughput per data pattern
//! - Cost of small streaming buffers

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use zlibstream::{
    CompressStatus, CompressionLevel, CompressionStrategy, Compressor, EncoderConfig, FlushMode,
    ZlibEncoder, zlib_compress, zlib_compress_with, zlib_decompress,
};

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    /// Random data, effectively incompressible
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Short repeating pattern
    pub fn repeated(size: usize) -> Vec<u8> {
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
            .iter()
            .copied()
            .cycle()
            .take(size)
            .collect()
    }

    /// Word soup with a skewed vocabulary
    pub fn text_like(size: usize) -> Vec<u8> {
        let words: [&[u8]; 12] = [
            b"the ", b"of ", b"stream ", b"window ", b"deflate ", b"and ", b"block ",
            b"a ", b"huffman ", b"to ", b"is ", b"match ",
        ];
        let mut data = Vec::with_capacity(size + 16);
        let mut seed: u32 = 12345;
        while data.len() < size {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            let pick = (seed >> 16) as usize % words.len();
            data.extend_from_slice(words[pick]);
        }
        data.truncate(size);
        data
    }
}

const PATTERNS: [(&str, PatternGenerator); 3] = [
    ("random", test_data::random as PatternGenerator),
    ("repeated", test_data::repeated as PatternGenerator),
    ("text", test_data::text_like as PatternGenerator),
];

fn bench_compress_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_levels");
    let size = 256 * 1024;
    let data = test_data::text_like(size);

    for level in [0u8, 1, 3, 6, 9] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("level_{}", level)),
            &data,
            |b, data| {
                b.iter(|| black_box(zlib_compress(black_box(data), level)));
            },
        );
    }

    group.finish();
}

fn bench_compress_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_strategies");
    let size = 256 * 1024;
    let data = test_data::text_like(size);

    for strategy in CompressionStrategy::ALL {
        let config = EncoderConfig::default().with_strategy(strategy);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", strategy)),
            &data,
            |b, data| {
                b.iter(|| black_box(zlib_compress_with(black_box(data), config)));
            },
        );
    }

    group.finish();
}

fn bench_decompress_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress_patterns");
    let size = 256 * 1024;

    for (pattern_name, generator) in PATTERNS {
        let data = generator(size);
        let Ok(compressed) = zlib_compress(&data, 6) else {
            continue;
        };

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern_name),
            &compressed,
            |b, compressed| {
                b.iter(|| black_box(zlib_decompress(black_box(compressed))));
            },
        );
    }

    group.finish();
}

fn bench_small_buffers(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_buffer_size");
    let size = 64 * 1024;
    let data = test_data::text_like(size);

    for buffer_size in [16usize, 256, 4096] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("buffer_{}", buffer_size)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut encoder = ZlibEncoder::new(CompressionLevel::DEFAULT);
                    let mut out = vec![0u8; buffer_size];
                    let mut pos = 0;
                    let mut total = 0;
                    loop {
                        let Ok((consumed, produced, status)) =
                            encoder.compress(&data[pos..], &mut out, FlushMode::Finish)
                        else {
                            break;
                        };
                        pos += consumed;
                        total += produced;
                        if status == CompressStatus::Done {
                            break;
                        }
                    }
                    black_box(total)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compress_levels,
    bench_compress_strategies,
    bench_decompress_patterns,
    bench_small_buffers,
);
criterion_main!(benches);
