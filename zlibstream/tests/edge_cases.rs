//! Edge case tests for zlib and DEFLATE streams.

use zlibstream::tables::{fixed_distance_codes, fixed_litlen_codes};
use zlibstream::{
    Adler32, CompressStatus, CompressionLevel, CompressionStrategy, Compressor, DecompressStatus,
    Decompressor, DeflateEncoder, EncoderConfig, FlushMode, InflateDecoder, ZlibDecoder,
    ZlibEncoder, ZlibError, deflate, inflate, zlib_compress, zlib_compress_with, zlib_decompress,
    zlib_decompress_with_dict,
};
use zlibstream_core::bitstream::BitWriter;

fn text(len: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn noise(len: usize, mut seed: u32) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            (seed >> 16) as u8
        })
        .collect()
}

/// Mixed data: text, a long zero run, noise.
fn mixed(len: usize) -> Vec<u8> {
    let mut data = text(len / 2);
    data.extend(std::iter::repeat_n(0u8, len / 4));
    data.extend(noise(len - data.len(), 7));
    data
}

fn all_configs() -> Vec<EncoderConfig> {
    let mut configs = Vec::new();
    for level in 0..=9 {
        for strategy in CompressionStrategy::ALL {
            configs.push(
                EncoderConfig::new(CompressionLevel::new(level)).with_strategy(strategy),
            );
        }
    }
    configs
}

/// Compress with `input_chunk`-sized input pieces and an `output_chunk`-sized buffer.
fn compress_chunked(
    data: &[u8],
    mut encoder: ZlibEncoder,
    input_chunk: usize,
    output_chunk: usize,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; output_chunk];
    let mut pos = 0;
    loop {
        let end = (pos + input_chunk).min(data.len());
        let flush = if end == data.len() {
            FlushMode::Finish
        } else {
            FlushMode::None
        };
        let (consumed, produced, status) =
            encoder.compress(&data[pos..end], &mut buf, flush).unwrap();
        pos += consumed;
        out.extend_from_slice(&buf[..produced]);
        if status == CompressStatus::Done {
            return out;
        }
    }
}

fn decompress_chunked(compressed: &[u8], input_chunk: usize, output_chunk: usize) -> Vec<u8> {
    let mut decoder = ZlibDecoder::new();
    let mut out = Vec::new();
    let mut buf = vec![0u8; output_chunk];
    let mut pos = 0;
    loop {
        let end = (pos + input_chunk).min(compressed.len());
        let (consumed, produced, status) =
            decoder.decompress(&compressed[pos..end], &mut buf).unwrap();
        pos += consumed;
        out.extend_from_slice(&buf[..produced]);
        match status {
            DecompressStatus::Done => return out,
            DecompressStatus::NeedsInput => assert!(end < compressed.len(), "stream truncated"),
            DecompressStatus::NeedsOutput => {}
            DecompressStatus::NeedsDictionary(id) => panic!("unexpected dictionary {:08x}", id),
        }
    }
}

#[test]
fn test_empty_input_every_config() {
    for config in all_configs() {
        let compressed = zlib_compress_with(b"", config).unwrap();
        assert_eq!(zlib_decompress(&compressed).unwrap(), b"", "{:?}", config);
    }
}

#[test]
fn test_single_byte_every_config() {
    for config in all_configs() {
        let compressed = zlib_compress_with(b"A", config).unwrap();
        assert_eq!(zlib_decompress(&compressed).unwrap(), b"A", "{:?}", config);
    }
}

#[test]
fn test_large_input_every_config() {
    let data = mixed(70_000);
    for config in all_configs() {
        let compressed = zlib_compress_with(&data, config).unwrap();
        assert_eq!(zlib_decompress(&compressed).unwrap(), data, "{:?}", config);
    }
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_all_same_byte_rle() {
    let input = vec![255u8; 5000];
    let config = EncoderConfig::default().with_strategy(CompressionStrategy::Rle);
    let compressed = zlib_compress_with(&input, config).unwrap();
    assert_eq!(zlib_decompress(&compressed).unwrap(), input);
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_max_match_length() {
    let input = vec![42u8; 258 * 10 + 1];
    let compressed = deflate(&input, 9).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_long_distance_match() {
    let mut input = vec![0u8; 32768];
    let pattern = b"PATTERN_TO_MATCH";
    input[..pattern.len()].copy_from_slice(pattern);
    input[32768 - pattern.len()..].copy_from_slice(pattern);

    for level in [1, 6, 9] {
        let compressed = deflate(&input, level).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input, "level {}", level);
    }
}

#[test]
fn test_binary_data() {
    let input: Vec<u8> = (0..=255).cycle().take(5000).collect();
    let compressed = zlib_compress(&input, 6).unwrap();
    assert_eq!(zlib_decompress(&compressed).unwrap(), input);
}

#[test]
fn test_compress_chunking_invariance() {
    let data = mixed(100_000);
    for level in [1u8, 4, 6, 9] {
        let config = EncoderConfig::new(CompressionLevel::new(level));
        let one_shot = zlib_compress_with(&data, config).unwrap();
        for (input_chunk, output_chunk) in [(1, 7), (333, 1), (4096, 65536), (100_000, 3)] {
            let encoder = ZlibEncoder::with_config(config).unwrap();
            assert_eq!(
                compress_chunked(&data, encoder, input_chunk, output_chunk),
                one_shot,
                "level {} chunks ({}, {})",
                level,
                input_chunk,
                output_chunk
            );
        }
    }
}

#[test]
fn test_compress_chunking_invariance_strategies() {
    let data = mixed(20_000);
    for level in [1u8, 6, 9] {
        for strategy in CompressionStrategy::ALL {
            for window_bits in [9u8, 11, 15] {
                let config = EncoderConfig::new(CompressionLevel::new(level))
                    .with_strategy(strategy)
                    .with_window_bits(window_bits);
                let one_shot = zlib_compress_with(&data, config).unwrap();
                for (input_chunk, output_chunk) in [(1, 5), (263, 1), (7777, 100)] {
                    let encoder = ZlibEncoder::with_config(config).unwrap();
                    assert_eq!(
                        compress_chunked(&data, encoder, input_chunk, output_chunk),
                        one_shot,
                        "{:?} chunks ({}, {})",
                        config,
                        input_chunk,
                        output_chunk
                    );
                }
            }
        }
    }
}

#[test]
fn test_dictionary_chunking_invariance() {
    let dictionary = text(1500);
    let data = mixed(20_000);
    for strategy in CompressionStrategy::ALL {
        for window_bits in [9u8, 15] {
            let config = EncoderConfig::new(CompressionLevel::new(6))
                .with_strategy(strategy)
                .with_window_bits(window_bits);
            let one_shot = ZlibEncoder::with_dictionary(config, &dictionary)
                .unwrap()
                .compress_all(&data)
                .unwrap();
            assert_eq!(
                zlib_decompress_with_dict(&one_shot, &dictionary).unwrap(),
                data
            );
            for (input_chunk, output_chunk) in [(1, 5), (263, 1), (7777, 100)] {
                let encoder = ZlibEncoder::with_dictionary(config, &dictionary).unwrap();
                assert_eq!(
                    compress_chunked(&data, encoder, input_chunk, output_chunk),
                    one_shot,
                    "{:?} chunks ({}, {})",
                    config,
                    input_chunk,
                    output_chunk
                );
            }
        }
    }
}

#[test]
fn test_decompress_chunking_invariance() {
    let data = mixed(50_000);
    let compressed = zlib_compress(&data, 6).unwrap();
    for (input_chunk, output_chunk) in [(1, 1), (1, 65536), (13, 7), (compressed.len(), 1)] {
        assert_eq!(
            decompress_chunked(&compressed, input_chunk, output_chunk),
            data,
            "chunks ({}, {})",
            input_chunk,
            output_chunk
        );
    }
}

#[test]
fn test_trailer_corruption_detected() {
    let data = text(2000);
    let compressed = zlib_compress(&data, 6).unwrap();
    for back in 1..=4 {
        let mut corrupt = compressed.clone();
        let index = corrupt.len() - back;
        corrupt[index] ^= 0x01;
        assert!(
            matches!(
                zlib_decompress(&corrupt),
                Err(ZlibError::ChecksumMismatch { .. })
            ),
            "trailer byte -{}",
            back
        );
    }
}

#[test]
fn test_header_corruption_detected() {
    let mut compressed = zlib_compress(b"header", 6).unwrap();
    compressed[1] ^= 0x01;
    assert!(matches!(
        zlib_decompress(&compressed),
        Err(ZlibError::InvalidHeader { .. })
    ));
}

#[test]
fn test_stored_size_bound() {
    for len in [0usize, 1, 65535, 65536, 200_000] {
        let data = noise(len, 11);
        let compressed = zlib_compress(&data, 0).unwrap();
        let blocks = len.div_ceil(65535).max(1);
        assert!(
            compressed.len() <= len + 5 * blocks + 6,
            "len {} gave {}",
            len,
            compressed.len()
        );
        assert_eq!(zlib_decompress(&compressed).unwrap(), data);
    }
}

#[test]
fn test_incompressible_size_bound() {
    let data = noise(150_000, 3);
    for strategy in CompressionStrategy::ALL {
        let config = EncoderConfig::default().with_strategy(strategy);
        let compressed = zlib_compress_with(&data, config).unwrap();
        let blocks = data.len().div_ceil(16384);
        assert!(
            compressed.len() <= data.len() + 5 * blocks + 6 + 5,
            "{:?} gave {}",
            strategy,
            compressed.len()
        );
    }
}

#[test]
fn test_distance_too_far_back() {
    // zlib header, then a fixed block: literal 'a', length 3 at distance 2.
    let codes = fixed_litlen_codes();
    let mut writer = BitWriter::new();
    writer.write_bytes(&[0x78, 0x01]);
    writer.write_bits(1, 1);
    writer.write_bits(1, 2);
    writer.write_bits(u32::from(codes[usize::from(b'a')]), 8);
    writer.write_bits(u32::from(codes[257]), 7);
    writer.write_bits(u32::from(fixed_distance_codes()[1]), 5);
    writer.write_bits(u32::from(codes[256]), 7);
    writer.align_to_byte();
    let mut stream = vec![0u8; writer.pending_len()];
    writer.drain_into(&mut stream);

    assert!(matches!(
        zlib_decompress(&stream),
        Err(ZlibError::InvalidBackReference { .. })
    ));
}

#[test]
fn test_reset_is_idempotent() {
    let data = mixed(30_000);
    let mut encoder = ZlibEncoder::new(CompressionLevel::new(5));
    let first = encoder.compress_all(&data).unwrap();
    encoder.reset();
    encoder.reset();
    assert_eq!(encoder.compress_all(&data).unwrap(), first);

    let mut decoder = ZlibDecoder::new();
    assert_eq!(decoder.decompress_all(&first).unwrap(), data);
    decoder.reset();
    assert_eq!(decoder.decompress_all(&first).unwrap(), data);
    assert_eq!(decoder.adler32(), Adler32::checksum(&data));
}

#[test]
fn test_sync_flush_prefix_decodes() {
    let part = text(5000);
    let mut encoder = ZlibEncoder::new(CompressionLevel::DEFAULT);
    let mut buf = vec![0u8; 16384];
    let (consumed, produced, status) =
        encoder.compress(&part, &mut buf, FlushMode::Sync).unwrap();
    assert_eq!(consumed, part.len());
    assert_eq!(status, CompressStatus::NeedsInput);
    let prefix = &buf[..produced];
    assert_eq!(&prefix[produced - 4..], &[0x00, 0x00, 0xFF, 0xFF]);

    let mut decoder = ZlibDecoder::new();
    let mut out = vec![0u8; 16384];
    let (used, written, status) = decoder.decompress(prefix, &mut out).unwrap();
    assert_eq!(used, prefix.len());
    assert_eq!(status, DecompressStatus::NeedsInput);
    assert_eq!(&out[..written], part.as_slice());
}

#[test]
fn test_full_flush_forgets_history() {
    let part = text(3000);
    let mut encoder = DeflateEncoder::new(CompressionLevel::DEFAULT);
    let mut buf = vec![0u8; 16384];
    let (_, head_len, _) = encoder.compress(&part, &mut buf, FlushMode::Full).unwrap();
    assert_eq!(&buf[head_len - 4..head_len], &[0x00, 0x00, 0xFF, 0xFF]);

    let (_, tail_len, status) = encoder
        .compress(&part, &mut buf[head_len..], FlushMode::Finish)
        .unwrap();
    assert_eq!(status, CompressStatus::Done);

    // The tail stands alone: nothing in it refers back past the flush.
    let tail = &buf[head_len..head_len + tail_len];
    assert_eq!(inflate(tail).unwrap(), part);

    let mut whole = part.clone();
    whole.extend_from_slice(&part);
    assert_eq!(inflate(&buf[..head_len + tail_len]).unwrap(), whole);
}

#[test]
fn test_stream_ends_mid_input() {
    let mut stream = zlib_compress(b"first", 6).unwrap();
    let first_len = stream.len();
    stream.extend_from_slice(&zlib_compress(b"second", 6).unwrap());

    let mut decoder = ZlibDecoder::new();
    let mut out = vec![0u8; 64];
    let (consumed, produced, status) = decoder.decompress(&stream, &mut out).unwrap();
    assert_eq!(status, DecompressStatus::Done);
    assert_eq!(consumed, first_len);
    assert_eq!(&out[..produced], b"first");

    decoder.reset();
    let (_, produced, status) = decoder.decompress(&stream[consumed..], &mut out).unwrap();
    assert_eq!(status, DecompressStatus::Done);
    assert_eq!(&out[..produced], b"second");
}

#[test]
fn test_raw_inflate_reports_totals() {
    let data = text(10_000);
    let compressed = deflate(&data, 6).unwrap();
    let mut decoder = InflateDecoder::new();
    assert_eq!(decoder.decompress_all(&compressed).unwrap(), data);
    assert!(decoder.is_done());
    assert_eq!(decoder.total_out(), data.len() as u64);
}
