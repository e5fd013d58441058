//! # zlibstream
//!
//! Pure Rust streaming implementation of the zlib format (RFC 1950) and the
//! DEFLATE compression algorithm (RFC 1951).
//!
//! Every codec here is resumable: the caller hands over an input slice and
//! an output slice and gets back how much of each was used, plus a status
//! saying what is needed next. Buffers of any size (down to a single byte)
//! produce the same compressed bytes.
//!
//! ## Features
//!
//! - **Decompression**: Full support for all DEFLATE block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - **Compression**: LZ77 + Huffman encoding
//!   - Compression levels 0-9 with greedy and lazy matching
//!   - Strategies: default, filtered, Huffman-only, run-length
//!   - Per-block choice of stored, fixed or dynamic codes
//!   - Sync and full flush
//! - **zlib framing**: header, preset dictionaries, Adler-32 trailer
//! - **`std::io` adapters**: [`ZlibReader`] and [`ZlibWriter`]
//!
//! ## Example
//!
//! ```rust
//! use zlibstream::{zlib_compress, zlib_decompress};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = zlib_compress(original, 6).unwrap();
//!
//! let decompressed = zlib_decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use zlibstream::{CompressStatus, CompressionLevel, Compressor, FlushMode, ZlibEncoder};
//!
//! let mut encoder = ZlibEncoder::new(CompressionLevel::BEST);
//! let mut out = [0u8; 64];
//! let (consumed, produced, status) = encoder
//!     .compress(b"abcabcabc", &mut out, FlushMode::Finish)
//!     .unwrap();
//! assert_eq!(consumed, 9);
//! assert_eq!(status, CompressStatus::Done);
//! assert_eq!(&out[..2], &[0x78, 0xDA]);
//! # let _ = produced;
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast compression (greedy matching)
//! - Level 4-6: Balanced (default is 6)
//! - Level 7-9: Best compression (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod io;
pub mod matcher;
pub mod tables;
pub mod zlib;

// Re-exports
pub use config::{DecoderConfig, EncoderConfig, Format};
pub use deflate::{DeflateEncoder, deflate, deflate_with};
pub use huffman::{HuffmanBuilder, HuffmanTree};
pub use inflate::{InflateDecoder, inflate, inflate_with_dictionary};
pub use io::{ZlibReader, ZlibWriter};
pub use zlib::{
    ZlibDecoder, ZlibEncoder, zlib_compress, zlib_compress_with, zlib_compress_with_dict,
    zlib_decompress, zlib_decompress_with_dict, zlib_requires_dictionary,
};
pub use zlibstream_core::{
    Adler32, CompressStatus, CompressionLevel, CompressionStrategy, Compressor, DecompressStatus,
    Decompressor, FlushMode, Result, StreamState, ZlibError,
};
