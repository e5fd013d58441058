//! # zlibstream Core
//!
//! Core components for the zlibstream codec.
//!
//! This crate provides the building blocks shared by the compressor and the
//! decompressor:
//!
//! - [`bitstream`]: Resumable bit-level I/O (LSB-first)
//! - [`window`]: 32 KiB history window for back-references
//! - [`adler32`]: Adler-32 checksum
//! - [`traits`]: Streaming traits and configuration values
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Wrapper                                             │
//! │     zlib header/trailer, sessions, io adapters          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE encoder (LZ77+Huffman), INFLATE decoder     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, HistoryWindow, Adler-32        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use zlibstream_core::adler32::Adler32;
//! use zlibstream_core::bitstream::BitReader;
//!
//! let data = [0xAB, 0xCD];
//! let mut reader = BitReader::new();
//! assert_eq!(reader.read_bits(&data, 12), Some(0xDAB));
//!
//! assert_eq!(Adler32::checksum(b"Wikipedia"), 0x11E60398);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adler32;
pub mod bitstream;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use adler32::Adler32;
pub use bitstream::{BitReader, BitWriter};
pub use error::{Result, ZlibError};
pub use traits::{
    CompressStatus, CompressionLevel, CompressionStrategy, Compressor, DecompressStatus,
    Decompressor, FlushMode, StreamState,
};
pub use window::HistoryWindow;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adler32::Adler32;
    pub use crate::error::{Result, ZlibError};
    pub use crate::traits::{
        CompressStatus, CompressionLevel, CompressionStrategy, Compressor, DecompressStatus,
        Decompressor, FlushMode,
    };
}
