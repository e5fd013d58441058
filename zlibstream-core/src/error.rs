//! Error types for zlibstream operations.
//!
//! Every failure a compression or decompression session can report is a
//! variant of [`ZlibError`]. Recoverable conditions such as "more input
//! needed" are statuses, not errors, and live in [`crate::traits`].

use std::io;
use thiserror::Error;

/// The main error type for zlibstream operations.
#[derive(Debug, Error)]
pub enum ZlibError {
    /// I/O error from an underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zlib header is malformed or uses an unsupported method.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// A DEFLATE block header declared the reserved block type 3.
    #[error("Invalid block type {block_type}")]
    InvalidBlockType {
        /// The block type bits that were read.
        block_type: u8,
    },

    /// A Huffman code description is over-subscribed, incomplete or otherwise unusable.
    #[error("Invalid code table: {message}")]
    InvalidCodeTable {
        /// Description of the table error.
        message: String,
    },

    /// A decoded symbol does not map to any valid code.
    #[error("Invalid symbol {symbol} at bit position {bit_position}")]
    InvalidSymbol {
        /// The offending symbol value (or raw code bits when no symbol matched).
        symbol: u32,
        /// Bit position in the compressed stream.
        bit_position: u64,
    },

    /// A back-reference points before the start of the available history.
    #[error("Invalid back-reference distance: {distance} exceeds available history {available}")]
    InvalidBackReference {
        /// The distance that was decoded.
        distance: usize,
        /// How much history was actually available.
        available: usize,
    },

    /// A stored block's LEN and NLEN fields are not complements.
    #[error("Stored block length mismatch: len {len:#06x}, nlen {nlen:#06x}")]
    StoredLengthMismatch {
        /// Stored LEN field.
        len: u16,
        /// Stored NLEN field.
        nlen: u16,
    },

    /// The Adler-32 trailer does not match the decompressed data.
    #[error("Checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the stream trailer.
        expected: u32,
        /// Checksum computed over the produced data.
        computed: u32,
    },

    /// A supplied preset dictionary does not match the stream's DICTID.
    #[error("Dictionary mismatch: stream wants {expected:#010x}, got {actual:#010x}")]
    DictionaryMismatch {
        /// DICTID declared in the stream header.
        expected: u32,
        /// Adler-32 of the supplied dictionary.
        actual: u32,
    },

    /// The stream declares a preset dictionary but none was supplied.
    #[error("Stream requires preset dictionary {id:#010x}")]
    DictionaryRequired {
        /// DICTID declared in the stream header.
        id: u32,
    },

    /// The session already completed; call `reset` before reuse.
    #[error("Stream already finished")]
    StreamFinished,

    /// The session failed earlier; call `reset` before reuse.
    #[error("Stream is in an error state")]
    StreamPoisoned,

    /// Compressed input ended before the stream was complete.
    #[error("Unexpected end of input: {context}")]
    UnexpectedEof {
        /// Where in the stream input ran out.
        context: String,
    },

    /// Compression level outside 0..=9.
    #[error("Invalid compression level {level}")]
    InvalidLevel {
        /// The rejected level.
        level: i32,
    },

    /// Strategy value outside the known set.
    #[error("Invalid compression strategy {value}")]
    InvalidStrategy {
        /// The rejected numeric strategy.
        value: i32,
    },

    /// Window size outside the supported range.
    #[error("Invalid window bits {bits}")]
    InvalidWindowBits {
        /// The rejected window size exponent.
        bits: u8,
    },

    /// The byte source cannot be repositioned after the compressed stream.
    #[error("Source is not unpackable: {message}")]
    UnpackableSource {
        /// Why the source could not be unpacked.
        message: String,
    },
}

/// Result type alias for zlibstream operations.
pub type Result<T> = std::result::Result<T, ZlibError>;

impl ZlibError {
    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an invalid block type error.
    pub fn invalid_block_type(block_type: u8) -> Self {
        Self::InvalidBlockType { block_type }
    }

    /// Create an invalid code table error.
    pub fn invalid_code_table(message: impl Into<String>) -> Self {
        Self::InvalidCodeTable {
            message: message.into(),
        }
    }

    /// Create an invalid symbol error.
    pub fn invalid_symbol(symbol: u32, bit_position: u64) -> Self {
        Self::InvalidSymbol {
            symbol,
            bit_position,
        }
    }

    /// Create an invalid back-reference error.
    pub fn invalid_back_reference(distance: usize, available: usize) -> Self {
        Self::InvalidBackReference {
            distance,
            available,
        }
    }

    /// Create a stored length mismatch error.
    pub fn stored_length_mismatch(len: u16, nlen: u16) -> Self {
        Self::StoredLengthMismatch { len, nlen }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }

    /// Create a dictionary mismatch error.
    pub fn dictionary_mismatch(expected: u32, actual: u32) -> Self {
        Self::DictionaryMismatch { expected, actual }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(context: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            context: context.into(),
        }
    }

    /// Create an unpackable source error.
    pub fn unpackable(message: impl Into<String>) -> Self {
        Self::UnpackableSource {
            message: message.into(),
        }
    }

    /// Whether this error came from malformed compressed data.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader { .. }
                | Self::InvalidBlockType { .. }
                | Self::InvalidCodeTable { .. }
                | Self::InvalidSymbol { .. }
                | Self::InvalidBackReference { .. }
                | Self::StoredLengthMismatch { .. }
                | Self::ChecksumMismatch { .. }
        )
    }
}

impl From<ZlibError> for io::Error {
    fn from(err: ZlibError) -> Self {
        match err {
            ZlibError::Io(e) => e,
            ZlibError::UnexpectedEof { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            ZlibError::UnpackableSource { .. } => io::Error::new(io::ErrorKind::Unsupported, err),
            ZlibError::InvalidLevel { .. }
            | ZlibError::InvalidStrategy { .. }
            | ZlibError::InvalidWindowBits { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            other if other.is_data_error() => io::Error::new(io::ErrorKind::InvalidData, other),
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZlibError::checksum_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("Checksum mismatch"));
        assert!(err.to_string().contains("0x12345678"));

        let err = ZlibError::invalid_header("bad FCHECK");
        assert!(err.to_string().contains("bad FCHECK"));

        let err = ZlibError::invalid_back_reference(40000, 10);
        assert!(err.to_string().contains("40000"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ZlibError = io_err.into();
        assert!(matches!(err, ZlibError::Io(_)));
    }

    #[test]
    fn test_into_io_error_kind() {
        let err: io::Error = ZlibError::stored_length_mismatch(1, 1).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err: io::Error = ZlibError::unexpected_eof("trailer").into();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let err: io::Error = ZlibError::unpackable("no seek").into();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);

        let err: io::Error = ZlibError::StreamFinished.into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_data_error_classification() {
        assert!(ZlibError::invalid_block_type(3).is_data_error());
        assert!(!ZlibError::StreamPoisoned.is_data_error());
        assert!(!ZlibError::DictionaryRequired { id: 1 }.is_data_error());
    }
}
