//! Streaming traits and the configuration values shared by both directions.
//!
//! Every codec in the workspace works the same way: the caller passes an
//! input slice and an output slice, and gets back
//! `(bytes consumed, bytes produced, status)`. Nothing is buffered on the
//! caller's behalf beyond what a session needs to resume.

use crate::error::{Result, ZlibError};

/// What a decompression call needs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// All input was consumed; supply more to continue.
    NeedsInput,
    /// The output buffer is full; supply more space to continue.
    NeedsOutput,
    /// The stream declares a preset dictionary with this Adler-32 DICTID.
    NeedsDictionary(u32),
    /// The stream is complete.
    Done,
}

/// What a compression call needs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStatus {
    /// All input was absorbed; supply more or flush.
    NeedsInput,
    /// The output buffer is full; call again with more space.
    NeedsOutput,
    /// The stream is complete and fully drained.
    Done,
}

/// How much of the buffered input a compression call must push out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Hold data back to build larger blocks.
    #[default]
    None,
    /// Sync flush - end the block and byte-align with an empty stored block.
    Sync,
    /// Full flush - sync flush and forget match history.
    Full,
    /// Finish - emit the final block and trailer.
    Finish,
}

/// Lifecycle of a compression or decompression session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Header not yet written or read.
    #[default]
    Idle,
    /// Compressing block data.
    Encoding,
    /// Decompressing block data.
    Decoding,
    /// Final block done; trailer pending.
    Finishing,
    /// Stream complete.
    Done,
    /// A failure occurred; only `reset` leaves this state.
    Error,
}

/// A resumable decoder.
pub trait Decompressor {
    /// Decode as much of `input` into `output` as possible.
    ///
    /// # Returns
    ///
    /// `(bytes consumed, bytes produced, status)`
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// Return to the state right after construction, keeping the settings.
    fn reset(&mut self);

    /// True once the end of the stream has been reached.
    fn is_finished(&self) -> bool;

    /// Decompress a complete stream held in memory.
    ///
    /// Fails with `UnexpectedEof` if `input` ends before the stream does and
    /// with `DictionaryRequired` if the stream needs a preset dictionary.
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) =
                self.decompress(&input[input_pos..], &mut buffer)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            match status {
                DecompressStatus::Done => break,
                DecompressStatus::NeedsDictionary(id) => {
                    return Err(ZlibError::DictionaryRequired { id });
                }
                DecompressStatus::NeedsInput if input_pos >= input.len() => {
                    return Err(ZlibError::unexpected_eof("compressed stream truncated"));
                }
                DecompressStatus::NeedsOutput | DecompressStatus::NeedsInput => continue,
            }
        }

        Ok(output)
    }
}

/// A resumable encoder.
pub trait Compressor {
    /// Encode as much of `input` into `output` as `flush` allows.
    ///
    /// # Returns
    ///
    /// `(bytes consumed, bytes produced, status)`
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)>;

    /// Return to the state right after construction, keeping the settings.
    fn reset(&mut self);

    /// True once the final block and any trailer have been handed out.
    fn is_finished(&self) -> bool;

    /// Compress a whole buffer and finish the stream.
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) =
                self.compress(&input[input_pos..], &mut buffer, FlushMode::Finish)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            if status == CompressStatus::Done {
                break;
            }
        }

        Ok(output)
    }
}

/// Compression level, clamped to 0-9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Stored blocks only.
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// zlib's default trade-off.
    pub const DEFAULT: Self = Self(6);
    /// Smallest output, slowest matching.
    pub const BEST: Self = Self(9);

    /// Create a compression level, clamping to 9.
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Create a compression level, rejecting anything outside 0..=9.
    ///
    /// `-1` selects the default level, as zlib does.
    pub fn try_new(level: i32) -> Result<Self> {
        match level {
            -1 => Ok(Self::DEFAULT),
            0..=9 => Ok(Self(level as u8)),
            _ => Err(ZlibError::InvalidLevel { level }),
        }
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

/// How the encoder searches for matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum CompressionStrategy {
    /// Normal LZ77 matching for the level.
    #[default]
    Default = 0,
    /// Favour literals: short matches are dropped. Suits filtered image data.
    Filtered = 1,
    /// Huffman coding only, no matches.
    HuffmanOnly = 2,
    /// Only distance-1 matches (run-length encoding).
    Rle = 3,
}

impl CompressionStrategy {
    /// All strategies, in numeric order.
    pub const ALL: [Self; 4] = [Self::Default, Self::Filtered, Self::HuffmanOnly, Self::Rle];
}

impl TryFrom<i32> for CompressionStrategy {
    type Error = ZlibError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Default),
            1 => Ok(Self::Filtered),
            2 => Ok(Self::HuffmanOnly),
            3 => Ok(Self::Rle),
            _ => Err(ZlibError::InvalidStrategy { value }),
        }
    }
}

impl From<CompressionStrategy> for i32 {
    fn from(strategy: CompressionStrategy) -> Self {
        strategy as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level() {
        assert_eq!(CompressionLevel::NONE.level(), 0);
        assert_eq!(CompressionLevel::FAST.level(), 1);
        assert_eq!(CompressionLevel::DEFAULT.level(), 6);
        assert_eq!(CompressionLevel::BEST.level(), 9);

        // Test clamping
        assert_eq!(CompressionLevel::new(100).level(), 9);
    }

    #[test]
    fn test_compression_level_validation() {
        assert_eq!(CompressionLevel::try_new(4).unwrap().level(), 4);
        assert_eq!(CompressionLevel::try_new(-1).unwrap(), CompressionLevel::DEFAULT);
        assert!(matches!(
            CompressionLevel::try_new(10),
            Err(ZlibError::InvalidLevel { level: 10 })
        ));
        assert!(CompressionLevel::try_new(-2).is_err());
    }

    #[test]
    fn test_strategy_conversions() {
        for strategy in CompressionStrategy::ALL {
            let value: i32 = strategy.into();
            assert_eq!(CompressionStrategy::try_from(value).unwrap(), strategy);
        }
        assert_eq!(i32::from(CompressionStrategy::Rle), 3);
        assert!(matches!(
            CompressionStrategy::try_from(4),
            Err(ZlibError::InvalidStrategy { value: 4 })
        ));
        assert_eq!(CompressionStrategy::default(), CompressionStrategy::Default);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(FlushMode::default(), FlushMode::None);
        assert_eq!(StreamState::default(), StreamState::Idle);
    }

    struct OneShot {
        data: Vec<u8>,
        done: bool,
    }

    impl Decompressor for OneShot {
        fn decompress(
            &mut self,
            input: &[u8],
            output: &mut [u8],
        ) -> Result<(usize, usize, DecompressStatus)> {
            // Treats input as a stream of 4 bytes that expands to `data`.
            if input.len() < 4 {
                return Ok((input.len(), 0, DecompressStatus::NeedsInput));
            }
            output[..self.data.len()].copy_from_slice(&self.data);
            self.done = true;
            Ok((4, self.data.len(), DecompressStatus::Done))
        }

        fn reset(&mut self) {
            self.done = false;
        }

        fn is_finished(&self) -> bool {
            self.done
        }
    }

    #[test]
    fn test_decompress_all_reports_truncation() {
        let mut d = OneShot {
            data: b"xyz".to_vec(),
            done: false,
        };
        assert_eq!(d.decompress_all(&[0; 4]).unwrap(), b"xyz");
        assert!(d.is_finished());

        d.reset();
        assert!(matches!(
            d.decompress_all(&[0; 2]),
            Err(ZlibError::UnexpectedEof { .. })
        ));
    }
}
