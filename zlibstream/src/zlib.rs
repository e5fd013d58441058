//! Zlib format wrapper for DEFLATE compression.
//!
//! The zlib format (RFC 1950) wraps raw DEFLATE data with a header and
//! an Adler-32 checksum. It is widely used in PNG, HTTP compression, and
//! many other applications.
//!
//! # Format
//!
//! ```text
//! +---+---+=========+============+---+---+---+---+
//! |CMF|FLG|[DICTID] | compressed |    ADLER32    |
//! +---+---+=========+============+---+---+---+---+
//! ```
//!
//! - CMF: Compression Method and Flags
//!   - Bits 0-3: CM (Compression Method) - must be 8 for DEFLATE
//!   - Bits 4-7: CINFO (Compression Info) - log2(window size) - 8
//! - FLG: Flags
//!   - Bits 0-4: FCHECK - check bits so (CMF*256 + FLG) mod 31 == 0
//!   - Bit 5: FDICT - preset dictionary present
//!   - Bits 6-7: FLEVEL - compression level (0-3)
//! - DICTID: Adler-32 of the preset dictionary (big-endian, only with FDICT)
//! - Compressed data (DEFLATE format)
//! - ADLER32: Adler-32 checksum of uncompressed data (big-endian)
//!
//! [`ZlibEncoder`] and [`ZlibDecoder`] are sessions: each owns its engine,
//! checksum and lifecycle state ([`StreamState`]) and can be driven with
//! input and output buffers of any size.

use crate::config::{DecoderConfig, EncoderConfig, Format};
use crate::deflate::DeflateEncoder;
use crate::inflate::InflateDecoder;
use log::debug;
use zlibstream_core::adler32::Adler32;
use zlibstream_core::error::{Result, ZlibError};
use zlibstream_core::traits::{
    CompressStatus, CompressionLevel, CompressionStrategy, Compressor, DecompressStatus,
    Decompressor, FlushMode, StreamState,
};

/// Compression method for DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Preset dictionary flag in FLG.
pub const FDICT: u8 = 0x20;

/// Zlib compression level indicator in header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZlibLevel {
    /// Fastest compression.
    Fastest = 0,
    /// Fast compression.
    Fast = 1,
    /// Default compression.
    Default = 2,
    /// Maximum compression.
    Maximum = 3,
}

impl ZlibLevel {
    /// Header level indicator for a level and strategy.
    pub fn from_settings(level: CompressionLevel, strategy: CompressionStrategy) -> Self {
        if matches!(strategy, CompressionStrategy::HuffmanOnly | CompressionStrategy::Rle) {
            return Self::Fastest;
        }
        match level.level() {
            0..=1 => Self::Fastest,
            2..=5 => Self::Fast,
            6 => Self::Default,
            _ => Self::Maximum,
        }
    }
}

/// Build the 2-byte zlib header.
pub fn zlib_header(config: &EncoderConfig, has_dictionary: bool) -> [u8; 2] {
    let cmf = ((config.window_bits - 8) << 4) | CM_DEFLATE;
    let mut flg = (ZlibLevel::from_settings(config.level, config.strategy) as u8) << 6;
    if has_dictionary {
        flg |= FDICT;
    }
    let check = (u16::from(cmf) * 256 + u16::from(flg)) % 31;
    if check != 0 {
        flg += (31 - check) as u8;
    }
    [cmf, flg]
}

/// Check a 2-byte zlib header. Returns `(window_bits, has_dictionary)`.
pub fn parse_zlib_header(cmf: u8, flg: u8, max_window_bits: u8) -> Result<(u8, bool)> {
    if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
        return Err(ZlibError::invalid_header(format!(
            "header check failed: {:02X} {:02X}",
            cmf, flg
        )));
    }
    let method = cmf & 0x0F;
    if method != CM_DEFLATE {
        return Err(ZlibError::invalid_header(format!(
            "unsupported compression method {}",
            method
        )));
    }
    let window_bits = (cmf >> 4) + 8;
    if window_bits > max_window_bits {
        return Err(ZlibError::invalid_header(format!(
            "window of 2^{} bytes exceeds limit of 2^{}",
            window_bits, max_window_bits
        )));
    }
    Ok((window_bits, flg & FDICT != 0))
}

/// Streaming zlib (or raw DEFLATE) compressor.
#[derive(Debug)]
pub struct ZlibEncoder {
    config: EncoderConfig,
    /// Adler-32 of the preset dictionary, if any.
    dict_id: Option<u32>,
    deflater: DeflateEncoder,
    adler: Adler32,
    state: StreamState,
    total_out: u64,
}

impl ZlibEncoder {
    /// Create a zlib compressor with default settings at `level`.
    pub fn new(level: CompressionLevel) -> Self {
        let config = EncoderConfig::new(level);
        Self::build(config, DeflateEncoder::new(level), None)
    }

    /// Create a compressor from a full configuration.
    pub fn with_config(config: EncoderConfig) -> Result<Self> {
        let config = config.validate()?;
        Ok(Self::build(config, DeflateEncoder::with_config(config)?, None))
    }

    /// Create a compressor primed with a preset dictionary.
    ///
    /// In zlib format the header carries FDICT and the dictionary's Adler-32.
    pub fn with_dictionary(config: EncoderConfig, dictionary: &[u8]) -> Result<Self> {
        let config = config.validate()?;
        let deflater = DeflateEncoder::with_dictionary(config, dictionary)?;
        Ok(Self::build(config, deflater, Some(Adler32::checksum(dictionary))))
    }

    fn build(config: EncoderConfig, deflater: DeflateEncoder, dict_id: Option<u32>) -> Self {
        Self {
            config,
            dict_id,
            deflater,
            adler: Adler32::new(),
            state: StreamState::Idle,
            total_out: 0,
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Input bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.deflater.total_in()
    }

    /// Output bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Adler-32 of the input consumed so far.
    pub fn adler32(&self) -> u32 {
        self.adler.finish()
    }

    fn start(&mut self) {
        if self.config.format == Format::Zlib {
            let header = zlib_header(&self.config, self.dict_id.is_some());
            self.deflater.queue_bytes(&header);
            if let Some(id) = self.dict_id {
                self.deflater.queue_bytes(&id.to_be_bytes());
            }
        }
        self.state = StreamState::Encoding;
    }

    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        if self.state == StreamState::Idle {
            self.start();
        }

        let (consumed, mut produced, status) = self.deflater.compress(input, output, flush)?;
        self.adler.update(&input[..consumed]);

        if self.state == StreamState::Encoding && self.deflater.is_finished() {
            if self.config.format == Format::Zlib {
                let trailer = self.adler.finish().to_be_bytes();
                self.deflater.queue_bytes(&trailer);
            }
            self.state = StreamState::Finishing;
            produced += self.deflater.drain_pending(&mut output[produced..]);
        }

        let status = if self.state == StreamState::Finishing {
            if self.deflater.has_pending() {
                CompressStatus::NeedsOutput
            } else {
                self.state = StreamState::Done;
                debug!(
                    "zlib encoder done: {} bytes in, {} bytes out, adler32 {:08x}",
                    self.total_in(),
                    self.total_out + produced as u64,
                    self.adler.finish()
                );
                CompressStatus::Done
            }
        } else {
            status
        };

        self.total_out += produced as u64;
        Ok((consumed, produced, status))
    }
}

impl Default for ZlibEncoder {
    fn default() -> Self {
        Self::new(CompressionLevel::DEFAULT)
    }
}

impl Compressor for ZlibEncoder {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        match self.state {
            StreamState::Done => return Err(ZlibError::StreamFinished),
            StreamState::Error => return Err(ZlibError::StreamPoisoned),
            _ => {}
        }
        self.step(input, output, flush).inspect_err(|e| {
            debug!("zlib encoder failed: {}", e);
            self.state = StreamState::Error;
        })
    }

    fn reset(&mut self) {
        self.deflater.reset();
        self.adler.reset();
        self.state = StreamState::Idle;
        self.total_out = 0;
    }

    fn is_finished(&self) -> bool {
        self.state == StreamState::Done
    }
}

/// Streaming zlib (or raw DEFLATE) decompressor.
#[derive(Debug)]
pub struct ZlibDecoder {
    config: DecoderConfig,
    inflater: InflateDecoder,
    adler: Adler32,
    state: StreamState,
    /// CMF, FLG and DICTID as they arrive.
    header: [u8; 6],
    header_len: usize,
    /// DICTID of a dictionary the caller still has to supply.
    awaiting_dictionary: Option<u32>,
    trailer: [u8; 4],
    trailer_len: usize,
    /// Bytes counted as consumed that lie past the end of the stream.
    overread: usize,
    total_in: u64,
    total_out: u64,
}

impl ZlibDecoder {
    /// Create a zlib decompressor.
    pub fn new() -> Self {
        Self::build(DecoderConfig::default())
    }

    /// Create a decompressor from a full configuration.
    pub fn with_config(config: DecoderConfig) -> Result<Self> {
        Ok(Self::build(config.validate()?))
    }

    /// Create a zlib decompressor that answers FDICT with `dictionary`.
    pub fn with_dictionary(dictionary: &[u8]) -> Self {
        Self::build(DecoderConfig::default().with_dictionary(dictionary))
    }

    fn build(config: DecoderConfig) -> Self {
        Self {
            config,
            inflater: InflateDecoder::new(),
            adler: Adler32::new(),
            state: StreamState::Idle,
            header: [0; 6],
            header_len: 0,
            awaiting_dictionary: None,
            trailer: [0; 4],
            trailer_len: 0,
            overread: 0,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Input bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Output bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Adler-32 of the output produced so far.
    pub fn adler32(&self) -> u32 {
        self.adler.finish()
    }

    /// Bytes reported as consumed that actually follow the end of the stream.
    ///
    /// Non-zero only once the stream is done, and only when a call that
    /// ended with a full output buffer had already read past the final block.
    pub fn overread(&self) -> usize {
        self.overread
    }

    /// Supply the preset dictionary after `NeedsDictionary`.
    ///
    /// For raw streams the dictionary may be supplied before any output.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        match self.awaiting_dictionary {
            Some(expected) => {
                let actual = Adler32::checksum(dictionary);
                if actual != expected {
                    return Err(ZlibError::dictionary_mismatch(expected, actual));
                }
                self.inflater.set_dictionary(dictionary);
                self.awaiting_dictionary = None;
                Ok(())
            }
            None if self.config.format == Format::Raw && self.total_out == 0 => {
                self.inflater.set_dictionary(dictionary);
                Ok(())
            }
            None => Err(ZlibError::invalid_header(
                "stream did not ask for a preset dictionary",
            )),
        }
    }

    /// Take header bytes. Returns false if more input is needed.
    fn read_header(&mut self, input: &[u8], consumed: &mut usize) -> Result<bool> {
        if self.config.format == Format::Raw {
            self.inflater.set_window_bits(self.config.max_window_bits);
            if let Some(dictionary) = &self.config.dictionary {
                self.inflater.set_dictionary(dictionary);
            }
            self.state = StreamState::Decoding;
            return Ok(true);
        }

        let mut needed = 2;
        loop {
            while self.header_len < needed {
                let Some(&byte) = input.get(*consumed) else {
                    return Ok(false);
                };
                self.header[self.header_len] = byte;
                self.header_len += 1;
                *consumed += 1;
            }
            if needed == 6 {
                break;
            }

            let (window_bits, has_dictionary) =
                parse_zlib_header(self.header[0], self.header[1], self.config.max_window_bits)?;
            self.inflater.set_window_bits(window_bits);
            if !has_dictionary {
                break;
            }
            needed = 6;
        }

        if self.header_len == 6 {
            let id = u32::from_be_bytes([
                self.header[2],
                self.header[3],
                self.header[4],
                self.header[5],
            ]);
            match &self.config.dictionary {
                Some(dictionary) => {
                    let actual = Adler32::checksum(dictionary);
                    if actual != id {
                        return Err(ZlibError::dictionary_mismatch(id, actual));
                    }
                    self.inflater.set_dictionary(dictionary);
                }
                None => self.awaiting_dictionary = Some(id),
            }
        }

        debug!(
            "zlib header: {:02X} {:02X}, dictionary={}",
            self.header[0],
            self.header[1],
            self.header_len == 6
        );
        self.state = StreamState::Decoding;
        Ok(true)
    }

    /// Move bytes the inflater read past the final block into the trailer.
    fn collect_leftover(&mut self) {
        for byte in self.inflater.take_unused_bytes() {
            if self.config.format == Format::Zlib && self.trailer_len < 4 {
                self.trailer[self.trailer_len] = byte;
                self.trailer_len += 1;
            } else {
                self.overread += 1;
            }
        }
    }

    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let mut consumed = 0;
        let mut produced = 0;

        if self.state == StreamState::Idle && !self.read_header(input, &mut consumed)? {
            return Ok((consumed, 0, DecompressStatus::NeedsInput));
        }
        if let Some(id) = self.awaiting_dictionary {
            return Ok((consumed, 0, DecompressStatus::NeedsDictionary(id)));
        }

        if self.state == StreamState::Decoding {
            let (c, p, status) = self.inflater.decompress(&input[consumed..], output)?;
            self.adler.update(&output[..p]);
            consumed += c;
            produced += p;
            if status != DecompressStatus::Done {
                return Ok((consumed, produced, status));
            }
            self.state = StreamState::Finishing;
            self.collect_leftover();
        }

        if self.config.format == Format::Zlib {
            while self.trailer_len < 4 {
                let Some(&byte) = input.get(consumed) else {
                    return Ok((consumed, produced, DecompressStatus::NeedsInput));
                };
                self.trailer[self.trailer_len] = byte;
                self.trailer_len += 1;
                consumed += 1;
            }
            let expected = u32::from_be_bytes(self.trailer);
            let computed = self.adler.finish();
            if expected != computed {
                return Err(ZlibError::checksum_mismatch(expected, computed));
            }
        }

        self.state = StreamState::Done;
        debug!(
            "zlib decoder done: {} bytes in, {} bytes out",
            self.total_in + consumed as u64,
            self.total_out + produced as u64
        );
        Ok((consumed, produced, DecompressStatus::Done))
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for ZlibDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        match self.state {
            StreamState::Done => return Err(ZlibError::StreamFinished),
            StreamState::Error => return Err(ZlibError::StreamPoisoned),
            _ => {}
        }
        let (consumed, produced, status) = self.step(input, output).inspect_err(|e| {
            debug!("zlib decoder failed: {}", e);
            self.state = StreamState::Error;
        })?;
        self.total_in += consumed as u64;
        self.total_out += produced as u64;
        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        *self = Self::build(self.config.clone());
    }

    fn is_finished(&self) -> bool {
        self.state == StreamState::Done
    }
}

/// Compress data in zlib format at `level` (0-9).
pub fn zlib_compress(input: &[u8], level: u8) -> Result<Vec<u8>> {
    ZlibEncoder::new(CompressionLevel::new(level)).compress_all(input)
}

/// Compress data with full settings (format, strategy, window size).
pub fn zlib_compress_with(input: &[u8], config: EncoderConfig) -> Result<Vec<u8>> {
    ZlibEncoder::with_config(config)?.compress_all(input)
}

/// Compress data in zlib format against a preset dictionary.
pub fn zlib_compress_with_dict(input: &[u8], level: u8, dictionary: &[u8]) -> Result<Vec<u8>> {
    let config = EncoderConfig::new(CompressionLevel::new(level));
    ZlibEncoder::with_dictionary(config, dictionary)?.compress_all(input)
}

/// Decompress a complete zlib stream.
pub fn zlib_decompress(input: &[u8]) -> Result<Vec<u8>> {
    ZlibDecoder::new().decompress_all(input)
}

/// Decompress a complete zlib stream that may use a preset dictionary.
pub fn zlib_decompress_with_dict(input: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
    ZlibDecoder::with_dictionary(dictionary).decompress_all(input)
}

/// The DICTID a zlib stream needs, or `None` if it needs no dictionary
/// (or does not start with a valid header).
pub fn zlib_requires_dictionary(input: &[u8]) -> Option<u32> {
    let [cmf, flg, a, b, c, d, ..] = input else {
        return None;
    };
    match parse_zlib_header(*cmf, *flg, DecoderConfig::MAX_WINDOW_BITS) {
        Ok((_, true)) => Some(u32::from_be_bytes([*a, *b, *c, *d])),
        _ => None,
    }
}
