//! DEFLATE decompression (inflate).
//!
//! This module implements a resumable DEFLATE decoder (RFC 1951) for all
//! three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! The decoder is a state machine. Each call runs until the input is used
//! up, the output is full, or the final block ends. Compound items (a block
//! header, a code length with its repeat count, a length/distance pair) are
//! decoded only once all of their bits are buffered, so running out of input
//! never leaves one half-read.

use crate::huffman::HuffmanTree;
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, DISTANCE_EXTRA_BITS,
    END_OF_BLOCK, LENGTH_EXTRA_BITS, LITLEN_ALPHABET_SIZE, decode_distance, decode_length,
    fixed_distance_tree, fixed_litlen_tree,
};
use log::{debug, trace};
use zlibstream_core::bitstream::BitReader;
use zlibstream_core::error::{Result, ZlibError};
use zlibstream_core::traits::{DecompressStatus, Decompressor};
use zlibstream_core::window::{HistoryWindow, MAX_WINDOW_SIZE};

/// Maximum dictionary size for DEFLATE (32KB).
pub const MAX_DICTIONARY_SIZE: usize = MAX_WINDOW_SIZE;

/// Bits buffered before decoding a length/distance pair: the longest
/// literal/length code, its extra bits, the longest distance code and its
/// extra bits.
const SYMBOL_FILL_BITS: u8 = 15 + 5 + 15 + 13;

/// Where the decoder is within the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InflatePhase {
    BlockHeader,
    StoredLen,
    StoredCopy { remaining: usize },
    DynamicCounts,
    CodeLengthLengths { read: usize },
    CodeLengths,
    Symbols,
    Done,
}

/// Codes for the current Huffman block.
#[derive(Debug)]
enum BlockCodes {
    Fixed,
    Dynamic {
        litlen: HuffmanTree,
        distance: HuffmanTree,
    },
}

/// Back-reference not yet fully copied to the output.
#[derive(Debug, Clone, Copy)]
struct PendingMatch {
    length: usize,
    distance: usize,
}

/// Streaming DEFLATE decompressor.
#[derive(Debug)]
pub struct InflateDecoder {
    reader: BitReader,
    window: HistoryWindow,
    phase: InflatePhase,
    final_block: bool,
    codes: BlockCodes,
    pending: Option<PendingMatch>,
    /// Dynamic header state.
    hlit: usize,
    hdist: usize,
    hclen: usize,
    codelen_lengths: [u8; CODELEN_ALPHABET_SIZE],
    codelen_tree: Option<HuffmanTree>,
    lengths: Vec<u8>,
    /// Farthest distance the stream may use.
    max_distance: usize,
    /// Preset dictionary, re-applied on reset.
    dictionary: Option<Vec<u8>>,
    total_out: u64,
}

impl InflateDecoder {
    /// Create a decoder for streams using up to a 32 KiB window.
    pub fn new() -> Self {
        Self {
            reader: BitReader::new(),
            window: HistoryWindow::deflate(),
            phase: InflatePhase::BlockHeader,
            final_block: false,
            codes: BlockCodes::Fixed,
            pending: None,
            hlit: 0,
            hdist: 0,
            hclen: 0,
            codelen_lengths: [0; CODELEN_ALPHABET_SIZE],
            codelen_tree: None,
            lengths: Vec::with_capacity(LITLEN_ALPHABET_SIZE + DISTANCE_ALPHABET_SIZE),
            max_distance: MAX_WINDOW_SIZE,
            dictionary: None,
            total_out: 0,
        }
    }

    /// Create a decoder primed with a preset dictionary.
    ///
    /// The dictionary must match the one used during compression. Only the
    /// last 32 KiB of a larger dictionary are used.
    pub fn with_dictionary(dictionary: &[u8]) -> Self {
        let mut decoder = Self::new();
        decoder.dictionary = Some(dictionary.to_vec());
        decoder.set_dictionary(dictionary);
        decoder
    }

    /// Prime the history with `dictionary` before any data is decoded.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) {
        let start = dictionary.len().saturating_sub(MAX_DICTIONARY_SIZE);
        self.window.preload_dictionary(&dictionary[start..]);
    }

    /// Reject distances beyond `1 << window_bits`.
    pub fn set_window_bits(&mut self, window_bits: u8) {
        self.max_distance = 1usize << window_bits.min(15);
    }

    /// Bytes written to the output so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Whether the stream has ended and the pending output is delivered.
    pub fn is_done(&self) -> bool {
        self.phase == InflatePhase::Done && self.pending.is_none()
    }

    /// After the final block, hand back whole bytes read ahead by earlier
    /// calls. These belong to whatever follows the DEFLATE data.
    pub fn take_unused_bytes(&mut self) -> Vec<u8> {
        self.reader.take_buffered_bytes()
    }

    fn end_block(&mut self) {
        self.phase = if self.final_block {
            InflatePhase::Done
        } else {
            InflatePhase::BlockHeader
        };
    }

    /// Copy as much of the pending match as fits. Returns false if output filled first.
    fn copy_pending(&mut self, output: &mut [u8], produced: &mut usize) -> Result<bool> {
        let Some(pending) = self.pending else {
            return Ok(true);
        };
        let n = self
            .window
            .copy_match(pending.distance, pending.length, &mut output[*produced..])?;
        *produced += n;
        if n < pending.length {
            self.pending = Some(PendingMatch {
                length: pending.length - n,
                distance: pending.distance,
            });
            return Ok(false);
        }
        self.pending = None;
        Ok(true)
    }

    fn read_block_header(&mut self, input: &[u8]) -> Result<bool> {
        if !self.reader.fill(input, 3) {
            return Ok(false);
        }
        let header = self.reader.peek(3);
        self.reader.consume(3);
        self.final_block = header & 1 == 1;
        let block_type = (header >> 1) as u8;

        trace!(
            "inflate block header: type {}, final={} at bit {}",
            block_type,
            self.final_block,
            self.reader.bit_position()
        );

        self.phase = match block_type {
            0 => InflatePhase::StoredLen,
            1 => {
                self.codes = BlockCodes::Fixed;
                InflatePhase::Symbols
            }
            2 => InflatePhase::DynamicCounts,
            _ => return Err(ZlibError::invalid_block_type(block_type)),
        };
        Ok(true)
    }

    fn read_stored_len(&mut self, input: &[u8]) -> Result<bool> {
        self.reader.align_to_byte();
        if !self.reader.fill(input, 32) {
            return Ok(false);
        }
        let len = self.reader.peek(16) as u16;
        let nlen = self.reader.peek_at(16, 16) as u16;
        if len != !nlen {
            return Err(ZlibError::stored_length_mismatch(len, nlen));
        }
        self.reader.consume(32);
        self.phase = InflatePhase::StoredCopy {
            remaining: usize::from(len),
        };
        Ok(true)
    }

    fn read_dynamic_counts(&mut self, input: &[u8]) -> Result<bool> {
        if !self.reader.fill(input, 14) {
            return Ok(false);
        }
        let hlit = self.reader.peek_at(0, 5) as usize + 257;
        let hdist = self.reader.peek_at(5, 5) as usize + 1;
        let hclen = self.reader.peek_at(10, 4) as usize + 4;
        if hlit > LITLEN_ALPHABET_SIZE {
            return Err(ZlibError::invalid_code_table(format!(
                "too many literal/length codes: {}",
                hlit
            )));
        }
        if hdist > DISTANCE_ALPHABET_SIZE {
            return Err(ZlibError::invalid_code_table(format!(
                "too many distance codes: {}",
                hdist
            )));
        }
        self.reader.consume(14);
        self.hlit = hlit;
        self.hdist = hdist;
        self.hclen = hclen;
        self.codelen_lengths = [0; CODELEN_ALPHABET_SIZE];
        self.phase = InflatePhase::CodeLengthLengths { read: 0 };
        Ok(true)
    }

    fn read_codelen_lengths(&mut self, input: &[u8], mut read: usize) -> Result<bool> {
        while read < self.hclen {
            let Some(len) = self.reader.read_bits(input, 3) else {
                self.phase = InflatePhase::CodeLengthLengths { read };
                return Ok(false);
            };
            self.codelen_lengths[CODE_LENGTH_ORDER[read]] = len as u8;
            read += 1;
        }

        let tree = HuffmanTree::from_code_lengths(&self.codelen_lengths)?;
        if !tree.is_complete() {
            return Err(ZlibError::invalid_code_table("incomplete code length code"));
        }
        self.codelen_tree = Some(tree);
        self.lengths.clear();
        self.phase = InflatePhase::CodeLengths;
        Ok(true)
    }

    fn read_code_lengths(&mut self, input: &[u8]) -> Result<bool> {
        let Some(tree) = self.codelen_tree.as_ref() else {
            return Err(ZlibError::invalid_code_table("missing code length code"));
        };
        let total = self.hlit + self.hdist;

        while self.lengths.len() < total {
            self.reader.fill(input, 14);
            let available = self.reader.bits_available();
            let position = self.reader.bit_position();
            let Some((symbol, len)) =
                tree.lookup(self.reader.peek(available.min(32)), available, position)?
            else {
                return Ok(false);
            };

            let (extra_bits, base) = match symbol {
                0..=15 => (0, 0),
                16 => (2, 3),
                17 => (3, 3),
                18 => (7, 11),
                _ => return Err(ZlibError::invalid_symbol(u32::from(symbol), position)),
            };
            if available < len + extra_bits {
                return Ok(false);
            }
            let repeat = base + self.reader.peek_at(len, extra_bits) as usize;

            let (value, count) = match symbol {
                0..=15 => (symbol as u8, 1),
                16 => {
                    let Some(&last) = self.lengths.last() else {
                        return Err(ZlibError::invalid_code_table(
                            "repeat code with no previous length",
                        ));
                    };
                    (last, repeat)
                }
                _ => (0, repeat),
            };
            if self.lengths.len() + count > total {
                return Err(ZlibError::invalid_code_table(format!(
                    "code length repeat overflows {} lengths",
                    total
                )));
            }

            self.reader.consume(len + extra_bits);
            self.lengths.extend(std::iter::repeat_n(value, count));
        }

        let (litlen_lengths, dist_lengths) = self.lengths.split_at(self.hlit);
        if litlen_lengths[usize::from(END_OF_BLOCK)] == 0 {
            return Err(ZlibError::invalid_code_table("missing end-of-block code"));
        }
        let litlen = HuffmanTree::from_code_lengths(litlen_lengths)?;
        let distance = HuffmanTree::from_code_lengths(dist_lengths)?;

        debug!(
            "inflate dynamic block: hlit={}, hdist={}, hclen={}",
            self.hlit, self.hdist, self.hclen
        );

        self.codes = BlockCodes::Dynamic { litlen, distance };
        self.codelen_tree = None;
        self.phase = InflatePhase::Symbols;
        Ok(true)
    }

    /// Decode symbols until the block ends, the output fills, or input runs out.
    fn decode_symbols(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        produced: &mut usize,
    ) -> Result<Option<DecompressStatus>> {
        let (litlen, distance_tree) = match &self.codes {
            BlockCodes::Fixed => (fixed_litlen_tree()?, fixed_distance_tree()?),
            BlockCodes::Dynamic { litlen, distance } => (litlen, distance),
        };

        loop {
            if *produced == output.len() {
                return Ok(Some(DecompressStatus::NeedsOutput));
            }

            self.reader.fill(input, SYMBOL_FILL_BITS);
            let available = self.reader.bits_available();
            let position = self.reader.bit_position();
            let Some((symbol, len)) =
                litlen.lookup(self.reader.peek(available.min(32)), available, position)?
            else {
                return Ok(Some(DecompressStatus::NeedsInput));
            };

            if symbol < 256 {
                self.reader.consume(len);
                output[*produced] = symbol as u8;
                self.window.write_byte(symbol as u8);
                *produced += 1;
                continue;
            }
            if symbol == END_OF_BLOCK {
                self.reader.consume(len);
                self.phase = if self.final_block {
                    InflatePhase::Done
                } else {
                    InflatePhase::BlockHeader
                };
                return Ok(None);
            }
            if symbol > 285 {
                return Err(ZlibError::invalid_symbol(u32::from(symbol), position));
            }

            let length_extra = LENGTH_EXTRA_BITS[usize::from(symbol - 257)];
            let mut used = len + length_extra;
            if available < used {
                return Ok(Some(DecompressStatus::NeedsInput));
            }
            let length = decode_length(symbol, self.reader.peek_at(len, length_extra) as u16);

            let rest = available - used;
            let Some((code, code_len)) = distance_tree.lookup(
                self.reader.peek_at(used, rest.min(32)),
                rest,
                position + u64::from(used),
            )?
            else {
                return Ok(Some(DecompressStatus::NeedsInput));
            };
            if usize::from(code) >= DISTANCE_ALPHABET_SIZE {
                return Err(ZlibError::invalid_symbol(
                    u32::from(code),
                    position + u64::from(used),
                ));
            }
            let distance_extra = DISTANCE_EXTRA_BITS[usize::from(code)];
            if available < used + code_len + distance_extra {
                return Ok(Some(DecompressStatus::NeedsInput));
            }
            let distance = decode_distance(
                code,
                self.reader.peek_at(used + code_len, distance_extra) as u16,
            );
            used += code_len + distance_extra;

            if distance > self.window.len() || distance > self.max_distance {
                return Err(ZlibError::invalid_back_reference(
                    distance,
                    self.window.len().min(self.max_distance),
                ));
            }

            self.reader.consume(used);
            let n = self
                .window
                .copy_match(distance, length, &mut output[*produced..])?;
            *produced += n;
            if n < length {
                self.pending = Some(PendingMatch {
                    length: length - n,
                    distance,
                });
                return Ok(Some(DecompressStatus::NeedsOutput));
            }
        }
    }

    fn copy_stored(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        produced: &mut usize,
        remaining: usize,
    ) -> Option<DecompressStatus> {
        if remaining == 0 {
            self.end_block();
            return None;
        }
        if *produced == output.len() {
            return Some(DecompressStatus::NeedsOutput);
        }
        let want = remaining.min(output.len() - *produced);
        let out = &mut output[*produced..*produced + want];
        let n = self.reader.read_aligned_bytes(input, out);
        self.window.write_bytes(&out[..n]);
        *produced += n;
        self.phase = InflatePhase::StoredCopy {
            remaining: remaining - n,
        };
        if n == 0 {
            return Some(DecompressStatus::NeedsInput);
        }
        None
    }

    fn run(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        produced: &mut usize,
    ) -> Result<DecompressStatus> {
        loop {
            if !self.copy_pending(output, produced)? {
                return Ok(DecompressStatus::NeedsOutput);
            }

            let progressed = match self.phase {
                InflatePhase::BlockHeader => self.read_block_header(input)?,
                InflatePhase::StoredLen => self.read_stored_len(input)?,
                InflatePhase::StoredCopy { remaining } => {
                    match self.copy_stored(input, output, produced, remaining) {
                        Some(status) => return Ok(status),
                        None => true,
                    }
                }
                InflatePhase::DynamicCounts => self.read_dynamic_counts(input)?,
                InflatePhase::CodeLengthLengths { read } => self.read_codelen_lengths(input, read)?,
                InflatePhase::CodeLengths => self.read_code_lengths(input)?,
                InflatePhase::Symbols => match self.decode_symbols(input, output, produced)? {
                    Some(status) => return Ok(status),
                    None => true,
                },
                InflatePhase::Done => {
                    self.reader.release_unused_bytes();
                    return Ok(DecompressStatus::Done);
                }
            };

            if !progressed {
                return Ok(DecompressStatus::NeedsInput);
            }
        }
    }
}

impl Default for InflateDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for InflateDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        if self.is_done() {
            return Ok((0, 0, DecompressStatus::Done));
        }

        self.reader.reset_for_new_input();
        let mut produced = 0;
        let status = self.run(input, output, &mut produced)?;
        self.total_out += produced as u64;

        if status == DecompressStatus::Done {
            debug!("inflate finished: {} bytes out", self.total_out);
        }
        Ok((self.reader.input_pos(), produced, status))
    }

    fn reset(&mut self) {
        let dictionary = self.dictionary.take();
        let max_distance = self.max_distance;
        *self = Self::new();
        self.max_distance = max_distance;
        if let Some(dictionary) = dictionary {
            self.set_dictionary(&dictionary);
            self.dictionary = Some(dictionary);
        }
    }

    fn is_finished(&self) -> bool {
        self.is_done()
    }
}

/// Decompress a complete raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    InflateDecoder::new().decompress_all(data)
}

/// Decompress a raw DEFLATE stream that was compressed against `dictionary`.
pub fn inflate_with_dictionary(data: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
    InflateDecoder::with_dictionary(dictionary).decompress_all(data)
}
