//! DEFLATE compression.
//!
//! This module implements a resumable DEFLATE encoder (RFC 1951). Input is
//! parsed into literals and matches by the [`MatchFinder`]; symbols are
//! collected per block and each block is written as stored, fixed Huffman
//! or dynamic Huffman, whichever is smallest in exact bits.
//!
//! Parsing follows the compression level:
//! - Level 0: stored blocks only
//! - Levels 1-3: greedy matching
//! - Levels 4-9: lazy matching (a match is deferred one byte to see
//!   whether the next position does better)
//!
//! Output is only a function of the input bytes and the flush points, never
//! of how the input was split across calls.

use crate::config::EncoderConfig;
use crate::huffman::{HuffmanBuilder, MAX_CODE_LENGTH, MAX_CODELEN_CODE_LENGTH, canonical_codes};
use crate::matcher::{MIN_LOOKAHEAD, MatchFinder, TOO_FAR};
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, DISTANCE_EXTRA_BITS,
    END_OF_BLOCK, FIXED_DISTANCE_LENGTHS, FIXED_LITLEN_LENGTHS, LENGTH_EXTRA_BITS,
    LITLEN_ALPHABET_SIZE, MAX_MATCH, MIN_MATCH, distance_to_code, fixed_distance_codes,
    fixed_litlen_codes, length_to_code,
};
use log::{debug, trace};
use zlibstream_core::bitstream::BitWriter;
use zlibstream_core::error::{Result, ZlibError};
use zlibstream_core::traits::{
    CompressStatus, CompressionLevel, CompressionStrategy, Compressor, FlushMode,
};

/// Largest payload of a stored block.
pub const MAX_STORED_BLOCK: usize = 65535;

/// Symbols collected before a block is emitted.
pub const MAX_BLOCK_SYMBOLS: usize = 16384;

/// Input bytes covered by one block, so any block can still fall back to stored.
pub const MAX_BLOCK_INPUT: usize = MAX_STORED_BLOCK - MAX_MATCH;

/// One parsed LZ77 symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A literal byte.
    Literal(u8),
    /// A back-reference.
    Match {
        /// Length (3-258).
        length: u16,
        /// Distance (1-32768).
        distance: u16,
    },
}

/// How a block was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Uncompressed.
    Stored,
    /// Fixed Huffman codes.
    FixedHuffman,
    /// Dynamic Huffman codes.
    DynamicHuffman,
}

impl BlockType {
    fn btype(self) -> u32 {
        match self {
            BlockType::Stored => 0,
            BlockType::FixedHuffman => 1,
            BlockType::DynamicHuffman => 2,
        }
    }
}

/// Dynamic code tables for one block, with the code length stream that
/// describes them.
struct DynamicTrees {
    litlen_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    codelen_lengths: Vec<u8>,
    /// `(code length symbol, extra value)` pairs.
    runs: Vec<(u8, u8)>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
}

impl DynamicTrees {
    fn build(litlen_freq: &[u32], dist_freq: &[u32]) -> Self {
        let litlen_lengths =
            HuffmanBuilder::from_frequencies(&at_least_two(litlen_freq), MAX_CODE_LENGTH as u8)
                .build_lengths();
        let dist_lengths =
            HuffmanBuilder::from_frequencies(&at_least_two(dist_freq), MAX_CODE_LENGTH as u8)
                .build_lengths();

        let hlit = last_used(&litlen_lengths).max(257);
        let hdist = last_used(&dist_lengths).max(1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let runs = run_length_encode(&combined);

        let mut codelen_freq = [0u32; CODELEN_ALPHABET_SIZE];
        for &(symbol, _) in &runs {
            codelen_freq[usize::from(symbol)] += 1;
        }
        let codelen_lengths =
            HuffmanBuilder::from_frequencies(&at_least_two(&codelen_freq), MAX_CODELEN_CODE_LENGTH)
                .build_lengths();

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&symbol| codelen_lengths[symbol] != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        Self {
            litlen_lengths,
            dist_lengths,
            codelen_lengths,
            runs,
            hlit,
            hdist,
            hclen,
        }
    }

    /// Bits taken by HLIT, HDIST, HCLEN and the code length stream.
    fn header_bits(&self) -> u64 {
        let runs: u64 = self
            .runs
            .iter()
            .map(|&(symbol, _)| {
                u64::from(self.codelen_lengths[usize::from(symbol)])
                    + u64::from(codelen_extra_bits(symbol))
            })
            .sum();
        5 + 5 + 4 + 3 * self.hclen as u64 + runs
    }

    fn write_header(&self, writer: &mut BitWriter) {
        writer.write_bits((self.hlit - 257) as u32, 5);
        writer.write_bits((self.hdist - 1) as u32, 5);
        writer.write_bits((self.hclen - 4) as u32, 4);
        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.write_bits(u32::from(self.codelen_lengths[symbol]), 3);
        }

        let codes = canonical_codes(&self.codelen_lengths);
        for &(symbol, extra) in &self.runs {
            let s = usize::from(symbol);
            writer.write_bits(u32::from(codes[s]), self.codelen_lengths[s]);
            writer.write_bits(u32::from(extra), codelen_extra_bits(symbol));
        }
    }
}

fn codelen_extra_bits(symbol: u8) -> u8 {
    match symbol {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0,
    }
}

/// Count of entries up to and including the last nonzero one.
fn last_used(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&len| len != 0).map_or(0, |i| i + 1)
}

/// Give unused symbols a count of 1 until at least two symbols are used,
/// so that every built code has two codewords.
fn at_least_two(freqs: &[u32]) -> Vec<u32> {
    let mut freqs = freqs.to_vec();
    let mut used = freqs.iter().filter(|&&f| f > 0).count();
    for slot in freqs.iter_mut() {
        if used >= 2 {
            break;
        }
        if *slot == 0 {
            *slot = 1;
            used += 1;
        }
    }
    freqs
}

/// Run-length encode a code length sequence with symbols 16, 17 and 18.
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let value = lengths[i];
        let run = lengths[i..].iter().take_while(|&&len| len == value).count();
        i += run;

        if value == 0 {
            let mut left = run;
            while left >= 11 {
                let n = left.min(138);
                runs.push((18, (n - 11) as u8));
                left -= n;
            }
            if left >= 3 {
                runs.push((17, (left - 3) as u8));
                left = 0;
            }
            runs.extend(std::iter::repeat_n((0, 0), left));
        } else {
            runs.push((value, 0));
            let mut left = run - 1;
            while left >= 3 {
                let n = left.min(6);
                runs.push((16, (n - 3) as u8));
                left -= n;
            }
            runs.extend(std::iter::repeat_n((value, 0), left));
        }
    }

    runs
}

/// Streaming DEFLATE compressor.
#[derive(Debug)]
pub struct DeflateEncoder {
    config: EncoderConfig,
    /// Preset dictionary, re-applied on reset.
    dictionary: Option<Vec<u8>>,
    matcher: MatchFinder,
    writer: BitWriter,
    /// Symbols of the open block.
    symbols: Vec<Symbol>,
    litlen_freq: [u32; LITLEN_ALPHABET_SIZE],
    dist_freq: [u32; DISTANCE_ALPHABET_SIZE],
    /// Input bytes covered by the open block.
    raw: Vec<u8>,
    /// Lazy parsing: the previous position has not been emitted yet.
    match_available: bool,
    /// Lazy parsing: best match found at the previous position.
    prev_length: usize,
    prev_distance: usize,
    /// No input arrived since the last sync or full flush.
    flushed: bool,
    finished: bool,
    total_in: u64,
}

impl DeflateEncoder {
    /// Create a compressor with default settings at `level`.
    pub fn new(level: CompressionLevel) -> Self {
        Self::build(EncoderConfig::new(level), None)
    }

    /// Create a compressor from a full configuration.
    pub fn with_config(config: EncoderConfig) -> Result<Self> {
        Ok(Self::build(config.validate()?, None))
    }

    /// Create a compressor whose matches may reach into `dictionary`.
    ///
    /// The dictionary itself is not emitted; the decoder must be primed with
    /// the same bytes.
    pub fn with_dictionary(config: EncoderConfig, dictionary: &[u8]) -> Result<Self> {
        Ok(Self::build(config.validate()?, Some(dictionary.to_vec())))
    }

    fn build(config: EncoderConfig, dictionary: Option<Vec<u8>>) -> Self {
        let mut encoder = Self {
            config,
            dictionary,
            matcher: MatchFinder::new(config.window_bits, config.level, config.strategy),
            writer: BitWriter::new(),
            symbols: Vec::with_capacity(MAX_BLOCK_SYMBOLS),
            litlen_freq: [0; LITLEN_ALPHABET_SIZE],
            dist_freq: [0; DISTANCE_ALPHABET_SIZE],
            raw: Vec::new(),
            match_available: false,
            prev_length: MIN_MATCH - 1,
            prev_distance: 0,
            flushed: false,
            finished: false,
            total_in: 0,
        };
        encoder.prime_dictionary();
        encoder
    }

    fn prime_dictionary(&mut self) {
        if let Some(dictionary) = &self.dictionary {
            self.matcher.set_dictionary(dictionary);
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Input bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Queue byte-aligned bytes ahead of anything not yet drained.
    ///
    /// Used by wrappers for headers and trailers; the bit position must be
    /// on a byte boundary (before the first block or after the last one).
    pub fn queue_bytes(&mut self, bytes: &[u8]) {
        debug_assert!(self.writer.is_aligned());
        self.writer.write_bytes(bytes);
    }

    /// Move queued output into `out`. Returns the number of bytes written.
    pub fn drain_pending(&mut self, out: &mut [u8]) -> usize {
        self.writer.drain_into(out)
    }

    /// Whether complete output bytes are waiting to be drained.
    pub fn has_pending(&self) -> bool {
        self.writer.pending_len() > 0
    }

    fn is_stored_only(&self) -> bool {
        self.config.level == CompressionLevel::NONE
    }

    /// Take input into the block buffer (level 0) or the match window.
    fn absorb(&mut self, input: &[u8]) -> usize {
        if self.is_stored_only() {
            let n = input.len().min(MAX_STORED_BLOCK - self.raw.len());
            self.raw.extend_from_slice(&input[..n]);
            if self.raw.len() == MAX_STORED_BLOCK {
                self.emit_block(false);
            }
            n
        } else {
            self.matcher.fill(input)
        }
    }

    /// Parse whatever the window allows. Without `flushing`, positions
    /// need [`MIN_LOOKAHEAD`] bytes ahead of them.
    fn process(&mut self, flushing: bool) {
        if self.is_stored_only() {
            return;
        }
        let need = if flushing { 1 } else { MIN_LOOKAHEAD };

        match self.config.strategy {
            CompressionStrategy::HuffmanOnly => self.parse_literals(),
            CompressionStrategy::Rle => self.parse_rle(need),
            _ if self.matcher.config().lazy => self.parse_lazy(need),
            _ => self.parse_greedy(need),
        }
    }

    fn parse_literals(&mut self) {
        while self.matcher.lookahead() > 0 {
            self.tally_literal(self.matcher.byte_at(0));
            self.matcher.advance(1);
            self.check_block_full();
        }
    }

    fn parse_rle(&mut self, need: usize) {
        while self.matcher.lookahead() >= need {
            let run = self.matcher.rle_run();
            if run >= MIN_MATCH {
                self.tally_match(0, run, 1);
                self.matcher.advance(run);
            } else {
                self.tally_literal(self.matcher.byte_at(0));
                self.matcher.advance(1);
            }
            self.check_block_full();
        }
    }

    /// Filtered data and short far matches are better sent as literals.
    fn discard_match(&self, length: usize, distance: usize) -> bool {
        length <= 5
            && (self.config.strategy == CompressionStrategy::Filtered
                || (length == MIN_MATCH && distance > TOO_FAR))
    }

    /// Find a match for the current position that beats `prev_length`.
    fn find_match(&mut self, prev_length: usize, lazy: bool) -> (usize, usize) {
        let Some(candidate) = self.matcher.insert() else {
            return (MIN_MATCH - 1, 0);
        };
        if (lazy && prev_length >= self.matcher.config().max_lazy)
            || !self.matcher.in_reach(candidate)
        {
            return (MIN_MATCH - 1, 0);
        }
        let (length, distance) = self.matcher.longest_match(candidate, prev_length);
        if distance == 0 || self.discard_match(length, distance) {
            (MIN_MATCH - 1, 0)
        } else {
            (length, distance)
        }
    }

    fn parse_greedy(&mut self, need: usize) {
        while self.matcher.lookahead() >= need {
            let (length, distance) = self.find_match(MIN_MATCH - 1, false);

            if length >= MIN_MATCH {
                self.tally_match(0, length, distance);
                self.matcher.advance(length);
                if length > self.matcher.config().max_lazy {
                    self.matcher.skip_hashing();
                }
            } else {
                self.tally_literal(self.matcher.byte_at(0));
                self.matcher.advance(1);
            }
            self.check_block_full();
        }
    }

    fn parse_lazy(&mut self, need: usize) {
        while self.matcher.lookahead() >= need {
            let prev_length = self.prev_length;
            let prev_distance = self.prev_distance;
            let (length, distance) = self.find_match(prev_length, true);

            if prev_length >= MIN_MATCH && length <= prev_length {
                // The match found one byte back wins; it starts at offset -1.
                self.tally_match(-1, prev_length, prev_distance);
                self.matcher.advance(prev_length - 1);
                self.match_available = false;
                self.prev_length = MIN_MATCH - 1;
                self.prev_distance = 0;
                self.check_block_full();
            } else {
                if self.match_available {
                    self.tally_literal(self.matcher.byte_at(-1));
                    self.check_block_full();
                }
                self.match_available = true;
                self.prev_length = length;
                self.prev_distance = distance;
                self.matcher.advance(1);
            }
        }
    }

    /// Emit the byte held back by lazy parsing.
    fn flush_held_literal(&mut self) {
        if self.match_available {
            self.tally_literal(self.matcher.byte_at(-1));
            self.match_available = false;
        }
        self.prev_length = MIN_MATCH - 1;
        self.prev_distance = 0;
    }

    fn tally_literal(&mut self, byte: u8) {
        self.symbols.push(Symbol::Literal(byte));
        self.litlen_freq[usize::from(byte)] += 1;
        self.raw.push(byte);
    }

    /// Record a match whose source bytes start `offset` from the current position.
    fn tally_match(&mut self, offset: isize, length: usize, distance: usize) {
        self.raw.extend_from_slice(self.matcher.bytes_at(offset, length));
        self.symbols.push(Symbol::Match {
            length: length as u16,
            distance: distance as u16,
        });
        let (symbol, _, _) = length_to_code(length);
        let (code, _, _) = distance_to_code(distance);
        self.litlen_freq[usize::from(symbol)] += 1;
        self.dist_freq[usize::from(code)] += 1;
    }

    fn check_block_full(&mut self) {
        // Literal-only blocks are bounded by input size alone.
        let symbol_limit = self.config.strategy != CompressionStrategy::HuffmanOnly
            && self.symbols.len() >= MAX_BLOCK_SYMBOLS;
        if symbol_limit || self.raw.len() >= MAX_BLOCK_INPUT {
            self.emit_block(false);
        }
    }

    fn extra_bits(&self) -> u64 {
        let lengths: u64 = LENGTH_EXTRA_BITS
            .iter()
            .zip(&self.litlen_freq[257..])
            .map(|(&bits, &freq)| u64::from(bits) * u64::from(freq))
            .sum();
        let distances: u64 = DISTANCE_EXTRA_BITS
            .iter()
            .zip(&self.dist_freq)
            .map(|(&bits, &freq)| u64::from(bits) * u64::from(freq))
            .sum();
        lengths + distances
    }

    fn stored_bits(&self) -> Option<u64> {
        if self.raw.len() > MAX_STORED_BLOCK {
            return None;
        }
        let pad = (8 - (u64::from(self.writer.partial_bits()) + 3) % 8) % 8;
        Some(3 + pad + 32 + 8 * self.raw.len() as u64)
    }

    /// Write the open block, choosing the cheapest encoding.
    fn emit_block(&mut self, last: bool) {
        if self.is_stored_only() {
            self.write_stored(last);
            self.clear_block();
            return;
        }

        self.litlen_freq[usize::from(END_OF_BLOCK)] += 1;
        let extra = self.extra_bits();

        let fixed_bits = 3
            + extra
            + weighted(&self.litlen_freq, &FIXED_LITLEN_LENGTHS)
            + weighted(&self.dist_freq, &FIXED_DISTANCE_LENGTHS);
        let trees = DynamicTrees::build(&self.litlen_freq, &self.dist_freq);
        let dynamic_bits = 3
            + extra
            + trees.header_bits()
            + weighted(&self.litlen_freq, &trees.litlen_lengths)
            + weighted(&self.dist_freq, &trees.dist_lengths);

        let (mut block_type, mut bits) = if dynamic_bits < fixed_bits {
            (BlockType::DynamicHuffman, dynamic_bits)
        } else {
            (BlockType::FixedHuffman, fixed_bits)
        };
        if let Some(stored_bits) = self.stored_bits() {
            if stored_bits < bits {
                block_type = BlockType::Stored;
                bits = stored_bits;
            }
        }

        debug!(
            "deflate block: {:?}, final={}, {} symbols, {} input bytes, {} bits",
            block_type,
            last,
            self.symbols.len(),
            self.raw.len(),
            bits
        );

        match block_type {
            BlockType::Stored => self.write_stored(last),
            BlockType::FixedHuffman => {
                self.writer.write_bits(u32::from(last), 1);
                self.writer.write_bits(block_type.btype(), 2);
                self.write_symbols(
                    fixed_litlen_codes(),
                    &FIXED_LITLEN_LENGTHS,
                    fixed_distance_codes(),
                    &FIXED_DISTANCE_LENGTHS,
                );
            }
            BlockType::DynamicHuffman => {
                self.writer.write_bits(u32::from(last), 1);
                self.writer.write_bits(block_type.btype(), 2);
                trees.write_header(&mut self.writer);
                let litlen_codes = canonical_codes(&trees.litlen_lengths);
                let dist_codes = canonical_codes(&trees.dist_lengths);
                self.write_symbols(
                    &litlen_codes,
                    &trees.litlen_lengths,
                    &dist_codes,
                    &trees.dist_lengths,
                );
            }
        }

        self.clear_block();
    }

    fn write_stored(&mut self, last: bool) {
        let len = self.raw.len() as u16;
        self.writer.write_bits(u32::from(last), 1);
        self.writer.write_bits(BlockType::Stored.btype(), 2);
        self.writer.align_to_byte();
        self.writer.write_bits(u32::from(len), 16);
        self.writer.write_bits(u32::from(!len), 16);
        self.writer.write_bytes(&self.raw);
    }

    fn write_symbols(
        &mut self,
        litlen_codes: &[u16],
        litlen_lengths: &[u8],
        dist_codes: &[u16],
        dist_lengths: &[u8],
    ) {
        let writer = &mut self.writer;
        for &symbol in &self.symbols {
            match symbol {
                Symbol::Literal(byte) => {
                    let s = usize::from(byte);
                    writer.write_bits(u32::from(litlen_codes[s]), litlen_lengths[s]);
                }
                Symbol::Match { length, distance } => {
                    let (symbol, extra_bits, extra_value) = length_to_code(usize::from(length));
                    let s = usize::from(symbol);
                    writer.write_bits(u32::from(litlen_codes[s]), litlen_lengths[s]);
                    writer.write_bits(u32::from(extra_value), extra_bits);

                    let (code, extra_bits, extra_value) = distance_to_code(usize::from(distance));
                    let c = usize::from(code);
                    writer.write_bits(u32::from(dist_codes[c]), dist_lengths[c]);
                    writer.write_bits(u32::from(extra_value), extra_bits);
                }
            }
        }
        let eob = usize::from(END_OF_BLOCK);
        writer.write_bits(u32::from(litlen_codes[eob]), litlen_lengths[eob]);
    }

    fn clear_block(&mut self) {
        self.symbols.clear();
        self.raw.clear();
        self.litlen_freq.fill(0);
        self.dist_freq.fill(0);
    }

    /// Close the open block and byte-align with an empty stored block.
    fn sync_flush(&mut self, full: bool) {
        self.flush_held_literal();
        if !self.symbols.is_empty() || !self.raw.is_empty() {
            self.emit_block(false);
        }
        self.writer.write_bits(0, 3);
        self.writer.align_to_byte();
        self.writer.write_bits(0x0000, 16);
        self.writer.write_bits(0xFFFF, 16);
        if full {
            self.matcher.forget_history();
        }
        trace!(
            "deflate {} flush at input offset {}",
            if full { "full" } else { "sync" },
            self.total_in
        );
    }

    fn finish_stream(&mut self) {
        self.flush_held_literal();
        self.emit_block(true);
        self.writer.align_to_byte();
        self.finished = true;
        debug!("deflate finished: {} bytes in", self.total_in);
    }

    fn status(&self, idle: CompressStatus) -> CompressStatus {
        if self.has_pending() {
            CompressStatus::NeedsOutput
        } else {
            idle
        }
    }
}

fn weighted(freqs: &[u32], lengths: &[u8]) -> u64 {
    freqs
        .iter()
        .zip(lengths)
        .map(|(&freq, &len)| u64::from(freq) * u64::from(len))
        .sum()
}

impl Default for DeflateEncoder {
    fn default() -> Self {
        Self::new(CompressionLevel::DEFAULT)
    }
}

impl Compressor for DeflateEncoder {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        let mut produced = self.writer.drain_into(output);

        if self.finished {
            if !input.is_empty() {
                return Err(ZlibError::StreamFinished);
            }
            return Ok((0, produced, self.status(CompressStatus::Done)));
        }
        if self.has_pending() {
            return Ok((0, produced, CompressStatus::NeedsOutput));
        }

        let mut consumed = 0;
        loop {
            let taken = self.absorb(&input[consumed..]);
            consumed += taken;
            self.total_in += taken as u64;
            if taken > 0 {
                self.flushed = false;
            }

            let flushing = flush != FlushMode::None && consumed == input.len();
            self.process(flushing);
            produced += self.writer.drain_into(&mut output[produced..]);

            if self.has_pending() {
                return Ok((consumed, produced, CompressStatus::NeedsOutput));
            }
            if consumed == input.len() {
                break;
            }
        }

        let idle = match flush {
            FlushMode::None => CompressStatus::NeedsInput,
            FlushMode::Sync | FlushMode::Full => {
                if !self.flushed {
                    self.sync_flush(flush == FlushMode::Full);
                    self.flushed = true;
                }
                CompressStatus::NeedsInput
            }
            FlushMode::Finish => {
                self.finish_stream();
                CompressStatus::Done
            }
        };
        produced += self.writer.drain_into(&mut output[produced..]);
        Ok((consumed, produced, self.status(idle)))
    }

    fn reset(&mut self) {
        self.matcher.reset();
        self.writer.clear();
        self.clear_block();
        self.match_available = false;
        self.prev_length = MIN_MATCH - 1;
        self.prev_distance = 0;
        self.flushed = false;
        self.finished = false;
        self.total_in = 0;
        self.prime_dictionary();
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Compress `data` into a raw DEFLATE stream at `level` (0-9).
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    DeflateEncoder::new(CompressionLevel::new(level)).compress_all(data)
}

/// Compress `data` into a raw DEFLATE stream with full settings.
pub fn deflate_with(data: &[u8], config: EncoderConfig) -> Result<Vec<u8>> {
    DeflateEncoder::with_config(config)?.compress_all(data)
}
