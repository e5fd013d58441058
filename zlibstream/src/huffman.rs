//! Huffman coding for DEFLATE.
//!
//! DEFLATE uses canonical Huffman codes: codes of the same length are
//! consecutive integers assigned in symbol order, so a code set is fully
//! described by its code lengths.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-287 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-31 (0-29 in data)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman tables)
//!
//! Decoding is table-driven with a canonical walk for long codes. Encoding
//! uses package-merge, which produces optimal code lengths under a length
//! limit.

use zlibstream_core::error::{Result, ZlibError};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Maximum code length for the code length alphabet.
pub const MAX_CODELEN_CODE_LENGTH: u8 = 7;

/// A decoding table for one canonical Huffman code.
///
/// Codes up to `FAST_BITS` long resolve with a single table lookup. Longer
/// codes fall back to walking the canonical code one bit at a time.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Direct lookup: (symbol, code_length), indexed by the next bits of input.
    /// A length of 0 means the prefix needs the slow path.
    fast_table: Vec<(u16, u8)>,
    /// Number of bits for fast lookup.
    fast_bits: u8,
    /// Maximum code length in this tree.
    max_code_length: u8,
    /// Number of codes of each length.
    counts: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols sorted by (code length, symbol).
    symbols: Vec<u16>,
    /// Whether the code lengths fill the code space exactly.
    complete: bool,
}

impl HuffmanTree {
    /// Number of bits for fast lookup table.
    const FAST_BITS: u8 = 9;

    /// Build a decoding table from code lengths.
    ///
    /// `code_lengths[i]` is the bit length for symbol `i`; 0 means unused.
    /// Over-subscribed sets are rejected, as are incomplete sets other than a
    /// single code of length 1. An all-zero set is accepted and fails on first use.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        let mut max_length = 0u8;

        for &len in code_lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(ZlibError::invalid_code_table(format!(
                    "code length {} exceeds maximum {}",
                    len, MAX_CODE_LENGTH
                )));
            }
            if len > 0 {
                counts[len as usize] += 1;
                max_length = max_length.max(len);
            }
        }

        // Remaining code space after each length; negative means over-subscribed.
        let mut left: i32 = 1;
        for &count in &counts[1..] {
            left <<= 1;
            left -= i32::from(count);
            if left < 0 {
                return Err(ZlibError::invalid_code_table("over-subscribed code lengths"));
            }
        }

        let total: u16 = counts.iter().sum();
        let complete = left == 0;
        if !complete && total > 0 && !(total == 1 && counts[1] == 1) {
            return Err(ZlibError::invalid_code_table("incomplete code lengths"));
        }

        // Symbols ordered by code length, then by symbol value.
        let mut offsets = [0u16; MAX_CODE_LENGTH + 2];
        for len in 1..=MAX_CODE_LENGTH {
            offsets[len + 1] = offsets[len] + counts[len];
        }
        let mut symbols = vec![0u16; total as usize];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len > 0 {
                let slot = &mut offsets[len as usize];
                symbols[*slot as usize] = symbol as u16;
                *slot += 1;
            }
        }

        let fast_bits = Self::FAST_BITS.min(max_length.max(1));
        let mut fast_table = vec![(0u16, 0u8); 1 << fast_bits];
        let codes = canonical_codes(code_lengths);
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len == 0 || len > fast_bits {
                continue;
            }
            let code = codes[symbol] as usize;
            for high in 0..1usize << (fast_bits - len) {
                fast_table[code | (high << len)] = (symbol as u16, len);
            }
        }

        Ok(Self {
            fast_table,
            fast_bits,
            max_code_length: max_length,
            counts,
            symbols,
            complete,
        })
    }

    /// Whether the code set has no symbols at all.
    pub fn is_empty(&self) -> bool {
        self.max_code_length == 0
    }

    /// Whether the code lengths fill the code space exactly.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Longest code in the set.
    pub fn max_code_length(&self) -> u8 {
        self.max_code_length
    }

    /// Resolve the next symbol from `bits` (stream order, LSB-first), of which
    /// only the low `available` are real input.
    ///
    /// Returns `Ok(None)` when `available` is too short to finish the code,
    /// and `InvalidSymbol` when the bits match no code.
    #[inline]
    pub fn lookup(&self, bits: u32, available: u8, bit_position: u64) -> Result<Option<(u16, u8)>> {
        if self.is_empty() {
            return Err(ZlibError::invalid_code_table("no codes defined for symbol"));
        }

        let mask = (1u32 << self.fast_bits) - 1;
        let (symbol, len) = self.fast_table[(bits & mask) as usize];
        if len > 0 && len <= available {
            return Ok(Some((symbol, len)));
        }

        self.lookup_slow(bits, available, bit_position)
    }

    /// Canonical walk: extend the code one bit at a time.
    fn lookup_slow(&self, bits: u32, available: u8, bit_position: u64) -> Result<Option<(u16, u8)>> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for len in 1..=self.max_code_length {
            if len > available {
                return Ok(None);
            }
            code |= ((bits >> (len - 1)) & 1) as i32;
            let count = i32::from(self.counts[len as usize]);
            if code - first < count {
                return Ok(Some((self.symbols[(index + code - first) as usize], len)));
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(ZlibError::invalid_symbol(bits, bit_position))
    }
}

/// Assign canonical codes to `lengths`, returned bit-reversed so they can be
/// written LSB-first.
pub fn canonical_codes(lengths: &[u8]) -> Vec<u16> {
    let mut bl_count = [0u16; MAX_CODE_LENGTH + 1];
    for &len in lengths {
        if len > 0 {
            bl_count[len as usize] += 1;
        }
    }

    let mut next_code = [0u16; MAX_CODE_LENGTH + 1];
    let mut code = 0u16;
    for bits in 1..=MAX_CODE_LENGTH {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                return 0;
            }
            let code = next_code[len as usize];
            next_code[len as usize] += 1;
            reverse_bits(code, len)
        })
        .collect()
}

/// Reverse the low `length` bits of `code`.
#[inline]
pub fn reverse_bits(code: u16, length: u8) -> u16 {
    code.reverse_bits() >> (16 - u16::from(length))
}

/// Builder for creating length-limited Huffman code lengths from frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

/// A package-merge item: a single symbol or a package of two items.
#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(usize),
    Package(usize, usize),
}

impl HuffmanBuilder {
    /// Create a new Huffman builder.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Create a builder over existing frequencies.
    pub fn from_frequencies(frequencies: &[u32], max_length: u8) -> Self {
        Self {
            frequencies: frequencies.to_vec(),
            max_length,
        }
    }

    /// Add a symbol occurrence.
    pub fn add(&mut self, symbol: u16) {
        self.add_count(symbol, 1);
    }

    /// Add multiple occurrences of a symbol.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        if let Some(freq) = self.frequencies.get_mut(symbol as usize) {
            *freq += count;
        }
    }

    /// Build code lengths from frequencies.
    ///
    /// Returns an array where `result[i]` is the code length for symbol `i`.
    /// Unused symbols get 0; a lone used symbol gets length 1. Equal
    /// frequencies are ordered by symbol index.
    pub fn build_lengths(&self) -> Vec<u8> {
        let mut lengths = vec![0u8; self.frequencies.len()];

        let mut leaves: Vec<(u64, usize)> = self
            .frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f > 0)
            .map(|(i, &f)| (u64::from(f), i))
            .collect();

        match leaves.len() {
            0 => return lengths,
            1 => {
                lengths[leaves[0].1] = 1;
                return lengths;
            }
            _ => {}
        }

        leaves.sort_unstable();
        for (symbol, len) in self.package_merge(&leaves) {
            lengths[symbol] = len;
        }
        lengths
    }

    /// Package-merge ("coin collector") over `leaves` sorted by (weight, symbol).
    ///
    /// Each of the `max_length - 1` rounds pairs up the current list into
    /// packages and merges them with the leaves. The first `2n - 2` items of
    /// the final list are the optimal selection; a symbol's code length is
    /// the number of times its leaf occurs in them.
    fn package_merge(&self, leaves: &[(u64, usize)]) -> Vec<(usize, u8)> {
        let n = leaves.len();
        debug_assert!(n <= 1 << self.max_length, "alphabet too large for length limit");

        let mut arena: Vec<Node> = (0..n).map(Node::Leaf).collect();
        let leaf_items: Vec<(u64, usize)> = leaves
            .iter()
            .enumerate()
            .map(|(i, &(weight, _))| (weight, i))
            .collect();

        let mut list = leaf_items.clone();
        for _ in 1..self.max_length {
            let mut packages = Vec::with_capacity(list.len() / 2);
            for pair in list.chunks_exact(2) {
                arena.push(Node::Package(pair[0].1, pair[1].1));
                packages.push((pair[0].0 + pair[1].0, arena.len() - 1));
            }

            // Merge, leaves first on equal weight.
            let mut merged = Vec::with_capacity(n + packages.len());
            let (mut i, mut j) = (0, 0);
            while i < n || j < packages.len() {
                if j >= packages.len() || (i < n && leaf_items[i].0 <= packages[j].0) {
                    merged.push(leaf_items[i]);
                    i += 1;
                } else {
                    merged.push(packages[j]);
                    j += 1;
                }
            }
            list = merged;
        }

        let mut depth = vec![0u8; n];
        let mut stack: Vec<usize> = list.iter().take(2 * n - 2).map(|&(_, node)| node).collect();
        while let Some(node) = stack.pop() {
            match arena[node] {
                Node::Leaf(leaf) => depth[leaf] += 1,
                Node::Package(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
            }
        }

        leaves
            .iter()
            .zip(depth)
            .map(|(&(_, symbol), len)| (symbol, len))
            .collect()
    }
}
