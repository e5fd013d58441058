//! DEFLATE constant tables (RFC 1951 Sections 3.2.5 to 3.2.7).
//!
//! Length and distance base/extra-bit tables, the fixed Huffman code
//! lengths, and precomputed lookups from a match length or distance to the
//! symbol that encodes it.

use crate::huffman::{HuffmanTree, canonical_codes};
use std::sync::OnceLock;
use zlibstream_core::error::{Result, ZlibError};

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Number of literal/length codes, including the two reserved ones.
pub const LITLEN_CODES: usize = 288;

/// Number of literal/length codes that may appear in data (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Number of distance codes, including the two reserved ones.
pub const DISTANCE_CODES: usize = 32;

/// Number of distance codes that may appear in data (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Fixed literal/length code lengths.
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub const FIXED_LITLEN_LENGTHS: [u8; LITLEN_CODES] = {
    let mut lengths = [0u8; LITLEN_CODES];
    let mut i = 0;
    while i < LITLEN_CODES {
        lengths[i] = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        i += 1;
    }
    lengths
};

/// Fixed distance code lengths: all 32 codes use 5 bits (30 and 31 never appear in data).
pub const FIXED_DISTANCE_LENGTHS: [u8; DISTANCE_CODES] = [5; DISTANCE_CODES];

/// Length code base values for symbols 257-285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values for codes 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Order in which code length code lengths are transmitted.
pub const CODE_LENGTH_ORDER: [usize; CODELEN_ALPHABET_SIZE] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Length code index (0-28) for every match length 0..=258.
const LENGTH_CODE: [u8; MAX_MATCH + 1] = {
    let mut table = [0u8; MAX_MATCH + 1];
    let mut code = 0;
    while code < 29 {
        let base = LENGTH_BASE[code] as usize;
        let span = 1usize << LENGTH_EXTRA_BITS[code];
        let mut k = 0;
        while k < span && base + k <= MAX_MATCH {
            table[base + k] = code as u8;
            k += 1;
        }
        code += 1;
    }
    // 258 has its own code even though 284 covers it numerically.
    table[MAX_MATCH] = 28;
    table
};

/// Distance code for `d - 1` when `d <= 256`, then for `256 + ((d - 1) >> 7)`.
const DIST_CODE: [u8; 512] = {
    let mut table = [0u8; 512];
    let mut code = 0;
    while code < 30 {
        let base = DISTANCE_BASE[code] as usize - 1;
        let span = 1usize << DISTANCE_EXTRA_BITS[code];
        let mut k = 0;
        while k < span {
            let d = base + k;
            if d < 256 {
                table[d] = code as u8;
            } else {
                table[256 + (d >> 7)] = code as u8;
            }
            k += 1;
        }
        code += 1;
    }
    table
};

/// Map a match length (3-258) to `(symbol, extra_bits, extra_value)`.
#[inline]
pub fn length_to_code(length: usize) -> (u16, u8, u16) {
    debug_assert!(
        (MIN_MATCH..=MAX_MATCH).contains(&length),
        "Length out of range: {}",
        length
    );
    let code = LENGTH_CODE[length] as usize;
    let extra_value = (length - LENGTH_BASE[code] as usize) as u16;
    (257 + code as u16, LENGTH_EXTRA_BITS[code], extra_value)
}

/// Map a distance (1-32768) to `(code, extra_bits, extra_value)`.
#[inline]
pub fn distance_to_code(distance: usize) -> (u16, u8, u16) {
    debug_assert!(
        (1..=32768).contains(&distance),
        "Distance out of range: {}",
        distance
    );
    let d = distance - 1;
    let code = if d < 256 {
        DIST_CODE[d]
    } else {
        DIST_CODE[256 + (d >> 7)]
    } as usize;
    let extra_value = (distance - DISTANCE_BASE[code] as usize) as u16;
    (code as u16, DISTANCE_EXTRA_BITS[code], extra_value)
}

/// Decode a length from a length symbol (257-285) and its extra bits.
#[inline]
pub fn decode_length(symbol: u16, extra: u16) -> usize {
    debug_assert!((257..=285).contains(&symbol), "Invalid length code: {}", symbol);
    LENGTH_BASE[(symbol - 257) as usize] as usize + extra as usize
}

/// Decode a distance from a distance code (0-29) and its extra bits.
#[inline]
pub fn decode_distance(code: u16, extra: u16) -> usize {
    debug_assert!(code < 30, "Invalid distance code: {}", code);
    DISTANCE_BASE[code as usize] as usize + extra as usize
}

fn cached_tree(
    cell: &'static OnceLock<std::result::Result<HuffmanTree, String>>,
    lengths: &[u8],
) -> Result<&'static HuffmanTree> {
    cell.get_or_init(|| HuffmanTree::from_code_lengths(lengths).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| ZlibError::invalid_code_table(message.clone()))
}

/// The fixed literal/length decoding tree, built once.
pub fn fixed_litlen_tree() -> Result<&'static HuffmanTree> {
    static TREE: OnceLock<std::result::Result<HuffmanTree, String>> = OnceLock::new();
    cached_tree(&TREE, &FIXED_LITLEN_LENGTHS)
}

/// The fixed distance decoding tree, built once.
pub fn fixed_distance_tree() -> Result<&'static HuffmanTree> {
    static TREE: OnceLock<std::result::Result<HuffmanTree, String>> = OnceLock::new();
    cached_tree(&TREE, &FIXED_DISTANCE_LENGTHS)
}

/// Bit-reversed fixed literal/length codes for the encoder.
pub fn fixed_litlen_codes() -> &'static [u16] {
    static CODES: OnceLock<Vec<u16>> = OnceLock::new();
    CODES.get_or_init(|| canonical_codes(&FIXED_LITLEN_LENGTHS))
}

/// Bit-reversed fixed distance codes for the encoder.
pub fn fixed_distance_codes() -> &'static [u16] {
    static CODES: OnceLock<Vec<u16>> = OnceLock::new();
    CODES.get_or_init(|| canonical_codes(&FIXED_DISTANCE_LENGTHS))
}
