//! LZ77 match finding for DEFLATE compression.
//!
//! The finder keeps a buffer of twice the window size. New input is
//! appended after the current position; once the position passes
//! `window + max_dist` the upper half slides down, so back-references can
//! always reach a full window of history.
//!
//! Positions are indexed through hash chains keyed on the next three
//! bytes. `head` holds the most recent position for each hash and `prev`
//! links every position to the previous one with the same hash. Both store
//! `position + 1` so that 0 can mean "no entry".

use crate::tables::{MAX_MATCH, MIN_MATCH};
use zlibstream_core::traits::{CompressionLevel, CompressionStrategy};

/// Look-ahead needed before a position is processed without flushing:
/// one maximal match plus the next three bytes to hash.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Matches of length 3 farther back than this cost more than three literals.
pub const TOO_FAR: usize = 4096;

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;
const HASH_SHIFT: u32 = 5;

/// Search parameters for one compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Shorten the chain search once a match this long is in hand.
    pub good_length: usize,
    /// Lazy mode: don't look for a better match past this length.
    /// Greedy mode: don't hash positions inside matches longer than this.
    pub max_lazy: usize,
    /// Stop searching once a match this long is found.
    pub nice_length: usize,
    /// Maximum hash chain entries to examine.
    pub max_chain: usize,
    /// Whether to defer match decisions by one position.
    pub lazy: bool,
}

impl MatchConfig {
    /// Search parameters per level, 0 through 9.
    pub const LEVELS: [MatchConfig; 10] = [
        MatchConfig::new(0, 0, 0, 0, false),
        MatchConfig::new(4, 4, 8, 4, false),
        MatchConfig::new(4, 5, 16, 8, false),
        MatchConfig::new(4, 6, 32, 32, false),
        MatchConfig::new(4, 4, 16, 16, true),
        MatchConfig::new(8, 16, 32, 32, true),
        MatchConfig::new(8, 16, 128, 128, true),
        MatchConfig::new(8, 32, 128, 256, true),
        MatchConfig::new(32, 128, 258, 1024, true),
        MatchConfig::new(32, 258, 258, 4096, true),
    ];

    const fn new(good: usize, lazy_len: usize, nice: usize, chain: usize, lazy: bool) -> Self {
        Self {
            good_length: good,
            max_lazy: lazy_len,
            nice_length: nice,
            max_chain: chain,
            lazy,
        }
    }

    /// Parameters for a compression level.
    pub fn for_level(level: CompressionLevel) -> Self {
        Self::LEVELS[level.level() as usize]
    }
}

/// Hash-chain match finder over a sliding window.
#[derive(Debug, Clone)]
pub struct MatchFinder {
    /// Two windows of history plus look-ahead.
    window: Vec<u8>,
    w_size: usize,
    w_mask: usize,
    /// Most recent `position + 1` per hash.
    head: Vec<u32>,
    /// Previous `position + 1` with the same hash, indexed by `position & w_mask`.
    prev: Vec<u32>,
    /// Current position.
    strstart: usize,
    /// Bytes available from `strstart`.
    lookahead: usize,
    /// Every position below this has been inserted (or deliberately skipped).
    hashed_upto: usize,
    /// Matches may not reach below this position.
    history_floor: usize,
    config: MatchConfig,
    strategy: CompressionStrategy,
}

impl MatchFinder {
    /// Create a finder for a `1 << window_bits` byte window.
    pub fn new(window_bits: u8, level: CompressionLevel, strategy: CompressionStrategy) -> Self {
        let w_size = 1usize << window_bits;
        Self {
            window: vec![0; 2 * w_size],
            w_size,
            w_mask: w_size - 1,
            head: vec![0; HASH_SIZE],
            prev: vec![0; w_size],
            strstart: 0,
            lookahead: 0,
            hashed_upto: 0,
            history_floor: 0,
            config: MatchConfig::for_level(level),
            strategy,
        }
    }

    /// Forget all data and history.
    pub fn reset(&mut self) {
        self.head.fill(0);
        self.prev.fill(0);
        self.strstart = 0;
        self.lookahead = 0;
        self.hashed_upto = 0;
        self.history_floor = 0;
    }

    /// Search parameters in use.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Strategy in use.
    pub fn strategy(&self) -> CompressionStrategy {
        self.strategy
    }

    /// Farthest distance a match may reach.
    pub fn max_dist(&self) -> usize {
        self.w_size - MIN_LOOKAHEAD
    }

    /// Bytes available from the current position.
    #[inline]
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Byte at `offset` from the current position (negative offsets reach history).
    #[inline]
    pub fn byte_at(&self, offset: isize) -> u8 {
        self.window[self.strstart.wrapping_add_signed(offset)]
    }

    /// `len` bytes starting `offset` bytes from the current position.
    pub fn bytes_at(&self, offset: isize, len: usize) -> &[u8] {
        let start = self.strstart.wrapping_add_signed(offset);
        &self.window[start..start + len]
    }

    /// Move the current position forward.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.lookahead);
        self.strstart += n;
        self.lookahead -= n;
    }

    /// Append as much of `input` as fits, sliding first when possible.
    /// Returns the number of bytes taken.
    pub fn fill(&mut self, input: &[u8]) -> usize {
        if self.strstart >= self.w_size + self.max_dist() {
            self.slide();
        }
        let end = self.strstart + self.lookahead;
        let n = input.len().min(self.window.len() - end);
        self.window[end..end + n].copy_from_slice(&input[..n]);
        self.lookahead += n;
        n
    }

    fn slide(&mut self) {
        let w = self.w_size;
        let end = self.strstart + self.lookahead;
        self.window.copy_within(w..end, 0);
        self.strstart -= w;
        self.hashed_upto = self.hashed_upto.saturating_sub(w);
        self.history_floor = self.history_floor.saturating_sub(w);

        let shift = w as u32;
        for entry in self.head.iter_mut().chain(self.prev.iter_mut()) {
            *entry = entry.saturating_sub(shift);
        }
    }

    /// Prime the window with a preset dictionary (last window's worth only).
    ///
    /// Must be called before any input is added.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) {
        self.reset();
        let dict = &dictionary[dictionary.len().saturating_sub(self.w_size)..];
        self.window[..dict.len()].copy_from_slice(dict);
        self.strstart = dict.len();
        // Dictionary positions are hashed on first use, once three bytes follow them.
    }

    /// Stop matches from reaching anything before the current position.
    pub fn forget_history(&mut self) {
        self.head.fill(0);
        self.prev.fill(0);
        self.hashed_upto = self.strstart;
        self.history_floor = self.strstart;
    }

    #[inline]
    fn hash_at(&self, pos: usize) -> usize {
        let w = &self.window;
        ((usize::from(w[pos]) << (2 * HASH_SHIFT))
            ^ (usize::from(w[pos + 1]) << HASH_SHIFT)
            ^ usize::from(w[pos + 2]))
            & HASH_MASK
    }

    #[inline]
    fn insert_at(&mut self, pos: usize) -> u32 {
        let h = self.hash_at(pos);
        let previous = self.head[h];
        self.prev[pos & self.w_mask] = previous;
        self.head[h] = pos as u32 + 1;
        previous
    }

    /// Hash every pending position up to and including the current one.
    ///
    /// Returns the previous position sharing the current position's hash,
    /// if the current position has three bytes to hash and such a position exists.
    pub fn insert(&mut self) -> Option<usize> {
        let end = self.strstart + self.lookahead;
        while self.hashed_upto < self.strstart && self.hashed_upto + MIN_MATCH <= end {
            self.insert_at(self.hashed_upto);
            self.hashed_upto += 1;
        }
        if self.hashed_upto != self.strstart || self.lookahead < MIN_MATCH {
            return None;
        }
        self.hashed_upto += 1;
        match self.insert_at(self.strstart) {
            0 => None,
            entry => Some(entry as usize - 1),
        }
    }

    /// Leave every position before the current one unhashed.
    pub fn skip_hashing(&mut self) {
        self.hashed_upto = self.hashed_upto.max(self.strstart);
    }

    /// Whether `candidate` is close enough and not behind a full flush.
    pub fn in_reach(&self, candidate: usize) -> bool {
        candidate >= self.history_floor && self.strstart - candidate <= self.max_dist()
    }

    /// Longest match for the current position, following the chain from `candidate`.
    ///
    /// Only matches longer than `prev_length` count. Returns
    /// `(length, distance)`, with distance 0 when nothing better was found.
    pub fn longest_match(&self, candidate: usize, prev_length: usize) -> (usize, usize) {
        let mut chain = self.config.max_chain;
        if prev_length >= self.config.good_length {
            chain >>= 2;
        }
        let max_len = MAX_MATCH.min(self.lookahead);
        let nice = self.config.nice_length.min(self.lookahead);
        let limit = self
            .strstart
            .saturating_sub(self.max_dist())
            .max(self.history_floor);

        let scan = self.strstart;
        let w = &self.window;
        let mut best_len = prev_length;
        let mut best_dist = 0;
        let mut cur = candidate;

        while chain > 0 && best_len < max_len && cur >= limit && cur < scan {
            if w[cur + best_len] == w[scan + best_len] && w[cur] == w[scan] {
                let len = w[cur..cur + max_len]
                    .iter()
                    .zip(&w[scan..scan + max_len])
                    .take_while(|(a, b)| a == b)
                    .count();
                if len > best_len {
                    best_len = len;
                    best_dist = scan - cur;
                    if len >= nice {
                        break;
                    }
                }
            }

            chain -= 1;
            match self.prev[cur & self.w_mask] {
                0 => break,
                entry if entry as usize - 1 >= cur => break,
                entry => cur = entry as usize - 1,
            }
        }

        (best_len, best_dist)
    }

    /// Length of the run of the previous byte starting at the current
    /// position, or 0 if shorter than a minimal match.
    pub fn rle_run(&self) -> usize {
        if self.strstart <= self.history_floor || self.lookahead < MIN_MATCH {
            return 0;
        }
        let w = &self.window;
        let byte = w[self.strstart - 1];
        let max_len = MAX_MATCH.min(self.lookahead);
        let run = w[self.strstart..self.strstart + max_len]
            .iter()
            .take_while(|&&b| b == byte)
            .count();
        if run >= MIN_MATCH { run } else { 0 }
    }
}
