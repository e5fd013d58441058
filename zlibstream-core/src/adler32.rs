//! Adler-32 checksum (RFC 1950).
//!
//! Adler-32 is the integrity check of the zlib wrapper: two 16-bit sums
//! modulo 65521, packed as `(b << 16) | a`. It is cheaper than CRC-32 and
//! weaker on short inputs, which is acceptable for a stream trailer.
//!
//! ## Performance
//!
//! The modulo is deferred for up to [`NMAX`] bytes, the longest run for
//! which `b` cannot overflow a `u32` starting from residues below 65521.

/// Largest prime smaller than 65536.
pub const ADLER_MOD: u32 = 65521;

/// Number of bytes to process before reducing.
pub const NMAX: usize = 5552;

/// Running Adler-32 accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new Adler-32 calculator (value 1).
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Resume from a previously finished checksum value.
    pub fn from_checksum(value: u32) -> Self {
        Self {
            a: value & 0xFFFF,
            b: value >> 16,
        }
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;

        for chunk in data.chunks(NMAX) {
            for &byte in chunk {
                a += u32::from(byte);
                b += a;
            }
            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }

        self.a = a;
        self.b = b;
    }

    /// Return the checksum of everything seen so far.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Start over at value 1.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Compute Adler-32 checksum of data in one shot.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}
