//! Bit-level I/O for DEFLATE streams.
//!
//! DEFLATE packs data LSB-first: the first bit of a field sits in the least
//! significant bit of the byte. Huffman codes are the exception and are
//! stored MSB-first, which is why encoders keep their codes bit-reversed.
//!
//! Neither type here owns a reader or writer. [`BitReader`] is fed a fresh
//! input slice on every call and keeps its partially consumed bits between
//! calls, so a decoder built on it can stop at any point and resume later.
//! [`BitWriter`] accumulates complete bytes in a pending queue that the
//! caller drains into whatever output space it has.
//!
//! # Example
//!
//! ```
//! use zlibstream_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! writer.align_to_byte();
//!
//! let mut out = [0u8; 4];
//! let n = writer.drain_into(&mut out);
//!
//! let mut reader = BitReader::new();
//! assert_eq!(reader.read_bits(&out[..n], 3), Some(0b101));
//! assert_eq!(reader.read_bits(&out[..n], 4), Some(0b1100));
//! ```

/// Largest fill request; leaves room to append one more byte to the 64-bit buffer.
pub const MAX_FILL_BITS: u8 = 56;

/// A resumable bit reader over caller-supplied input slices.
///
/// Bytes are pulled from the current slice into a 64-bit buffer on demand.
/// `input_pos` counts how many bytes of the current slice have been taken;
/// call [`BitReader::reset_for_new_input`] before handing it the next slice.
#[derive(Debug, Clone, Default)]
pub struct BitReader {
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Bytes taken from the current input slice.
    input_pos: usize,
    /// Bytes taken from the current input slice that are still (partly) buffered.
    pulled_this_call: usize,
    /// Total bits consumed (for error reporting).
    total_bits_read: u64,
}

impl BitReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget buffered bits and counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Start a new input slice. Buffered bits are kept.
    pub fn reset_for_new_input(&mut self) {
        self.input_pos = 0;
        self.pulled_this_call = 0;
    }

    /// Bytes taken from the current input slice.
    pub fn input_pos(&self) -> usize {
        self.input_pos
    }

    /// Total bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of buffered bits.
    #[inline]
    pub fn bits_available(&self) -> u8 {
        self.bits_in_buffer
    }

    /// Whether the read position sits on a byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.bits_in_buffer % 8 == 0
    }

    /// Pull bytes from `input` until at least `want` bits are buffered or
    /// the slice is exhausted. Returns whether `want` bits are available.
    #[inline]
    pub fn fill(&mut self, input: &[u8], want: u8) -> bool {
        let want = want.min(MAX_FILL_BITS);
        while self.bits_in_buffer < want {
            let Some(&byte) = input.get(self.input_pos) else {
                return false;
            };
            self.buffer |= u64::from(byte) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
            self.input_pos += 1;
            self.pulled_this_call += 1;
        }
        true
    }

    /// Look at the next `count` (at most 32) buffered bits without consuming them.
    ///
    /// Bits beyond [`BitReader::bits_available`] read as zero.
    #[inline]
    pub fn peek(&self, count: u8) -> u32 {
        debug_assert!(count <= 32, "Cannot peek more than 32 bits at once");
        let mask = (1u64 << count).wrapping_sub(1);
        (self.buffer & mask) as u32
    }

    /// Look at `count` (at most 32) buffered bits starting `offset` bits ahead.
    #[inline]
    pub fn peek_at(&self, offset: u8, count: u8) -> u32 {
        debug_assert!(count <= 32 && offset < 64);
        let mask = (1u64 << count).wrapping_sub(1);
        ((self.buffer >> offset) & mask) as u32
    }

    /// Drop `count` buffered bits.
    #[inline]
    pub fn consume(&mut self, count: u8) {
        debug_assert!(count <= self.bits_in_buffer);
        self.buffer = self.buffer.checked_shr(u32::from(count)).unwrap_or(0);
        self.bits_in_buffer -= count;
        self.total_bits_read += u64::from(count);
    }

    /// Read `count` (at most 32) bits, pulling from `input` as needed.
    ///
    /// Returns `None` when the slice runs out first; bits already pulled stay
    /// buffered, so the same call can be repeated with the next slice.
    #[inline]
    pub fn read_bits(&mut self, input: &[u8], count: u8) -> Option<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");
        if count == 0 {
            return Some(0);
        }
        if !self.fill(input, count) {
            return None;
        }
        let value = self.peek(count);
        self.consume(count);
        Some(value)
    }

    /// Discard bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let remainder = self.bits_in_buffer % 8;
        if remainder > 0 {
            self.consume(remainder);
        }
    }

    /// Copy byte-aligned data into `out`, first from the bit buffer and then
    /// straight from `input`. Returns the number of bytes copied.
    pub fn read_aligned_bytes(&mut self, input: &[u8], out: &mut [u8]) -> usize {
        debug_assert!(self.is_aligned(), "reader must be byte-aligned");

        let mut written = 0;
        while self.bits_in_buffer >= 8 && written < out.len() {
            out[written] = self.peek(8) as u8;
            self.consume(8);
            written += 1;
        }

        let available = input.len().saturating_sub(self.input_pos);
        let direct = available.min(out.len() - written);
        if direct > 0 {
            out[written..written + direct]
                .copy_from_slice(&input[self.input_pos..self.input_pos + direct]);
            self.input_pos += direct;
            self.total_bits_read += direct as u64 * 8;
            written += direct;
        }
        written
    }

    /// Hand whole look-ahead bytes back to the current input slice.
    ///
    /// Only bytes taken from the current slice can be returned. Partial bits
    /// of the current byte are discarded first. Returns how many bytes were
    /// given back.
    pub fn release_unused_bytes(&mut self) -> usize {
        self.align_to_byte();
        let whole = usize::from(self.bits_in_buffer / 8);
        let give_back = whole.min(self.pulled_this_call);
        if give_back > 0 {
            self.input_pos -= give_back;
            self.pulled_this_call -= give_back;
            self.bits_in_buffer -= (give_back * 8) as u8;
            let mask = (1u64 << self.bits_in_buffer).wrapping_sub(1);
            self.buffer &= mask;
        }
        give_back
    }

    /// Align, then hand out every whole byte left in the buffer.
    ///
    /// Used once a stream ends to recover look-ahead bytes pulled in by
    /// earlier calls, which [`BitReader::release_unused_bytes`] cannot return.
    pub fn take_buffered_bytes(&mut self) -> Vec<u8> {
        self.align_to_byte();
        let mut bytes = Vec::with_capacity(self.buffered_bytes());
        while self.bits_in_buffer >= 8 {
            bytes.push(self.peek(8) as u8);
            self.consume(8);
        }
        bytes
    }

    /// Whole bytes still sitting in the buffer.
    pub fn buffered_bytes(&self) -> usize {
        usize::from(self.bits_in_buffer / 8)
    }
}

/// A bit writer that queues finished bytes for the caller to drain.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Complete bytes not yet handed out.
    pending: Vec<u8>,
    /// Bytes of `pending` already drained.
    drained: usize,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all queued output and partial bits.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.drained = 0;
        self.buffer = 0;
        self.bits_in_buffer = 0;
        self.total_bits_written = 0;
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Whether the next bit starts a new byte.
    pub fn is_aligned(&self) -> bool {
        self.bits_in_buffer == 0
    }

    /// Bits waiting in the partial byte.
    pub fn partial_bits(&self) -> u8 {
        self.bits_in_buffer
    }

    #[inline]
    fn flush_bytes(&mut self) {
        while self.bits_in_buffer >= 8 {
            self.pending.push(self.buffer as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
    }

    /// Write the low `count` (at most 32) bits of `value`.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");
        if count == 0 {
            return;
        }
        let mask = (1u64 << count) - 1;
        self.buffer |= (u64::from(value) & mask) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += u64::from(count);
        self.flush_bytes();
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(u32::from(bit), 1);
    }

    /// Pad with zero bits to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        if self.bits_in_buffer > 0 {
            let padding = 8 - self.bits_in_buffer;
            self.write_bits(0, padding);
        }
    }

    /// Align, then append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align_to_byte();
        self.pending.extend_from_slice(bytes);
        self.total_bits_written += bytes.len() as u64 * 8;
    }

    /// Complete bytes waiting to be drained.
    pub fn pending_len(&self) -> usize {
        self.pending.len() - self.drained
    }

    /// Move as many complete bytes as fit into `out`. Returns the count moved.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let n = self.pending_len().min(out.len());
        out[..n].copy_from_slice(&self.pending[self.drained..self.drained + n]);
        self.drained += n;
        if self.drained == self.pending.len() {
            self.pending.clear();
            self.drained = 0;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitreader_basic() {
        // 0b10110101 = 0xB5
        let data = [0xB5];
        let mut reader = BitReader::new();

        let bits: Vec<u32> = (0..8).filter_map(|_| reader.read_bits(&data, 1)).collect();
        assert_eq!(bits, vec![1, 0, 1, 0, 1, 1, 0, 1]); // LSB first
        assert_eq!(reader.read_bits(&data, 1), None);
    }

    #[test]
    fn test_bitreader_multi_byte() {
        let data = [0xFF, 0x00];
        let mut reader = BitReader::new();

        assert_eq!(reader.read_bits(&data, 4), Some(0xF));
        assert_eq!(reader.read_bits(&data, 8), Some(0x0F)); // Crosses byte boundary
        assert_eq!(reader.read_bits(&data, 4), Some(0x0));
        assert_eq!(reader.bit_position(), 16);
    }

    #[test]
    fn test_bitreader_resumes_across_slices() {
        let mut reader = BitReader::new();

        // 12-bit value 0xABC split over two one-byte slices.
        assert_eq!(reader.read_bits(&[0xBC], 12), None);
        assert_eq!(reader.input_pos(), 1);

        reader.reset_for_new_input();
        assert_eq!(reader.read_bits(&[0x0A], 12), Some(0xABC));
        assert_eq!(reader.input_pos(), 1);
    }

    #[test]
    fn test_peek_and_consume() {
        let data = [0xAB];
        let mut reader = BitReader::new();
        assert!(reader.fill(&data, 8));

        assert_eq!(reader.peek(4), 0xB);
        assert_eq!(reader.peek(4), 0xB);
        reader.consume(4);
        assert_eq!(reader.peek(4), 0xA);
        assert_eq!(reader.bits_available(), 4);
    }

    #[test]
    fn test_align_and_aligned_bytes() {
        let data = [0xFF, 0xAA, 0x12, 0x34, 0x56];
        let mut reader = BitReader::new();

        assert_eq!(reader.read_bits(&data, 3), Some(0b111));
        reader.align_to_byte();
        assert_eq!(reader.read_bits(&data, 8), Some(0xAA));

        let mut out = [0u8; 8];
        let n = reader.read_aligned_bytes(&data, &mut out);
        assert_eq!(&out[..n], &[0x12, 0x34, 0x56]);
        assert_eq!(reader.input_pos(), 5);
    }

    #[test]
    fn test_release_unused_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = BitReader::new();

        assert!(reader.fill(&data, 32));
        assert_eq!(reader.read_bits(&data, 4), Some(0x1));

        // Rest of byte 0 is dropped, bytes 1..4 go back.
        assert_eq!(reader.release_unused_bytes(), 3);
        assert_eq!(reader.input_pos(), 1);
        assert_eq!(reader.bits_available(), 0);
    }

    #[test]
    fn test_release_keeps_bytes_from_earlier_slices() {
        let mut reader = BitReader::new();
        assert!(reader.fill(&[0x11, 0x22], 16));

        reader.reset_for_new_input();
        assert!(reader.fill(&[0x33], 24));
        assert_eq!(reader.read_bits(&[0x33], 8), Some(0x11));

        assert_eq!(reader.release_unused_bytes(), 1);
        assert_eq!(reader.buffered_bytes(), 1);
        assert_eq!(reader.input_pos(), 0);
    }

    #[test]
    fn test_peek_at_and_take_buffered() {
        let data = [0b1010_0110, 0x12, 0x34, 0x56];
        let mut reader = BitReader::new();
        assert!(reader.fill(&data, 32));
        assert_eq!(reader.peek_at(1, 3), 0b011);
        assert_eq!(reader.peek_at(8, 8), 0x12);

        reader.consume(3);
        assert_eq!(reader.take_buffered_bytes(), vec![0x12, 0x34, 0x56]);
        assert_eq!(reader.bits_available(), 0);
    }

    #[test]
    fn test_bitwriter_basic() {
        let mut writer = BitWriter::new();
        for bit in [true, false, true, false, true, true, false, true] {
            writer.write_bit(bit);
        }
        let mut out = [0u8; 1];
        assert_eq!(writer.drain_into(&mut out), 1);
        assert_eq!(out, [0xB5]);
    }

    #[test]
    fn test_bitwriter_multi_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b11001, 5);
        // 3 bits: 101, 5 bits: 11001 -> 11001_101 = 0xCD
        assert_eq!(writer.pending_len(), 1);
        let mut out = [0u8; 2];
        assert_eq!(writer.drain_into(&mut out), 1);
        assert_eq!(out[0], 0xCD);
    }

    #[test]
    fn test_partial_drain() {
        let mut writer = BitWriter::new();
        writer.write_bytes(&[1, 2, 3, 4, 5]);

        let mut out = [0u8; 2];
        assert_eq!(writer.drain_into(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(writer.pending_len(), 3);
        assert_eq!(writer.drain_into(&mut out), 2);
        assert_eq!(out, [3, 4]);
        assert_eq!(writer.drain_into(&mut out), 1);
        assert_eq!(out[0], 5);
        assert_eq!(writer.pending_len(), 0);
    }

    #[test]
    fn test_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b1111, 4);
        writer.write_bits(0b10, 2);
        writer.write_bits(0b110011, 6);
        writer.write_bits(0xDEAD_BEEF, 32);
        writer.align_to_byte();

        let mut bytes = vec![0u8; writer.pending_len()];
        writer.drain_into(&mut bytes);

        let mut reader = BitReader::new();
        assert_eq!(reader.read_bits(&bytes, 3), Some(0b101));
        assert_eq!(reader.read_bits(&bytes, 4), Some(0b1111));
        assert_eq!(reader.read_bits(&bytes, 2), Some(0b10));
        assert_eq!(reader.read_bits(&bytes, 6), Some(0b110011));
        assert_eq!(reader.read_bits(&bytes, 32), Some(0xDEAD_BEEF));
    }
}
