//! History window for back-reference copies during decompression.
//!
//! The window keeps the most recent output bytes (32 KiB for DEFLATE) in a
//! power-of-two ring so a decoder can resolve `(length, distance)` pairs
//! without holding on to the caller's output buffers.

use crate::error::{Result, ZlibError};

/// Largest window DEFLATE allows (32 KiB).
pub const MAX_WINDOW_SIZE: usize = 32768;

/// A ring buffer holding the last `capacity` bytes produced.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    /// The underlying buffer.
    buffer: Vec<u8>,
    /// Current write position (next byte will be written here).
    position: usize,
    /// Number of valid bytes (up to capacity).
    size: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl HistoryWindow {
    /// Create a window with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );

        Self {
            buffer: vec![0; capacity],
            position: 0,
            size: 0,
            mask: capacity - 1,
        }
    }

    /// Create a full-size DEFLATE window.
    pub fn deflate() -> Self {
        Self::new(MAX_WINDOW_SIZE)
    }

    /// Get the capacity of the window.
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Number of bytes a back-reference may reach.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.position = 0;
        self.size = 0;
        self.buffer.fill(0);
    }

    /// Append a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
        if self.size <= self.mask {
            self.size += 1;
        }
    }

    /// Append a run of bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let cap = self.capacity();
        let bytes = if bytes.len() > cap {
            &bytes[bytes.len() - cap..]
        } else {
            bytes
        };

        let first = bytes.len().min(cap - self.position);
        self.buffer[self.position..self.position + first].copy_from_slice(&bytes[..first]);
        let rest = bytes.len() - first;
        self.buffer[..rest].copy_from_slice(&bytes[first..]);

        self.position = (self.position + bytes.len()) & self.mask;
        self.size = (self.size + bytes.len()).min(cap);
    }

    /// Read the byte `distance` positions back (1 is the most recent byte).
    pub fn read_at_distance(&self, distance: usize) -> Result<u8> {
        if distance == 0 || distance > self.size {
            return Err(ZlibError::invalid_back_reference(distance, self.size));
        }

        let index = (self.position.wrapping_sub(distance)) & self.mask;
        Ok(self.buffer[index])
    }

    /// Copy up to `length` bytes from `distance` back into `out`, appending
    /// each to the history as it goes. Copies stop early when `out` is full.
    ///
    /// Overlapping copies (`length > distance`) repeat the pattern, so the
    /// loop runs byte by byte. Returns the number of bytes copied.
    pub fn copy_match(&mut self, distance: usize, length: usize, out: &mut [u8]) -> Result<usize> {
        if distance == 0 || distance > self.size {
            return Err(ZlibError::invalid_back_reference(distance, self.size));
        }

        let count = length.min(out.len());
        let mut src_pos = (self.position.wrapping_sub(distance)) & self.mask;

        for slot in out.iter_mut().take(count) {
            let byte = self.buffer[src_pos];
            *slot = byte;
            self.write_byte(byte);
            src_pos = (src_pos + 1) & self.mask;
        }

        Ok(count)
    }

    /// Get the last `count` bytes written, oldest first.
    pub fn last_bytes(&self, count: usize) -> Vec<u8> {
        let count = count.min(self.size);
        (0..count)
            .map(|i| self.buffer[(self.position.wrapping_sub(count - i)) & self.mask])
            .collect()
    }

    /// Prime the window with a preset dictionary.
    ///
    /// Only the last `capacity` bytes of an oversized dictionary are kept.
    pub fn preload_dictionary(&mut self, dictionary: &[u8]) {
        self.write_bytes(dictionary);
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::deflate()
    }
}
