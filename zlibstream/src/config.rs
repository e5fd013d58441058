//! Session configuration.
//!
//! Configuration is fixed when a session is constructed. Builders return
//! new values; validation happens once, in `validate`, which every session
//! constructor calls.

use zlibstream_core::error::{Result, ZlibError};
use zlibstream_core::traits::{CompressionLevel, CompressionStrategy};

/// Stream framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    /// RFC 1950: 2-byte header, DEFLATE data, Adler-32 trailer.
    #[default]
    Zlib,
    /// Bare RFC 1951 DEFLATE data.
    Raw,
}

/// Compression session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderConfig {
    /// Compression level.
    pub level: CompressionLevel,
    /// Match-finding strategy.
    pub strategy: CompressionStrategy,
    /// Base-2 logarithm of the window size (9-15; 8 is promoted to 9).
    pub window_bits: u8,
    /// Output framing.
    pub format: Format,
}

impl EncoderConfig {
    /// Smallest window accepted (8 is also accepted and promoted).
    pub const MIN_WINDOW_BITS: u8 = 9;
    /// Largest window DEFLATE can address.
    pub const MAX_WINDOW_BITS: u8 = 15;

    /// Default settings at the given level.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Build from zlib-style integer parameters.
    pub fn from_params(level: i32, strategy: i32, window_bits: u8) -> Result<Self> {
        Self {
            level: CompressionLevel::try_new(level)?,
            strategy: CompressionStrategy::try_from(strategy)?,
            window_bits,
            format: Format::Zlib,
        }
        .validate()
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: CompressionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the window size exponent.
    pub fn with_window_bits(mut self, window_bits: u8) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Set the output framing.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Check the settings and normalize window bits.
    pub fn validate(self) -> Result<Self> {
        let window_bits = match self.window_bits {
            8 => Self::MIN_WINDOW_BITS,
            bits @ Self::MIN_WINDOW_BITS..=Self::MAX_WINDOW_BITS => bits,
            bits => return Err(ZlibError::InvalidWindowBits { bits }),
        };
        Ok(Self {
            window_bits,
            ..self
        })
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            level: CompressionLevel::DEFAULT,
            strategy: CompressionStrategy::Default,
            window_bits: Self::MAX_WINDOW_BITS,
            format: Format::Zlib,
        }
    }
}

/// Decompression session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// Expected framing.
    pub format: Format,
    /// Largest window the stream may declare (8-15). Raw streams are held
    /// to it as well.
    pub max_window_bits: u8,
    /// Preset dictionary to use when the stream asks for one.
    pub dictionary: Option<Vec<u8>>,
}

impl DecoderConfig {
    /// Smallest window a zlib header can declare.
    pub const MIN_WINDOW_BITS: u8 = 8;
    /// Largest window DEFLATE can address.
    pub const MAX_WINDOW_BITS: u8 = 15;

    /// Default settings for the given framing.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Set the expected framing.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Limit the window the stream may declare.
    pub fn with_max_window_bits(mut self, bits: u8) -> Self {
        self.max_window_bits = bits;
        self
    }

    /// Supply a preset dictionary.
    pub fn with_dictionary(mut self, dictionary: impl Into<Vec<u8>>) -> Self {
        self.dictionary = Some(dictionary.into());
        self
    }

    /// Check the settings.
    pub fn validate(self) -> Result<Self> {
        if !(Self::MIN_WINDOW_BITS..=Self::MAX_WINDOW_BITS).contains(&self.max_window_bits) {
            return Err(ZlibError::InvalidWindowBits {
                bits: self.max_window_bits,
            });
        }
        Ok(self)
    }

    /// Largest window size in bytes.
    pub fn max_window_size(&self) -> usize {
        1 << self.max_window_bits
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            format: Format::Zlib,
            max_window_bits: Self::MAX_WINDOW_BITS,
            dictionary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.level, CompressionLevel::DEFAULT);
        assert_eq!(config.strategy, CompressionStrategy::Default);
        assert_eq!(config.window_size(), 32768);
        assert_eq!(config.format, Format::Zlib);
    }

    #[test]
    fn test_window_bits_validation() {
        let config = EncoderConfig::default().with_window_bits(8).validate().unwrap();
        assert_eq!(config.window_bits, 9);

        for bits in [0, 7, 16] {
            assert!(matches!(
                EncoderConfig::default().with_window_bits(bits).validate(),
                Err(ZlibError::InvalidWindowBits { .. })
            ));
        }
    }

    #[test]
    fn test_from_params() {
        let config = EncoderConfig::from_params(9, 3, 12).unwrap();
        assert_eq!(config.level, CompressionLevel::BEST);
        assert_eq!(config.strategy, CompressionStrategy::Rle);
        assert_eq!(config.window_bits, 12);

        assert!(matches!(
            EncoderConfig::from_params(11, 0, 15),
            Err(ZlibError::InvalidLevel { level: 11 })
        ));
        assert!(matches!(
            EncoderConfig::from_params(6, 7, 15),
            Err(ZlibError::InvalidStrategy { value: 7 })
        ));
    }

    #[test]
    fn test_decoder_builders() {
        let config = DecoderConfig::new(Format::Raw)
            .with_max_window_bits(10)
            .with_dictionary(b"dict".as_slice())
            .validate()
            .unwrap();
        assert_eq!(config.format, Format::Raw);
        assert_eq!(config.max_window_size(), 1024);
        assert_eq!(config.dictionary.as_deref(), Some(b"dict".as_slice()));

        assert!(DecoderConfig::default().with_max_window_bits(16).validate().is_err());
    }
}
