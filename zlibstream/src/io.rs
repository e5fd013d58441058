//! `std::io` adapters over the zlib sessions.
//!
//! [`ZlibReader`] decompresses from any `Read` source; [`ZlibWriter`]
//! compresses into any `Write` sink. Both move data through fixed-size
//! buffers, so memory use does not grow with the stream.

use crate::zlib::{ZlibDecoder, ZlibEncoder};
use log::debug;
use std::io::{self, Read, Seek, SeekFrom, Write};
use zlibstream_core::error::{Result, ZlibError};
use zlibstream_core::traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
};

/// Size of the internal staging buffers.
const BUFFER_SIZE: usize = 32 * 1024;

/// Streaming decompression reader implementing `Read`.
#[derive(Debug)]
pub struct ZlibReader<R: Read> {
    inner: R,
    decoder: ZlibDecoder,
    input: Vec<u8>,
    input_pos: usize,
    input_len: usize,
    done: bool,
}

impl<R: Read> ZlibReader<R> {
    /// Create a reader for a zlib stream.
    pub fn new(inner: R) -> Self {
        Self::with_decoder(inner, ZlibDecoder::new())
    }

    /// Create a reader driving a configured decoder.
    pub fn with_decoder(inner: R, decoder: ZlibDecoder) -> Self {
        Self {
            inner,
            decoder,
            input: vec![0; BUFFER_SIZE],
            input_pos: 0,
            input_len: 0,
            done: false,
        }
    }

    /// The underlying decoder.
    pub fn decoder(&self) -> &ZlibDecoder {
        &self.decoder
    }

    /// The underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Give back the source. Bytes read ahead of the stream end are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ZlibReader<R> {
    /// Give back the source, positioned right after the zlib stream.
    ///
    /// Fails with `UnpackableSource` if the source refuses to seek back.
    pub fn into_inner_rewound(mut self) -> Result<R> {
        let unread = (self.input_len - self.input_pos) + self.decoder.overread();
        if unread > 0 {
            self.inner
                .seek(SeekFrom::Current(-(unread as i64)))
                .map_err(|e| ZlibError::unpackable(format!("cannot rewind {} bytes: {}", unread, e)))?;
        }
        Ok(self.inner)
    }
}

impl<R: Read> Read for ZlibReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.done {
            return Ok(0);
        }

        let mut eof = false;
        loop {
            if self.input_pos == self.input_len && !eof {
                self.input_len = self.inner.read(&mut self.input)?;
                self.input_pos = 0;
                eof = self.input_len == 0;
            }

            let (consumed, produced, status) = self
                .decoder
                .decompress(&self.input[self.input_pos..self.input_len], buf)?;
            self.input_pos += consumed;

            match status {
                DecompressStatus::Done => {
                    self.done = true;
                    return Ok(produced);
                }
                DecompressStatus::NeedsDictionary(id) => {
                    return Err(ZlibError::DictionaryRequired { id }.into());
                }
                _ if produced > 0 => return Ok(produced),
                DecompressStatus::NeedsInput if eof => {
                    return Err(ZlibError::unexpected_eof("zlib stream truncated").into());
                }
                _ => {}
            }
        }
    }
}

/// Streaming compression writer implementing `Write`.
///
/// `flush` performs a sync flush; `finish` ends the stream. Dropping an
/// unfinished writer finishes it; a failure there is only logged.
#[derive(Debug)]
pub struct ZlibWriter<W: Write> {
    inner: Option<W>,
    encoder: ZlibEncoder,
    output: Vec<u8>,
}

impl<W: Write> ZlibWriter<W> {
    /// Create a writer producing a zlib stream at `level`.
    pub fn new(inner: W, level: CompressionLevel) -> Self {
        Self::with_encoder(inner, ZlibEncoder::new(level))
    }

    /// Create a writer driving a configured encoder.
    pub fn with_encoder(inner: W, encoder: ZlibEncoder) -> Self {
        Self {
            inner: Some(inner),
            encoder,
            output: vec![0; BUFFER_SIZE],
        }
    }

    /// The underlying encoder.
    pub fn encoder(&self) -> &ZlibEncoder {
        &self.encoder
    }

    /// The underlying sink.
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// Compress `input` with `flush`, writing everything produced to the sink.
    fn pump(&mut self, input: &[u8], flush: FlushMode) -> Result<usize> {
        let Some(inner) = self.inner.as_mut() else {
            return Err(ZlibError::StreamFinished);
        };

        let mut consumed = 0;
        loop {
            let (c, produced, status) =
                self.encoder
                    .compress(&input[consumed..], &mut self.output, flush)?;
            consumed += c;
            inner.write_all(&self.output[..produced])?;

            match status {
                CompressStatus::NeedsOutput => continue,
                CompressStatus::Done => return Ok(consumed),
                CompressStatus::NeedsInput if consumed == input.len() => return Ok(consumed),
                CompressStatus::NeedsInput => continue,
            }
        }
    }

    /// Write the final block and trailer, then give back the sink.
    pub fn finish(mut self) -> Result<W> {
        if !self.encoder.is_finished() {
            self.pump(&[], FlushMode::Finish)?;
        }
        let mut inner = self.inner.take().ok_or(ZlibError::StreamFinished)?;
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for ZlibWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.pump(buf, FlushMode::None)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.pump(&[], FlushMode::Sync)?;
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for ZlibWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() && !self.encoder.is_finished() {
            if let Err(e) = self.pump(&[], FlushMode::Finish) {
                debug!("zlib writer failed to finish on drop: {}", e);
            }
        }
    }
}
