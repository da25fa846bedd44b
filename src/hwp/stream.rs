//! Lazy raw-deflate decompression of section streams.
//!
//! Compressed documents store every `BodyText/Section{N}` stream as headerless
//! deflate data. [`DeflateStream`] inflates on demand: it pulls input from the
//! wrapped source only while its output buffer cannot satisfy a read and the
//! inflater has not reached the end of the deflate stream.

use crate::common::{Error, Result};
use flate2::{Decompress, FlushDecompress, Status};
use std::io::{self, Read};
use tracing::trace;

/// Default number of compressed bytes requested from the source at a time.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A forward-only reader that inflates raw-deflate data from `R`.
///
/// # Examples
///
/// ```
/// use std::io::{Read, Write};
/// use flate2::{Compression, write::DeflateEncoder};
/// use hwp_tables::hwp::DeflateStream;
///
/// let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(b"section bytes").unwrap();
/// let compressed = encoder.finish().unwrap();
///
/// let mut stream = DeflateStream::new(compressed.as_slice(), -15).unwrap();
/// assert_eq!(stream.read_up_to(7).unwrap(), b"section");
/// assert_eq!(stream.read_up_to(100).unwrap(), b" bytes");
/// assert!(stream.read_up_to(1).unwrap().is_empty());
/// ```
pub struct DeflateStream<R: Read> {
    source: R,
    inflater: Decompress,
    /// Compressed bytes read from `source` but not yet consumed
    input: Vec<u8>,
    input_pos: usize,
    /// Inflated bytes not yet handed to the caller
    output: Vec<u8>,
    output_pos: usize,
    chunk_size: usize,
    source_done: bool,
    finished: bool,
}

impl<R: Read> DeflateStream<R> {
    /// Wrap `source` using the negative window-bits convention for raw
    /// deflate (`-8` through `-15`).
    pub fn new(source: R, window_bits: i8) -> Result<Self> {
        Self::with_chunk_size(source, window_bits, DEFAULT_CHUNK_SIZE)
    }

    /// Like [`DeflateStream::new`] with a custom input chunk size.
    pub fn with_chunk_size(source: R, window_bits: i8, chunk_size: usize) -> Result<Self> {
        if !(-15..=-8).contains(&window_bits) {
            return Err(Error::InvalidArgument(format!(
                "raw deflate window bits must be in -15..=-8, got {window_bits}"
            )));
        }
        if chunk_size == 0 {
            return Err(Error::InvalidArgument(
                "chunk size must be non-zero".to_string(),
            ));
        }

        // A 32 KiB window decodes data produced with any smaller window.
        Ok(Self {
            source,
            inflater: Decompress::new(false),
            input: Vec::with_capacity(chunk_size),
            input_pos: 0,
            output: Vec::new(),
            output_pos: 0,
            chunk_size,
            source_done: false,
            finished: false,
        })
    }

    /// Number of inflated bytes buffered and not yet returned.
    #[inline]
    fn buffered(&self) -> usize {
        self.output.len() - self.output_pos
    }

    /// Whether the inflater has seen the end of the deflate stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Inflate until `want` bytes are buffered or no more can be produced.
    fn fill(&mut self, want: usize) -> Result<()> {
        while self.buffered() < want && !self.finished {
            if self.input_pos == self.input.len() && !self.source_done {
                self.input.resize(self.chunk_size, 0);
                let read = self.source.read(&mut self.input)?;
                self.input.truncate(read);
                self.input_pos = 0;
                if read == 0 {
                    self.source_done = true;
                }
            }

            if self.output_pos > 0 && self.output_pos == self.output.len() {
                self.output.clear();
                self.output_pos = 0;
            }
            self.output.reserve(self.chunk_size.max(want - self.buffered()));

            let flush = if self.source_done {
                FlushDecompress::Finish
            } else {
                FlushDecompress::None
            };
            let before_in = self.inflater.total_in();
            let before_out = self.inflater.total_out();
            let status = self.inflater.decompress_vec(
                &self.input[self.input_pos..],
                &mut self.output,
                flush,
            )?;
            let consumed = (self.inflater.total_in() - before_in) as usize;
            let produced = (self.inflater.total_out() - before_out) as usize;
            self.input_pos += consumed;

            match status {
                Status::StreamEnd => {
                    self.finished = true;
                    trace!(total_out = self.inflater.total_out(), "deflate stream finished");
                },
                _ if self.source_done && consumed == 0 && produced == 0 => {
                    // An empty source is an empty stream; anything else
                    // ending here was cut short.
                    if self.inflater.total_in() == 0 {
                        break;
                    }
                    return Err(Error::Decompression(format!(
                        "deflate stream truncated after {} input bytes",
                        self.inflater.total_in()
                    )));
                },
                _ => {},
            }
        }
        Ok(())
    }

    /// Return up to `n` inflated bytes; fewer only at end of stream.
    pub fn read_up_to(&mut self, n: usize) -> Result<Vec<u8>> {
        self.fill(n)?;
        let take = n.min(self.buffered());
        let chunk = self.output[self.output_pos..self.output_pos + take].to_vec();
        self.output_pos += take;
        Ok(chunk)
    }

    /// Consume the stream and return the wrapped source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: Read> Read for DeflateStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill(buf.len()).map_err(|err| match err {
            Error::Io(io_err) => io_err,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })?;
        let take = buf.len().min(self.buffered());
        buf[..take].copy_from_slice(&self.output[self.output_pos..self.output_pos + take]);
        self.output_pos += take;
        Ok(take)
    }
}

#[cfg(test)]
pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that hands out at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
        reads: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let take = self.step.min(buf.len()).min(self.data.len());
            buf[..take].copy_from_slice(&self.data[..take]);
            self.data = &self.data[take..];
            Ok(take)
        }
    }

    fn sample_text() -> Vec<u8> {
        (0..20_000u32).flat_map(|i| (i % 97).to_le_bytes()).collect()
    }

    #[test]
    fn test_round_trip_in_small_reads() {
        let plain = sample_text();
        let compressed = deflate(&plain);
        let mut stream = DeflateStream::new(compressed.as_slice(), -15).unwrap();

        let mut out = Vec::new();
        loop {
            let chunk = stream.read_up_to(333).unwrap();
            assert!(chunk.len() <= 333);
            if chunk.is_empty() {
                break;
            }
            out.extend_from_slice(&chunk);
        }
        assert_eq!(out, plain);
        assert!(stream.is_finished());
    }

    #[test]
    fn test_tolerates_one_byte_source_chunks() {
        let plain = sample_text();
        let compressed = deflate(&plain);
        let source = Trickle {
            data: &compressed,
            step: 1,
            reads: 0,
        };
        let mut stream = DeflateStream::new(source, -15).unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, plain);
    }

    #[test]
    fn test_does_not_read_source_when_buffer_suffices() {
        let plain = vec![7u8; 10_000];
        let compressed = deflate(&plain);
        let source = Trickle {
            data: &compressed,
            step: compressed.len(),
            reads: 0,
        };
        let mut stream = DeflateStream::new(source, -15).unwrap();
        assert_eq!(stream.read_up_to(4).unwrap(), vec![7u8; 4]);
        assert_eq!(stream.read_up_to(4).unwrap(), vec![7u8; 4]);
        assert_eq!(stream.into_inner().reads, 1);
    }

    #[test]
    fn test_trailing_bytes_after_stream_end_are_ignored() {
        let mut compressed = deflate(b"table");
        compressed.extend_from_slice(b"garbage");
        let mut stream = DeflateStream::new(compressed.as_slice(), -15).unwrap();
        assert_eq!(stream.read_up_to(64).unwrap(), b"table");
        assert!(stream.read_up_to(64).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_stream_is_a_decompression_error() {
        let plain = sample_text();
        let compressed = deflate(&plain);
        let cut = &compressed[..compressed.len() / 2];

        let mut stream = DeflateStream::new(cut, -15).unwrap();
        let mut out = Vec::new();
        let err = stream.read_to_end(&mut out).unwrap_err();
        assert!(matches!(
            Error::from_stream_io(err),
            Error::Decompression(_)
        ));
        assert!(!stream.is_finished());

        let mut stream = DeflateStream::with_chunk_size(cut, -15, 7).unwrap();
        let result = loop {
            match stream.read_up_to(500) {
                Ok(chunk) if chunk.is_empty() => break Ok(()),
                Ok(_) => {},
                Err(err) => break Err(err),
            }
        };
        assert!(matches!(result, Err(Error::Decompression(_))));
    }

    #[test]
    fn test_corrupt_data_is_a_decompression_error() {
        // BFINAL=1 with the reserved block type 0b11
        let corrupt = [0xFFu8; 16];
        let mut stream = DeflateStream::new(&corrupt[..], -15).unwrap();
        assert!(matches!(
            stream.read_up_to(10),
            Err(Error::Decompression(_))
        ));

        let mut stream = DeflateStream::new(&corrupt[..], -15).unwrap();
        let err = stream.read(&mut [0u8; 10]).unwrap_err();
        assert!(matches!(
            Error::from_stream_io(err),
            Error::Decompression(_)
        ));
    }

    #[test]
    fn test_rejects_invalid_window_bits() {
        assert!(matches!(
            DeflateStream::new(&[][..], 15),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DeflateStream::new(&[][..], -7),
            Err(Error::InvalidArgument(_))
        ));
        assert!(DeflateStream::new(&[][..], -9).is_ok());
    }

    #[test]
    fn test_empty_source_yields_nothing() {
        let mut stream = DeflateStream::new(&[][..], -15).unwrap();
        assert!(stream.read_up_to(16).unwrap().is_empty());
    }
}
