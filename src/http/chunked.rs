//! Decoder for `Transfer-Encoding: chunked` message bodies.
//!
//! This is the reading side of [`ResponseWriter::write_chunked_body`]: it consumes
//! `<hex size>\r\n<data>\r\n` chunks up to the zero-size chunk, then an optional
//! trailer section ended by a blank line. Like [`RequestParser`], it is fed a
//! caller-owned window and reports how many bytes it consumed.
//!
//! [`ResponseWriter::write_chunked_body`]: super::ResponseWriter::write_chunked_body
//! [`RequestParser`]: super::RequestParser

use bytes::{Bytes, BytesMut};
use thiserror::Error;

use super::validate::CRLF;
use super::{Headers, ParseError};

/// Errors produced while decoding chunked framing.
#[derive(Debug, Error)]
pub enum ChunkedError {
    #[error("invalid chunk size line")]
    InvalidChunkSize,

    #[error("chunk of {0} bytes cannot be buffered")]
    ChunkTooLarge(u64),

    #[error("chunk data is not followed by CRLF")]
    MissingCrlf,

    #[error("malformed trailer section: {0}")]
    Trailer(#[from] ParseError),

    #[error("decoder in error state")]
    DecoderInErrorState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Size,
    Data { remaining: usize },
    DataCrlf,
    Trailers,
    Done,
    Error,
}

/// Incremental chunked-body decoder.
///
/// # Examples
///
/// ```
/// use wirehttp::http::ChunkedDecoder;
///
/// let wire = b"5\r\nhello\r\n0\r\nX-Checksum: 42\r\n\r\n";
/// let mut decoder = ChunkedDecoder::new();
///
/// assert_eq!(decoder.decode(wire).unwrap(), wire.len());
/// assert!(decoder.is_done());
/// assert_eq!(decoder.body(), b"hello");
/// assert_eq!(decoder.trailers().get("x-checksum"), Some("42"));
/// ```
#[derive(Debug)]
pub struct ChunkedDecoder {
    phase: Phase,
    body: BytesMut,
    trailers: Headers,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self {
            phase: Phase::Size,
            body: BytesMut::new(),
            trailers: Headers::new(),
        }
    }

    /// Consumes as much of `buf` as possible and returns the byte count.
    ///
    /// Zero consumed means more input is needed (or the decoder is done).
    ///
    /// # Errors
    ///
    /// Any framing error, after which every call returns
    /// [`ChunkedError::DecoderInErrorState`].
    pub fn decode(&mut self, buf: &[u8]) -> Result<usize, ChunkedError> {
        if self.phase == Phase::Error {
            return Err(ChunkedError::DecoderInErrorState);
        }

        let mut read = 0;
        loop {
            match self.step(&buf[read..]) {
                Ok(0) => return Ok(read),
                Ok(n) => read += n,
                Err(e) => {
                    self.phase = Phase::Error;
                    return Err(e);
                }
            }
        }
    }

    /// Returns `true` once the last chunk and the trailer section have been read.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// The body bytes decoded so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Trailer fields that followed the last chunk.
    pub fn trailers(&self) -> &Headers {
        &self.trailers
    }

    pub fn into_parts(self) -> (Bytes, Headers) {
        (self.body.freeze(), self.trailers)
    }

    fn step(&mut self, data: &[u8]) -> Result<usize, ChunkedError> {
        match self.phase {
            Phase::Size => {
                let status = httparse::parse_chunk_size(data)
                    .map_err(|_| ChunkedError::InvalidChunkSize)?;
                let httparse::Status::Complete((consumed, size)) = status else {
                    return Ok(0);
                };
                self.phase = if size == 0 {
                    Phase::Trailers
                } else {
                    let remaining =
                        usize::try_from(size).map_err(|_| ChunkedError::ChunkTooLarge(size))?;
                    Phase::Data { remaining }
                };
                Ok(consumed)
            }
            Phase::Data { remaining } => {
                let take = remaining.min(data.len());
                self.body.extend_from_slice(&data[..take]);
                self.phase = if take == remaining {
                    Phase::DataCrlf
                } else {
                    Phase::Data {
                        remaining: remaining - take,
                    }
                };
                Ok(take)
            }
            Phase::DataCrlf => {
                if data.len() < CRLF.len() {
                    Ok(0)
                } else if data.starts_with(CRLF) {
                    self.phase = Phase::Size;
                    Ok(CRLF.len())
                } else {
                    Err(ChunkedError::MissingCrlf)
                }
            }
            Phase::Trailers => {
                let parsed = self.trailers.parse(data)?;
                if parsed.complete {
                    self.phase = Phase::Done;
                }
                Ok(parsed.consumed)
            }
            Phase::Done | Phase::Error => Ok(0),
        }
    }
}
