//! HTTP/1.1 response serialization.
//!
//! [`ResponseWriter`] turns the pieces of a response into wire bytes on any
//! [`AsyncWrite`] sink. Each call is independent; the writer does not check that
//! the status line, header block, and body are written in that order.
//!
//! A fixed-length response:
//!
//! ```text
//! write_status_line ─▶ write_headers ─▶ write_body
//! ```
//!
//! A chunked response with trailers:
//!
//! ```text
//! write_status_line ─▶ write_headers ─▶ write_chunked_body* ─▶ write_last_chunk ─▶ write_trailers
//! ```

use std::io;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::validate::CRLF;
use super::{Headers, StatusCode};

/// The chunk that ends a chunked body, including the blank line that ends the
/// (empty) trailer section.
const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

/// Builds the header set every response starts from.
///
/// Callers adjust or remove entries before passing the set to
/// [`ResponseWriter::write_headers`].
///
/// ```
/// use wirehttp::http::default_headers;
///
/// let headers = default_headers(12);
/// assert_eq!(headers.get("Content-Length"), Some("12"));
/// assert_eq!(headers.get("connection"), Some("close"));
/// assert_eq!(headers.get("content-type"), Some("text/plain"));
/// ```
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::with_capacity(3);
    headers.append("content-length".to_owned(), content_len.to_string());
    headers.append("connection".to_owned(), "close".to_owned());
    headers.append("content-type".to_owned(), "text/plain".to_owned());
    headers
}

/// Writes a response onto a byte sink.
///
/// # Examples
///
/// ```
/// use wirehttp::http::{ResponseWriter, StatusCode, default_headers};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> std::io::Result<()> {
/// let mut writer = ResponseWriter::new(Vec::new());
/// writer.write_status_line(StatusCode::Ok).await?;
/// writer.write_headers(&default_headers(5)).await?;
/// writer.write_body(b"hello").await?;
///
/// let wire = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(
///     wire,
///     "HTTP/1.1 200 OK\r\n\
///      content-length: 5\r\n\
///      connection: close\r\n\
///      content-type: text/plain\r\n\
///      \r\n\
///      hello"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResponseWriter<W> {
    sink: W,
    scratch: BytesMut,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            scratch: BytesMut::with_capacity(256),
        }
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: StatusCode) -> io::Result<()> {
        trace!(status = status.as_u16(), "writing status line");
        encode_status_line(status, &mut self.scratch);
        self.drain_scratch().await
    }

    /// Writes each entry as `name: value\r\n`, followed by the blank line.
    ///
    /// The same call writes a trailer block after
    /// [`write_chunked_body_done`](Self::write_chunked_body_done).
    pub async fn write_headers(&mut self, headers: &Headers) -> io::Result<()> {
        encode_headers(headers, &mut self.scratch);
        self.scratch.put_slice(CRLF);
        self.drain_scratch().await
    }

    /// Writes `body` as is.
    pub async fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.sink.write_all(body).await
    }

    /// Writes one chunk of a chunked body. An empty `chunk` writes nothing, since a
    /// zero-size chunk would end the body.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        encode_chunk(chunk, &mut self.scratch);
        self.drain_scratch().await
    }

    /// Writes `0\r\n\r\n`, ending a chunked body that has no trailers.
    pub async fn write_chunked_body_done(&mut self) -> io::Result<()> {
        self.sink.write_all(LAST_CHUNK).await
    }

    /// Writes only the `0\r\n` last-chunk line so that a trailer section can follow.
    ///
    /// Must be followed by [`write_trailers`](Self::write_trailers), which supplies
    /// the final blank line.
    pub async fn write_last_chunk(&mut self) -> io::Result<()> {
        self.sink.write_all(&LAST_CHUNK[..3]).await
    }

    /// Writes trailer fields and the blank line that ends the chunked message.
    ///
    /// Every field here should have been announced in a `Trailer` response header.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> io::Result<()> {
        self.write_headers(trailers).await
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.sink.flush().await
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    async fn drain_scratch(&mut self) -> io::Result<()> {
        let result = self.sink.write_all(&self.scratch).await;
        self.scratch.clear();
        result
    }
}

/// Appends `HTTP/1.1 <code> <reason>\r\n` to `dst`.
pub fn encode_status_line(status: StatusCode, dst: &mut BytesMut) {
    dst.put(
        format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason()
        )
        .as_bytes(),
    );
}

/// Appends one `name: value\r\n` line per entry to `dst`, without the blank line.
pub fn encode_headers(headers: &Headers, dst: &mut BytesMut) {
    for (name, value) in headers {
        dst.reserve(name.len() + value.len() + 4);
        dst.put_slice(name.as_bytes());
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(CRLF);
    }
}

/// Appends `<hex size>\r\n<chunk>\r\n` to `dst`.
pub fn encode_chunk(chunk: &[u8], dst: &mut BytesMut) {
    dst.put(format!("{:x}\r\n", chunk.len()).as_bytes());
    dst.reserve(chunk.len() + CRLF.len());
    dst.put_slice(chunk);
    dst.put_slice(CRLF);
}
