//! The read/feed/compact loop that drives a [`RequestParser`](super::RequestParser)
//! from a transport.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use super::{ParseError, Request};
use crate::config::ServerConfig;

/// Reads one request from `reader`.
///
/// Bytes are read into a window of at most `config.read_buffer_size` bytes. After
/// every read the window is fed to the parser and the consumed prefix is dropped, so
/// the window only ever holds an unfinished line or unread body bytes. End-of-stream
/// is reported to the parser through
/// [`RequestParser::finish`](super::RequestParser::finish).
///
/// # Errors
///
/// - Any [`ParseError`] from the parser, including [`ParseError::TruncatedBody`]
///   when the stream ends before the declared `Content-Length` is satisfied.
/// - [`ParseError::LineTooLong`] if the window fills up without the parser being
///   able to consume anything.
/// - [`ParseError::Io`] for transport failures.
///
/// # Examples
///
/// ```
/// use wirehttp::config::ServerConfig;
/// use wirehttp::http::read_request;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), wirehttp::http::ParseError> {
/// let raw: &[u8] = b"POST /submit HTTP/1.1\r\nContent-Length: 13\r\n\r\nhello world!\n";
/// let request = read_request(raw, &ServerConfig::default()).await?;
/// assert_eq!(&request.body()[..], b"hello world!\n");
/// # Ok(())
/// # }
/// ```
pub async fn read_request<R>(mut reader: R, config: &ServerConfig) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let capacity = config.read_buffer_size;
    let mut parser = config.parser();
    let mut buf = BytesMut::with_capacity(capacity);

    while !parser.is_done() {
        if buf.len() >= capacity {
            return Err(ParseError::LineTooLong { limit: capacity });
        }

        let n = (&mut reader)
            .take((capacity - buf.len()) as u64)
            .read_buf(&mut buf)
            .await?;
        if n == 0 {
            trace!(buffered = buf.len(), "end of stream");
            parser.finish()?;
            break;
        }

        let consumed = parser.feed(&buf)?;
        buf.advance(consumed);
        trace!(read = n, consumed, buffered = buf.len(), "fed request bytes");
    }

    parser.into_request().ok_or(ParseError::IncompleteHead)
}
