//! Errors produced while parsing requests and building responses.

use thiserror::Error;

use super::StatusCode;

/// Errors that can occur while parsing an HTTP/1.1 request.
///
/// Every variant except [`ParseError::Io`] is a protocol violation by the peer and
/// maps to `400 Bad Request`. Once a [`RequestParser`](super::RequestParser) has
/// returned one of these it is terminal: later calls fail with
/// [`ParseError::ParserInErrorState`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request-line: {0}")]
    MalformedRequestLine(&'static str),

    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("body truncated: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    #[error("parser in error state")]
    ParserInErrorState,

    #[error("no line terminator within {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("header block larger than {limit} bytes")]
    HeadersTooLarge { limit: usize },

    #[error("stream ended before the request head was complete")]
    IncompleteHead,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// The status a server should answer with when a request fails this way.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Io(_) => StatusCode::InternalServerError,
            _ => StatusCode::BadRequest,
        }
    }
}

impl From<ParseError> for std::io::Error {
    /// Lets handlers that build headers propagate a rejected field with `?`.
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Io(e) => e,
            other => Self::new(std::io::ErrorKind::InvalidInput, other),
        }
    }
}

/// A numeric status code outside the set this crate knows a reason phrase for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported status code: {0}")]
pub struct InvalidStatusCode(pub u16);
