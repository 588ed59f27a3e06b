//! HTTP/1.1 protocol types, the incremental request codec, and the response writer.
//!
//! This module provides the core HTTP primitives:
//! [`Method`], [`StatusCode`], [`Headers`], [`RequestParser`], [`Request`], and
//! [`ResponseWriter`].

use std::fmt;

pub mod chunked;
pub mod error;
pub mod headers;
pub mod reader;
pub mod request;
pub mod response;
pub mod validate;

pub use chunked::ChunkedDecoder;
pub use error::{InvalidStatusCode, ParseError};
pub use headers::{HeaderParse, Headers};
pub use reader::read_request;
pub use request::{BodyLength, ParserState, Request, RequestLine, RequestParser, UnboundedBody};
pub use response::{ResponseWriter, default_headers};

/// An HTTP response status code.
///
/// Only the codes this crate can produce are representable; converting any other
/// number fails with [`InvalidStatusCode`] instead of yielding an empty reason phrase.
///
/// # Examples
///
/// ```
/// use wirehttp::http::StatusCode;
///
/// let status = StatusCode::Ok;
/// assert_eq!(status.as_u16(), 200);
/// assert_eq!(status.canonical_reason(), "OK");
/// assert!(StatusCode::from_u16(418).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,
    BadRequest = 400,
    InternalServerError = 500,
}

impl StatusCode {
    /// Looks up a known status code by number.
    pub fn from_u16(code: u16) -> Result<Self, InvalidStatusCode> {
        match code {
            200 => Ok(Self::Ok),
            400 => Ok(Self::BadRequest),
            500 => Ok(Self::InternalServerError),
            other => Err(InvalidStatusCode(other)),
        }
    }

    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_u16(code)
    }
}

/// An HTTP request method from the fixed allow-list accepted by the parser.
///
/// Matching is case-sensitive; anything else is rejected as a malformed request line.
///
/// # Examples
///
/// ```
/// use wirehttp::http::Method;
///
/// let method: Method = "GET".parse().unwrap();
/// assert_eq!(method, Method::Get);
/// assert_eq!(method.as_str(), "GET");
/// assert!("get".parse::<Method>().is_err());
/// assert!("TRACE".parse::<Method>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl Method {
    /// Returns the method as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            _ => return Err(ParseError::MalformedRequestLine("unsupported method")),
        })
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
