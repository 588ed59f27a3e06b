//! Incremental HTTP/1.1 request parsing.
//!
//! [`RequestParser`] is a push parser: the caller owns the read buffer, hands the
//! not-yet-consumed window to [`RequestParser::feed`] whenever more bytes arrive, and
//! discards however many bytes the parser reports as consumed. The parser never
//! blocks and never looks at the transport; "need more input" is signalled by
//! consuming zero bytes.
//!
//! ```text
//! Init ──▶ Headers ──▶ Body ──▶ Done
//!   │         │  └───────────────▲
//!   └─────────┴──────┴──▶ Error (sticky)
//! ```

use bytes::{Bytes, BytesMut};
use serde::Deserialize;
use tracing::{debug, trace};

use super::validate::{CRLF, find_crlf, is_valid_target};
use super::{Headers, Method, ParseError};

/// Default bound on how many bytes may be buffered without finding a line terminator.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Default bound on the total size of the header field lines of one request.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

/// The only protocol version this parser accepts.
pub const HTTP_VERSION: &str = "1.1";

/// The position of a [`RequestParser`] in the request grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// Waiting for the request line.
    Init,
    /// Reading header field lines.
    Headers,
    /// Accumulating the message body.
    Body,
    /// A complete request has been parsed.
    Done,
    /// Parsing failed; the parser rejects all further input.
    Error,
}

impl ParserState {
    /// Returns `true` if the state machine may move from `self` to `next`.
    ///
    /// Transitions are strictly forward, and `Error` is reachable from every
    /// non-terminal state.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Headers)
                | (Self::Headers, Self::Body | Self::Done)
                | (Self::Body, Self::Done)
                | (Self::Init | Self::Headers | Self::Body, Self::Error)
        )
    }

    /// Returns `true` for `Done` and `Error`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// How the body of a request is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLength {
    /// A valid `Content-Length` header declared the exact size.
    Known(usize),
    /// No usable `Content-Length`; the body runs until the transport ends.
    Unbounded,
}

impl BodyLength {
    /// Derives the body framing from a parsed header block.
    ///
    /// A missing or non-numeric `content-length` yields [`BodyLength::Unbounded`].
    pub fn from_headers(headers: &Headers) -> Self {
        headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .map_or(Self::Unbounded, Self::Known)
    }
}

/// What to do with a request that carries no usable `Content-Length`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnboundedBody {
    /// Treat every byte until end-of-stream as body.
    #[default]
    ReadToEof,
    /// Treat the body as empty and complete the request after the headers.
    Empty,
}

/// The parsed first line of a request, e.g. `GET /coffee HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    version: String,
}

impl RequestLine {
    /// Parses a request line without its trailing `\r\n`.
    ///
    /// # Errors
    ///
    /// [`ParseError::MalformedRequestLine`] if the line does not have exactly three
    /// space-separated fields, the method is not allowed, the target is not an
    /// acceptable origin-form path, or the version is not `HTTP/1.1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirehttp::http::{Method, RequestLine};
    ///
    /// let line = RequestLine::parse("POST /coffee HTTP/1.1").unwrap();
    /// assert_eq!(line.method(), Method::Post);
    /// assert_eq!(line.target(), "/coffee");
    /// assert_eq!(line.version(), "1.1");
    ///
    /// assert!(RequestLine::parse("GET / HTTP/1.0").is_err());
    /// ```
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut parts = line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::MalformedRequestLine(
                "expected method, target, and version",
            ));
        };

        if version.strip_prefix("HTTP/") != Some(HTTP_VERSION) {
            return Err(ParseError::MalformedRequestLine("unsupported HTTP version"));
        }
        let method = method.parse()?;
        if !is_valid_target(target) {
            return Err(ParseError::MalformedRequestLine("invalid request target"));
        }

        Ok(Self {
            method,
            target: target.to_owned(),
            version: HTTP_VERSION.to_owned(),
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The protocol version without the `HTTP/` prefix; always `"1.1"`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// A fully parsed HTTP/1.1 request.
///
/// # Examples
///
/// ```
/// use wirehttp::http::Request;
///
/// let raw = b"POST /submit HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
/// let request = Request::parse(raw).unwrap();
///
/// assert_eq!(request.method().as_str(), "POST");
/// assert_eq!(request.target(), "/submit");
/// assert_eq!(request.headers().get("host"), Some("localhost"));
/// assert_eq!(&request.body()[..], b"hello");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    request_line: RequestLine,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Parses a request from a buffer holding the entire stream.
    ///
    /// The end of `buf` is treated as end-of-stream, so a body without a
    /// `Content-Length` is everything after the header block.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] the parser reports, including
    /// [`ParseError::TruncatedBody`] and [`ParseError::IncompleteHead`] when `buf`
    /// ends early.
    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        let mut parser = RequestParser::new();
        parser.feed(buf)?;
        parser.finish()?;
        parser.into_request().ok_or(ParseError::IncompleteHead)
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> Method {
        self.request_line.method
    }

    /// Returns the request target exactly as received.
    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn version(&self) -> &str {
        &self.request_line.version
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the value of the `Content-Length` header parsed as a `usize`, if present.
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("content-length")?.parse().ok()
    }
}

/// A resumable request parser.
///
/// # Examples
///
/// ```
/// use wirehttp::http::{ParserState, RequestParser};
///
/// let raw = b"GET /coffee HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n";
/// let mut parser = RequestParser::new();
///
/// // Half of the request line: nothing can be consumed yet.
/// assert_eq!(parser.feed(&raw[..10]).unwrap(), 0);
///
/// // The whole window, re-supplied by the caller.
/// assert_eq!(parser.feed(raw).unwrap(), raw.len());
/// assert_eq!(parser.state(), ParserState::Done);
///
/// let request = parser.into_request().unwrap();
/// assert_eq!(request.target(), "/coffee");
/// ```
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request_line: Option<RequestLine>,
    headers: Headers,
    body: BytesMut,
    body_length: BodyLength,
    header_bytes: usize,
    max_line_len: usize,
    max_header_bytes: usize,
    unbounded_body: UnboundedBody,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// Creates a parser in the `Init` state with default limits.
    pub fn new() -> Self {
        Self {
            state: ParserState::Init,
            request_line: None,
            headers: Headers::new(),
            body: BytesMut::new(),
            body_length: BodyLength::Unbounded,
            header_bytes: 0,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            unbounded_body: UnboundedBody::default(),
        }
    }

    /// Sets how many bytes may be buffered while waiting for a line terminator.
    #[must_use]
    pub fn max_line_len(mut self, limit: usize) -> Self {
        self.max_line_len = limit;
        self
    }

    /// Sets how many bytes of header field lines one request may carry.
    #[must_use]
    pub fn max_header_bytes(mut self, limit: usize) -> Self {
        self.max_header_bytes = limit;
        self
    }

    /// Sets the policy for requests without a usable `Content-Length`.
    #[must_use]
    pub fn unbounded_body(mut self, policy: UnboundedBody) -> Self {
        self.unbounded_body = policy;
        self
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn is_error(&self) -> bool {
        self.state == ParserState::Error
    }

    /// The body framing chosen after the header block; `Unbounded` until then.
    pub fn body_length(&self) -> BodyLength {
        self.body_length
    }

    /// Consumes as much of `buf` as the grammar allows and returns the byte count.
    ///
    /// The caller must drop the consumed prefix and pass the remainder, extended
    /// with newly received bytes, to the next call. Zero consumed with `Ok` means
    /// more input is needed. In `Done` every call consumes zero bytes.
    ///
    /// # Errors
    ///
    /// The first protocol violation is returned as is and moves the parser to
    /// [`ParserState::Error`]; every call after that returns
    /// [`ParseError::ParserInErrorState`] without inspecting `buf`.
    pub fn feed(&mut self, buf: &[u8]) -> Result<usize, ParseError> {
        if self.is_error() {
            return Err(ParseError::ParserInErrorState);
        }

        let mut read = 0;
        loop {
            let data = &buf[read..];
            let step = match self.state {
                ParserState::Init => self.parse_request_line(data),
                ParserState::Headers => self.parse_headers(data),
                ParserState::Body => Ok(self.parse_body(data)),
                ParserState::Done | ParserState::Error => Ok(0),
            };
            match step {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) => return Err(self.fail(e)),
            }
        }
        Ok(read)
    }

    /// Tells the parser that the transport reached end-of-stream.
    ///
    /// An unbounded body is complete at this point. Anything short of a complete
    /// request is an error.
    ///
    /// # Errors
    ///
    /// - [`ParseError::TruncatedBody`] if fewer body bytes arrived than declared.
    /// - [`ParseError::IncompleteHead`] if the stream ended inside the request line
    ///   or the header block.
    /// - [`ParseError::ParserInErrorState`] if an earlier call failed.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        match (self.state, self.body_length) {
            (ParserState::Done, _) => Ok(()),
            (ParserState::Error, _) => Err(ParseError::ParserInErrorState),
            (ParserState::Body, BodyLength::Unbounded) => {
                self.transition(ParserState::Done);
                Ok(())
            }
            (ParserState::Body, BodyLength::Known(expected)) => {
                Err(self.fail(ParseError::TruncatedBody {
                    expected,
                    received: self.body.len(),
                }))
            }
            (ParserState::Init | ParserState::Headers, _) => {
                Err(self.fail(ParseError::IncompleteHead))
            }
        }
    }

    /// Returns the parsed request once the parser is `Done`.
    pub fn into_request(self) -> Option<Request> {
        if !self.is_done() {
            return None;
        }
        Some(Request {
            request_line: self.request_line?,
            headers: self.headers,
            body: self.body.freeze(),
        })
    }

    fn parse_request_line(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(idx) = find_crlf(data) else {
            return self.wait_for_line(data);
        };
        if idx > self.max_line_len {
            return Err(ParseError::LineTooLong {
                limit: self.max_line_len,
            });
        }

        let line = std::str::from_utf8(&data[..idx])
            .map_err(|_| ParseError::MalformedRequestLine("request-line is not UTF-8"))?;
        let request_line = RequestLine::parse(line)?;
        debug!(method = %request_line.method, target = %request_line.target, "request line parsed");

        self.request_line = Some(request_line);
        self.transition(ParserState::Headers);
        Ok(idx + CRLF.len())
    }

    fn parse_headers(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let parsed = self.headers.parse(data)?;
        if parsed.consumed == 0 {
            return self.wait_for_line(data);
        }
        self.header_bytes += parsed.consumed;
        if self.header_bytes > self.max_header_bytes {
            return Err(ParseError::HeadersTooLarge {
                limit: self.max_header_bytes,
            });
        }
        if parsed.complete {
            self.body_length = BodyLength::from_headers(&self.headers);
            let next = match (self.body_length, self.unbounded_body) {
                (BodyLength::Known(0), _) | (BodyLength::Unbounded, UnboundedBody::Empty) => {
                    ParserState::Done
                }
                _ => ParserState::Body,
            };
            debug!(headers = self.headers.len(), body = ?self.body_length, "header block parsed");
            self.transition(next);
        }
        Ok(parsed.consumed)
    }

    fn parse_body(&mut self, data: &[u8]) -> usize {
        match self.body_length {
            BodyLength::Known(expected) => {
                let take = (expected - self.body.len()).min(data.len());
                self.body.extend_from_slice(&data[..take]);
                if self.body.len() == expected {
                    self.transition(ParserState::Done);
                }
                take
            }
            BodyLength::Unbounded => {
                self.body.extend_from_slice(data);
                data.len()
            }
        }
    }

    fn wait_for_line(&self, data: &[u8]) -> Result<usize, ParseError> {
        if data.len() > self.max_line_len {
            Err(ParseError::LineTooLong {
                limit: self.max_line_len,
            })
        } else {
            Ok(0)
        }
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        debug!(state = ?self.state, error = %err, "request parse failed");
        self.transition(ParserState::Error);
        err
    }

    fn transition(&mut self, next: ParserState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal parser transition {:?} -> {next:?}",
            self.state
        );
        trace!(from = ?self.state, to = ?next, "parser transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeds `data` in `chunk`-sized pieces through a caller-side window, the way a
    /// connection read loop does, then signals end-of-stream.
    fn parse_in_chunks(data: &[u8], chunk: usize) -> Result<Request, ParseError> {
        let mut parser = RequestParser::new();
        let mut window = Vec::new();
        for piece in data.chunks(chunk) {
            window.extend_from_slice(piece);
            let n = parser.feed(&window)?;
            window.drain(..n);
            if parser.is_done() {
                break;
            }
        }
        parser.finish()?;
        Ok(parser.into_request().expect("parser is done"))
    }

    const GET: &[u8] =
        b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

    #[test]
    fn good_get_request_line() {
        let req = parse_in_chunks(GET, 3).unwrap();
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.target(), "/");
        assert_eq!(req.version(), "1.1");
    }

    #[test]
    fn good_get_with_path_byte_at_a_time() {
        let raw = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nAccept: */*\r\n\r\n";
        let req = parse_in_chunks(raw, 1).unwrap();
        assert_eq!(req.target(), "/coffee");
    }

    #[test]
    fn good_post_with_body() {
        let raw = b"POST /coffee HTTP/1.1\r\nHost: localhost:42069\r\nContent-Type: application/json\r\nContent-Length: 22\r\n\r\n{\"flavor\":\"dark mode\"}";
        let req = parse_in_chunks(raw, 1).unwrap();
        assert_eq!(req.method(), Method::Post);
        assert_eq!(req.content_length(), Some(22));
        assert_eq!(&req.body()[..], br#"{"flavor":"dark mode"}"#);
    }

    #[test]
    fn chunk_size_does_not_change_the_result() {
        let raw = b"PUT /items/7 HTTP/1.1\r\nHost: a\r\nHost: b\r\nX-Trace: t1\r\nContent-Length: 13\r\n\r\nhello world!\n";
        let whole = Request::parse(raw).unwrap();
        for chunk in 1..=raw.len() {
            let req = parse_in_chunks(raw, chunk).unwrap();
            assert_eq!(req.request_line(), whole.request_line(), "chunk {chunk}");
            assert_eq!(req.headers(), whole.headers(), "chunk {chunk}");
            assert_eq!(req.body(), whole.body(), "chunk {chunk}");
        }
        assert_eq!(whole.headers().get("host"), Some("a,b"));
    }

    #[test]
    fn invalid_number_of_parts() {
        let raw = b"/coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
        assert!(matches!(
            parse_in_chunks(raw, 1),
            Err(ParseError::MalformedRequestLine(_))
        ));
        assert!(Request::parse(b"GET  / HTTP/1.1\r\n\r\n").is_err());
        assert!(Request::parse(b"GET / HTTP/1.1 extra\r\n\r\n").is_err());
    }

    #[test]
    fn invalid_method_out_of_order() {
        let raw = b"/ GET HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
        assert!(matches!(
            parse_in_chunks(raw, 1),
            Err(ParseError::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn invalid_version() {
        for raw in [
            &b"GET / HTTP/1.0\r\n\r\n"[..],
            b"GET / HTTP/2\r\n\r\n",
            b"GET / HTTPS/1.1\r\n\r\n",
        ] {
            assert!(matches!(
                Request::parse(raw),
                Err(ParseError::MalformedRequestLine("unsupported HTTP version"))
            ));
        }
    }

    #[test]
    fn invalid_targets() {
        assert!(Request::parse(b"GET coffee HTTP/1.1\r\n\r\n").is_err());
        assert!(Request::parse(b"GET /../etc/passwd HTTP/1.1\r\n\r\n").is_err());
    }

    #[test]
    fn standard_headers() {
        let req = parse_in_chunks(GET, 3).unwrap();
        assert_eq!(req.headers().get("host"), Some("localhost:42069"));
        assert_eq!(req.headers().get("user-agent"), Some("curl/7.81.0"));
        assert_eq!(req.headers().get("accept"), Some("*/*"));
    }

    #[test]
    fn malformed_header() {
        let raw = b"GET / HTTP/1.1\r\nHost localhost:42069\r\n\r\n";
        assert!(matches!(
            parse_in_chunks(raw, 3),
            Err(ParseError::MalformedHeader(_))
        ));
    }

    #[test]
    fn space_before_colon_consumes_nothing_from_header_block() {
        let mut parser = RequestParser::new();
        let line = b"GET / HTTP/1.1\r\n";
        assert_eq!(parser.feed(line).unwrap(), line.len());
        assert!(matches!(
            parser.feed(b"Host : a\r\n\r\n"),
            Err(ParseError::MalformedHeader(_))
        ));
        assert!(parser.headers.is_empty());
    }

    #[test]
    fn standard_body() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n";
        let req = parse_in_chunks(raw, 3).unwrap();
        assert_eq!(&req.body()[..], b"hello world!\n");
    }

    #[test]
    fn body_never_exceeds_content_length() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloEXTRA";
        let mut parser = RequestParser::new();
        let consumed = parser.feed(raw).unwrap();
        assert_eq!(consumed, raw.len() - b"EXTRA".len());
        assert!(parser.is_done());
        assert_eq!(parser.feed(b"EXTRA").unwrap(), 0);
        assert_eq!(&parser.into_request().unwrap().body()[..], b"hello");
    }

    #[test]
    fn zero_content_length_is_done_after_headers() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 0\r\n\r\n";
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(raw).unwrap(), raw.len());
        assert!(parser.is_done());
        assert!(parser.into_request().unwrap().body().is_empty());
    }

    #[test]
    fn no_content_length_and_no_body() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
        let req = parse_in_chunks(raw, 3).unwrap();
        assert!(req.body().is_empty());
    }

    #[test]
    fn no_content_length_accumulates_until_caller_stops() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\n\r\nbody without length";
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(raw).unwrap(), raw.len());
        assert_eq!(parser.state(), ParserState::Body);
        assert_eq!(parser.feed(b" and more").unwrap(), 9);
        assert_eq!(parser.state(), ParserState::Body);

        parser.finish().unwrap();
        let req = parser.into_request().unwrap();
        assert_eq!(&req.body()[..], b"body without length and more");
    }

    #[test]
    fn non_numeric_content_length_is_unbounded() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\nabc";
        let mut parser = RequestParser::new();
        parser.feed(raw).unwrap();
        assert_eq!(parser.body_length(), BodyLength::Unbounded);
        assert_eq!(parser.state(), ParserState::Body);
    }

    #[test]
    fn empty_policy_completes_without_content_length() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\nleftover";
        let mut parser = RequestParser::new().unbounded_body(UnboundedBody::Empty);
        assert_eq!(parser.feed(raw).unwrap(), raw.len() - b"leftover".len());
        assert!(parser.is_done());
    }

    #[test]
    fn body_shorter_than_content_length() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 20\r\n\r\npartial content";
        assert!(matches!(
            parse_in_chunks(raw, 3),
            Err(ParseError::TruncatedBody {
                expected: 20,
                received: 15
            })
        ));
    }

    #[test]
    fn eof_inside_head_is_incomplete() {
        let mut parser = RequestParser::new();
        parser.feed(b"GET / HTTP/1.1\r\nHost: a\r\n").unwrap();
        assert!(matches!(parser.finish(), Err(ParseError::IncompleteHead)));
        assert!(parser.is_error());
    }

    #[test]
    fn error_state_is_sticky() {
        let mut parser = RequestParser::new();
        assert!(matches!(
            parser.feed(b"BREW /pot HTTP/1.1\r\n"),
            Err(ParseError::MalformedRequestLine(_))
        ));
        assert!(matches!(
            parser.feed(b"GET / HTTP/1.1\r\n\r\n"),
            Err(ParseError::ParserInErrorState)
        ));
        assert!(matches!(
            parser.finish(),
            Err(ParseError::ParserInErrorState)
        ));
        assert!(parser.into_request().is_none());
    }

    #[test]
    fn request_line_without_terminator_is_bounded() {
        let mut parser = RequestParser::new().max_line_len(16);
        assert_eq!(parser.feed(b"GET /aaaaaaaaaa").unwrap(), 0);
        assert!(matches!(
            parser.feed(b"GET /aaaaaaaaaaaaaaaaaaaa"),
            Err(ParseError::LineTooLong { limit: 16 })
        ));
    }

    #[test]
    fn header_line_without_terminator_is_bounded() {
        let mut parser = RequestParser::new().max_line_len(16);
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n").unwrap(), 16);
        assert!(matches!(
            parser.feed(b"X-Long: 0123456789abcdef"),
            Err(ParseError::LineTooLong { .. })
        ));
    }

    #[test]
    fn header_block_is_bounded() {
        let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
        for i in 0..64 {
            raw.extend_from_slice(format!("X-Field-{i}: value\r\n").as_bytes());
        }
        raw.extend_from_slice(b"\r\n");

        let mut parser = RequestParser::new().max_header_bytes(256);
        assert!(matches!(
            parser.feed(&raw),
            Err(ParseError::HeadersTooLarge { limit: 256 })
        ));
        assert!(parser.is_error());

        // Same block split into lines: the budget spans feed calls.
        let mut parser = RequestParser::new().max_header_bytes(256);
        let err = raw
            .split_inclusive(|&b| b == b'\n')
            .find_map(|line| parser.feed(line).err())
            .unwrap();
        assert!(matches!(err, ParseError::HeadersTooLarge { limit: 256 }));

        let mut parser = RequestParser::new().unbounded_body(UnboundedBody::Empty);
        assert_eq!(parser.feed(&raw).unwrap(), raw.len());
        assert!(parser.is_done());
    }

    #[test]
    fn done_consumes_nothing() {
        let raw = b"GET / HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
        let mut parser = RequestParser::new();
        parser.feed(raw).unwrap();
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n").unwrap(), 0);
        parser.finish().unwrap();
    }

    #[test]
    fn transitions_only_move_forward() {
        type S = ParserState;
        assert!(S::Init.can_transition_to(S::Headers));
        assert!(S::Headers.can_transition_to(S::Done));
        assert!(S::Body.can_transition_to(S::Error));
        assert!(!S::Headers.can_transition_to(S::Init));
        assert!(!S::Init.can_transition_to(S::Body));
        assert!(!S::Done.can_transition_to(S::Error));
        assert!(!S::Error.can_transition_to(S::Init));
        assert!(S::Done.is_terminal() && S::Error.is_terminal());
    }
}
