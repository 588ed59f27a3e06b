//! Byte-level validation helpers shared by the request and header parsers.

/// The request-line and header-line terminator.
pub(crate) const CRLF: &[u8] = b"\r\n";

/// Longest request target accepted in a request line.
pub const MAX_TARGET_LEN: usize = 2048;

/// Returns the offset of the first `\r\n` in `buf`, if any.
pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

/// Returns `true` if `b` may appear in a header field name (RFC 9110 `tchar`).
pub fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Returns `true` if `name` is a non-empty token.
///
/// ```
/// use wirehttp::http::validate::is_token;
///
/// assert!(is_token(b"Content-Length"));
/// assert!(!is_token(b"Host "));
/// assert!(!is_token(b""));
/// ```
pub fn is_token(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().copied().all(is_token_byte)
}

/// Returns `true` if `value` can be written as a field value without breaking
/// the line it sits on: no CR, LF or NUL.
///
/// ```
/// use wirehttp::http::validate::is_field_value;
///
/// assert!(is_field_value(b"text/html; charset=utf-8"));
/// assert!(!is_field_value(b"a\r\nSet-Cookie: x=1"));
/// ```
pub fn is_field_value(value: &[u8]) -> bool {
    !value.iter().any(|&b| matches!(b, b'\r' | b'\n' | b'\0'))
}

/// Returns `true` if `target` is an acceptable origin-form request target.
///
/// The target must start with `/`, must not contain `../`, and must be at most
/// [`MAX_TARGET_LEN`] bytes long.
pub fn is_valid_target(target: &str) -> bool {
    target.starts_with('/') && !target.contains("../") && target.len() <= MAX_TARGET_LEN
}

pub(crate) fn trim_ows(mut bytes: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = bytes {
        bytes = rest;
    }
    bytes
}
