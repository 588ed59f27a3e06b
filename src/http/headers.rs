//! HTTP header store with case-insensitive names and merge-on-duplicate values.
//!
//! Names are normalized to lower case when stored. A repeated field is folded into the
//! existing entry as a comma-separated list, the combination RFC 9110 §5.3 allows for
//! list-valued fields. Distinct names keep the order in which they were first seen.
//!
//! Every entry is checked on the way in: names must be tokens and values may not
//! contain CR, LF or NUL, so a stored map always serializes to well-formed field
//! lines.

use std::collections::HashMap;
use std::fmt;
use std::slice;

use super::ParseError;
use super::validate::{CRLF, find_crlf, is_field_value, is_token, trim_ows};

/// A case-insensitive HTTP header map holding one merged value per name.
///
/// # Examples
///
/// ```
/// use wirehttp::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.set("Content-Type", "text/html").unwrap();
/// headers.set("X-Custom", "first").unwrap();
/// headers.set("x-custom", "second").unwrap();
///
/// assert_eq!(headers.get("content-type"), Some("text/html"));
/// assert_eq!(headers.get("X-CUSTOM"), Some("first,second"));
/// assert!(headers.set("X-Note", "a\r\nSet-Cookie: x=1").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: Vec<(String, String)>,
    // lower-cased name -> position in `inner`
    index: HashMap<String, usize>,
}

/// Outcome of one [`Headers::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderParse {
    /// Bytes of complete field lines (and the terminator, if found) that were consumed.
    pub consumed: usize,
    /// `true` once the blank line ending the header block has been consumed.
    pub complete: bool,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header map with pre-allocated capacity for `capacity` distinct names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the value stored for `name` (case-insensitive), or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.inner[i].1.as_str())
    }

    /// Stores a value, appending it to any existing value as `old,new`.
    ///
    /// # Errors
    ///
    /// [`ParseError::MalformedHeader`] if `name` is empty or not a token, or if
    /// `value` contains CR, LF or NUL. The map is unchanged on error.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ParseError> {
        let (name, value) = checked(name.into(), value.into())?;
        self.append(name, value);
        Ok(())
    }

    /// Stores a value, overwriting any existing value for the same name in place.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn replace(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ParseError> {
        let (name, value) = checked(name.into(), value.into())?;
        match self.index.get(&name) {
            Some(&i) => self.inner[i].1 = value,
            None => self.push(name, value),
        }
        Ok(())
    }

    /// Removes the entry for `name` (case-insensitive), returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let i = self.index.remove(&name.to_ascii_lowercase())?;
        let (_, value) = self.inner.remove(i);
        for pos in self.index.values_mut() {
            if *pos > i {
                *pos -= 1;
            }
        }
        Some(value)
    }

    /// Returns `true` if the map contains an entry for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no header entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over `(name, value)` pairs in first-seen order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.inner.iter(),
        }
    }

    /// Parses `name: value\r\n` field lines from the front of `buf`.
    ///
    /// Parsing stops at the first incomplete line or at the blank line that ends the
    /// header block. A return of zero bytes consumed without completion means more
    /// input is needed. Fields are only added to the map when the whole call
    /// succeeds.
    ///
    /// # Errors
    ///
    /// [`ParseError::MalformedHeader`] if any line lacks a colon, has whitespace
    /// between the name and the colon, has an empty or non-token name, or has a
    /// value that is not UTF-8 or contains a bare CR, LF or NUL.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirehttp::http::Headers;
    ///
    /// let mut headers = Headers::new();
    /// let data = b"Host: localhost:42069\r\n\r\n";
    /// let parsed = headers.parse(data).unwrap();
    ///
    /// assert!(parsed.complete);
    /// assert_eq!(parsed.consumed, data.len());
    /// assert_eq!(headers.get("host"), Some("localhost:42069"));
    /// ```
    pub fn parse(&mut self, buf: &[u8]) -> Result<HeaderParse, ParseError> {
        let mut staged = Vec::new();
        let mut consumed = 0;
        let mut complete = false;

        while let Some(idx) = find_crlf(&buf[consumed..]) {
            if idx == 0 {
                consumed += CRLF.len();
                complete = true;
                break;
            }
            staged.push(parse_field_line(&buf[consumed..consumed + idx])?);
            consumed += idx + CRLF.len();
        }

        // Already validated by `parse_field_line`.
        for (name, value) in staged {
            self.append(name, value);
        }
        Ok(HeaderParse { consumed, complete })
    }

    /// Merges a pre-validated, lower-cased entry.
    pub(crate) fn append(&mut self, name: String, value: String) {
        match self.index.get(&name) {
            Some(&i) => {
                let existing = &mut self.inner[i].1;
                existing.push(',');
                existing.push_str(&value);
            }
            None => self.push(name, value),
        }
    }

    fn push(&mut self, name: String, value: String) {
        self.index.insert(name.clone(), self.inner.len());
        self.inner.push((name, value));
    }

    fn position(&self, name: &str) -> Option<usize> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.index.get(&name.to_ascii_lowercase()).copied()
        } else {
            self.index.get(name).copied()
        }
    }
}

fn checked(mut name: String, value: String) -> Result<(String, String), ParseError> {
    if !is_token(name.as_bytes()) {
        return Err(ParseError::MalformedHeader("invalid field name"));
    }
    if !is_field_value(value.as_bytes()) {
        return Err(ParseError::MalformedHeader("invalid field value"));
    }
    name.make_ascii_lowercase();
    Ok((name, value))
}

fn parse_field_line(line: &[u8]) -> Result<(String, String), ParseError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(ParseError::MalformedHeader("missing colon"))?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    if matches!(name.last(), Some(b' ' | b'\t')) {
        return Err(ParseError::MalformedHeader("whitespace before colon"));
    }
    let value = std::str::from_utf8(trim_ows(value))
        .map_err(|_| ParseError::MalformedHeader("field value is not UTF-8"))?;

    // Token bytes are ASCII, so a valid name converts losslessly.
    let name = name.iter().map(|&b| char::from(b)).collect();
    checked(name, value.to_owned())
}

/// Iterator over the entries of a [`Headers`] map.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_get() {
        let mut h = Headers::new();
        h.set("Content-Type", "text/plain").unwrap();
        assert_eq!(h.get("content-type"), Some("text/plain"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(h.iter().next(), Some(("content-type", "text/plain")));
    }

    #[test]
    fn set_merges_duplicates() {
        let mut h = Headers::new();
        h.set("Trailer", "X-Content-SHA256").unwrap();
        h.set("trailer", "X-Content-Length").unwrap();
        assert_eq!(h.get("trailer"), Some("X-Content-SHA256,X-Content-Length"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn replace_keeps_position() {
        let mut h = Headers::new();
        h.set("A", "1").unwrap();
        h.set("B", "2").unwrap();
        h.replace("a", "3").unwrap();
        let pairs: Vec<_> = h.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn remove() {
        let mut h = Headers::new();
        h.set("X-Foo", "bar").unwrap();
        assert_eq!(h.remove("x-foo"), Some("bar".to_owned()));
        assert!(h.is_empty());
        assert_eq!(h.remove("x-foo"), None);
    }

    #[test]
    fn remove_keeps_lookup_consistent() {
        let mut h = Headers::new();
        h.set("A", "1").unwrap();
        h.set("B", "2").unwrap();
        h.set("C", "3").unwrap();
        h.remove("a");
        assert_eq!(h.get("b"), Some("2"));
        assert_eq!(h.get("c"), Some("3"));
        h.set("c", "4").unwrap();
        h.set("a", "5").unwrap();
        let pairs: Vec<_> = h.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("c", "3,4"), ("a", "5")]);
    }

    #[test]
    fn set_rejects_invalid_names() {
        let mut h = Headers::new();
        for name in ["", "Bad Name", "Host:", "H\u{a9}st", "(x)"] {
            assert!(
                matches!(h.set(name, "x"), Err(ParseError::MalformedHeader(_))),
                "{name:?}"
            );
            assert!(h.replace(name, "x").is_err(), "{name:?}");
        }
        assert!(h.is_empty());
    }

    #[test]
    fn set_rejects_line_breaks_in_values() {
        let mut h = Headers::new();
        h.set("X-Note", "safe").unwrap();
        for value in ["a\r\nSet-Cookie: evil=1", "a\nb", "a\rb", "a\0b"] {
            assert!(
                matches!(h.set("X-Note", value), Err(ParseError::MalformedHeader(_))),
                "{value:?}"
            );
            assert!(h.replace("X-Note", value).is_err(), "{value:?}");
        }
        assert_eq!(h.get("x-note"), Some("safe"));
        assert_eq!(h.to_string(), "x-note: safe\r\n");
    }

    #[test]
    fn many_fields_parse_in_one_pass() {
        let mut raw = String::new();
        for i in 0..2000 {
            raw.push_str(&format!("X-Field-{}: {i}\r\n", i % 500));
        }
        raw.push_str("\r\n");

        let mut h = Headers::new();
        let parsed = h.parse(raw.as_bytes()).unwrap();
        assert!(parsed.complete);
        assert_eq!(h.len(), 500);
        assert_eq!(h.get("x-field-7"), Some("7,507,1007,1507"));
    }

    #[test]
    fn bare_carriage_return_in_value_is_rejected() {
        let mut h = Headers::new();
        assert!(matches!(
            h.parse(b"X-Note: a\rb\r\n\r\n"),
            Err(ParseError::MalformedHeader(_))
        ));
        assert!(h.is_empty());
    }

    #[test]
    fn parse_single_header() {
        let mut h = Headers::new();
        let data = b"Host: localhost:42069\r\n\r\n";
        let parsed = h.parse(data).unwrap();
        assert_eq!(h.get("host"), Some("localhost:42069"));
        assert_eq!(parsed.consumed, 25);
        assert!(parsed.complete);
    }

    #[test]
    fn parse_trims_value_whitespace() {
        let mut h = Headers::new();
        let data = b"       Host: localhost:42069       \r\n\r\n";
        // Leading whitespace makes the name a non-token.
        assert!(h.parse(data).is_err());

        let mut h = Headers::new();
        let parsed = h.parse(b"Host:    localhost:42069   \r\n\r\n").unwrap();
        assert!(parsed.complete);
        assert_eq!(h.get("host"), Some("localhost:42069"));
    }

    #[test]
    fn parse_merges_repeated_fields() {
        let mut h = Headers::new();
        let parsed = h.parse(b"Host: a\r\nHost: b\r\n\r\n").unwrap();
        assert!(parsed.complete);
        assert_eq!(h.get("host"), Some("a,b"));
        assert_eq!(h.get("HOST"), Some("a,b"));
    }

    #[test]
    fn parse_merges_with_existing_values() {
        let mut h = Headers::new();
        h.set("Set-Person", "lane-loves-go").unwrap();
        h.parse(b"Set-Person: prime-loves-zig\r\nSet-Person: tj-loves-ocaml\r\n\r\n")
            .unwrap();
        assert_eq!(
            h.get("set-person"),
            Some("lane-loves-go,prime-loves-zig,tj-loves-ocaml")
        );
    }

    #[test]
    fn space_before_colon_is_rejected() {
        let mut h = Headers::new();
        let err = h.parse(b"Host : a\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader(_)));
        assert!(h.is_empty());
    }

    #[test]
    fn missing_colon_is_rejected() {
        let mut h = Headers::new();
        let err = h.parse(b"Host localhost\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader("missing colon")));
    }

    #[test]
    fn invalid_token_is_rejected() {
        let mut h = Headers::new();
        assert!(h.parse("H©st: localhost\r\n\r\n".as_bytes()).is_err());
        assert!(h.parse(b": empty-name\r\n\r\n").is_err());
    }

    #[test]
    fn error_discards_lines_from_the_failing_call() {
        let mut h = Headers::new();
        assert!(h.parse(b"Good: yes\r\nBad Header\r\n\r\n").is_err());
        assert!(!h.contains("good"));
    }

    #[test]
    fn incomplete_input_consumes_nothing() {
        let mut h = Headers::new();
        let parsed = h.parse(b"Host: localh").unwrap();
        assert_eq!(
            parsed,
            HeaderParse {
                consumed: 0,
                complete: false
            }
        );
    }

    #[test]
    fn complete_lines_are_consumed_before_terminator_arrives() {
        let mut h = Headers::new();
        let data = b"Host: localhost\r\nAccept: */*\r\nUser-Ag";
        let parsed = h.parse(data).unwrap();
        assert_eq!(parsed.consumed, b"Host: localhost\r\nAccept: */*\r\n".len());
        assert!(!parsed.complete);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn parse_stops_at_terminator() {
        let mut h = Headers::new();
        let parsed = h.parse(b"A: 1\r\n\r\nbody: not-a-header\r\n").unwrap();
        assert_eq!(parsed.consumed, 8);
        assert!(parsed.complete);
        assert!(!h.contains("body"));
    }

    #[test]
    fn display_renders_field_lines() {
        let mut h = Headers::new();
        h.set("Content-Length", "5").unwrap();
        h.set("Connection", "close").unwrap();
        assert_eq!(h.to_string(), "content-length: 5\r\nconnection: close\r\n");
    }
}
