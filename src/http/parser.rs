use std::borrow::Cow;

use crate::http::request::{DEFAULT_VERSION, Request};

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The header block has not been terminated yet; read more bytes.
    Incomplete,
    /// The peer closed the connection without sending anything.
    Empty,
}

/// Parses a request line and its header block from `buf`.
///
/// Lines end with `\n`, an optional preceding `\r` is stripped. Header
/// reading stops at the first blank line or at the first line that is not
/// `Name: Value`; headers collected up to that point are kept and nothing is
/// reported. Returns the request and the number of bytes consumed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    parse(buf, false)
}

/// Like [`parse_http_request`], for a buffer the peer will not extend.
///
/// An unterminated final line is parsed as if it were terminated and a
/// missing blank line ends the header block, which lets HTTP/0.9 style
/// requests such as `GET /\n` through once the client half-closes.
pub fn parse_http_request_at_eof(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }
    parse(buf, true)
}

fn parse(buf: &[u8], at_eof: bool) -> Result<(Request, usize), ParseError> {
    let mut lines = Lines { buf, pos: 0, at_eof };

    let request_line = lines.next_line().ok_or(ParseError::Incomplete)?;
    let mut request = parse_request_line(&request_line);

    loop {
        let Some(line) = lines.next_line() else {
            if at_eof {
                break;
            }
            return Err(ParseError::Incomplete);
        };

        if line.is_empty() {
            break;
        }

        match parse_header_line(&line) {
            Some((name, value)) => request.headers.set(name, value),
            None => break,
        }
    }

    Ok((request, lines.pos))
}

/// Splits `Method SP Request-Target [SP HTTP/major.minor]` on runs of
/// whitespace. Missing tokens become empty strings; a missing or malformed
/// version token yields `HTTP/0.9`.
pub fn parse_request_line(line: &str) -> Request {
    let mut tokens = line.split_whitespace();

    let method = tokens.next().unwrap_or("");
    let target = tokens.next().unwrap_or("");
    let version = tokens
        .next()
        .and_then(parse_version)
        .unwrap_or(DEFAULT_VERSION);

    Request::new(method, target, version)
}

/// Parses `HTTP/<major>.<minor>`.
pub fn parse_version(token: &str) -> Option<(u8, u8)> {
    let (major, minor) = token.strip_prefix("HTTP/")?.split_once('.')?;
    Some((parse_digits(major)?, parse_digits(minor)?))
}

fn parse_digits(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses `Token ":" OWS Value OWS`. The name must be non-empty and free of
/// whitespace and control characters.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;

    if name.is_empty()
        || name
            .bytes()
            .any(|b| b.is_ascii_whitespace() || b.is_ascii_control())
    {
        return None;
    }

    Some((name, value.trim_matches(|c| c == ' ' || c == '\t')))
}

/// Tracks how far the request head has been examined across reads, so each
/// line is looked at once however the bytes arrive.
///
/// The head is complete at the first blank line after the request line, or
/// at the first line that is not `Name: Value`, matching where
/// [`parse_http_request`] stops.
#[derive(Debug, Default)]
pub struct HeadScanner {
    pos: usize,
    seen_request_line: bool,
}

impl HeadScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Examines the complete lines appended to `buf` since the last call.
    /// `buf` must only ever grow between calls.
    pub fn is_complete(&mut self, buf: &[u8]) -> bool {
        while let Some(end) = buf[self.pos..].iter().position(|&b| b == b'\n') {
            let line = &buf[self.pos..self.pos + end];
            self.pos += end + 1;

            if !self.seen_request_line {
                self.seen_request_line = true;
                continue;
            }

            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() || parse_header_line(&String::from_utf8_lossy(line)).is_none() {
                return true;
            }
        }

        false
    }
}

struct Lines<'a> {
    buf: &'a [u8],
    pos: usize,
    at_eof: bool,
}

impl<'a> Lines<'a> {
    fn next_line(&mut self) -> Option<Cow<'a, str>> {
        let rest = &self.buf[self.pos..];

        let line = match rest.iter().position(|&b| b == b'\n') {
            Some(end) => {
                self.pos += end + 1;
                &rest[..end]
            }
            None if self.at_eof && !rest.is_empty() => {
                self.pos = self.buf.len();
                rest
            }
            None => return None,
        };

        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Some(String::from_utf8_lossy(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.0\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn bare_newlines_are_accepted() {
        let req = b"GET /x HTTP/1.0\nAccept: */*\n\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/x");
        assert_eq!(parsed.header("accept"), Some("*/*"));
        assert_eq!(consumed, req.len());
    }
}
