use std::io;
use std::time::SystemTime;

use crate::http::headers::HeaderMap;

/// Phrase reported for status codes outside the known table.
pub const INVALID_REASON: &str = "INVALID";

/// HTTP status codes emitted by the server.
///
/// - `Ok` (200): Request successful
/// - `MovedPermanently` (301) / `Found` (302): Redirects
/// - `BadRequest` (400): Malformed request
/// - `Unauthorized` (401) / `Forbidden` (403): Access refused
/// - `NotFound` (404): Resource not found
/// - `MethodNotAllowed` (405): HTTP method not supported
/// - `InternalServerError` (500): Server error
/// - `NotImplemented` (501): Functionality not supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Found
    Found,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    pub const ALL: [StatusCode; 10] = [
        StatusCode::Ok,
        StatusCode::MovedPermanently,
        StatusCode::Found,
        StatusCode::BadRequest,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::MethodNotAllowed,
        StatusCode::InternalServerError,
        StatusCode::NotImplemented,
    ];

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use porthole::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        StatusCode::ALL.into_iter().find(|s| s.as_u16() == code)
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use porthole::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> u16 {
        status.as_u16()
    }
}

/// Reason phrase for a numeric code, [`INVALID_REASON`] if it is unknown.
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .map(|s| s.reason_phrase())
        .unwrap_or(INVALID_REASON)
}

/// An HTTP response filled in by a handler and serialized once by the
/// [`ResponseWriter`](crate::http::writer::ResponseWriter).
///
/// The status is kept numeric so handlers may set any code; codes outside
/// [`StatusCode`] serialize with the phrase `INVALID`.
#[derive(Debug, Clone)]
pub struct Response {
    /// The numeric HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as bytes
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates a `200 OK` response carrying the default headers: `Date` and
    /// `Last-Modified` set to now, `Cache-Control: no-cache` and
    /// `Content-Type: text/html`.
    pub fn new() -> Self {
        let now = httpdate::fmt_http_date(SystemTime::now());

        let mut headers = HeaderMap::new();
        headers.set("Date", now.clone());
        headers.set("Last-Modified", now);
        headers.set("Cache-Control", "no-cache");
        headers.set("Content-Type", "text/html");

        Self {
            status: StatusCode::Ok.as_u16(),
            headers,
            body: Vec::new(),
        }
    }

    pub fn set_status(&mut self, status: impl Into<u16>) {
        self.status = status.into();
    }

    pub fn reason_phrase(&self) -> &'static str {
        reason_phrase(self.status)
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Appends bytes to the body.
    pub fn write_body(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }
}

impl io::Write for Response {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Builder for constructing responses in a fluent style, starting from the
/// defaults of [`Response::new`].
///
/// # Example
///
/// ```
/// # use porthole::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::NotFound)
///     .header("Content-Type", "text/plain")
///     .body(b"gone".to_vec())
///     .build();
/// assert_eq!(response.status, 404);
/// ```
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new(status: impl Into<u16>) -> Self {
        let mut response = Response::new();
        response.set_status(status);
        Self { response }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.response.set_header(key, value);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.response.body = body;
        self
    }

    pub fn build(self) -> Response {
        self.response
    }
}
