use crate::http::codec;
use crate::http::headers::HeaderMap;
use crate::http::path;
use crate::http::query::Query;

/// HTTP request methods.
///
/// Any token outside the known set parses as `UNKNOWN`; the raw token stays
/// available on [`Request::method_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    OPTIONS,
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    TRACE,
    CONNECT,
    UNKNOWN,
}

impl Method {
    /// Matches a method token exactly; matching is case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use porthole::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::UNKNOWN);
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "OPTIONS" => Method::OPTIONS,
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "TRACE" => Method::TRACE,
            "CONNECT" => Method::CONNECT,
            _ => Method::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::OPTIONS => "OPTIONS",
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

/// Protocol version assumed when the request line carries none.
pub const DEFAULT_VERSION: (u8, u8) = (0, 9);

/// A parsed HTTP request.
///
/// The request target is split at the first `?`; both halves are
/// percent-decoded, `+` included. The decoded path is *not* normalized, see
/// [`Request::normalized_path`].
#[derive(Debug, Clone)]
pub struct Request {
    /// The matched method, `UNKNOWN` if the token was not recognized
    pub method: Method,
    /// The method token exactly as received
    pub method_token: String,
    /// The raw request target, e.g. `/a%20b?x=1`
    pub target: String,
    /// Decoded path; never empty and always starts with `/`. Octets that
    /// are not UTF-8 are replaced here but kept in `path_bytes`.
    pub path: String,
    /// The decoded path octets exactly as decoded
    pub path_bytes: Vec<u8>,
    /// Decoded query string, empty when the target has no `?`
    pub query_string: String,
    /// Query tokens parsed from the raw (undecoded) query
    pub params: Query,
    /// `(major, minor)`, [`DEFAULT_VERSION`] when absent
    pub version: (u8, u8),
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method_token: &str, target: &str, version: (u8, u8)) -> Self {
        let mut request = Self {
            method: Method::from_token(method_token),
            method_token: method_token.to_string(),
            target: String::new(),
            path: String::new(),
            path_bytes: Vec::new(),
            query_string: String::new(),
            params: Query::new(),
            version,
            headers: HeaderMap::new(),
        };
        request.set_target(target);
        request
    }

    /// Replaces the request target and decomposes it again into path and
    /// query.
    pub fn set_target(&mut self, target: &str) {
        let (raw_path, raw_query) = match target.split_once('?') {
            Some((p, q)) => (p, q),
            None => (target, ""),
        };

        let mut path = codec::decode_bytes(raw_path.as_bytes());
        if path.first() != Some(&b'/') {
            path.insert(0, b'/');
        }

        self.target = target.to_string();
        self.path = String::from_utf8_lossy(&path).into_owned();
        self.path_bytes = path;
        self.query_string = codec::decode(raw_query);
        self.params = Query::parse(raw_query);
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.params
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn path_bytes(&self) -> &[u8] {
        &self.path_bytes
    }

    /// The decoded path with `.` and `..` segments resolved.
    pub fn normalized_path(&self) -> String {
        path::normalize(&self.path)
    }

    /// [`normalized_path`](Request::normalized_path) over the exact octets.
    pub fn normalized_path_bytes(&self) -> Vec<u8> {
        path::normalize_bytes(&self.path_bytes)
    }

    /// Retrieves a header value by name, case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// The version formatted as it appears on the wire, e.g. `HTTP/1.0`.
    pub fn version_string(&self) -> String {
        format!("HTTP/{}.{}", self.version.0, self.version.1)
    }
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<String>,
    target: Option<String>,
    version: (u8, u8),
    headers: HeaderMap,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: DEFAULT_VERSION,
            headers: HeaderMap::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method.as_str().to_string());
        self
    }

    /// Sets the raw method token, which may be outside the known set.
    pub fn method_token(mut self, token: impl Into<String>) -> Self {
        self.method = Some(token.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.version = (major, minor);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let target = self.target.ok_or("target missing")?;

        let mut request = Request::new(&method, &target, self.version);
        request.headers = self.headers;
        Ok(request)
    }
}
