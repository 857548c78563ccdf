//! Query-string tokenizer producing unnamed tokens and named, multi-valued
//! parameters.
//!
//! The tokenizer runs over the raw (still percent-encoded) query in a single
//! pass. A token becomes *named* as soon as an `=` is seen in it, even if the
//! value that follows is empty; otherwise it is *unnamed*. `&` and `;` both
//! terminate a token. `+` and `%XX` decode inline exactly as in
//! [`codec::decode`](crate::http::codec::decode).
//!
//! ```
//! use porthole::http::query::Query;
//!
//! let query = Query::parse("debug&name=a+b;name=c&empty=");
//! assert_eq!(query.unnamed(), ["debug"]);
//! assert_eq!(query.get_all("name"), ["a b", "c"]);
//! assert_eq!(query.get("empty"), Some(""));
//! ```

use std::borrow::{Borrow, Cow};
use std::fmt;

use indexmap::IndexMap;

use crate::http::codec::{self, EscapeDecoder, EscapeStep};

/// One decoded query token: the exact octets, which need not be UTF-8.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Param(Vec<u8>);

impl Param {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The token as text, `None` if it is not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl Borrow<[u8]> for Param {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Param {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Param {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl PartialEq<str> for Param {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Param {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    unnamed: Vec<Param>,
    named: IndexMap<Param, Vec<Param>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizes a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        let mut tokenizer = Tokenizer::default();
        for &c in raw.as_bytes() {
            tokenizer.push(c);
        }
        tokenizer.finish()
    }

    /// Tokens that carried no `=`, in order of occurrence.
    pub fn unnamed(&self) -> &[Param] {
        &self.unnamed
    }

    /// Named parameters in order of first occurrence.
    pub fn named(&self) -> &IndexMap<Param, Vec<Param>> {
        &self.named
    }

    /// First value of `name` as text. `None` if absent or not valid UTF-8,
    /// see [`get_param`](Query::get_param) for the raw octets.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&str> {
        self.get_param(name).and_then(Param::as_str)
    }

    /// First value of the named parameter `name`.
    pub fn get_param(&self, name: impl AsRef<[u8]>) -> Option<&Param> {
        self.get_all(name).first()
    }

    /// Every value of `name`, in occurrence order. Empty if absent.
    pub fn get_all(&self, name: impl AsRef<[u8]>) -> &[Param] {
        self.named
            .get(name.as_ref())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True if `name` occurs either as a named parameter or an unnamed token.
    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        let name = name.as_ref();
        self.named.contains_key(name) || self.unnamed.iter().any(|t| t.as_bytes() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.unnamed.is_empty() && self.named.is_empty()
    }

    pub fn push_unnamed(&mut self, token: impl Into<Param>) {
        self.unnamed.push(token.into());
    }

    pub fn push_named(&mut self, name: impl Into<Param>, value: impl Into<Param>) {
        self.named.entry(name.into()).or_default().push(value.into());
    }

    /// Re-serializes the query with every token percent-encoded.
    ///
    /// Unnamed tokens come first, then each `name=value` pair; the relative
    /// order of unnamed and named tokens in the parsed input is not kept.
    pub fn to_query_string(&self) -> String {
        let mut out = String::new();

        for token in &self.unnamed {
            if !out.is_empty() {
                out.push('&');
            }
            codec::encode_bytes_into(&mut out, token.as_bytes());
        }

        for (name, values) in &self.named {
            for value in values {
                if !out.is_empty() {
                    out.push('&');
                }
                codec::encode_bytes_into(&mut out, name.as_bytes());
                out.push('=');
                codec::encode_bytes_into(&mut out, value.as_bytes());
            }
        }

        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Key,
    Value,
}

/// The `KEY`/`VAL` state machine; a pending `escape` marks the matching
/// `*_ESCAPE` state.
#[derive(Default)]
struct Tokenizer {
    state: State,
    escape: Option<EscapeDecoder>,
    key: Vec<u8>,
    value: Vec<u8>,
    query: Query,
}

impl Tokenizer {
    fn push(&mut self, c: u8) {
        if let Some(decoder) = self.escape.as_mut() {
            match decoder.push(c) {
                EscapeStep::Pending => return,
                EscapeStep::Byte(byte) => {
                    self.escape = None;
                    self.buffer().push(byte);
                    return;
                }
                // The broken escape is dropped and `c` handled as usual.
                EscapeStep::Invalid => self.escape = None,
            }
        }

        match (self.state, c) {
            (_, b'%') => self.escape = Some(EscapeDecoder::default()),
            (State::Key, b'&' | b';') => self.commit_unnamed(),
            (State::Value, b'&' | b';') => {
                self.commit_named();
                self.state = State::Key;
            }
            (_, b'+') => self.buffer().push(b' '),
            (State::Key, b'=') => self.state = State::Value,
            (_, c) => self.buffer().push(c),
        }
    }

    fn finish(mut self) -> Query {
        self.escape = None;
        match self.state {
            State::Key => self.commit_unnamed(),
            State::Value => self.commit_named(),
        }
        self.query
    }

    fn buffer(&mut self) -> &mut Vec<u8> {
        match self.state {
            State::Key => &mut self.key,
            State::Value => &mut self.value,
        }
    }

    // Empty tokens (`a&&b`, a trailing separator) are not recorded.
    fn commit_unnamed(&mut self) {
        let token = std::mem::take(&mut self.key);
        if !token.is_empty() {
            self.query.push_unnamed(token);
        }
        self.value.clear();
    }

    fn commit_named(&mut self) {
        let name = std::mem::take(&mut self.key);
        let value = std::mem::take(&mut self.value);
        self.query.push_named(name, value);
    }
}
