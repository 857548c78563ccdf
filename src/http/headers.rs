//! Header dictionary shared by [`Request`](crate::http::request::Request),
//! [`Response`](crate::http::response::Response) and the
//! [`ConnectionServer`](crate::server::listener::ConnectionServer) defaults.
//!
//! Names compare case-insensitively and hold a single value each: setting an
//! existing name overwrites its value and replaces the stored spelling of the
//! name with the one used last. Entries serialize in first-insertion order,
//! which keeps output deterministic.

use std::fmt;

use bytes::BufMut;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    // lowercased name -> (name as last set, value)
    entries: IndexMap<String, (String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Sets `name` to `value`, overwriting any entry with the same name
    /// regardless of case.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Looks up `name`, falling back to `default` when absent.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Removes `name` and returns its value, if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .shift_remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs, names spelled as last set.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Copies every entry of `other` into `self`, overwriting clashes.
    pub fn extend_from(&mut self, other: &HeaderMap) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Appends `Name: Value\r\n` for each entry.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        for (name, value) in self.iter() {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        Ok(())
    }
}
