//! Extension to content-type lookup.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

/// Built on first use and read-only afterwards.
static MIME_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("css", "text/css"),
        ("htm", "text/html"),
        ("html", "text/html"),
        ("txt", "text/plain"),
        ("xml", "text/xml"),
        ("xsl", "text/xsl"),
        ("xhtml", "application/xhtml+xml"),
        ("js", "application/javascript"),
        ("json", "application/json"),
        ("gif", "image/gif"),
        ("ico", "image/x-icon"),
        ("jpeg", "image/jpeg"),
        ("jpg", "image/jpeg"),
        ("png", "image/png"),
        ("svg", "image/svg+xml"),
        ("gz", "application/x-gzip"),
        ("pdf", "application/pdf"),
        ("tar", "application/x-tar"),
        ("zip", "application/zip"),
    ])
});

/// Content type for a file extension (without the dot), case-insensitive.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    MIME_TYPES.get(ext.to_ascii_lowercase().as_str()).copied()
}

/// Content type for the extension of `path`, if it has a known one.
pub fn from_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(from_extension)
}

/// Forces the table to be built, so it happens before any request is served.
pub fn init() {
    Lazy::force(&MIME_TYPES);
}
