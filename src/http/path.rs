//! Resolution of `.` and `..` segments in decoded URL paths.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Normalizes a decoded URL path.
///
/// `.` and empty segments are dropped and `..` removes the previous retained
/// segment; a `..` with nothing left to remove is ignored, so the result
/// never climbs above `/`. A trailing slash on the input is kept unless the
/// result is the root itself.
///
/// ```
/// use porthole::http::path::normalize;
///
/// assert_eq!(normalize("/a/b/../c"), "/a/c");
/// assert_eq!(normalize("/a/../../b"), "/b");
/// assert_eq!(normalize("/a/b/"), "/a/b/");
/// assert_eq!(normalize(""), "/");
/// ```
pub fn normalize(path: &str) -> String {
    // Segments are split at `/` only, so valid UTF-8 stays valid.
    String::from_utf8_lossy(&normalize_bytes(path.as_bytes())).into_owned()
}

/// [`normalize`] over raw decoded octets, which need not be UTF-8.
pub fn normalize_bytes(path: &[u8]) -> Vec<u8> {
    let mut segments: Vec<&[u8]> = Vec::new();

    for segment in path.split(|&b| b == b'/') {
        match segment {
            b"" | b"." => {}
            b".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return b"/".to_vec();
    }

    let mut normalized = Vec::with_capacity(path.len() + 1);
    for segment in &segments {
        normalized.push(b'/');
        normalized.extend_from_slice(segment);
    }
    if path.ends_with(b"/") {
        normalized.push(b'/');
    }

    normalized
}

/// Maps a URL path onto a filesystem path below `root`.
///
/// The path is normalized first, so the result always lies inside `root`.
pub fn resolve(root: &Path, path: &str) -> PathBuf {
    resolve_bytes(root, path.as_bytes())
}

/// [`resolve`] over raw decoded octets. On Unix every segment maps to the
/// file name with exactly those bytes.
pub fn resolve_bytes(root: &Path, path: &[u8]) -> PathBuf {
    let normalized = normalize_bytes(path);
    let mut resolved = root.to_path_buf();

    for segment in normalized.split(|&b| b == b'/').filter(|s| !s.is_empty()) {
        resolved.push(os_segment(segment));
    }

    resolved
}

#[cfg(unix)]
fn os_segment(segment: &[u8]) -> Cow<'_, OsStr> {
    use std::os::unix::ffi::OsStrExt;

    Cow::Borrowed(OsStr::from_bytes(segment))
}

#[cfg(not(unix))]
fn os_segment(segment: &[u8]) -> Cow<'_, OsStr> {
    match String::from_utf8_lossy(segment) {
        Cow::Borrowed(s) => Cow::Borrowed(OsStr::new(s)),
        Cow::Owned(s) => Cow::Owned(s.into()),
    }
}
