use std::path::{Path, PathBuf};

use porthole::http::path::{normalize, normalize_bytes, resolve, resolve_bytes};

#[test]
fn test_normalize_parent_segment() {
    assert_eq!(normalize("/a/b/../c"), "/a/c");
}

#[test]
fn test_normalize_never_climbs_above_root() {
    assert_eq!(normalize("/a/../../b"), "/b");
    assert_eq!(normalize("/../../.."), "/");
}

#[test]
fn test_normalize_empty_and_root() {
    assert_eq!(normalize(""), "/");
    assert_eq!(normalize("/"), "/");
    assert_eq!(normalize("/./"), "/");
}

#[test]
fn test_normalize_keeps_trailing_slash() {
    assert_eq!(normalize("/a/b/"), "/a/b/");
    assert_eq!(normalize("/a/./b/./"), "/a/b/");
    assert_eq!(normalize("/a/.."), "/");
}

#[test]
fn test_normalize_collapses_empty_segments() {
    assert_eq!(normalize("//a///b"), "/a/b");
    assert_eq!(normalize("a/b"), "/a/b");
}

#[test]
fn test_normalize_keeps_dot_prefixed_names() {
    assert_eq!(normalize("/.hidden/..x/file."), "/.hidden/..x/file.");
}

#[test]
fn test_normalize_result_has_no_dot_segments() {
    for input in ["/a/./b/../../c/.", "../x", "/x/y/z/../../..", "/./../a/"] {
        let out = normalize(input);
        assert!(out.starts_with('/'), "{input} -> {out}");
        assert!(
            out.split('/').all(|s| s != "." && s != ".."),
            "{input} -> {out}"
        );
    }
}

#[test]
fn test_resolve_stays_under_root() {
    let root = Path::new("/srv/www");

    assert_eq!(resolve(root, "/../../etc/passwd"), PathBuf::from("/srv/www/etc/passwd"));
    assert_eq!(resolve(root, "/docs/a.html"), PathBuf::from("/srv/www/docs/a.html"));
    assert_eq!(resolve(root, "/"), PathBuf::from("/srv/www"));
}

#[test]
fn test_normalize_bytes_passes_octets_through() {
    assert_eq!(normalize_bytes(b"/a/\xff/../\xe9/"), b"/a/\xe9/".to_vec());
    assert_eq!(normalize_bytes(b""), b"/".to_vec());
}

#[cfg(unix)]
#[test]
fn test_resolve_bytes_maps_exact_file_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let root = Path::new("/srv/www");
    let resolved = resolve_bytes(root, b"/docs/../caf\xe9.html");

    assert_eq!(resolved, root.join(OsStr::from_bytes(b"caf\xe9.html")));
}
