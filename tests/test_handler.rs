use std::fs;
use std::path::PathBuf;

use porthole::handler::{Echo, Handler, Mount, StaticFiles};
use porthole::http::request::{Request, RequestBuilder};
use porthole::http::response::Response;

/// Creates a fresh document root for one test.
fn doc_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("porthole-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("docs")).unwrap();

    fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(root.join("style.css"), "body {}").unwrap();
    fs::write(root.join("my file.txt"), "spaced").unwrap();
    fs::write(root.join("data.bin"), [0u8, 1, 2]).unwrap();
    fs::write(root.join("docs").join("index.html"), "docs").unwrap();
    fs::write(root.join("docs").join("page.HTM"), "page").unwrap();
    root
}

fn serve(handler: &dyn Handler, method: &str, target: &str) -> Response {
    let request = Request::new(method, target, (1, 0));
    let mut response = Response::new();
    handler.handle(&request, &mut response);
    response
}

#[test]
fn test_static_serves_file_with_mime_type() {
    let root = doc_root("mime");
    let files = StaticFiles::new(&root);

    let response = serve(&files, "GET", "/style.css");

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("text/css"));
    assert_eq!(response.header("Content-Length"), Some("7"));
    assert_eq!(response.body, b"body {}".to_vec());

    let response = serve(&files, "GET", "/docs/page.HTM");
    assert_eq!(response.header("Content-Type"), Some("text/html"));
}

#[test]
fn test_static_serves_index_for_trailing_slash() {
    let root = doc_root("index");
    let files = StaticFiles::new(&root);

    assert_eq!(serve(&files, "GET", "/").body, b"<h1>home</h1>".to_vec());
    assert_eq!(serve(&files, "GET", "/docs/").body, b"docs".to_vec());
}

#[test]
fn test_static_redirects_directory_without_slash() {
    let root = doc_root("redirect");
    let files = StaticFiles::new(&root);

    let response = serve(&files, "GET", "/docs");

    assert_eq!(response.status, 301);
    assert_eq!(response.header("Location"), Some("/docs/"));
    assert!(response.body.is_empty());
}

#[test]
fn test_static_decodes_and_normalizes_path() {
    let root = doc_root("decode");
    let files = StaticFiles::new(&root);

    assert_eq!(serve(&files, "GET", "/my%20file.txt").body, b"spaced".to_vec());
    assert_eq!(serve(&files, "GET", "/my+file.txt").body, b"spaced".to_vec());
    assert_eq!(serve(&files, "GET", "/docs/../../../style.css").status, 200);
}

#[cfg(target_os = "linux")]
#[test]
fn test_static_serves_non_utf8_file_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let root = doc_root("octets");
    fs::write(root.join(OsStr::from_bytes(b"caf\xe9.html")), "latin-1").unwrap();
    fs::create_dir(root.join(OsStr::from_bytes(b"d\xe9j\xe0"))).unwrap();
    let files = StaticFiles::new(&root);

    let response = serve(&files, "GET", "/caf%E9.html");
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"latin-1".to_vec());

    let response = serve(&files, "GET", "/d%E9j%E0");
    assert_eq!(response.status, 301);
    assert_eq!(response.header("Location"), Some("/d%E9j%E0/"));
}

#[test]
fn test_static_missing_file_is_404() {
    let root = doc_root("missing");
    let files = StaticFiles::new(&root);

    let response = serve(&files, "GET", "/nope.html");

    assert_eq!(response.status, 404);
    assert!(response.body.is_empty());
}

#[test]
fn test_static_unknown_extension_is_404() {
    let root = doc_root("ext");
    let files = StaticFiles::new(&root);

    assert_eq!(serve(&files, "GET", "/data.bin").status, 404);
}

#[test]
fn test_static_rejects_other_methods() {
    let root = doc_root("method");
    let files = StaticFiles::new(&root);

    for method in ["POST", "PUT", "DELETE", "BREW"] {
        let response = serve(&files, method, "/index.html");
        assert_eq!(response.status, 405);
        assert_eq!(response.header("Allow"), Some("GET, HEAD"));
    }

    assert_eq!(serve(&files, "HEAD", "/index.html").status, 200);
}

#[test]
fn test_static_custom_index() {
    let root = doc_root("custom-index");
    fs::write(root.join("docs").join("start.txt"), "start").unwrap();
    let files = StaticFiles::new(&root).with_index("start.txt");

    let response = serve(&files, "GET", "/docs/");

    assert_eq!(response.body, b"start".to_vec());
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
}

#[test]
fn test_echo_reports_parsed_request() {
    let request = RequestBuilder::new()
        .method_token("GET")
        .target("/_echo/a/../b?x=1&x=2;flag&q=a%26b")
        .version(1, 0)
        .header("Host", "example.com")
        .build()
        .unwrap();

    let body = Echo::render(&request);

    assert!(body.contains("path: /_echo/a/../b\n"));
    assert!(body.contains("normalized: /_echo/b\n"));
    assert!(body.contains("unnamed: flag\n"));
    assert!(body.contains("named: x = [\"1\", \"2\"]\n"));
    assert!(body.contains("reencoded: flag&x=1&x=2&q=a%26b\n"));
    assert!(body.contains("header: Host: example.com\n"));
}

#[test]
fn test_echo_sets_plain_text() {
    let response = serve(&Echo, "GET", "/_echo?x=1");

    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert!(!response.body.is_empty());
}

#[test]
fn test_mount_dispatches_on_prefix() {
    let root = doc_root("mount");
    let handler = Mount::new("/_echo", Echo, StaticFiles::new(&root));

    let echoed = serve(&handler, "GET", "/_echo/x");
    assert_eq!(echoed.header("Content-Type"), Some("text/plain"));

    let file = serve(&handler, "GET", "/index.html");
    assert_eq!(file.body, b"<h1>home</h1>".to_vec());
}

#[test]
fn test_mount_matches_whole_segments_only() {
    let root = doc_root("mount-segments");
    fs::write(root.join("_echoes.html"), "not echoed").unwrap();
    let handler = Mount::new("/_echo", Echo, StaticFiles::new(&root));

    let exact = serve(&handler, "GET", "/_echo");
    assert_eq!(exact.header("Content-Type"), Some("text/plain"));

    let sibling = serve(&handler, "GET", "/_echoes.html");
    assert_eq!(sibling.body, b"not echoed".to_vec());
    assert_eq!(sibling.header("Content-Type"), Some("text/html"));
}

#[test]
fn test_mount_prefix_with_trailing_slash() {
    let root = doc_root("mount-slash");
    let handler = Mount::new("/_echo/", Echo, StaticFiles::new(&root));

    assert_eq!(
        serve(&handler, "GET", "/_echo/x").header("Content-Type"),
        Some("text/plain")
    );
    assert_eq!(serve(&handler, "GET", "/_echo").status, 404);
}
