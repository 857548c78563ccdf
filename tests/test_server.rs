use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use porthole::handler::Handler;
use porthole::http::request::Request;
use porthole::http::response::Response;
use porthole::server::{ConnectionServer, ServerState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// A port that was free a moment ago.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind((LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

async fn fetch(port: u16, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect((LOCALHOST, port)).await.unwrap();
    stream.write_all(raw).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_server_starts_created() {
    let server = ConnectionServer::new(LOCALHOST);

    assert_eq!(server.state(), ServerState::Created);
    assert_eq!(server.port(), 0);
    assert!(server.error().is_none());
    assert!(server.headers().get("Server").unwrap().starts_with("porthole/"));
}

#[test]
fn test_server_bind_port_zero_fails() {
    let mut server = ConnectionServer::new(LOCALHOST);

    assert_eq!(server.bind(0), 0);
    assert_eq!(server.state(), ServerState::Created);
    assert!(server.error().is_some());
}

#[test]
fn test_server_bind_port_in_use_fails() {
    let holder = std::net::TcpListener::bind((LOCALHOST, 0)).unwrap();
    let port = holder.local_addr().unwrap().port();

    let mut server = ConnectionServer::new(LOCALHOST);

    assert_eq!(server.bind(port), 0);
    assert!(server.error().unwrap().contains(&port.to_string()));
}

#[test]
fn test_server_listen_before_bind_fails() {
    let mut server = ConnectionServer::new(LOCALHOST);

    assert!(!server.listen(16));
    assert!(server.error().unwrap().contains("before bind"));
}

#[tokio::test]
async fn test_server_error_is_sticky() {
    let mut server = ConnectionServer::new(LOCALHOST);
    assert_eq!(server.bind(0), 0);

    let port = free_port();
    assert_eq!(server.bind(port), port);
    assert!(server.listen(16));

    assert_eq!(server.state(), ServerState::Listening);
    assert!(server.error().unwrap().contains("port 0"));
}

#[tokio::test]
async fn test_server_bind_twice_fails() {
    let mut server = ConnectionServer::new(LOCALHOST);
    let port = free_port();

    assert_eq!(server.bind(port), port);
    assert_eq!(server.bind(port), 0);
    assert_eq!(server.state(), ServerState::Bound);
}

#[tokio::test]
async fn test_server_accept_listens_implicitly() {
    let mut server = ConnectionServer::new(LOCALHOST);
    let port = free_port();
    assert_eq!(server.bind(port), port);
    assert_eq!(server.state(), ServerState::Bound);

    let accepting = tokio::spawn(async move {
        let accepted = server.accept().await;
        (server.state(), accepted.is_some())
    });

    // Retry until the spawned accept has started listening.
    let client = loop {
        match TcpStream::connect((LOCALHOST, port)).await {
            Ok(stream) => break stream,
            Err(_) => tokio::task::yield_now().await,
        }
    };

    let (state, accepted) = accepting.await.unwrap();
    assert_eq!(state, ServerState::Listening);
    assert!(accepted);
    drop(client);
}

#[tokio::test]
async fn test_server_serves_each_connection() {
    let mut server = ConnectionServer::new(LOCALHOST);
    server.headers_mut().set("Server", "jobs <xml>");
    let port = free_port();
    assert_eq!(server.bind(port), port);
    assert!(server.listen(16));
    assert_eq!(server.local_addr().unwrap().port(), port);

    let handler: Arc<dyn Handler> = Arc::new(|req: &Request, res: &mut Response| {
        if req.path() == "/jobs" {
            res.set_header("Content-Type", "text/xml");
            res.write_body(format!("<jobs user=\"{}\"/>", req.query().get("user").unwrap_or("")));
        } else {
            res.set_status(404u16);
        }
    });
    tokio::spawn(async move { server.serve(handler).await });

    let ok = fetch(port, b"GET /jobs?user=a+b HTTP/1.0\r\n\r\n").await;
    assert!(ok.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(ok.contains("Content-Type: text/xml\r\n"));
    assert!(ok.ends_with("<jobs user=\"a b\"/>"));

    let missing = fetch(port, b"GET /hosts HTTP/1.0\r\n\r\n").await;
    assert!(missing.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(missing.contains("Server: jobs <xml>\r\n"));
    assert!(missing.contains("jobs &lt;xml&gt;"));
}

#[tokio::test]
async fn test_server_serve_without_bind_fails() {
    let mut server = ConnectionServer::new(LOCALHOST);
    let handler: Arc<dyn Handler> = Arc::new(|_: &Request, _: &mut Response| {});

    let err = server.serve(handler).await.unwrap_err();

    assert!(err.to_string().contains("before bind"));
}

// Two reuse-address sockets may share a port until one listens; the second
// listen then fails.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_server_failed_listen_releases_port() {
    let port = free_port();
    let mut first = ConnectionServer::new(LOCALHOST);
    let mut second = ConnectionServer::new(LOCALHOST);

    assert_eq!(first.bind(port), port);
    assert_eq!(second.bind(port), port);
    assert!(first.listen(16));

    assert!(!second.listen(16));
    assert_eq!(second.state(), ServerState::Created);
    assert_eq!(second.port(), 0);
    assert!(second.error().unwrap().contains("listen on port"));
    assert_eq!(second.local_addr(), None);

    assert_eq!(first.port(), port);
}
