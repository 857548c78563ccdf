use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::handler::Handler;
use crate::http::headers::HeaderMap;
use crate::http::parser::{
    HeadScanner, ParseError, parse_http_request, parse_http_request_at_eof,
};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{Body, ResponseWriter};

/// One accepted client, served exactly once.
///
/// The connection owns its stream for the whole request/response cycle and
/// shuts it down when [`run`](Connection::run) returns, on success and on
/// failure alike. There is no keep-alive and no read timeout: a client that
/// stalls mid-request keeps its task parked.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    handler: Arc<dyn Handler>,
    defaults: HeaderMap,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, handler: Arc<dyn Handler>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            handler,
            defaults: HeaderMap::new(),
        }
    }

    /// Headers copied onto the response before the handler sees it.
    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        self.defaults = headers;
        self
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        // Best effort; the stream is dropped right after either way.
        let _ = self.stream.shutdown().await;
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some(req) => ConnectionState::Processing(req),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    let writer = self.process(req).await;
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(mut writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Reads until the header block is complete or the peer stops sending.
    ///
    /// Returns `None` if the peer closed without sending a single byte.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        let mut head = HeadScanner::new();

        loop {
            if head.is_complete(&self.buffer) {
                match parse_http_request(&self.buffer) {
                    Ok((request, _consumed)) => return Ok(Some(request)),
                    Err(ParseError::Incomplete) => {}
                    Err(ParseError::Empty) => return Ok(None),
                }
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Client closed its write half; use what arrived.
                return match parse_http_request_at_eof(&self.buffer) {
                    Ok((request, _consumed)) => Ok(Some(request)),
                    Err(_) => Ok(None),
                };
            }
        }
    }

    async fn process(&self, request: Request) -> ResponseWriter {
        debug!(
            method = %request.method_token,
            target = %request.target,
            version = %request.version_string(),
            "Request parsed"
        );

        let mut response = Response::new();
        response.headers.extend_from(&self.defaults);

        let head_only = request.method == Method::HEAD;
        let path = request.path.clone();

        let handler = Arc::clone(&self.handler);
        let outcome = tokio::task::spawn_blocking(move || {
            handler.handle(&request, &mut response);
            response
        })
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(path = %path, error = %err, "Handler failed");
                let mut response = Response::new();
                response.headers.extend_from(&self.defaults);
                response.set_status(StatusCode::InternalServerError);
                response
            }
        };

        info!(path = %path, status = response.status, "Request served");

        let body = if head_only {
            Body::None
        } else if response.body.is_empty() && response.status != StatusCode::Ok.as_u16() {
            Body::ErrorPage { path: &path }
        } else {
            Body::Payload
        };

        ResponseWriter::new(&response, body)
    }
}
