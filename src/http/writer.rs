use std::fmt;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.0";

/// What follows the header block.
#[derive(Debug, Clone, Copy)]
pub enum Body<'a> {
    /// Nothing, e.g. for `HEAD`.
    None,
    /// The bytes the handler wrote.
    Payload,
    /// A generated HTML page describing the status, mentioning `path`.
    ErrorPage { path: &'a str },
}

/// Serializes status line, headers, the blank line and the chosen body.
pub fn serialize_response(resp: &Response, body: Body<'_>) -> BytesMut {
    let mut buf = BytesMut::with_capacity(256 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status,
        resp.reason_phrase()
    );
    buf.put_slice(status_line.as_bytes());

    // Headers
    resp.headers.write_to(&mut buf);

    // Header/body separator
    buf.put_slice(b"\r\n");

    match body {
        Body::None => {}
        Body::Payload => buf.put_slice(&resp.body),
        Body::ErrorPage { path } => buf.put_slice(error_page(resp, path).as_bytes()),
    }

    buf
}

/// Renders the HTML page sent for an error status without a handler body.
///
/// The request path and the response's `Server` header are XML-escaped.
pub fn error_page(resp: &Response, path: &str) -> String {
    let phrase = resp.reason_phrase();
    let server = resp.header("Server").unwrap_or("");

    format!(
        "<html><head><title>{code} {phrase}</title></head>\n\
         <body><h1>{phrase}</h1>\n\
         <p>{code} {phrase}: {path}</p>\n\
         <hr><address>{server}</address>\n\
         </body></html>\n",
        code = resp.status,
        phrase = phrase,
        path = XmlEscaped(path),
        server = XmlEscaped(server),
    )
}

/// Escapes `&`, `<` and `>`.
pub struct XmlEscaped<'a>(pub &'a str);

impl fmt::Display for XmlEscaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                c => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

pub struct ResponseWriter {
    buffer: BytesMut,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, body: Body<'_>) -> Self {
        Self {
            buffer: serialize_response(response, body),
            written: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
