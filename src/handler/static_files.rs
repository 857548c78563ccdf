use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::handler::Handler;
use crate::http::codec;
use crate::http::mime;
use crate::http::path;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};

/// Serves files below a document root.
///
/// Only `GET` and `HEAD` are allowed. The request path is normalized before
/// it is mapped onto the root, so `..` can never leave it. Files whose
/// extension is not in the MIME table are reported as missing.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: "index.html".to_string(),
        }
    }

    /// File served for paths ending in `/`.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Handler for StaticFiles {
    fn handle(&self, request: &Request, response: &mut Response) {
        if !matches!(request.method, Method::GET | Method::HEAD) {
            response.set_status(StatusCode::MethodNotAllowed);
            response.set_header("Allow", "GET, HEAD");
            return;
        }

        let url_path = request.normalized_path_bytes();
        let mut full_path = path::resolve_bytes(&self.root, &url_path);

        if url_path.ends_with(b"/") {
            full_path.push(&self.index);
        } else if full_path.is_dir() {
            response.set_status(StatusCode::MovedPermanently);
            response.set_header("Location", format!("{}/", codec::encode_bytes(&url_path)));
            return;
        }

        let Some(content_type) = mime::from_path(&full_path) else {
            debug!(path = %full_path.display(), "No content type for extension");
            response.set_status(StatusCode::NotFound);
            return;
        };

        debug!(path = %full_path.display(), "Serving static file");

        let body = match fs::read(&full_path) {
            Ok(body) => body,
            Err(err) => {
                let status = match err.kind() {
                    ErrorKind::NotFound => StatusCode::NotFound,
                    ErrorKind::PermissionDenied => StatusCode::Forbidden,
                    _ => {
                        warn!(path = %full_path.display(), error = %err, "Failed to read file");
                        StatusCode::InternalServerError
                    }
                };
                response.set_status(status);
                return;
            }
        };

        if let Ok(modified) = fs::metadata(&full_path).and_then(|m| m.modified()) {
            response.set_header("Last-Modified", httpdate::fmt_http_date(modified));
        }
        response.set_header("Content-Type", content_type);
        response.set_header("Content-Length", body.len().to_string());
        response.body = body;
    }
}
