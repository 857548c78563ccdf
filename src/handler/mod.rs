//! Request handlers.
//!
//! A [`Handler`] is the application side of a connection: it reads the
//! parsed [`Request`] and fills in the [`Response`]. The connection calls it
//! exactly once and serializes whatever it leaves behind; nothing it writes
//! is validated.

pub mod echo;
pub mod static_files;

use crate::http::request::Request;
use crate::http::response::Response;

pub use echo::Echo;
pub use static_files::StaticFiles;

/// Produces the response for one request.
///
/// Runs on a blocking-capable thread, so implementations may do synchronous
/// I/O.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request, response: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
{
    fn handle(&self, request: &Request, response: &mut Response) {
        self(request, response)
    }
}

/// Sends requests whose path is `prefix` or lies below it to `mounted`,
/// everything else to `fallback`. `/_echo` matches `/_echo` and `/_echo/x`
/// but not `/_echoes`.
pub struct Mount<A, B> {
    prefix: String,
    mounted: A,
    fallback: B,
}

impl<A: Handler, B: Handler> Mount<A, B> {
    pub fn new(prefix: impl Into<String>, mounted: A, fallback: B) -> Self {
        Self {
            prefix: prefix.into(),
            mounted,
            fallback,
        }
    }
}

impl<A, B> Mount<A, B> {
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}

impl<A: Handler, B: Handler> Handler for Mount<A, B> {
    fn handle(&self, request: &Request, response: &mut Response) {
        if self.matches(request.path()) {
            self.mounted.handle(request, response)
        } else {
            self.fallback.handle(request, response)
        }
    }
}
