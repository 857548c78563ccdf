use std::fmt;

use crate::handler::Handler;
use crate::http::request::Request;
use crate::http::response::Response;

/// Replies with a plain-text dump of how the request was parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl Echo {
    pub fn render(request: &Request) -> String {
        RequestDump(request).to_string()
    }
}

impl Handler for Echo {
    fn handle(&self, request: &Request, response: &mut Response) {
        response.set_header("Content-Type", "text/plain");
        response.write_body(Self::render(request));
    }
}

struct RequestDump<'a>(&'a Request);

impl fmt::Display for RequestDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.0;
        let query = request.query();

        writeln!(f, "method: {}", request.method_token)?;
        writeln!(f, "target: {}", request.target)?;
        writeln!(f, "version: {}", request.version_string())?;
        writeln!(f, "path: {}", request.path())?;
        writeln!(f, "normalized: {}", request.normalized_path())?;
        writeln!(f, "query: {}", request.query_string())?;

        for token in query.unnamed() {
            writeln!(f, "unnamed: {}", token)?;
        }
        for (name, values) in query.named() {
            writeln!(f, "named: {} = {:?}", name, values)?;
        }

        writeln!(f, "reencoded: {}", query.to_query_string())?;

        for (name, value) in request.headers.iter() {
            writeln!(f, "header: {}: {}", name, value)?;
        }

        Ok(())
    }
}
