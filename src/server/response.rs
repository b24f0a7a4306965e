use dashmap::DashMap;
use std::sync::OnceLock;
use tracing::warn;

use crate::context::Response;

/// Upper bound on distinct interned header lines.
const MAX_INTERNED_HEADERS: usize = 4096;

/// Reason phrase for `status`.
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn interned_headers() -> &'static DashMap<String, &'static str> {
    static HEADERS: OnceLock<DashMap<String, &'static str>> = OnceLock::new();
    HEADERS.get_or_init(DashMap::new)
}

/// `may_minihttp` only accepts `&'static str` header lines. Lines are leaked
/// once and reused; past the cap they are leaked per response instead.
fn intern_header(line: String) -> &'static str {
    intern_in(interned_headers(), MAX_INTERNED_HEADERS, line)
}

fn intern_in(
    headers: &DashMap<String, &'static str>,
    limit: usize,
    line: String,
) -> &'static str {
    if let Some(existing) = headers.get(&line) {
        return *existing;
    }
    if headers.len() >= limit {
        warn!(header = %line, "Header intern table full, leaking header line");
        return Box::leak(line.into_boxed_str());
    }
    let leaked: &'static str = Box::leak(line.clone().into_boxed_str());
    *headers.entry(line).or_insert(leaked)
}

/// Write a buffered [`Response`] onto the wire response.
pub fn write_response(res: &mut may_minihttp::Response, response: Response) {
    let (status, headers, body) = response.into_parts();
    res.status_code(status as usize, status_reason(status));
    for (name, value) in headers {
        res.header(intern_header(format!("{name}: {value}")));
    }
    res.body_vec(body);
}
