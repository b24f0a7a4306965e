use std::io::{self, Read};

use http::Method;
use tracing::debug;

use crate::context::Request;

/// Convert a `may_minihttp::Request` into a [`Request`].
///
/// The path is percent-decoded before routing, the query string is kept raw.
/// Header names are lower-cased and values decoded lossily; the body is read
/// to the end.
///
/// # Errors
///
/// `InvalidInput` for a method token `http` does not accept or a path that
/// does not decode to UTF-8, otherwise any error from reading the body.
pub fn parse_request(req: may_minihttp::Request) -> io::Result<Request> {
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let target = req.path();
    let (raw_path, query) = target.split_once('?').unwrap_or((target, ""));
    let mut request = Request::from_parts(
        method,
        &urlencoding::decode(raw_path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        query,
    );

    for h in req.headers() {
        request.headers.insert(
            h.name.to_ascii_lowercase(),
            String::from_utf8_lossy(h.value).into_owned(),
        );
    }

    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;
    request.body = body;

    debug!(
        method = %request.method,
        path = %request.path,
        headers_count = request.headers.len(),
        body_size_bytes = request.body.len(),
        "HTTP request parsed"
    );
    Ok(request)
}
