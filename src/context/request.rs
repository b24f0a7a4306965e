use std::borrow::Cow;
use std::collections::HashMap;

use http::Method;

/// Request data a [`Context`](super::Context) is built from.
///
/// The transport fills this from the wire; tests build it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Path without the query string
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: String,
    /// Headers with lower-cased names
    pub headers: HashMap<String, String>,
    /// Raw request body
    pub body: Vec<u8>,
}

impl Request {
    /// Build a request for `target`, which may carry a `?query` suffix.
    ///
    /// The path part is taken as already decoded.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self::from_parts(method, path, query)
    }

    /// Build a request from a decoded path and a raw query string.
    pub fn from_parts(method: Method, path: &str, query: &str) -> Self {
        Self {
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query: query.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Add a header (name is lower-cased).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Header value by name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First query string value for `key`.
    pub fn query_param(&self, key: &str) -> Option<String> {
        first_value(self.query.as_bytes(), key)
    }

    /// First value for `key` from an urlencoded form body, falling back to the query string.
    pub fn form_value(&self, key: &str) -> Option<String> {
        let is_form = self
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        let has_body = matches!(self.method, Method::POST | Method::PUT | Method::PATCH);
        if is_form && has_body {
            if let Some(value) = first_value(&self.body, key) {
                return Some(value);
            }
        }
        self.query_param(key)
    }
}

fn first_value(encoded: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Buffered response sink written by handlers.
///
/// The status is committed by the first write; later status changes are
/// ignored, the same way a streaming response writer behaves once headers are
/// on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Committed status, `200` if nothing was written.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Header value by name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Commit `code` unless a status was already committed.
    pub fn write_header(&mut self, code: u16) {
        if self.status.is_none() {
            self.status = Some(code);
        }
    }

    /// Append to the body, committing `200` if no status was written yet.
    pub fn write(&mut self, bytes: &[u8]) {
        self.write_header(200);
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Split into status, headers and body.
    pub fn into_parts(self) -> (u16, Vec<(String, String)>, Vec<u8>) {
        (self.status(), self.headers, self.body)
    }
}
