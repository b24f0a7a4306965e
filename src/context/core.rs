//! Context core module - per-request state and the chain executor.

use std::sync::Arc;

use http::Method;
use minijinja::Environment;
use serde::Serialize;
use tracing::debug;

use super::request::{Request, Response};
use crate::ids::RequestId;
use crate::router::Params;

/// A middleware or route handler.
///
/// Handlers receive the request's [`Context`] and either call
/// [`Context::next`] to run the rest of the chain, return without calling it to
/// short-circuit, or call [`Context::fail`] to abort with an error body.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Wrap a closure as a [`HandlerFunc`].
pub fn handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Where the chain cursor currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// `next` has not been called yet
    NotStarted,
    /// The cursor points at a handler in the chain
    Running,
    /// The cursor is past the last handler (finished or failed)
    Completed,
}

/// Per-request state: request data, path params, response sink and the
/// ordered handler chain with its cursor.
///
/// A context belongs to exactly one request flow. Handlers may do their own
/// work concurrently but chain control (`next`, `fail`) stays on the flow that
/// owns the context, which `&mut self` enforces.
pub struct Context {
    request_id: RequestId,
    request: Request,
    params: Params,
    status_code: u16,
    response: Response,
    handlers: Vec<HandlerFunc>,
    /// Index of the handler currently running; `None` before the first `next`
    index: Option<usize>,
    templates: Option<Arc<Environment<'static>>>,
}

impl Context {
    /// Build a context with an empty chain.
    pub fn new(request: Request) -> Self {
        let request_id = RequestId::from_header_or_new(request.header("x-request-id"));
        Self {
            request_id,
            request,
            params: Params::new(),
            status_code: 0,
            response: Response::default(),
            handlers: Vec::new(),
            index: None,
            templates: None,
        }
    }

    /// Build a context whose chain starts with `handlers`.
    pub fn with_handlers(request: Request, handlers: Vec<HandlerFunc>) -> Self {
        let mut ctx = Self::new(request);
        ctx.handlers = handlers;
        ctx
    }

    pub(crate) fn set_templates(&mut self, templates: Option<Arc<Environment<'static>>>) {
        self.templates = templates;
    }

    pub(crate) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Append a handler to the end of the chain.
    pub fn push_handler(&mut self, handler: HandlerFunc) {
        self.handlers.push(handler);
    }

    // ---------------------------------------------------------------------
    // chain control
    // ---------------------------------------------------------------------

    /// Run the next handler in the chain.
    ///
    /// The cursor is shared by every handler of the request: a handler that
    /// calls `next` runs the rest of the chain inline and gets control back
    /// afterwards, while a handler that returns without calling it ends the
    /// chain there. No handler runs twice.
    pub fn next(&mut self) {
        let index = self.advance();
        if let Some(current) = self.handlers.get(index).map(Arc::clone) {
            current(self);
        }
    }

    fn advance(&mut self) -> usize {
        let index = self.index.map_or(0, |i| i.saturating_add(1));
        self.index = Some(index);
        index
    }

    /// Abort the chain and write `{"message": message}` with status `code`.
    ///
    /// Handlers after the current one never run; handlers already on the stack
    /// return normally when control comes back to them.
    pub fn fail(&mut self, code: u16, message: impl Into<String>) {
        let message = message.into();
        debug!(
            request_id = %self.request_id,
            status = code,
            message = %message,
            "Handler chain aborted"
        );
        self.index = Some(self.handlers.len());
        self.json(code, &serde_json::json!({ "message": message }));
    }

    /// Current position of the chain cursor.
    pub fn state(&self) -> ChainState {
        match self.index {
            None => ChainState::NotStarted,
            Some(i) if i < self.handlers.len() => ChainState::Running,
            Some(_) => ChainState::Completed,
        }
    }

    /// Number of handlers in the chain.
    pub fn chain_len(&self) -> usize {
        self.handlers.len()
    }

    // ---------------------------------------------------------------------
    // request accessors
    // ---------------------------------------------------------------------

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// All path parameters bound for the matched route.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A path parameter by name (without its `:`/`*` sigil).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// First query string value for `key`.
    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query_param(key)
    }

    /// Form value for `key` (urlencoded body first, then query string).
    pub fn post_form(&self, key: &str) -> Option<String> {
        self.request.form_value(key)
    }

    /// Request header by name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    // ---------------------------------------------------------------------
    // response writers
    // ---------------------------------------------------------------------

    /// Last status a handler asked for (0 if none).
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    /// Record `code` and commit it to the response if nothing was written yet.
    pub fn status(&mut self, code: u16) {
        self.status_code = code;
        self.response.write_header(code);
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.response.set_header(name, value);
    }

    /// Write a `text/plain` body.
    pub fn string(&mut self, code: u16, body: impl AsRef<str>) {
        self.set_header("Content-Type", "text/plain");
        self.status(code);
        self.response.write(body.as_ref().as_bytes());
    }

    /// Write `obj` as an `application/json` body followed by a newline.
    ///
    /// A value that fails to serialize produces a `500` plain-text body with
    /// the serializer's error instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: u16, obj: &T) {
        match serde_json::to_vec(obj) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                self.set_header("Content-Type", "application/json");
                self.status(code);
                self.response.write(&bytes);
            }
            Err(err) => {
                self.set_header("Content-Type", "text/plain; charset=utf-8");
                self.status(500);
                self.response.write(format!("{err}\n").as_bytes());
            }
        }
    }

    /// Write raw bytes.
    pub fn data(&mut self, code: u16, data: &[u8]) {
        self.status(code);
        self.response.write(data);
    }

    /// Render the template `name` with `data` as `text/html`.
    ///
    /// Missing templates and render errors abort the chain with a `500`.
    pub fn html<T: Serialize>(&mut self, code: u16, name: &str, data: T) {
        let rendered = match &self.templates {
            Some(env) => env
                .get_template(name)
                .and_then(|tmpl| tmpl.render(data))
                .map_err(|err| err.to_string()),
            None => Err("no HTML templates configured".to_string()),
        };
        match rendered {
            Ok(body) => {
                self.set_header("Content-Type", "text/html");
                self.status(code);
                self.response.write(body.as_bytes());
            }
            Err(err) => self.fail(500, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn get(path: &str) -> Request {
        Request::new(Method::GET, path)
    }

    /// Handler that appends `name` to a shared log and optionally continues.
    fn recording(
        log: &Arc<parking_lot::Mutex<Vec<String>>>,
        name: &'static str,
        call_next: bool,
    ) -> HandlerFunc {
        let log = Arc::clone(log);
        handler(move |ctx| {
            log.lock().push(format!("{name}:before"));
            if call_next {
                ctx.next();
            }
            log.lock().push(format!("{name}:after"));
        })
    }

    #[test]
    fn test_chain_runs_to_completion_when_every_handler_continues() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut ctx = Context::with_handlers(
            get("/"),
            vec![
                recording(&log, "a", true),
                recording(&log, "b", true),
                recording(&log, "c", true),
            ],
        );
        assert_eq!(ctx.state(), ChainState::NotStarted);
        ctx.next();
        assert_eq!(ctx.state(), ChainState::Completed);
        assert_eq!(log.lock().len(), 6);
    }

    #[test]
    fn test_reentrant_next_wraps_downstream_handlers() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut ctx = Context::with_handlers(
            get("/"),
            vec![
                recording(&log, "outer", true),
                recording(&log, "inner", true),
                recording(&log, "route", false),
            ],
        );
        ctx.next();
        assert_eq!(
            *log.lock(),
            vec![
                "outer:before",
                "inner:before",
                "route:before",
                "route:after",
                "inner:after",
                "outer:after"
            ]
        );
    }

    #[test]
    fn test_each_handler_runs_exactly_once() {
        let calls: Arc<Vec<AtomicUsize>> = Arc::new((0..4).map(|_| AtomicUsize::new(0)).collect());
        let chain = (0..4)
            .map(|i| {
                let calls = Arc::clone(&calls);
                handler(move |ctx| {
                    calls[i].fetch_add(1, Ordering::SeqCst);
                    ctx.next();
                    // A second call after the chain is done is a no-op.
                    ctx.next();
                })
            })
            .collect();
        let mut ctx = Context::with_handlers(get("/"), chain);
        ctx.next();
        for counter in calls.iter() {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_fail_stops_downstream_and_writes_message() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut ctx = Context::with_handlers(
            get("/"),
            vec![
                recording(&log, "first", true),
                handler(|ctx| ctx.fail(403, "forbidden")),
                recording(&log, "never", false),
            ],
        );
        ctx.next();
        assert_eq!(*log.lock(), vec!["first:before", "first:after"]);
        assert_eq!(ctx.state(), ChainState::Completed);
        let res = ctx.response();
        assert_eq!(res.status(), 403);
        assert_eq!(res.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "forbidden" }));
    }

    #[test]
    fn test_handler_without_next_short_circuits_silently() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut ctx = Context::with_handlers(
            get("/"),
            vec![
                handler(|ctx| ctx.string(401, "no")),
                recording(&log, "never", false),
            ],
        );
        ctx.next();
        assert!(log.lock().is_empty());
        assert_eq!(ctx.state(), ChainState::Running);
        assert_eq!(ctx.response().status(), 401);
    }

    #[test]
    fn test_string_and_data_writers() {
        let mut ctx = Context::new(get("/"));
        ctx.string(201, format!("hello {}\n", "world"));
        ctx.data(500, b"more");
        assert_eq!(ctx.status_code(), 500);
        let res = ctx.into_response();
        assert_eq!(res.status(), 201);
        assert_eq!(res.header("Content-Type"), Some("text/plain"));
        assert_eq!(res.body_str(), "hello world\nmore");
    }

    #[test]
    fn test_html_without_templates_fails_with_500() {
        let mut ctx = Context::with_handlers(
            get("/"),
            vec![handler(|ctx| ctx.html(200, "index.html", ()))],
        );
        ctx.next();
        assert_eq!(ctx.response().status(), 500);
        assert!(ctx.response().body_str().contains("no HTML templates configured"));
    }

    #[test]
    fn test_html_renders_registered_template() {
        let mut env = Environment::new();
        env.add_template_owned("hello.html".to_string(), "<h1>Hello {{ name }}!</h1>".to_string())
            .unwrap();
        let mut ctx = Context::new(get("/"));
        ctx.set_templates(Some(Arc::new(env)));
        ctx.html(200, "hello.html", serde_json::json!({ "name": "World" }));
        assert_eq!(ctx.response().body_str(), "<h1>Hello World!</h1>");
        assert_eq!(ctx.response().header("content-type"), Some("text/html"));
    }
}
