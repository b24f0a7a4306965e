//! Router core module - per-method tries plus the handler table.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, error};

use super::radix::{parse_pattern, validate_pattern, TrieNode};
use crate::context::{Context, HandlerFunc};
use crate::error::RouteError;

/// Path parameters extracted for a matched route, keyed by name without sigil.
pub type Params = HashMap<String, String>;

/// Composite handler key, `METHOD-pattern`.
fn route_key(method: &Method, pattern: &str) -> String {
    format!("{}-{}", method.as_str(), pattern)
}

/// Terminal handler appended when nothing matches.
fn not_found(ctx: &mut Context) {
    let body = format!("404 NOT FOUND: {}\n", ctx.path());
    ctx.string(404, body);
}

/// Result of resolving a request path against one method's trie.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The terminal trie node that matched
    pub node: &'a TrieNode,
    /// Parameters bound from the node's own pattern
    pub params: Params,
}

impl RouteMatch<'_> {
    /// The registered pattern that matched (e.g. `/user/:id`).
    pub fn pattern(&self) -> &str {
        self.node.pattern()
    }
}

/// Router holding one segment trie per HTTP method.
///
/// Registration mutates the tries and must finish before serving begins; the
/// read path ([`Router::get_route`], [`Router::handle`]) takes `&self` and is
/// safe to share across request threads once the router is frozen inside an
/// [`App`](crate::engine::App).
#[derive(Clone)]
pub struct Router {
    roots: HashMap<Method, TrieNode>,
    handlers: HashMap<String, HandlerFunc>,
    not_found: HandlerFunc,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roots: HashMap::new(),
            handlers: HashMap::new(),
            not_found: Arc::new(not_found),
        }
    }

    /// Register `handler` for `method` and `pattern`.
    ///
    /// The method's trie is created on first use. Registering the same pattern
    /// twice replaces the handler.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for an empty pattern, a pattern without a
    /// leading `/`, a segment after a catch-all, or an unnamed `:` segment.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerFunc,
    ) -> Result<(), RouteError> {
        let parts = validate_pattern(pattern)?;
        let key = route_key(&method, pattern);

        self.roots
            .entry(method)
            .or_insert_with(TrieNode::root)
            .insert(pattern, &parts, 0);
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Resolve `path` for `method`, returning the matched node and its params.
    ///
    /// Parameters are bound by walking the matched node's registered pattern
    /// against the request segments: `:name` takes the segment at the same
    /// position, `*name` takes every remaining segment joined with `/` and ends
    /// the walk.
    #[must_use]
    pub fn get_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let search_parts = parse_pattern(path);
        let root = self.roots.get(method)?;
        let node = root.search(&search_parts, 0)?;

        let mut params = Params::new();
        for (index, part) in parse_pattern(node.pattern()).into_iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                if let Some(value) = search_parts.get(index) {
                    params.insert(name.to_string(), (*value).to_string());
                }
            } else if let Some(name) = part.strip_prefix('*') {
                if !name.is_empty() {
                    if let Some(rest) = search_parts.get(index..) {
                        params.insert(name.to_string(), rest.join("/"));
                    }
                }
                break;
            }
        }

        Some(RouteMatch { node, params })
    }

    /// Every terminal node registered for `method`, depth-first.
    #[must_use]
    pub fn get_routes(&self, method: &Method) -> Vec<&TrieNode> {
        let mut nodes = Vec::new();
        if let Some(root) = self.roots.get(method) {
            root.travel(&mut nodes);
        }
        nodes
    }

    /// Every registered `(method, pattern)` pair, sorted by method then trie order.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut methods: Vec<&Method> = self.roots.keys().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
            .into_iter()
            .flat_map(|method| {
                self.get_routes(method)
                    .into_iter()
                    .map(move |node| (method.clone(), node.pattern().to_string()))
            })
            .collect()
    }

    /// Append the resolved handler (or the 404 terminal) to `ctx` and run the chain.
    pub fn handle(&self, ctx: &mut Context) {
        let method = ctx.method().clone();
        let resolved = self.get_route(&method, ctx.path()).and_then(|m| {
            let key = route_key(&method, m.pattern());
            match self.handlers.get(&key) {
                Some(handler) => Some((Arc::clone(handler), m.params)),
                None => {
                    error!(
                        method = %method,
                        route_pattern = %m.pattern(),
                        "Terminal trie node has no registered handler"
                    );
                    None
                }
            }
        });

        match resolved {
            Some((handler, params)) => {
                ctx.set_params(params);
                ctx.push_handler(handler);
            }
            None => {
                debug!(method = %method, path = %ctx.path(), "No route matched");
                ctx.push_handler(Arc::clone(&self.not_found));
            }
        }
        ctx.next();
    }
}
