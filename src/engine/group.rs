use std::path::PathBuf;
use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::core::Registry;
use crate::context::{handler, Context, HandlerFunc};
use crate::error::RouteError;
use crate::static_files::StaticFiles;

/// A path-prefix namespace that owns middleware and registers routes.
///
/// Every group of an [`Engine`](super::Engine) shares the engine's registry:
/// the one [`Router`](crate::router::Router) and the flat list of all groups.
/// A `RouterGroup` is a cheap handle into that registry, so any number of
/// groups can be held and configured at the same time.
///
/// At request time groups are not walked as a tree. Every group whose prefix
/// is a literal prefix of the request path contributes its middleware, in the
/// order the groups were created.
#[derive(Clone)]
pub struct RouterGroup {
    id: usize,
    prefix: Arc<str>,
    registry: Arc<Mutex<Registry>>,
}

impl RouterGroup {
    pub(crate) fn new(id: usize, prefix: Arc<str>, registry: Arc<Mutex<Registry>>) -> Self {
        Self {
            id,
            prefix,
            registry,
        }
    }

    /// Absolute prefix of this group.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The group this one was created from, if any.
    pub fn parent(&self) -> Option<RouterGroup> {
        let registry = self.registry.lock();
        let parent_id = registry.groups.get(self.id)?.parent?;
        let prefix = Arc::clone(&registry.groups.get(parent_id)?.prefix);
        Some(RouterGroup::new(parent_id, prefix, Arc::clone(&self.registry)))
    }

    /// Create a child group whose prefix is this prefix followed by `suffix`.
    ///
    /// The two strings are concatenated verbatim; no slashes are added or
    /// collapsed.
    pub fn group(&self, suffix: &str) -> RouterGroup {
        let prefix: Arc<str> = Arc::from(format!("{}{}", self.prefix, suffix));
        let id = self
            .registry
            .lock()
            .push_group(Arc::clone(&prefix), Some(self.id));
        debug!(group_prefix = %prefix, parent_prefix = %self.prefix, "Route group created");
        RouterGroup::new(id, prefix, Arc::clone(&self.registry))
    }

    /// Append a middleware to this group.
    pub fn use_middleware<F>(&self, middleware: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.use_all([handler(middleware)]);
    }

    /// Append several middleware handlers, in iteration order.
    pub fn use_all(&self, handlers: impl IntoIterator<Item = HandlerFunc>) {
        let mut registry = self.registry.lock();
        if let Some(group) = registry.groups.get_mut(self.id) {
            group.middlewares.extend(handlers);
        }
    }

    /// Register `handler` for `method` at `prefix + path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the absolute pattern is malformed.
    pub fn handle<F>(&self, method: Method, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(method, path, handler(handler_fn))
    }

    fn add_route(&self, method: Method, path: &str, handler: HandlerFunc) -> Result<(), RouteError> {
        let pattern = format!("{}{}", self.prefix, path);
        self.registry
            .lock()
            .router
            .add_route(method.clone(), &pattern, handler)?;
        info!(method = %method, route_pattern = %pattern, "Route registered");
        Ok(())
    }

    /// Register a `GET` route.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::handle`].
    pub fn get<F>(&self, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::GET, path, handler_fn)
    }

    /// Register a `POST` route.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::handle`].
    pub fn post<F>(&self, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::POST, path, handler_fn)
    }

    /// Register a `PUT` route.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::handle`].
    pub fn put<F>(&self, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::PUT, path, handler_fn)
    }

    /// Register a `DELETE` route.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::handle`].
    pub fn delete<F>(&self, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::DELETE, path, handler_fn)
    }

    /// Register a `PATCH` route.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::handle`].
    pub fn patch<F>(&self, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::PATCH, path, handler_fn)
    }

    /// Register a `HEAD` route.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::handle`].
    pub fn head<F>(&self, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::HEAD, path, handler_fn)
    }

    /// Register an `OPTIONS` route.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::handle`].
    pub fn options<F>(&self, path: &str, handler_fn: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::OPTIONS, path, handler_fn)
    }

    /// Serve files below `root` at `prefix + relative_path/*filepath`.
    ///
    /// The handler answers `404` with an empty body when the requested file
    /// does not exist (or escapes `root`) and otherwise streams the file with a
    /// content type guessed from its extension.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the resulting pattern is malformed.
    pub fn static_dir(&self, relative_path: &str, root: impl Into<PathBuf>) -> Result<(), RouteError> {
        let files = StaticFiles::new(root);
        let pattern = format!("{}/*filepath", relative_path.trim_end_matches('/'));
        self.get(&pattern, move |ctx| {
            let file = ctx.param("filepath").unwrap_or_default().to_string();
            if files.resolve(&file).is_none() {
                ctx.status(404);
                return;
            }
            match files.load(&file) {
                Ok((bytes, content_type)) => {
                    ctx.set_header("Content-Type", content_type);
                    ctx.data(200, &bytes);
                }
                Err(err) => ctx.fail(500, err.to_string()),
            }
        })
    }
}
