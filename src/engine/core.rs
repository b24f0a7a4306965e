//! Engine core module - registration registry and the frozen, servable app.

use std::io;
use std::net::ToSocketAddrs;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use minijinja::Environment;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::group::RouterGroup;
use crate::context::{Context, HandlerFunc, Request, Response};
use crate::router::Router;

pub(crate) struct GroupEntry {
    pub(crate) prefix: Arc<str>,
    pub(crate) middlewares: Vec<HandlerFunc>,
    /// Index of the parent group in `Registry::groups`
    pub(crate) parent: Option<usize>,
}

/// Everything registration mutates: the router and the flat group list.
pub(crate) struct Registry {
    pub(crate) router: Router,
    pub(crate) groups: Vec<GroupEntry>,
}

impl Registry {
    pub(crate) fn push_group(&mut self, prefix: Arc<str>, parent: Option<usize>) -> usize {
        self.groups.push(GroupEntry {
            prefix,
            middlewares: Vec::new(),
            parent,
        });
        self.groups.len() - 1
    }
}

/// Configuration-time composition root.
///
/// An `Engine` is itself the root group (prefix `""`) through `Deref`, so
/// routes, middleware and child groups can be registered on it directly.
/// Once configuration is complete, [`Engine::build`] freezes everything into
/// an [`App`] that can be served from many threads without locking.
///
/// ```rust
/// use http::Method;
/// use triechain::{Engine, Request};
///
/// # fn main() -> Result<(), triechain::RouteError> {
/// let engine = Engine::new();
/// engine.get("/hello/:name", |ctx| {
///     let name = ctx.param("name").unwrap_or_default().to_string();
///     ctx.string(200, format!("hello {name}\n"));
/// })?;
///
/// let app = engine.build();
/// let res = app.dispatch(Request::new(Method::GET, "/hello/triechain"));
/// assert_eq!(res.body_str(), "hello triechain\n");
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    root: RouterGroup,
    registry: Arc<Mutex<Registry>>,
    templates: Option<Environment<'static>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Registry {
            router: Router::new(),
            groups: Vec::new(),
        };
        let prefix: Arc<str> = Arc::from("");
        let id = registry.push_group(Arc::clone(&prefix), None);
        let registry = Arc::new(Mutex::new(registry));
        Self {
            root: RouterGroup::new(id, prefix, Arc::clone(&registry)),
            registry,
            templates: None,
        }
    }

    /// Load HTML templates by name from files below `dir`.
    pub fn load_html_dir(&mut self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref().to_path_buf();
        info!(template_dir = %dir.display(), "HTML template directory configured");
        self.templates_mut()
            .set_loader(minijinja::path_loader(dir));
    }

    /// Register an inline HTML template.
    ///
    /// # Errors
    ///
    /// Returns the template syntax error, if any.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), minijinja::Error> {
        self.templates_mut()
            .add_template_owned(name.to_string(), source.to_string())
    }

    /// Adjust the template environment, e.g. to add functions or filters.
    pub fn configure_templates(&mut self, configure: impl FnOnce(&mut Environment<'static>)) {
        configure(self.templates_mut());
    }

    fn templates_mut(&mut self) -> &mut Environment<'static> {
        self.templates.get_or_insert_with(Environment::new)
    }

    /// Snapshot the current configuration into a servable [`App`].
    ///
    /// Registrations made after this call do not affect the returned app;
    /// build again to pick them up.
    #[must_use]
    pub fn build(&self) -> App {
        let registry = self.registry.lock();
        let groups = registry
            .groups
            .iter()
            .map(|g| FrozenGroup {
                prefix: Arc::clone(&g.prefix),
                middlewares: g.middlewares.clone(),
            })
            .collect::<Vec<_>>();
        info!(
            group_count = groups.len(),
            route_count = registry.router.routes().len(),
            "Application built"
        );
        App {
            inner: Arc::new(AppInner {
                router: registry.router.clone(),
                groups,
                templates: self.templates.clone().map(Arc::new),
            }),
        }
    }

    /// Build the app and serve it on `addr` until the server stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server
    /// coroutine panics.
    pub fn run<A: ToSocketAddrs>(&self, addr: A) -> io::Result<()> {
        let handle = crate::server::HttpServer(self.build()).start(addr)?;
        handle
            .join()
            .map_err(|e| io::Error::other(format!("server failed: {e:?}")))
    }
}

impl Deref for Engine {
    type Target = RouterGroup;

    fn deref(&self) -> &RouterGroup {
        &self.root
    }
}

struct FrozenGroup {
    prefix: Arc<str>,
    middlewares: Vec<HandlerFunc>,
}

struct AppInner {
    router: Router,
    groups: Vec<FrozenGroup>,
    templates: Option<Arc<Environment<'static>>>,
}

/// Immutable, cheaply clonable application produced by [`Engine::build`].
///
/// `App` is the dispatcher: for every request it gathers the middleware of all
/// groups whose prefix matches, lets the router append the route handler (or
/// the 404 terminal) and runs the chain.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    /// Middleware that applies to `path`, in group-creation order.
    #[must_use]
    pub fn middlewares_for(&self, path: &str) -> Vec<HandlerFunc> {
        self.inner
            .groups
            .iter()
            .filter(|group| path.starts_with(&*group.prefix))
            .flat_map(|group| group.middlewares.iter().map(Arc::clone))
            .collect()
    }

    /// Run `request` through its handler chain and return the response.
    pub fn dispatch(&self, request: Request) -> Response {
        let middlewares = self.middlewares_for(&request.path);
        let mut ctx = Context::with_handlers(request, middlewares);
        ctx.set_templates(self.inner.templates.clone());

        debug!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            middleware_count = ctx.chain_len(),
            "Dispatching request"
        );

        self.inner.router.handle(&mut ctx);
        ctx.into_response()
    }
}
