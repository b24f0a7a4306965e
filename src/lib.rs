//! # triechain
//!
//! **triechain** is a small HTTP framework core for Rust: a per-method segment
//! trie router, path-prefix route groups that own middleware, and a
//! re-entrant handler chain, served on `may` coroutines through
//! `may_minihttp`.
//!
//! ## Architecture
//!
//! - **[`router`]** - segment tries with literal, `:param` and `*catchall` segments
//! - **[`context`]** - per-request state and the `next`/`fail` chain executor
//! - **[`engine`]** - route groups, the configuration-time [`Engine`] and the frozen [`App`]
//! - **[`middleware`]** - logger, auth, CORS and metrics handlers
//! - **[`server`]** - `may_minihttp` transport for an [`App`]
//! - **[`static_files`]** - traversal-safe file mapping with content types
//! - **[`config`]** / **[`logging`]** - YAML + env configuration and `tracing` setup
//! - **[`cli`]** - the `triechain` binary
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as HttpServer<br/>(may_minihttp)
//!     participant App as App::dispatch
//!     participant Router as Router::handle
//!     participant Chain as Context::next
//!
//!     Client->>Server: GET /v1/hello/tom
//!     Server->>App: Request
//!     App->>App: collect middleware of groups<br/>whose prefix starts the path
//!     App->>Router: Context (middleware chain)
//!     Router->>Router: trie search, bind {name: tom}
//!     alt No Route Match
//!         Router->>Chain: append 404 handler
//!     else Match
//!         Router->>Chain: append route handler
//!     end
//!     Chain->>Chain: run handlers in order<br/>(next / fail / short-circuit)
//!     Chain-->>Server: Response
//!     Server-->>Client: status, headers, body
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use triechain::{middleware, Engine, Request};
//!
//! # fn main() -> Result<(), triechain::RouteError> {
//! let engine = Engine::new();
//! engine.use_all([middleware::logger()]);
//!
//! let v1 = engine.group("/v1");
//! v1.use_middleware(|ctx| {
//!     ctx.set_header("X-Api-Version", "1");
//!     ctx.next();
//! });
//! v1.get("/hello/:name", |ctx| {
//!     let name = ctx.param("name").unwrap_or_default().to_string();
//!     ctx.string(200, format!("hello {name}\n"));
//! })?;
//!
//! let app = engine.build();
//! let res = app.dispatch(Request::new(Method::GET, "/v1/hello/tom"));
//! assert_eq!(res.status(), 200);
//! assert_eq!(res.header("x-api-version"), Some("1"));
//!
//! let res = app.dispatch(Request::new(Method::GET, "/v2/hello/tom"));
//! assert_eq!(res.body_str(), "404 NOT FOUND: /v2/hello/tom\n");
//! # Ok(())
//! # }
//! ```
//!
//! Serving the same app over HTTP is `engine.run("127.0.0.1:9999")`.

pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod server;
pub mod static_files;

pub use context::{handler, Context, HandlerFunc, Request, Response};
pub use engine::{App, Engine, RouterGroup};
pub use error::RouteError;
pub use ids::RequestId;
pub use router::Router;
