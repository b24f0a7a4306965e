//! # Context Module
//!
//! Per-request execution state for triechain.
//!
//! A [`Context`] owns everything one request needs while its handler chain
//! runs: the [`Request`], the bound path parameters, a buffered [`Response`]
//! and the ordered chain of [`HandlerFunc`]s with a cursor.
//!
//! ## Chain Control
//!
//! ```text
//! NotStarted --next()--> Running --(next() past the last handler / fail())--> Completed
//! ```
//!
//! - [`Context::next`] runs the next handler inline. Code after the call in a
//!   middleware runs once everything downstream has finished.
//! - Returning without calling `next` ends the chain without an error.
//! - [`Context::fail`] moves the cursor to the end and writes
//!   `{"message": "..."}` immediately.
//!
//! ```rust
//! use http::Method;
//! use triechain::context::{handler, Context, Request};
//!
//! let mut ctx = Context::with_handlers(
//!     Request::new(Method::GET, "/"),
//!     vec![
//!         handler(|ctx| {
//!             ctx.set_header("X-Powered-By", "triechain");
//!             ctx.next();
//!         }),
//!         handler(|ctx| ctx.string(200, "ok")),
//!     ],
//! );
//! ctx.next();
//! assert_eq!(ctx.response().body_str(), "ok");
//! ```

mod core;
mod request;

pub use core::{handler, ChainState, Context, HandlerFunc};
pub use request::{Request, Response};
