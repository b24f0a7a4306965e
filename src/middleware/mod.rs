//! # Middleware Module
//!
//! Ready-made chain handlers for use with
//! [`RouterGroup::use_middleware`](crate::RouterGroup::use_middleware) and
//! [`RouterGroup::use_all`](crate::RouterGroup::use_all).
//!
//! Every middleware here is a plain [`HandlerFunc`](crate::HandlerFunc): work
//! placed before `ctx.next()` runs on the way in, work placed after it runs on
//! the way out, and returning without calling `next` short-circuits the chain.
//!
//! - [`logger`] - request/response log line with latency
//! - [`auth`] - static token check on the `Authorization` header
//! - [`cors`] - CORS response headers and preflight answers
//! - [`Metrics`] - request count and average latency

mod auth;
mod cors;
mod logger;
mod metrics;

pub use auth::auth;
pub use cors::{cors, CorsConfig};
pub use logger::logger;
pub use metrics::Metrics;
