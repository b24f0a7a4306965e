//! # Router Module
//!
//! Path matching and route resolution for triechain.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Storing one segment trie per HTTP method
//! - Mapping each registered `(method, pattern)` to its handler
//! - Extracting `:param` and `*catch_all` values from a matched request path
//! - Substituting the 404 terminal when nothing matches
//!
//! ## Pattern Syntax
//!
//! | Segment     | Matches                                   | Param value          |
//! |-------------|-------------------------------------------|----------------------|
//! | `users`     | exactly `users`                           | -                    |
//! | `:id`       | any single segment                        | the segment          |
//! | `*filepath` | one or more trailing segments (must be last) | segments joined by `/` |
//!
//! Patterns are case-sensitive. Sibling precedence is declaration order.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use triechain::{handler, router::Router};
//!
//! let mut router = Router::new();
//! router
//!     .add_route(Method::GET, "/user/:id", handler(|ctx| ctx.string(200, "user")))
//!     .unwrap();
//!
//! let m = router.get_route(&Method::GET, "/user/42").unwrap();
//! assert_eq!(m.pattern(), "/user/:id");
//! assert_eq!(m.params["id"], "42");
//! ```

mod core;
mod radix;

pub use core::{Params, RouteMatch, Router};
pub use radix::TrieNode;
