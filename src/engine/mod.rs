//! # Engine Module
//!
//! Route groups and the two-phase application lifecycle.
//!
//! ## Lifecycle
//!
//! ```text
//! Engine::new() ──► register groups / middleware / routes ──► build() ──► App
//!   (mutable, single owner)                                       (immutable, Clone + Send + Sync)
//! ```
//!
//! - [`Engine`] owns the registration registry and derefs to the root
//!   [`RouterGroup`] (prefix `""`).
//! - [`RouterGroup`] handles share that registry; child groups concatenate
//!   their suffix onto the parent prefix.
//! - [`App`] is a frozen snapshot. It resolves middleware by literal prefix
//!   match on the request path, appends the route handler and runs the chain.
//!
//! Middleware scoping is purely textual: a group with prefix `/v1` also
//! applies to `/v1beta/x`.

mod core;
mod group;

pub use core::{App, Engine};
pub use group::RouterGroup;
