//! Registration-time errors.
//!
//! Routing misses and chain short-circuits are ordinary outcomes and never show
//! up here. A [`RouteError`] means the application was configured with a pattern
//! the trie cannot represent, and it is reported before the first request is
//! served.

use thiserror::Error;

/// A route pattern rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern was the empty string.
    #[error("route pattern is empty")]
    EmptyPattern,

    /// The pattern did not start with `/`.
    #[error("route pattern `{pattern}` must start with '/'")]
    MissingLeadingSlash { pattern: String },

    /// A segment followed a catch-all segment.
    #[error("catch-all `{catch_all}` must be the last segment of `{pattern}`")]
    CatchAllNotLast { pattern: String, catch_all: String },

    /// A `:` segment carried no parameter name.
    #[error("parameter segment in `{pattern}` has no name")]
    EmptyParamName { pattern: String },
}
