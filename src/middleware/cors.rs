use std::sync::Arc;

use http::Method;
use serde::Deserialize;

use crate::context::{handler, Context, HandlerFunc};

/// CORS settings for [`cors`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` allows any origin
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,
    /// Preflight cache lifetime in seconds
    pub max_age: Option<u32>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            allowed_methods: [
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// The `Access-Control-Allow-Origin` value for `origin`, if allowed.
    fn allow_origin(&self, origin: &str) -> Option<String> {
        if self.allowed_origins.iter().any(|o| o == "*") {
            Some("*".to_string())
        } else if self.allowed_origins.iter().any(|o| o == origin) {
            Some(origin.to_string())
        } else {
            None
        }
    }

    fn apply(&self, ctx: &mut Context, origin: &str) {
        if let Some(allowed) = self.allow_origin(origin) {
            ctx.set_header("Access-Control-Allow-Origin", allowed);
            ctx.set_header("Access-Control-Allow-Methods", self.allowed_methods.join(", "));
            ctx.set_header("Access-Control-Allow-Headers", self.allowed_headers.join(", "));
            if let Some(max_age) = self.max_age {
                ctx.set_header("Access-Control-Max-Age", max_age.to_string());
            }
        }
    }
}

/// Add CORS headers to cross-origin requests.
///
/// Requests without an `Origin` header pass through untouched. `OPTIONS`
/// requests are answered with `204` and never reach the route handler.
pub fn cors(config: CorsConfig) -> HandlerFunc {
    let config = Arc::new(config);
    handler(move |ctx| {
        let Some(origin) = ctx.header("origin").map(str::to_string) else {
            ctx.next();
            return;
        };
        config.apply(ctx, &origin);
        if ctx.method() == Method::OPTIONS {
            ctx.status(204);
            return;
        }
        ctx.next();
    })
}
