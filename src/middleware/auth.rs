use std::sync::Arc;

use tracing::warn;

use crate::context::{handler, HandlerFunc};

/// Reject requests whose `Authorization` header is not exactly `token`.
///
/// Failing requests are aborted with `401` and `{"message":"Unauthorized"}`.
pub fn auth(token: impl Into<String>) -> HandlerFunc {
    let token: Arc<str> = Arc::from(token.into());
    handler(move |ctx| {
        if ctx.header("authorization") == Some(&*token) {
            ctx.next();
            return;
        }
        warn!(
            request_id = %ctx.request_id(),
            path = %ctx.path(),
            "Authorization rejected"
        );
        ctx.fail(401, "Unauthorized");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, Request};
    use http::Method;

    fn run(req: Request) -> Context {
        let mut ctx = Context::with_handlers(
            req,
            vec![auth("Bearer secret"), handler(|ctx| ctx.string(200, "ok"))],
        );
        ctx.next();
        ctx
    }

    #[test]
    fn test_matching_token_passes() {
        let ctx = run(Request::new(Method::GET, "/").with_header("Authorization", "Bearer secret"));
        assert_eq!(ctx.response().status(), 200);
        assert_eq!(ctx.response().body_str(), "ok");
    }

    #[test]
    fn test_missing_or_wrong_token_is_401() {
        for req in [
            Request::new(Method::GET, "/"),
            Request::new(Method::GET, "/").with_header("Authorization", "Bearer nope"),
        ] {
            let ctx = run(req);
            assert_eq!(ctx.response().status(), 401);
            assert_eq!(ctx.response().body_str(), "{\"message\":\"Unauthorized\"}\n");
        }
    }
}
