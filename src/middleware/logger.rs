use std::time::Instant;

use tracing::info;

use crate::context::{handler, HandlerFunc};

/// Log every request once the rest of the chain has run.
///
/// Logs method, path, final status and latency under the request's id.
pub fn logger() -> HandlerFunc {
    handler(|ctx| {
        let start = Instant::now();
        ctx.next();
        info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            status = ctx.response().status(),
            latency_us = start.elapsed().as_micros() as u64,
            "Request completed"
        );
    })
}
