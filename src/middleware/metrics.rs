use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context::{handler, HandlerFunc};

/// Request counters shared between a middleware handler and its readers.
///
/// All counters are atomics updated with `Ordering::Relaxed`; readings are
/// eventually consistent.
#[derive(Debug, Default)]
pub struct Metrics {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    failures: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A chain handler recording into these metrics.
    pub fn handler(self: &Arc<Self>) -> HandlerFunc {
        let metrics = Arc::clone(self);
        handler(move |ctx| {
            metrics.request_count.fetch_add(1, Ordering::Relaxed);
            let start = Instant::now();
            ctx.next();
            metrics
                .total_latency_ns
                .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
            if ctx.response().status() >= 400 {
                metrics.failures.fetch_add(1, Ordering::Relaxed);
            }
        })
    }

    /// Total number of requests seen
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests answered with a 4xx or 5xx status
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Mean time spent in the downstream chain, zero before the first request.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}
