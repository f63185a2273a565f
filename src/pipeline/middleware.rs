//! Built-in middleware.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::BoxFuture;

use crate::observability::sink::{RequestSummary, TelemetrySink};
use crate::pipeline::chain::{Middleware, Next};
use crate::pipeline::context::RequestContext;

/// Hands every error recorded during the request to the sink once the
/// chain below has fully unwound.
#[derive(Clone)]
pub struct ErrorLogger {
    sink: Arc<dyn TelemetrySink>,
}

impl ErrorLogger {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }
}

impl Middleware for ErrorLogger {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            next.run(ctx).await;

            if !ctx.errors().is_empty() {
                self.sink.observe(&RequestSummary::of(ctx), ctx.errors());
            }
        })
    }
}

/// Measures the time spent in the rest of the chain, whatever its outcome.
#[derive(Clone)]
pub struct Timing {
    sink: Arc<dyn TelemetrySink>,
}

impl Timing {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }
}

impl Middleware for Timing {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let start = Instant::now();

            next.run(ctx).await;

            self.sink.record_timing(&RequestSummary::of(ctx), start.elapsed());
        })
    }
}
