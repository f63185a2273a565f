//! Terminal observers for request errors and timings.
//!
//! # Responsibilities
//! - Receive the errors a request accumulated, once, after the chain unwinds
//! - Receive per-request elapsed time from the timing middleware
//!
//! # Design Decisions
//! - Observers never influence dispatch or the response
//! - Errors are delivered in production order (first produced, first logged)
//! - The tracing sink emits one aggregated event per request; per-error
//!   detail goes to debug

use std::sync::Mutex;
use std::time::Duration;

use crate::pipeline::context::{ContextError, RequestContext};

/// What an observer needs to know about the request it is observing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub route: String,
    pub status: u16,
}

impl RequestSummary {
    pub fn of(ctx: &RequestContext) -> Self {
        Self {
            request_id: ctx.request_id().to_string(),
            method: ctx.method().to_string(),
            path: ctx.path().to_string(),
            route: ctx.route().to_string(),
            status: ctx.status().as_u16(),
        }
    }
}

/// Receiver of per-request telemetry.
pub trait TelemetrySink: Send + Sync {
    /// Called at most once per request with every recorded error, in order.
    fn observe(&self, request: &RequestSummary, errors: &[ContextError]);

    /// Called by the timing middleware after the chain below it returns.
    fn record_timing(&self, request: &RequestSummary, elapsed: Duration);
}

/// Default sink: structured `tracing` events plus metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn observe(&self, request: &RequestSummary, errors: &[ContextError]) {
        if errors.is_empty() {
            return;
        }

        tracing::error!(
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path,
            status = request.status,
            count = errors.len(),
            errors = %summarize(errors),
            "Request errors"
        );

        for (index, error) in errors.iter().enumerate() {
            tracing::debug!(
                request_id = %request.request_id,
                index,
                error = %error.cause,
                kind = %error.kind,
                meta = error.meta.as_deref().unwrap_or(""),
                "Request error"
            );
            crate::observability::metrics::record_error(&error.kind.to_string());
        }
    }

    fn record_timing(&self, request: &RequestSummary, elapsed: Duration) {
        tracing::info!(
            request_id = %request.request_id,
            route = %request.route,
            status = request.status,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Time to process"
        );
        crate::observability::metrics::record_duration(&request.route, elapsed);
    }
}

/// All errors of one request on a single line, in production order.
fn summarize(errors: &[ContextError]) -> String {
    errors
        .iter()
        .map(|error| match &error.meta {
            Some(meta) => format!("{} [{}] ({})", error.cause, error.kind, meta),
            None => format!("{} [{}]", error.cause, error.kind),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// One `observe` call as captured by [`RecordingSink`].
#[derive(Debug, Clone)]
pub struct ObservedErrors {
    pub request: RequestSummary,
    pub errors: Vec<ContextError>,
}

/// Sink that keeps everything in memory, for embedding tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    observed: Mutex<Vec<ObservedErrors>>,
    timings: Mutex<Vec<(RequestSummary, Duration)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observed(&self) -> Vec<ObservedErrors> {
        self.observed.lock().expect("recording sink mutex poisoned").clone()
    }

    pub fn timings(&self) -> Vec<(RequestSummary, Duration)> {
        self.timings.lock().expect("recording sink mutex poisoned").clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn observe(&self, request: &RequestSummary, errors: &[ContextError]) {
        self.observed
            .lock()
            .expect("recording sink mutex poisoned")
            .push(ObservedErrors {
                request: request.clone(),
                errors: errors.to_vec(),
            });
    }

    fn record_timing(&self, request: &RequestSummary, elapsed: Duration) {
        self.timings
            .lock()
            .expect("recording sink mutex poisoned")
            .push((request.clone(), elapsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ErrorKind;

    #[test]
    fn test_summary_keeps_production_order() {
        let errors = [
            ContextError::new("bad date", ErrorKind::BIND),
            ContextError::new("store down", ErrorKind::PRIVATE).with_meta("employee 7"),
        ];

        assert_eq!(
            summarize(&errors),
            format!(
                "bad date [{}]; store down [{}] (employee 7)",
                ErrorKind::BIND,
                ErrorKind::PRIVATE
            )
        );
    }
}
