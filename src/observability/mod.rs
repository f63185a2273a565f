//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline produces:
//!     → sink.rs (errors after unwind, timings from the timing middleware)
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows into every per-request event
//! - Observers are terminal; they never change a response

pub mod logging;
pub mod metrics;
pub mod sink;

pub use sink::{RecordingSink, RequestSummary, TelemetrySink, TracingSink};
